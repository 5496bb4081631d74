//! Wire types for the search contract.
//!
//! POST request, JSON body; response envelope carries the ranked records in
//! `data` and cache metadata in `extraInfos`.

use serde::{Deserialize, Serialize};

use driftwatch_engine::model::{CacheBucket, IdSample, ResultRecord};

/// Fixed request parameters shared by every probe against one revision.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestParams {
    pub time_sup_size: u32,
    pub decomposed_flag: bool,
    pub decomposed_size: u32,
    pub size: u32,
    pub use_news_search: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_strategy_type: Option<String>,
}

impl Default for RequestParams {
    fn default() -> Self {
        Self {
            time_sup_size: 3,
            decomposed_flag: true,
            decomposed_size: 3,
            size: 12,
            use_news_search: true,
            search_strategy_type: None,
        }
    }
}

/// One request body. `traceid` is regenerated on every attempt so that
/// server-side traces stay one-to-one with requests.
#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    #[serde(flatten)]
    pub params: &'a RequestParams,
    pub query: &'a str,
    pub traceid: &'a str,
    #[serde(rename = "childSearchType", skip_serializing_if = "Option::is_none")]
    pub child_search_type: Option<&'a str>,
}

/// Response envelope. `data` is kept raw so "absent" and "not a list" can
/// be told apart from an empty result set; both are structural errors, not
/// empty results.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub data: Option<serde_json::Value>,
    #[serde(rename = "extraInfos")]
    pub extra_infos: Option<ExtraInfos>,
    #[serde(rename = "traceId")]
    pub trace_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtraInfos {
    #[serde(rename = "isCache")]
    pub is_cache: Option<bool>,
    #[serde(rename = "cacheTraceId")]
    pub cache_trace_id: Option<String>,
    #[serde(rename = "decomposedQueries")]
    pub decomposed_queries: Option<Vec<String>>,
}

impl SearchResponse {
    /// Parsed records, or `None` when `data` is absent or not a list.
    pub fn records(&self) -> Option<Vec<ResultRecord>> {
        let items = self.data.as_ref()?.as_array()?;
        Some(
            items
                .iter()
                .map(|item| serde_json::from_value(item.clone()).unwrap_or_default())
                .collect(),
        )
    }

    /// Whether `extraInfos.isCache` was present, and its value.
    pub fn cache_flag(&self) -> Option<bool> {
        self.extra_infos.as_ref().and_then(|e| e.is_cache)
    }

    pub fn cache_bucket(&self) -> CacheBucket {
        CacheBucket::from_flag(self.cache_flag())
    }
}

/// One completed probe: the correlation id that was finally accepted plus
/// the parsed response.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub correlation_id: String,
    pub response: SearchResponse,
}

impl ProbeResult {
    /// Result ids in ranked order. Records without an id are skipped, as is
    /// the whole set on a structural `data` error.
    pub fn ids(&self) -> Vec<String> {
        self.response
            .records()
            .unwrap_or_default()
            .into_iter()
            .map(|r| r.id)
            .filter(|id| !id.is_empty())
            .collect()
    }

    pub fn sample(&self) -> IdSample {
        IdSample {
            ids: self.ids(),
            correlation_id: self.correlation_id.clone(),
        }
    }
}
