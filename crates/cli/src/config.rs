//! Harness configuration: endpoints, request params, probe knobs.
//!
//! One TOML file describes a whole run. `useNewsSearch` is the flag the
//! migration flips, so it is configured per revision; everything else is
//! shared.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use driftwatch_client::{RequestParams, RetryPolicy, SearchClient};
use driftwatch_engine::model::Revision;

use crate::CliError;

#[derive(Debug, Deserialize)]
pub struct HarnessConfig {
    pub endpoints: Endpoints,
    #[serde(default)]
    pub params: ParamsConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
}

#[derive(Debug, Deserialize)]
pub struct Endpoints {
    pub old: String,
    pub new: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParamsConfig {
    pub time_sup_size: u32,
    pub decomposed_flag: bool,
    pub decomposed_size: u32,
    pub size: u32,
    pub use_news_search_old: bool,
    pub use_news_search_new: bool,
    pub search_strategy_type: Option<String>,
}

impl Default for ParamsConfig {
    fn default() -> Self {
        Self {
            time_sup_size: 3,
            decomposed_flag: true,
            decomposed_size: 3,
            size: 12,
            use_news_search_old: false,
            use_news_search_new: true,
            search_strategy_type: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Samples per revision per query in `compare`.
    pub samples: usize,
    /// Worker pool width in `cache`.
    pub workers: usize,
    /// Sleep between failed attempts.
    pub backoff_ms: u64,
    /// Sleep between samples of one query.
    pub probe_gap_ms: u64,
    /// Sleep between queries.
    pub query_gap_ms: u64,
    /// Attempts per probe. Absent = retry forever (the production policy).
    pub max_attempts: Option<u32>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            samples: 3,
            workers: 3,
            backoff_ms: 500,
            probe_gap_ms: 200,
            query_gap_ms: 300,
            max_attempts: None,
        }
    }
}

impl HarnessConfig {
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_toml(&raw).map_err(|e| {
            CliError::config(format!("invalid config {}: {}", path.display(), e))
                .with_hint("expected [endpoints] with old/new URLs, optional [params] and [probe]")
        })
    }

    pub fn params_for(&self, revision: Revision) -> RequestParams {
        RequestParams {
            time_sup_size: self.params.time_sup_size,
            decomposed_flag: self.params.decomposed_flag,
            decomposed_size: self.params.decomposed_size,
            size: self.params.size,
            use_news_search: match revision {
                Revision::Old => self.params.use_news_search_old,
                Revision::New => self.params.use_news_search_new,
            },
            search_strategy_type: self.params.search_strategy_type.clone(),
        }
    }

    pub fn endpoint_for(&self, revision: Revision) -> &str {
        match revision {
            Revision::Old => &self.endpoints.old,
            Revision::New => &self.endpoints.new,
        }
    }

    /// The configured retry policy: unbounded unless `max_attempts` is set.
    pub fn policy(&self) -> RetryPolicy {
        let policy = match self.probe.max_attempts {
            Some(n) => RetryPolicy::bounded(n),
            None => RetryPolicy::unbounded(),
        };
        policy.with_backoff(Duration::from_millis(self.probe.backoff_ms))
    }

    /// Like [`HarnessConfig::policy`], but never unbounded, for drivers
    /// that record a probe failure as an output row instead of waiting out
    /// an outage.
    pub fn bounded_policy(&self, default_attempts: u32) -> RetryPolicy {
        RetryPolicy::bounded(self.probe.max_attempts.unwrap_or(default_attempts))
            .with_backoff(Duration::from_millis(self.probe.backoff_ms))
    }

    pub fn client_for(&self, revision: Revision, policy: RetryPolicy) -> Result<SearchClient, CliError> {
        SearchClient::new(self.endpoint_for(revision), self.params_for(revision), policy)
            .map_err(|e| CliError::general(format!("cannot build HTTP client: {e}")))
    }

    pub fn probe_gap(&self) -> Duration {
        Duration::from_millis(self.probe.probe_gap_ms)
    }

    pub fn query_gap(&self) -> Duration {
        Duration::from_millis(self.probe.query_gap_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = HarnessConfig::from_toml(
            r#"
[endpoints]
old = "http://search.internal/search/modelV2"
new = "http://search.internal/search/coreApp/modelV2"
"#,
        )
        .unwrap();

        assert_eq!(config.probe.samples, 3);
        assert_eq!(config.probe.workers, 3);
        assert_eq!(config.probe.backoff_ms, 500);
        assert!(config.probe.max_attempts.is_none());

        let old = config.params_for(Revision::Old);
        let new = config.params_for(Revision::New);
        assert!(!old.use_news_search);
        assert!(new.use_news_search);
        assert_eq!(old.size, 12);
        assert_eq!(old.time_sup_size, 3);
    }

    #[test]
    fn full_config_round_trips() {
        let config = HarnessConfig::from_toml(
            r#"
[endpoints]
old = "http://a/search"
new = "http://b/search"

[params]
time_sup_size = 5
decomposed_flag = false
decomposed_size = 1
size = 20
use_news_search_old = true
use_news_search_new = true
search_strategy_type = "mergeAllQueryRank"

[probe]
samples = 5
workers = 8
backoff_ms = 100
probe_gap_ms = 0
query_gap_ms = 0
max_attempts = 4
"#,
        )
        .unwrap();

        assert_eq!(config.endpoint_for(Revision::Old), "http://a/search");
        assert_eq!(config.endpoint_for(Revision::New), "http://b/search");
        assert_eq!(config.params_for(Revision::Old).size, 20);
        assert_eq!(
            config.params_for(Revision::New).search_strategy_type.as_deref(),
            Some("mergeAllQueryRank")
        );
        assert_eq!(config.policy().max_attempts, Some(4));
        assert_eq!(config.probe_gap(), Duration::ZERO);
    }

    #[test]
    fn unbounded_policy_by_default_bounded_on_request() {
        let config = HarnessConfig::from_toml(
            r#"
[endpoints]
old = "http://a"
new = "http://b"
"#,
        )
        .unwrap();

        assert!(config.policy().max_attempts.is_none());
        assert_eq!(config.bounded_policy(3).max_attempts, Some(3));
    }

    #[test]
    fn missing_endpoints_is_an_error() {
        assert!(HarnessConfig::from_toml("[probe]\nsamples = 2\n").is_err());
    }
}
