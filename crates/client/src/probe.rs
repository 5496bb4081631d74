//! Probe loop: retry policy, correlation ids, sample collection.

use std::thread;
use std::time::Duration;

use driftwatch_engine::model::InfoType;

use crate::api::{ProbeResult, RequestParams, SearchRequest, SearchResponse};
use crate::error::ClientError;

pub(crate) const USER_AGENT: &str = concat!("dwatch/", env!("CARGO_PKG_VERSION"));

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_BACKOFF_MS: u64 = 500;

/// Retry policy for one probe.
///
/// `max_attempts: None` retries forever, the production policy: transient
/// flakiness must never surface as a diff or validation signal, so a probe
/// against a permanently-down endpoint hangs rather than failing. Swap in
/// [`RetryPolicy::bounded`] where liveness matters more than signal purity
/// (the audit driver, tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: Option<u32>,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn unbounded() -> Self {
        Self {
            max_attempts: None,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
        }
    }

    pub fn bounded(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts.max(1)),
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Blocking client bound to one revision's endpoint.
pub struct SearchClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    params: RequestParams,
    policy: RetryPolicy,
}

impl SearchClient {
    pub fn new(
        endpoint: impl Into<String>,
        params: RequestParams,
        policy: RetryPolicy,
    ) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            params,
            policy,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issue one probe, retrying per policy. Every attempt carries a fresh
    /// correlation id and is logged on failure before the backoff sleep.
    pub fn probe(&self, query: &str) -> Result<ProbeResult, ClientError> {
        self.probe_with(query, None)
    }

    /// Probe steering the backend toward one category via `childSearchType`.
    pub fn probe_category(
        &self,
        query: &str,
        category: InfoType,
    ) -> Result<ProbeResult, ClientError> {
        self.probe_with(query, Some(category.wire_name()))
    }

    fn probe_with(
        &self,
        query: &str,
        child_search_type: Option<&str>,
    ) -> Result<ProbeResult, ClientError> {
        let query = query.trim();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let correlation_id = uuid::Uuid::new_v4().to_string();
            let body = SearchRequest {
                params: &self.params,
                query,
                traceid: &correlation_id,
                child_search_type,
            };

            match self.attempt(&body) {
                Ok(response) => {
                    return Ok(ProbeResult {
                        correlation_id,
                        response,
                    })
                }
                Err(e) => {
                    eprintln!(
                        "warning: probe failed ({}) query {:?} trace {}: {}",
                        self.endpoint, query, correlation_id, e,
                    );
                    if let Some(max) = self.policy.max_attempts {
                        if attempt >= max {
                            return Err(ClientError::Exhausted { attempts: attempt });
                        }
                    }
                    thread::sleep(self.policy.backoff);
                }
            }
        }
    }

    fn attempt(&self, body: &SearchRequest<'_>) -> Result<SearchResponse, ClientError> {
        let resp = self
            .http
            .post(self.endpoint.as_str())
            .json(body)
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(ClientError::Status(status.as_u16(), head(&text, 200)));
        }

        resp.json::<SearchResponse>()
            .map_err(|e| ClientError::Parse(e.to_string()))
    }

    /// Collect `n` samples for one query.
    ///
    /// Under the unbounded policy every slot fills (or the call never
    /// returns). Under a bounded policy failed slots are dropped and the
    /// partial set is returned; callers must tolerate fewer than `n`,
    /// down to zero.
    pub fn collect(&self, query: &str, n: usize, gap: Duration) -> Vec<ProbeResult> {
        let mut samples = Vec::with_capacity(n);

        for i in 0..n {
            match self.probe(query) {
                Ok(result) => samples.push(result),
                Err(e) => eprintln!(
                    "warning: sample {}/{} dropped for query {:?}: {}",
                    i + 1,
                    n,
                    query.trim(),
                    e,
                ),
            }
            if i + 1 < n && !gap.is_zero() {
                thread::sleep(gap);
            }
        }

        samples
    }
}

fn head(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}
