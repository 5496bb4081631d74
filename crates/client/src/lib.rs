//! Search API HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). Covers the probe
//! loop every harness command shares: build payload → POST → parse → retry
//! on any transport or decode failure.

pub mod api;
pub mod error;
pub mod probe;

pub use api::{ExtraInfos, ProbeResult, RequestParams, SearchResponse};
pub use error::ClientError;
pub use probe::{RetryPolicy, SearchClient};
