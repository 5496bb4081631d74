//! `driftwatch-engine` — diff, validation, and coverage engine.
//!
//! Pure engine crate: receives sampled id sequences and parsed result
//! records, returns structured reports. No HTTP or filesystem dependencies.

pub mod coverage;
pub mod diff;
pub mod error;
pub mod model;
pub mod rules;
pub mod validate;

pub use coverage::CoverageCounters;
pub use diff::{best_pairing, compare_ids};
pub use error::EngineError;
pub use model::{
    BestPairing, CacheBucket, DiffReport, IdSample, InfoType, OrderChange, ResultRecord, Revision,
};
pub use validate::validate_record;
