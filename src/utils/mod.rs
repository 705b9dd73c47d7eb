//! Utils Module - Helper Functions & Shared Utilities

pub mod cache;
pub mod constants;
pub mod export;
pub mod labels;
pub mod telemetry;

pub use cache::{CacheStats, TransactionCache};
pub use constants::*;
pub use export::{activities_from_json, pairs_from_csv, pairs_to_csv, pairs_to_json, write_report, PairRow};
pub use labels::{short_id, short_signature};
pub use telemetry::{TelemetryCollector, TelemetryStats};
