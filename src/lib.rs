//! Ruster Graph Library
//!
//! Wallet connection analysis: given the recent transaction histories of a
//! few monitored addresses, infer how they are related through
//! - direct transfers between them
//! - shared counterparties and middleman hubs
//! - time-proximate interactions with the same address
//! - shared programs
//!
//! and produce a pruned relationship graph, ranked pair evidence and a
//! 0-100 confidence score.

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{AnalysisService, ConfidenceScore, ConnectionAnalyzer};
pub use models::{
    AnalysisConfig, AnalysisReport, AnalysisSummary, AppError, AppResult, EntityActivity, Graph,
    Link, LinkCategory, Node, NodeCategory, PairEvidence, TransactionRecord,
};
pub use providers::{ChainDataProvider, InsightGenerator, SolanaClient, StaticProvider};
pub use utils::{TelemetryCollector, TelemetryStats};
