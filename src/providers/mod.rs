//! Providers Module - External Data Sources
//!
//! Chain history over Solana JSON-RPC and narrative insight generation.

pub mod insight;
pub mod solana;

pub use insight::{insight_from_config, HttpInsightGenerator, InsightGenerator, RuleBasedInsight};
pub use solana::{ChainDataProvider, SolanaClient, StaticProvider};
