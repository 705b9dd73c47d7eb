//! Core Module - Connection Analysis Engine
//!
//! Indexing, heuristic detectors, pruning and scoring, plus the async
//! service that feeds the engine from a chain data provider.

pub mod confidence;
pub mod detectors;
pub mod engine;
pub mod evidence;
pub mod indexer;
pub mod pruner;
pub mod registry;
pub mod service;

pub use confidence::{ConfidenceScore, ScoreFactor};
pub use engine::ConnectionAnalyzer;
pub use evidence::PairRecorder;
pub use indexer::{InteractionIndex, InteractionLog};
pub use registry::GraphRegistry;
pub use service::AnalysisService;
