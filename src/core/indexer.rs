//! Interaction Indexer
//!
//! Walks every record of every monitored address once. Recipients that are
//! themselves monitored become direct transfers; everything else becomes a
//! counterparty with an interaction log entry. Programs only feed the graph.

use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::core::evidence::PairRecorder;
use crate::core::registry::GraphRegistry;
use crate::models::config::AnalysisConfig;
use crate::models::types::{EntityActivity, Interaction, LinkCategory, NodeCategory};
use crate::utils::constants::{DIRECT_LINK_WEIGHT, DIRECT_PAIR_SCORE, SHARED_LINK_WEIGHT};
use crate::utils::labels::short_signature;

/// Interactions with one external address
#[derive(Debug, Clone, Default)]
pub struct InteractionLog {
    pub entries: Vec<Interaction>,
    /// Distinct monitored interactors, first-encounter order
    pub interactors: Vec<String>,
}

impl InteractionLog {
    fn push(&mut self, entity: &str, timestamp: i64, signature: &str) {
        if !self.interactors.iter().any(|e| e == entity) {
            self.interactors.push(entity.to_string());
        }
        self.entries.push(Interaction {
            entity: entity.to_string(),
            timestamp,
            signature: signature.to_string(),
        });
    }

    pub fn distinct_interactors(&self) -> usize {
        self.interactors.len()
    }
}

/// Per-counterparty interaction logs, iterated in first-touch order
#[derive(Debug, Default)]
pub struct InteractionIndex {
    order: Vec<String>,
    logs: HashMap<String, InteractionLog>,
}

impl InteractionIndex {
    fn record(&mut self, counterparty: &str, entity: &str, timestamp: i64, signature: &str) {
        if !self.logs.contains_key(counterparty) {
            self.order.push(counterparty.to_string());
        }
        self.logs
            .entry(counterparty.to_string())
            .or_default()
            .push(entity, timestamp, signature);
    }

    pub fn get(&self, counterparty: &str) -> Option<&InteractionLog> {
        self.logs.get(counterparty)
    }

    /// 0 for addresses with no log (programs, monitored addresses)
    pub fn distinct_interactors(&self, counterparty: &str) -> usize {
        self.logs.get(counterparty).map_or(0, InteractionLog::distinct_interactors)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InteractionLog)> {
        self.order
            .iter()
            .filter_map(|id| self.logs.get(id).map(|log| (id.as_str(), log)))
    }

    pub fn counterparty_count(&self) -> usize {
        self.order.len()
    }
}

/// Result of the indexing pass
#[derive(Debug, Default)]
pub struct IndexOutcome {
    pub index: InteractionIndex,
    pub total_transactions_scanned: u64,
    pub malformed_skipped: u64,
}

/// Index all activity, writing counterparty/program nodes, their links and
/// direct-transfer evidence as it goes.
pub fn index_interactions(
    activities: &[EntityActivity],
    monitored: &HashSet<String>,
    config: &AnalysisConfig,
    registry: &mut GraphRegistry,
    recorder: &mut PairRecorder,
) -> IndexOutcome {
    let mut outcome = IndexOutcome::default();

    for activity in activities {
        let entity = activity.address.as_str();
        outcome.total_transactions_scanned += activity.transactions.len() as u64;

        for tx in &activity.transactions {
            if tx.is_malformed() {
                outcome.malformed_skipped += 1;
                continue;
            }

            for recipient in &tx.recipients {
                if recipient == entity {
                    continue;
                }

                if monitored.contains(recipient) {
                    registry.upsert_link(
                        entity,
                        recipient,
                        LinkCategory::Direct,
                        DIRECT_LINK_WEIGHT,
                        Some(tx.signature.clone()),
                    );
                    recorder.record(
                        entity,
                        recipient,
                        format!("Direct transfer (tx {})", short_signature(&tx.signature)),
                        DIRECT_PAIR_SCORE,
                        LinkCategory::Direct,
                    );
                } else {
                    registry.upsert_node(recipient, NodeCategory::Counterparty);
                    registry.upsert_link(
                        entity,
                        recipient,
                        LinkCategory::SharedCounterparty,
                        SHARED_LINK_WEIGHT,
                        None,
                    );
                    outcome
                        .index
                        .record(recipient, entity, tx.block_time, &tx.signature);
                }
            }

            if config.include_programs {
                for program in &tx.program_ids {
                    if config.is_ignored_program(program) || monitored.contains(program) {
                        continue;
                    }
                    registry.upsert_node(program, NodeCategory::Program);
                    registry.upsert_link(
                        entity,
                        program,
                        LinkCategory::SharedProgram,
                        SHARED_LINK_WEIGHT,
                        None,
                    );
                }
            }
        }
    }

    if outcome.malformed_skipped > 0 {
        warn!("⚠️ Skipped {} malformed records (missing sender)", outcome.malformed_skipped);
    }
    debug!(
        "📇 Indexed {} txs, {} counterparties",
        outcome.total_transactions_scanned,
        outcome.index.counterparty_count()
    );

    outcome
}
