//! Heuristic Detectors
//!
//! Direct-transfer and shared-program observations are written while
//! indexing. The two passes here read the finished interaction index:
//! time-proximate activity first, then hub/middleman classification.

use tracing::debug;

use crate::core::evidence::PairRecorder;
use crate::core::indexer::InteractionIndex;
use crate::core::registry::GraphRegistry;
use crate::models::types::{LinkCategory, NodeCategory};
use crate::utils::constants::{
    HUB_MIN_DISTINCT_EXCLUSIVE, HUB_MIN_INTERACTIONS_EXCLUSIVE, MIDDLEMAN_LINK_WEIGHT,
    MIDDLEMAN_PAIR_SCORE, SHARED_COUNTERPARTY_PAIR_SCORE, TIME_PROXIMATE_LINK_WEIGHT,
    TIME_PROXIMATE_PAIR_SCORE,
};
use crate::utils::labels::short_id;

/// Pairs of interactions by different monitored addresses with the same
/// counterparty, no further apart than `window_secs`.
///
/// O(k²) per counterparty where k is its interaction count; k is bounded by
/// the fetch depth. A missing block time is 0, so two unknown timestamps
/// always count as proximate.
pub fn detect_time_proximate(
    index: &InteractionIndex,
    window_secs: u64,
    registry: &mut GraphRegistry,
    recorder: &mut PairRecorder,
) -> usize {
    let mut hits = 0;

    for (counterparty, log) in index.iter() {
        if log.distinct_interactors() < 2 {
            continue;
        }

        let mut entries = log.entries.clone();
        entries.sort_by_key(|e| e.timestamp);

        for i in 0..entries.len() {
            for j in (i + 1)..entries.len() {
                let (first, second) = (&entries[i], &entries[j]);
                if first.entity == second.entity {
                    continue;
                }

                let delta = first.timestamp.abs_diff(second.timestamp);
                if delta > window_secs {
                    continue;
                }

                let detail = Some(format!("{}s apart", delta));
                registry.upsert_link(
                    &first.entity,
                    counterparty,
                    LinkCategory::TimeProximate,
                    TIME_PROXIMATE_LINK_WEIGHT,
                    detail.clone(),
                );
                registry.upsert_link(
                    &second.entity,
                    counterparty,
                    LinkCategory::TimeProximate,
                    TIME_PROXIMATE_LINK_WEIGHT,
                    detail,
                );
                recorder.record(
                    &first.entity,
                    &second.entity,
                    format!(
                        "Interacted with {} within {}s of each other",
                        short_id(counterparty),
                        delta
                    ),
                    TIME_PROXIMATE_PAIR_SCORE,
                    LinkCategory::TimeProximate,
                );
                hits += 1;
            }
        }
    }

    debug!("⏱️ Time-proximate pass: {} interaction pairs in window", hits);
    hits
}

/// Counterparties shared by 2+ monitored addresses. Busy ones (more than two
/// distinct interactors, or more than five interactions) become middlemen.
///
/// Evidence is recorded only for the first two interactors in
/// first-encounter order, whatever the number of interactors; links are
/// still drawn from every interactor.
pub fn detect_hubs(
    index: &InteractionIndex,
    registry: &mut GraphRegistry,
    recorder: &mut PairRecorder,
) -> usize {
    let mut hubs = 0;

    for (counterparty, log) in index.iter() {
        let distinct = log.distinct_interactors();
        if distinct < 2 {
            continue;
        }

        let (first, second) = (&log.interactors[0], &log.interactors[1]);
        let total = log.entries.len();

        if distinct > HUB_MIN_DISTINCT_EXCLUSIVE || total > HUB_MIN_INTERACTIONS_EXCLUSIVE {
            registry.upsert_node(counterparty, NodeCategory::Middleman);
            for entity in &log.interactors {
                registry.upsert_link(
                    entity,
                    counterparty,
                    LinkCategory::Middleman,
                    MIDDLEMAN_LINK_WEIGHT,
                    Some(format!("hub of {}", distinct)),
                );
            }
            recorder.record(
                first,
                second,
                format!(
                    "Both connected through middleman {} ({} wallets, {} interactions)",
                    short_id(counterparty),
                    distinct,
                    total
                ),
                MIDDLEMAN_PAIR_SCORE,
                LinkCategory::Middleman,
            );
            hubs += 1;
        } else {
            recorder.record(
                first,
                second,
                format!("Shared counterparty {}", short_id(counterparty)),
                SHARED_COUNTERPARTY_PAIR_SCORE,
                LinkCategory::SharedCounterparty,
            );
        }
    }

    debug!("🕸️ Hub pass: {} middlemen", hubs);
    hubs
}
