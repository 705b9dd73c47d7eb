//! Graph Pruner
//!
//! Drops single-touch counterparties from the registry's graph. A link
//! survives if both ends are monitored, or if its external end is a program
//! or was touched by 2+ monitored addresses according to the interaction
//! index. The index is consulted directly; node categories are not trusted
//! for this decision.

use std::collections::HashSet;

use crate::core::indexer::InteractionIndex;
use crate::core::registry::GraphRegistry;
use crate::models::types::{Graph, Node, NodeCategory};

pub fn prune_graph(
    monitored_order: &[String],
    monitored: &HashSet<String>,
    registry: &GraphRegistry,
    index: &InteractionIndex,
) -> Graph {
    let is_relevant = |id: &str| -> bool {
        monitored.contains(id)
            || registry
                .node(id)
                .map_or(false, |n| n.category == NodeCategory::Program)
            || index.distinct_interactors(id) >= 2
    };

    let links: Vec<_> = registry
        .links()
        .iter()
        .filter(|link| is_relevant(&link.source) && is_relevant(&link.target))
        .cloned()
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut nodes: Vec<Node> = Vec::new();

    for id in monitored_order {
        if seen.insert(id.as_str()) {
            nodes.push(
                registry
                    .node(id)
                    .cloned()
                    .unwrap_or_else(|| Node::new(id.as_str(), NodeCategory::Input)),
            );
        }
    }

    for link in &links {
        for id in [link.source.as_str(), link.target.as_str()] {
            if seen.insert(id) {
                if let Some(node) = registry.node(id) {
                    nodes.push(node.clone());
                }
            }
        }
    }

    Graph { nodes, links }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::evidence::PairRecorder;
    use crate::core::indexer::index_interactions;
    use crate::models::config::AnalysisConfig;
    use crate::models::types::{EntityActivity, LinkCategory, TransactionRecord};

    fn run(activities: &[EntityActivity], config: &AnalysisConfig) -> Graph {
        let order: Vec<String> = activities.iter().map(|a| a.address.clone()).collect();
        let monitored: HashSet<String> = order.iter().cloned().collect();
        let mut reg = GraphRegistry::new();
        for id in &order {
            reg.upsert_node(id, NodeCategory::Input);
        }
        let mut rec = PairRecorder::new();
        let out = index_interactions(activities, &monitored, config, &mut reg, &mut rec);
        prune_graph(&order, &monitored, &reg, &out.index)
    }

    #[test]
    fn test_single_touch_counterparty_dropped() {
        let activities = vec![
            EntityActivity::new("A", vec![TransactionRecord::new("s1", "A", 0).to("X").to("Y")]),
            EntityActivity::new("B", vec![TransactionRecord::new("s2", "B", 0).to("X")]),
        ];
        let graph = run(&activities, &AnalysisConfig::default());

        assert!(graph.node("X").is_some());
        assert!(graph.node("Y").is_none());
        assert!(graph.link("A", "Y").is_none());
        assert_eq!(graph.links.len(), 2);
    }

    #[test]
    fn test_program_links_kept_even_single_touch() {
        let activities = vec![EntityActivity::new(
            "A",
            vec![TransactionRecord::new("s1", "A", 0).via("JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4")],
        )];
        let graph = run(&activities, &AnalysisConfig::default());

        let link = graph
            .link("A", "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4")
            .unwrap();
        assert_eq!(link.category, LinkCategory::SharedProgram);
        assert_eq!(graph.nodes.len(), 2);
    }

    #[test]
    fn test_monitored_always_present_first() {
        let activities = vec![EntityActivity::new("A", vec![]), EntityActivity::new("B", vec![])];
        let graph = run(&activities, &AnalysisConfig::default());

        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert!(graph.nodes.iter().all(|n| n.category == NodeCategory::Input));
        assert!(graph.links.is_empty());
    }
}
