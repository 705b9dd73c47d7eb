//! Type definitions for Ruster Graph
//! All core data structures for connection analysis

use serde::{Deserialize, Serialize};

use crate::utils::labels::short_id;

/// One transaction as delivered by the chain data provider.
///
/// `recipients` never contains `sender`, and both `recipients` and
/// `program_ids` are already deduplicated (first occurrence wins).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub signature: String,
    /// Unix seconds, 0 when the provider had no block time
    #[serde(default)]
    pub block_time: i64,
    /// Fee payer; `None` marks a malformed record
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub recipients: Vec<String>,
    #[serde(default)]
    pub program_ids: Vec<String>,
}

impl TransactionRecord {
    pub fn new(signature: impl Into<String>, sender: impl Into<String>, block_time: i64) -> Self {
        Self {
            signature: signature.into(),
            block_time,
            sender: Some(sender.into()),
            recipients: Vec::new(),
            program_ids: Vec::new(),
        }
    }

    /// Add a recipient, ignoring duplicates and the sender itself
    pub fn to(mut self, recipient: impl Into<String>) -> Self {
        let recipient = recipient.into();
        if self.sender.as_deref() != Some(recipient.as_str()) && !self.recipients.contains(&recipient) {
            self.recipients.push(recipient);
        }
        self
    }

    /// Add an invoked program, ignoring duplicates
    pub fn via(mut self, program_id: impl Into<String>) -> Self {
        let program_id = program_id.into();
        if !self.program_ids.contains(&program_id) {
            self.program_ids.push(program_id);
        }
        self
    }

    pub fn is_malformed(&self) -> bool {
        self.sender.as_deref().map_or(true, str::is_empty)
    }
}

/// Transaction history for one monitored address, in caller order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityActivity {
    pub address: String,
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
}

impl EntityActivity {
    pub fn new(address: impl Into<String>, transactions: Vec<TransactionRecord>) -> Self {
        Self {
            address: address.into(),
            transactions,
        }
    }
}

/// Graph node classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeCategory {
    /// Monitored address
    Input,
    /// External address touched by a monitored one
    Counterparty,
    /// Invoked on-chain program
    Program,
    /// Counterparty promoted to hub
    Middleman,
}

impl NodeCategory {
    /// Upgrade precedence. Only strictly higher precedence replaces a stored category.
    pub fn precedence(&self) -> u8 {
        match self {
            NodeCategory::Counterparty | NodeCategory::Program => 0,
            NodeCategory::Middleman => 1,
            NodeCategory::Input => 2,
        }
    }

    /// Merge an incoming observation into a stored category
    pub fn upgrade(self, incoming: NodeCategory) -> NodeCategory {
        if incoming.precedence() > self.precedence() {
            incoming
        } else {
            self
        }
    }

    /// Weight a node starts with when first registered
    pub fn base_weight(&self) -> f64 {
        match self {
            NodeCategory::Middleman => 15.0,
            _ => 5.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeCategory::Input => "INPUT",
            NodeCategory::Counterparty => "COUNTERPARTY",
            NodeCategory::Program => "PROGRAM",
            NodeCategory::Middleman => "MIDDLEMAN",
        }
    }
}

/// Relationship type shared by graph links and pair evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkCategory {
    Direct,
    SharedCounterparty,
    SharedProgram,
    Middleman,
    TimeProximate,
}

impl LinkCategory {
    /// 1 for the categories allowed to overwrite a stored link, 0 otherwise
    pub fn strength(&self) -> u8 {
        match self {
            LinkCategory::Direct | LinkCategory::Middleman => 1,
            _ => 0,
        }
    }

    pub fn is_strong(&self) -> bool {
        self.strength() > 0
    }

    /// Merge an incoming observation into a stored category.
    /// Strong observations always win, weak ones never replace anything.
    pub fn upgrade(self, incoming: LinkCategory) -> LinkCategory {
        if incoming.is_strong() && incoming.strength() >= self.strength() {
            incoming
        } else {
            self
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkCategory::Direct => "DIRECT",
            LinkCategory::SharedCounterparty => "SHARED_COUNTERPARTY",
            LinkCategory::SharedProgram => "SHARED_PROGRAM",
            LinkCategory::Middleman => "MIDDLEMAN",
            LinkCategory::TimeProximate => "TIME_PROXIMATE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DIRECT" => Some(LinkCategory::Direct),
            "SHARED_COUNTERPARTY" => Some(LinkCategory::SharedCounterparty),
            "SHARED_PROGRAM" => Some(LinkCategory::SharedProgram),
            "MIDDLEMAN" => Some(LinkCategory::Middleman),
            "TIME_PROXIMATE" => Some(LinkCategory::TimeProximate),
            _ => None,
        }
    }
}

/// Graph node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "group")]
    pub category: NodeCategory,
    pub label: String,
    /// Rendered node size
    #[serde(rename = "val")]
    pub weight: f64,
}

impl Node {
    pub fn new(id: impl Into<String>, category: NodeCategory) -> Self {
        let id = id.into();
        Self {
            label: short_id(&id),
            weight: category.base_weight(),
            id,
            category,
        }
    }
}

/// Undirected graph link. `id` is the canonical pair key of its endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub category: LinkCategory,
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Canonical key for an unordered pair: both ids sorted and joined
pub fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{}-{}", a, b)
    } else {
        format!("{}-{}", b, a)
    }
}

/// Strongest evidence recorded for one pair of monitored addresses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairEvidence {
    /// Lexicographically smaller address
    pub entity_a: String,
    pub entity_b: String,
    pub reason: String,
    pub score: u32,
    #[serde(rename = "type")]
    pub category: LinkCategory,
}

/// One interaction of a monitored address with an external address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interaction {
    pub entity: String,
    pub timestamp: i64,
    pub signature: String,
}

/// Pruned graph ready for rendering
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl Graph {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn link(&self, a: &str, b: &str) -> Option<&Link> {
        let key = pair_key(a, b);
        self.links.iter().find(|l| l.id == key)
    }
}

/// Ranked evidence plus aggregate counts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    /// Sorted by score descending, ties in recording order
    pub pairs: Vec<PairEvidence>,
    pub total_transactions_scanned: u64,
    pub unique_counterparty_count: u64,
    /// 0-100
    pub confidence_score: u8,
}

/// Full engine output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub graph: Graph,
    pub summary: AnalysisSummary,
}

impl AnalysisReport {
    /// Pretty print the ranked pairs
    pub fn summary_text(&self) -> String {
        let mut output = format!(
            "\n🔗 Confidence: {}/100 | Scanned: {} txs | Counterparties: {}\n",
            self.summary.confidence_score,
            self.summary.total_transactions_scanned,
            self.summary.unique_counterparty_count
        );
        output.push_str(&format!(
            "   Graph: {} nodes, {} links\n",
            self.graph.nodes.len(),
            self.graph.links.len()
        ));

        if self.summary.pairs.is_empty() {
            output.push_str("   No connections found\n");
        } else {
            output.push_str("   Connections:\n");
            for pair in &self.summary.pairs {
                output.push_str(&format!(
                    "     - {} <-> {} [{}] {} ({})\n",
                    short_id(&pair.entity_a),
                    short_id(&pair.entity_b),
                    pair.category.as_str(),
                    pair.reason,
                    pair.score
                ));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_order_independent() {
        assert_eq!(pair_key("alpha", "beta"), pair_key("beta", "alpha"));
        assert_eq!(pair_key("alpha", "beta"), "alpha-beta");
    }

    #[test]
    fn test_node_category_upgrade_only_moves_up() {
        let cat = NodeCategory::Counterparty.upgrade(NodeCategory::Middleman);
        assert_eq!(cat, NodeCategory::Middleman);
        assert_eq!(cat.upgrade(NodeCategory::Counterparty), NodeCategory::Middleman);
        assert_eq!(NodeCategory::Program.upgrade(NodeCategory::Counterparty), NodeCategory::Program);
        assert_eq!(NodeCategory::Input.upgrade(NodeCategory::Middleman), NodeCategory::Input);
    }

    #[test]
    fn test_link_category_weak_never_overwrites() {
        assert_eq!(
            LinkCategory::SharedCounterparty.upgrade(LinkCategory::TimeProximate),
            LinkCategory::SharedCounterparty
        );
        assert_eq!(
            LinkCategory::SharedCounterparty.upgrade(LinkCategory::Middleman),
            LinkCategory::Middleman
        );
        assert_eq!(
            LinkCategory::Direct.upgrade(LinkCategory::SharedCounterparty),
            LinkCategory::Direct
        );
        assert_eq!(LinkCategory::Direct.upgrade(LinkCategory::Middleman), LinkCategory::Middleman);
    }

    #[test]
    fn test_record_builder_dedupes_and_skips_sender() {
        let tx = TransactionRecord::new("sig", "me", 10)
            .to("you")
            .to("you")
            .to("me")
            .via("prog")
            .via("prog");
        assert_eq!(tx.recipients, vec!["you".to_string()]);
        assert_eq!(tx.program_ids, vec!["prog".to_string()]);
        assert!(!tx.is_malformed());
    }

    #[test]
    fn test_record_missing_sender_is_malformed() {
        let json = r#"{"signature":"abc","recipients":["x"]}"#;
        let tx: TransactionRecord = serde_json::from_str(json).unwrap();
        assert!(tx.is_malformed());
        assert_eq!(tx.block_time, 0);
    }

    #[test]
    fn test_category_string_roundtrip() {
        for cat in [
            LinkCategory::Direct,
            LinkCategory::SharedCounterparty,
            LinkCategory::SharedProgram,
            LinkCategory::Middleman,
            LinkCategory::TimeProximate,
        ] {
            assert_eq!(LinkCategory::parse(cat.as_str()), Some(cat));
        }
    }
}
