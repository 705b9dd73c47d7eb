//! Node/Link Registry
//!
//! Owns the deduplicated graph for one analysis run. `upsert_node` and
//! `upsert_link` are the only mutation surface; categories merge through
//! `NodeCategory::upgrade` / `LinkCategory::upgrade` and weights only grow.
//! Insertion order is kept so output is reproducible.

use std::collections::HashMap;

use crate::models::types::{pair_key, Link, LinkCategory, Node, NodeCategory};

#[derive(Debug, Default)]
pub struct GraphRegistry {
    nodes: Vec<Node>,
    node_index: HashMap<String, usize>,
    links: Vec<Link>,
    link_index: HashMap<String, usize>,
}

impl GraphRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create at the category's base weight, or bump weight by 1 and merge category
    pub fn upsert_node(&mut self, id: &str, category: NodeCategory) {
        match self.node_index.get(id) {
            Some(&idx) => {
                let node = &mut self.nodes[idx];
                node.weight += 1.0;
                node.category = node.category.upgrade(category);
            }
            None => {
                self.node_index.insert(id.to_string(), self.nodes.len());
                self.nodes.push(Node::new(id, category));
            }
        }
    }

    /// Add `weight` to the link between `a` and `b`. Self-links are ignored.
    pub fn upsert_link(
        &mut self,
        a: &str,
        b: &str,
        category: LinkCategory,
        weight: f64,
        detail: Option<String>,
    ) {
        if a == b {
            return;
        }

        let key = pair_key(a, b);
        match self.link_index.get(&key) {
            Some(&idx) => {
                let link = &mut self.links[idx];
                link.weight += weight;
                link.category = link.category.upgrade(category);
            }
            None => {
                self.link_index.insert(key.clone(), self.links.len());
                self.links.push(Link {
                    id: key,
                    source: a.to_string(),
                    target: b.to_string(),
                    category,
                    weight,
                    detail,
                });
            }
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn link(&self, a: &str, b: &str) -> Option<&Link> {
        self.link_index.get(&pair_key(a, b)).map(|&idx| &self.links[idx])
    }

    /// Nodes in first-registration order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Links in first-registration order
    pub fn links(&self) -> &[Link] {
        &self.links
    }
}
