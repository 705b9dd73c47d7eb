//! Pair Evidence Recorder
//! Keeps the single strongest piece of evidence per unordered address pair.

use std::collections::HashMap;

use crate::models::types::{pair_key, LinkCategory, PairEvidence};

#[derive(Debug, Default)]
pub struct PairRecorder {
    entries: Vec<PairEvidence>,
    index: HashMap<String, usize>,
}

impl PairRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, or replace only when `score` is strictly higher than the stored one.
    /// A replacement keeps the pair's original recording position.
    pub fn record(
        &mut self,
        a: &str,
        b: &str,
        reason: impl Into<String>,
        score: u32,
        category: LinkCategory,
    ) {
        if a == b {
            return;
        }

        let (entity_a, entity_b) = if a <= b { (a, b) } else { (b, a) };
        let evidence = PairEvidence {
            entity_a: entity_a.to_string(),
            entity_b: entity_b.to_string(),
            reason: reason.into(),
            score,
            category,
        };

        let key = pair_key(a, b);
        match self.index.get(&key) {
            Some(&idx) => {
                if score > self.entries[idx].score {
                    self.entries[idx] = evidence;
                }
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(evidence);
            }
        }
    }

    pub fn get(&self, a: &str, b: &str) -> Option<&PairEvidence> {
        self.index.get(&pair_key(a, b)).map(|&idx| &self.entries[idx])
    }

    /// Recorded evidence, recording order
    pub fn entries(&self) -> &[PairEvidence] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evidence sorted by score descending. The sort is stable, so equal
    /// scores stay in recording order.
    pub fn ranked(&self) -> Vec<PairEvidence> {
        let mut pairs = self.entries.clone();
        pairs.sort_by(|x, y| y.score.cmp(&x.score));
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_sorted() {
        let mut rec = PairRecorder::new();
        rec.record("zed", "abe", "r", 10, LinkCategory::SharedCounterparty);
        let ev = rec.get("abe", "zed").unwrap();
        assert_eq!(ev.entity_a, "abe");
        assert_eq!(ev.entity_b, "zed");
    }

    #[test]
    fn test_higher_score_replaces() {
        let mut rec = PairRecorder::new();
        rec.record("a", "b", "shared", 10, LinkCategory::SharedCounterparty);
        rec.record("b", "a", "direct", 50, LinkCategory::Direct);
        rec.record("a", "b", "time", 30, LinkCategory::TimeProximate);

        assert_eq!(rec.len(), 1);
        let ev = rec.get("a", "b").unwrap();
        assert_eq!(ev.score, 50);
        assert_eq!(ev.category, LinkCategory::Direct);
        assert_eq!(ev.reason, "direct");
    }

    #[test]
    fn test_equal_score_keeps_first() {
        let mut rec = PairRecorder::new();
        rec.record("a", "b", "first", 30, LinkCategory::TimeProximate);
        rec.record("a", "b", "second", 30, LinkCategory::TimeProximate);
        assert_eq!(rec.get("a", "b").unwrap().reason, "first");
    }

    #[test]
    fn test_ranked_descending_with_stable_ties() {
        let mut rec = PairRecorder::new();
        rec.record("a", "b", "ab", 10, LinkCategory::SharedCounterparty);
        rec.record("a", "c", "ac", 50, LinkCategory::Direct);
        rec.record("b", "c", "bc", 10, LinkCategory::SharedCounterparty);

        let ranked = rec.ranked();
        let reasons: Vec<&str> = ranked.iter().map(|p| p.reason.as_str()).collect();
        assert_eq!(reasons, vec!["ac", "ab", "bc"]);
    }

    #[test]
    fn test_self_pair_ignored() {
        let mut rec = PairRecorder::new();
        rec.record("a", "a", "self", 50, LinkCategory::Direct);
        assert!(rec.is_empty());
    }
}
