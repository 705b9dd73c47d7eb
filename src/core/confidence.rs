//! Confidence Scoring Module
//! Aggregates retained pair evidence into a single 0-100 connection score
//!
//! Each retained pair contributes a fixed weight for its evidence type;
//! the sum is clamped to 100.

use serde::{Deserialize, Serialize};

use crate::models::types::{LinkCategory, PairEvidence};

/// Connection confidence (0-100)
/// - 0: No evidence
/// - 1-30: Weak (shared counterparties only)
/// - 31-60: Moderate
/// - 61-100: Strong (direct transfers or several corroborating signals)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceScore {
    pub total: u8,
    /// One factor per retained pair
    pub breakdown: Vec<ScoreFactor>,
}

/// Contribution of a single pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreFactor {
    pub pair: String,
    pub category: LinkCategory,
    pub points: u32,
}

impl ConfidenceScore {
    /// Points a pair contributes for its evidence type
    pub fn category_weight(category: LinkCategory) -> u32 {
        match category {
            LinkCategory::Direct => 40,
            LinkCategory::Middleman => 30,
            LinkCategory::TimeProximate => 20,
            LinkCategory::SharedCounterparty => 10,
            _ => 5,
        }
    }

    /// Score the final deduplicated evidence set
    pub fn calculate(pairs: &[PairEvidence]) -> Self {
        let breakdown: Vec<ScoreFactor> = pairs
            .iter()
            .map(|p| ScoreFactor {
                pair: format!("{}-{}", p.entity_a, p.entity_b),
                category: p.category,
                points: Self::category_weight(p.category),
            })
            .collect();

        let sum: u32 = breakdown.iter().map(|f| f.points).sum();
        let total = sum.min(100) as u8;

        Self { total, breakdown }
    }

    pub fn verdict(&self) -> &'static str {
        match self.total {
            0 => "NO CONNECTION",
            1..=30 => "WEAK",
            31..=60 => "MODERATE",
            _ => "STRONG",
        }
    }

    /// Get color code for UI
    pub fn color_code(&self) -> &'static str {
        match self.total {
            0 => "#6b7280",       // Gray
            1..=30 => "#eab308",  // Yellow
            31..=60 => "#f97316", // Orange
            _ => "#ef4444",       // Red
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: &str, b: &str, category: LinkCategory) -> PairEvidence {
        PairEvidence {
            entity_a: a.to_string(),
            entity_b: b.to_string(),
            reason: String::new(),
            score: 0,
            category,
        }
    }

    #[test]
    fn test_empty_is_zero() {
        let score = ConfidenceScore::calculate(&[]);
        assert_eq!(score.total, 0);
        assert_eq!(score.verdict(), "NO CONNECTION");
    }

    #[test]
    fn test_category_weights_sum() {
        let score = ConfidenceScore::calculate(&[
            pair("a", "b", LinkCategory::Direct),
            pair("a", "c", LinkCategory::SharedCounterparty),
            pair("b", "c", LinkCategory::TimeProximate),
        ]);
        assert_eq!(score.total, 70);
        assert_eq!(score.breakdown.len(), 3);
        assert_eq!(score.verdict(), "STRONG");
    }

    #[test]
    fn test_clamped_to_100() {
        let pairs: Vec<_> = ["b", "c", "d", "e"]
            .iter()
            .map(|b| pair("a", b, LinkCategory::Direct))
            .collect();
        assert_eq!(ConfidenceScore::calculate(&pairs).total, 100);
    }

    #[test]
    fn test_other_category_weight() {
        assert_eq!(ConfidenceScore::category_weight(LinkCategory::SharedProgram), 5);
    }

    #[test]
    fn test_monotonic_in_evidence() {
        let mut pairs = vec![pair("a", "b", LinkCategory::SharedCounterparty)];
        let before = ConfidenceScore::calculate(&pairs).total;
        pairs.push(pair("a", "c", LinkCategory::Middleman));
        let after = ConfidenceScore::calculate(&pairs).total;
        assert!(after >= before);
    }
}
