//! Feedback Record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::features::vector::SignalMap;
use crate::logic::risk::RiskLevel;

/// One labeled document pair. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub doc_a: String,
    pub doc_b: String,
    /// 1 = collusion confirmed by review, 0 = cleared
    pub label: u8,
    /// Full signal mapping observed at labeling time
    pub signals: SignalMap,
    /// Score/risk the engine reported when the pair was reviewed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskLevel>,
    pub created_at: DateTime<Utc>,
}

impl FeedbackRecord {
    pub fn new(doc_a: &str, doc_b: &str, label: u8, signals: SignalMap) -> Self {
        Self {
            doc_a: doc_a.to_string(),
            doc_b: doc_b.to_string(),
            label: u8::from(label != 0),
            signals,
            score: None,
            risk: None,
            created_at: Utc::now(),
        }
    }

    /// Attach the scoring the reviewer saw
    pub fn with_scoring(mut self, score: f64, risk: RiskLevel) -> Self {
        self.score = Some(score);
        self.risk = Some(risk);
        self
    }

    pub fn has_re_rank(&self) -> bool {
        self.signals.contains_key("re_rank_score")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::vector::signal_map;

    #[test]
    fn test_label_normalized_to_binary() {
        let record = FeedbackRecord::new("a.pdf", "b.pdf", 7, SignalMap::new());
        assert_eq!(record.label, 1);
        let record = FeedbackRecord::new("a.pdf", "b.pdf", 0, SignalMap::new());
        assert_eq!(record.label, 0);
    }

    #[test]
    fn test_serde_round_trip() {
        let record = FeedbackRecord::new(
            "a.pdf",
            "b.pdf",
            1,
            signal_map([("jaccard", 0.8), ("re_rank_score", 0.7)]),
        )
        .with_scoring(0.82, RiskLevel::Medium);

        let json = serde_json::to_string(&record).unwrap();
        let back: FeedbackRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.doc_a, "a.pdf");
        assert_eq!(back.label, 1);
        assert_eq!(back.risk, Some(RiskLevel::Medium));
        assert!(back.has_re_rank());
    }
}
