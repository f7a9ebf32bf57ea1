//! Risk Classifier
//!
//! Pure mapping from a final score to an ordered risk label via a threshold
//! table. The table is configuration: it validates once at load time and is
//! never re-checked per call.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD, DEFAULT_MEDIUM_THRESHOLD};
use crate::logic::error::EngineError;

// ============================================================================
// RISK LEVELS
// ============================================================================

/// Ordered risk labels for a scored pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Normal,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Normal => "Normal",
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    pub fn severity_level(&self) -> u8 {
        match self {
            RiskLevel::Normal => 0,
            RiskLevel::Low => 1,
            RiskLevel::Medium => 2,
            RiskLevel::High => 3,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// THRESHOLD TABLE
// ============================================================================

/// Score thresholds, checked high to low; first match wins, else Normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high: DEFAULT_HIGH_THRESHOLD,
            medium: DEFAULT_MEDIUM_THRESHOLD,
            low: DEFAULT_LOW_THRESHOLD,
        }
    }
}

impl RiskThresholds {
    /// Load an externally edited threshold table; fails fast on malformed
    /// content.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let data = std::fs::read(path)?;
        let thresholds: Self = serde_json::from_slice(&data).map_err(|e| {
            EngineError::InvalidConfiguration(format!("{}: {}", path.display(), e))
        })?;
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Thresholds must each sit in [0, 1] and strictly decrease
    /// high > medium > low.
    pub fn validate(&self) -> Result<(), EngineError> {
        for (name, value) in [("high", self.high), ("medium", self.medium), ("low", self.low)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(EngineError::InvalidConfiguration(format!(
                    "{} threshold {} outside [0, 1]",
                    name, value
                )));
            }
        }
        if !(self.high > self.medium && self.medium > self.low) {
            return Err(EngineError::InvalidConfiguration(format!(
                "thresholds must strictly decrease: high {} / medium {} / low {}",
                self.high, self.medium, self.low
            )));
        }
        Ok(())
    }

    pub fn classify(&self, score: f64) -> RiskLevel {
        if score >= self.high {
            RiskLevel::High
        } else if score >= self.medium {
            RiskLevel::Medium
        } else if score >= self.low {
            RiskLevel::Low
        } else {
            RiskLevel::Normal
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_classification() {
        let t = RiskThresholds::default();
        assert_eq!(t.classify(0.9), RiskLevel::High);
        assert_eq!(t.classify(0.85), RiskLevel::High);
        assert_eq!(t.classify(0.75), RiskLevel::Medium);
        assert_eq!(t.classify(0.70), RiskLevel::Medium);
        assert_eq!(t.classify(0.5), RiskLevel::Low);
        assert_eq!(t.classify(0.49), RiskLevel::Normal);
        assert_eq!(t.classify(0.0), RiskLevel::Normal);
    }

    #[test]
    fn test_validate_default() {
        RiskThresholds::default().validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_non_decreasing() {
        let t = RiskThresholds {
            high: 0.5,
            medium: 0.7,
            low: 0.2,
        };
        assert!(matches!(
            t.validate(),
            Err(EngineError::InvalidConfiguration(_))
        ));
        let equal = RiskThresholds {
            high: 0.7,
            medium: 0.7,
            low: 0.2,
        };
        assert!(equal.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let t = RiskThresholds {
            high: 1.2,
            medium: 0.7,
            low: 0.5,
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(RiskLevel::High > RiskLevel::Medium);
        assert!(RiskLevel::Medium > RiskLevel::Low);
        assert!(RiskLevel::Low > RiskLevel::Normal);
        assert_eq!(RiskLevel::High.severity_level(), 3);
    }

    #[test]
    fn test_serializes_as_label_strings() {
        assert_eq!(serde_json::to_string(&RiskLevel::High).unwrap(), "\"High\"");
        assert_eq!(
            serde_json::from_str::<RiskLevel>("\"Normal\"").unwrap(),
            RiskLevel::Normal
        );
    }
}
