//! Gap severity buckets.

use serde::{Deserialize, Serialize};

use crate::config::SeverityThresholds;

/// Severity of a coverage shortfall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapSeverity {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl GapSeverity {
    /// Buckets a gap fraction. Boundary values belong to the higher bucket.
    pub fn classify(gap_percentage: f64, thresholds: &SeverityThresholds) -> Self {
        if gap_percentage >= thresholds.critical {
            Self::Critical
        } else if gap_percentage >= thresholds.high {
            Self::High
        } else if gap_percentage >= thresholds.medium {
            Self::Medium
        } else if gap_percentage >= thresholds.low {
            Self::Low
        } else {
            Self::None
        }
    }

    /// Whether the interval needs attention (High or Critical).
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

/// Number of intervals per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub none: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl SeverityCounts {
    pub fn record(&mut self, severity: GapSeverity) {
        match severity {
            GapSeverity::None => self.none += 1,
            GapSeverity::Low => self.low += 1,
            GapSeverity::Medium => self.medium += 1,
            GapSeverity::High => self.high += 1,
            GapSeverity::Critical => self.critical += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.none + self.low + self.medium + self.high + self.critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_go_up() {
        let t = SeverityThresholds::default();
        assert_eq!(GapSeverity::classify(0.0, &t), GapSeverity::None);
        assert_eq!(GapSeverity::classify(0.0499, &t), GapSeverity::None);
        assert_eq!(GapSeverity::classify(0.05, &t), GapSeverity::Low);
        assert_eq!(GapSeverity::classify(0.0999, &t), GapSeverity::Low);
        assert_eq!(GapSeverity::classify(0.10, &t), GapSeverity::Medium);
        assert_eq!(GapSeverity::classify(0.20, &t), GapSeverity::High);
        assert_eq!(GapSeverity::classify(0.3499, &t), GapSeverity::High);
        assert_eq!(GapSeverity::classify(0.35, &t), GapSeverity::Critical);
        assert_eq!(GapSeverity::classify(1.0, &t), GapSeverity::Critical);
    }

    #[test]
    fn test_custom_thresholds() {
        let t = SeverityThresholds {
            low: 0.01,
            medium: 0.02,
            high: 0.03,
            critical: 0.04,
        };
        assert_eq!(GapSeverity::classify(0.05, &t), GapSeverity::Critical);
        assert_eq!(GapSeverity::classify(0.015, &t), GapSeverity::Low);
    }

    #[test]
    fn test_counts() {
        let mut c = SeverityCounts::default();
        c.record(GapSeverity::High);
        c.record(GapSeverity::High);
        c.record(GapSeverity::None);
        assert_eq!(c.high, 2);
        assert_eq!(c.total(), 3);
        assert!(GapSeverity::High.is_critical());
        assert!(!GapSeverity::Medium.is_critical());
    }
}
