//! Required-vs-scheduled comparison.
//!
//! # Algorithm
//! For each interval `i`, in forecast order:
//!
//! ```text
//! gap     = max(0, required − scheduled)
//! surplus = max(0, scheduled − required)
//! pct     = gap / required            (0 when required = 0)
//! ```
//!
//! and `coverage_score = 100 · (1 − mean(pct))`, clamped to `[0, 100]`.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::severity::{GapSeverity, SeverityCounts};
use crate::config::CoverageConfig;
use crate::error::{StaffingError, StaffingResult};
use crate::models::IntervalMap;

/// Coverage status of one interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageGap {
    pub interval: String,
    pub required: f64,
    pub scheduled: f64,
    /// Shortfall, never negative.
    pub gap_count: f64,
    /// Excess over the requirement, never negative.
    pub surplus: f64,
    /// `gap_count / required`, 0 when nothing is required.
    pub gap_percentage: f64,
    pub severity: GapSeverity,
}

/// Aggregated gap analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapReport {
    /// One entry per interval, in forecast order.
    pub gaps: Vec<CoverageGap>,
    /// `100 · (1 − mean gap percentage)`, in `[0, 100]`.
    pub coverage_score: f64,
    /// Intervals classified High or Critical.
    pub critical_intervals: Vec<String>,
    /// Intervals with a surplus.
    pub over_covered_intervals: Vec<String>,
    pub total_gap: f64,
    pub total_surplus: f64,
    pub severity_counts: SeverityCounts,
    /// Wall-clock time spent in the analysis.
    pub processing_time: Duration,
}

impl GapReport {
    /// Gap entry for one interval.
    pub fn gap(&self, interval: &str) -> Option<&CoverageGap> {
        self.gaps.iter().find(|g| g.interval == interval)
    }

    /// Whether every requirement is met.
    pub fn is_fully_covered(&self) -> bool {
        self.total_gap == 0.0
    }
}

/// Coverage gap analyzer.
#[derive(Debug, Clone, Default)]
pub struct CoverageGapAnalyzer {
    config: CoverageConfig,
}

impl CoverageGapAnalyzer {
    pub fn new(config: CoverageConfig) -> Self {
        Self { config }
    }

    /// Compares required against scheduled headcount per interval.
    ///
    /// # Errors
    /// - `IntervalMismatch` if the key sets differ (no zero-fill)
    /// - `InvalidParameter` for a negative or non-finite count
    pub fn analyze_coverage_gaps(
        &self,
        forecast: &IntervalMap,
        scheduled: &IntervalMap,
    ) -> StaffingResult<GapReport> {
        let started = Instant::now();
        forecast.ensure_same_keys(scheduled)?;
        let scheduled_by_key = scheduled.as_lookup();
        let thresholds = &self.config.thresholds;

        let mut gaps = Vec::with_capacity(forecast.len());
        let mut counts = SeverityCounts::default();
        let mut critical_intervals = Vec::new();
        let mut over_covered_intervals = Vec::new();
        let mut pct_sum = 0.0;

        for (interval, required) in forecast.iter() {
            let scheduled = scheduled_by_key.get(interval).copied().unwrap_or(0.0);
            check_count("forecast", interval, required)?;
            check_count("scheduled", interval, scheduled)?;

            let gap_count = (required - scheduled).max(0.0);
            let surplus = (scheduled - required).max(0.0);
            let gap_percentage = if required > 0.0 {
                gap_count / required
            } else {
                0.0
            };
            let severity = GapSeverity::classify(gap_percentage, thresholds);

            counts.record(severity);
            if severity.is_critical() {
                critical_intervals.push(interval.to_string());
            }
            if surplus > 0.0 {
                over_covered_intervals.push(interval.to_string());
            }
            pct_sum += gap_percentage;

            gaps.push(CoverageGap {
                interval: interval.to_string(),
                required,
                scheduled,
                gap_count,
                surplus,
                gap_percentage,
                severity,
            });
        }

        let mean_pct = if gaps.is_empty() {
            0.0
        } else {
            pct_sum / gaps.len() as f64
        };
        let coverage_score = (100.0 * (1.0 - mean_pct)).clamp(0.0, 100.0);
        let total_gap = gaps.iter().map(|g| g.gap_count).sum();
        let total_surplus = gaps.iter().map(|g| g.surplus).sum();

        let processing_time = started.elapsed();
        if processing_time > Duration::from_millis(self.config.soft_time_target_ms) {
            warn!(
                "coverage: analysis of {} intervals took {:?}, above the {} ms target",
                gaps.len(),
                processing_time,
                self.config.soft_time_target_ms
            );
        }
        debug!(
            "coverage: score {coverage_score:.1}, {} critical of {} intervals",
            critical_intervals.len(),
            gaps.len()
        );

        Ok(GapReport {
            gaps,
            coverage_score,
            critical_intervals,
            over_covered_intervals,
            total_gap,
            total_surplus,
            severity_counts: counts,
            processing_time,
        })
    }
}

/// Analyzes with default thresholds.
pub fn analyze_coverage_gaps(
    forecast: &IntervalMap,
    scheduled: &IntervalMap,
) -> StaffingResult<GapReport> {
    CoverageGapAnalyzer::default().analyze_coverage_gaps(forecast, scheduled)
}

fn check_count(map: &str, interval: &str, value: f64) -> StaffingResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(StaffingError::invalid(
            format!("{map}[{interval}]"),
            value,
            "a finite count >= 0",
            "Headcounts cannot be negative.",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeverityThresholds;

    #[test]
    fn test_reference_scenario() {
        let forecast = IntervalMap::new().with("10:00", 100.0).with("11:00", 80.0);
        let scheduled = IntervalMap::new().with("10:00", 50.0).with("11:00", 70.0);
        let report = analyze_coverage_gaps(&forecast, &scheduled).unwrap();

        let g10 = report.gap("10:00").unwrap();
        assert!((g10.gap_percentage - 0.50).abs() < 1e-12);
        assert_eq!(g10.severity, GapSeverity::Critical);

        let g11 = report.gap("11:00").unwrap();
        assert!((g11.gap_percentage - 0.125).abs() < 1e-12);
        assert_eq!(g11.severity, GapSeverity::Medium);

        assert_eq!(report.critical_intervals, vec!["10:00".to_string()]);
        assert!((report.total_gap - 60.0).abs() < 1e-12);
        assert!((report.coverage_score - 100.0 * (1.0 - 0.3125)).abs() < 1e-9);
    }

    #[test]
    fn test_full_coverage() {
        let forecast = IntervalMap::new().with("09:00", 10.0).with("10:00", 12.0);
        let scheduled = IntervalMap::new().with("09:00", 10.0).with("10:00", 15.0);
        let report = analyze_coverage_gaps(&forecast, &scheduled).unwrap();
        assert!((report.coverage_score - 100.0).abs() < 1e-12);
        assert_eq!(report.total_gap, 0.0);
        assert!(report.is_fully_covered());
        assert_eq!(report.over_covered_intervals, vec!["10:00".to_string()]);
        assert!((report.total_surplus - 3.0).abs() < 1e-12);
        assert_eq!(report.severity_counts.none, 2);
    }

    #[test]
    fn test_zero_required_interval() {
        let forecast = IntervalMap::new().with("03:00", 0.0);
        let scheduled = IntervalMap::new().with("03:00", 0.0);
        let report = analyze_coverage_gaps(&forecast, &scheduled).unwrap();
        assert_eq!(report.gaps[0].gap_percentage, 0.0);
        assert_eq!(report.gaps[0].severity, GapSeverity::None);
    }

    #[test]
    fn test_nothing_scheduled_scores_zero() {
        let forecast = IntervalMap::new().with("09:00", 10.0).with("10:00", 5.0);
        let scheduled = IntervalMap::new().with("09:00", 0.0).with("10:00", 0.0);
        let report = analyze_coverage_gaps(&forecast, &scheduled).unwrap();
        assert_eq!(report.coverage_score, 0.0);
        assert_eq!(report.severity_counts.critical, 2);
    }

    #[test]
    fn test_boundary_percentages() {
        let forecast = IntervalMap::new()
            .with("a", 100.0)
            .with("b", 100.0)
            .with("c", 100.0)
            .with("d", 100.0);
        let scheduled = IntervalMap::new()
            .with("a", 95.0)
            .with("b", 90.0)
            .with("c", 80.0)
            .with("d", 65.0);
        let report = analyze_coverage_gaps(&forecast, &scheduled).unwrap();
        let severities: Vec<GapSeverity> = report.gaps.iter().map(|g| g.severity).collect();
        assert_eq!(
            severities,
            vec![
                GapSeverity::Low,
                GapSeverity::Medium,
                GapSeverity::High,
                GapSeverity::Critical
            ]
        );
    }

    #[test]
    fn test_mismatch_is_error() {
        let forecast = IntervalMap::new().with("09:00", 1.0).with("10:00", 1.0);
        let scheduled = IntervalMap::new().with("09:00", 1.0);
        let err = analyze_coverage_gaps(&forecast, &scheduled).unwrap_err();
        match err {
            StaffingError::IntervalMismatch { missing, extra } => {
                assert_eq!(missing, vec!["10:00".to_string()]);
                assert!(extra.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_count_rejected() {
        let forecast = IntervalMap::new().with("09:00", 1.0);
        let scheduled = IntervalMap::new().with("09:00", -2.0);
        let err = analyze_coverage_gaps(&forecast, &scheduled).unwrap_err();
        assert!(err.to_string().contains("scheduled[09:00]"));
    }

    #[test]
    fn test_idempotent() {
        let forecast = IntervalMap::new().with("10:00", 100.0).with("11:00", 80.0);
        let scheduled = IntervalMap::new().with("10:00", 50.0).with("11:00", 90.0);
        let analyzer = CoverageGapAnalyzer::default();
        let a = analyzer.analyze_coverage_gaps(&forecast, &scheduled).unwrap();
        let b = analyzer.analyze_coverage_gaps(&forecast, &scheduled).unwrap();
        assert_eq!(a.gaps, b.gaps);
        assert_eq!(a.coverage_score, b.coverage_score);
        assert_eq!(a.critical_intervals, b.critical_intervals);
        assert_eq!(a.severity_counts, b.severity_counts);
    }

    #[test]
    fn test_configured_thresholds() {
        let analyzer = CoverageGapAnalyzer::new(CoverageConfig {
            thresholds: SeverityThresholds {
                low: 0.2,
                medium: 0.4,
                high: 0.6,
                critical: 0.8,
            },
            ..CoverageConfig::default()
        });
        let forecast = IntervalMap::new().with("10:00", 100.0);
        let scheduled = IntervalMap::new().with("10:00", 50.0);
        let report = analyzer.analyze_coverage_gaps(&forecast, &scheduled).unwrap();
        assert_eq!(report.gaps[0].severity, GapSeverity::Medium);
        assert!(report.critical_intervals.is_empty());
    }

    #[test]
    fn test_records_processing_time() {
        let pairs: Vec<(String, f64)> = (0..500).map(|i| (format!("i{i}"), 10.0)).collect();
        let forecast = IntervalMap::from_pairs(pairs.clone()).unwrap();
        let scheduled = IntervalMap::from_pairs(pairs).unwrap();
        let report = analyze_coverage_gaps(&forecast, &scheduled).unwrap();
        assert_eq!(report.gaps.len(), 500);
        assert!(report.processing_time < Duration::from_secs(1));
    }
}
