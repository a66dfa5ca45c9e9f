//! Coverage gap analysis.
//!
//! Compares the headcount an interval requires with the headcount a plan
//! schedules, classifies each shortfall, and scores the plan as a whole.
//!
//! # Submodules
//!
//! - [`CoverageGapAnalyzer`]: Per-interval gaps, severities, coverage score
//! - [`GapSeverity`]: Threshold buckets (None/Low/Medium/High/Critical)
//! - [`scheduled_coverage`]: Headcount per interval from shift windows

mod analyzer;
mod scheduled;
mod severity;

pub use analyzer::{analyze_coverage_gaps, CoverageGap, CoverageGapAnalyzer, GapReport};
pub use scheduled::scheduled_coverage;
pub use severity::{GapSeverity, SeverityCounts};
