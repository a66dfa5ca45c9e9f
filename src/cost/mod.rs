//! Labor cost evaluation and optimization.
//!
//! Prices a staffing plan with daily overtime and optional shift
//! premiums, spreads cost over requirement intervals, and derives savings
//! opportunities with an ROI projection.
//!
//! # Submodules
//!
//! - [`CostModel`]: Regular/overtime split and premium lines
//! - [`CostEvaluator`]: Per worker-day breakdowns and plan totals
//! - [`GreedyCostOptimizer`]: Least-cost shift selection behind the
//!   [`CostOptimizer`] trait
//!
//! # Usage
//!
//! ```
//! use chrono::NaiveDate;
//! use u_staffing::cost::CostEvaluator;
//! use u_staffing::models::{IntervalMap, ShiftRecord, StaffingPlan, TimeWindow};
//!
//! let date = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
//! let plan = StaffingPlan::new()
//!     .with_record(ShiftRecord::new("A1", date, TimeWindow::new(480, 1080)).with_rate(30.0));
//! let reqs = IntervalMap::new().with("08:00", 1.0);
//! let impact = CostEvaluator::default().evaluate(&plan, &reqs, None).unwrap();
//! assert!((impact.total_cost - 330.0).abs() < 1e-9);
//! ```

mod evaluator;
mod insights;
mod model;
mod optimizer;

pub use evaluator::{
    CostBreakdown, CostEvaluator, CostType, FinancialImpact, RateOverrides, RecordError,
};
pub use insights::{OpportunityKind, RoiProjection, SavingsOpportunity};
pub use model::{CostModel, PremiumKind, PremiumLine};
pub use optimizer::{CostOptimizer, GreedyCostOptimizer, OptimizedPlan, ShiftOption};
