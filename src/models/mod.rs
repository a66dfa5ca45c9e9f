//! Staffing domain models.
//!
//! Provides the data types shared by every stage of the pipeline:
//! per-interval quantities, workers and their availability, shift
//! assignments, roster constraints, requirements, and staffing plans.
//!
//! # Domain Mappings
//!
//! | u-staffing | Contact Center | Hospital | Dispatch |
//! |------------|---------------|----------|----------|
//! | Interval | Half-hour slot | Ward hour | Radio hour |
//! | Worker | Agent | Nurse | Dispatcher |
//! | ShiftAssignment | Agent shift | Nursing shift | Console shift |
//! | StaffingPlan | Weekly roster | Ward rota | Duty sheet |

mod availability;
mod constraint;
mod interval;
mod requirement;
mod schedule;
mod shift;
mod worker;

pub use availability::{overlap_minutes, Availability, TimeWindow};
pub use constraint::{Constraint, ConstraintSet};
pub use interval::{
    format_hhmm, parse_hhmm, IntervalMap, DEFAULT_INTERVAL_MINUTES, MINUTES_PER_DAY,
};
pub use requirement::{StaffingRequirement, StaffingRequirements};
pub use schedule::{ShiftRecord, StaffingPlan, Violation, ViolationType};
pub use shift::{ShiftAssignment, ShiftClass, ShiftTemplate, TemplateSource};
pub use worker::{Skill, WorkerProfile};
