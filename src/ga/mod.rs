//! Genetic roster search.
//!
//! Evolves a fixed-size population of candidate rosters toward better
//! coverage, lower cost, constraint compliance and shift-class variety,
//! within a wall-clock budget.
//!
//! # Encoding
//!
//! One gene per eligible worker: `None` (not rostered) or that worker's
//! [`ShiftAssignment`](crate::models::ShiftAssignment). Shift windows come
//! from a [`TemplateLibrary`] built from historical-pattern hints.
//!
//! # Submodules
//!
//! - [`operators`]: Runtime-selectable crossover and mutation strategies
//! - [`ScheduleVariantGenerator`]: Generational loop with elitism, time
//!   budget and cancellation
//!
//! # Reference
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of applications,
//!   methods and models"

mod chromosome;
mod engine;
pub mod operators;
mod patterns;
mod problem;

pub use chromosome::{
    reassign_mutation, shift_window_mutation, single_point_crossover, uniform_crossover,
    ScheduleCandidate,
};
pub use engine::{
    CancellationToken, ScheduleVariantGenerator, ScheduleVariants, TerminationReason,
};
pub use operators::{CrossoverType, GeneticOperators, MutationType};
pub use patterns::{
    PatternHints, PlanningSpan, TemplateLibrary, PEAK_INTERVALS_KEY, PREFERRED_TEMPLATES_KEY,
    SHIFT_LENGTHS_KEY,
};
pub use problem::{GenerationRequest, StaffingGaProblem};
