//! Workforce staffing optimization.
//!
//! Turns a contact-volume forecast into staffing requirements, measures how
//! well a schedule covers them, searches for alternative rosters, and
//! prices every plan.
//!
//! # Modules
//!
//! - **`staffing`**: Erlang-C minimum-agent search and forecast conversion
//! - **`coverage`**: Per-interval gaps, severities and coverage score
//! - **`ga`**: Genetic search for ranked schedule variants
//! - **`cost`**: Overtime, premiums, savings insights and least-cost selection
//! - **`pipeline`**: All stages wired together
//! - **`models`**: Domain types: `IntervalMap`, `TimeWindow`, `WorkerProfile`,
//!   `ShiftAssignment`, `StaffingPlan`, `ConstraintSet`
//! - **`config`**: Serializable settings for every component
//! - **`validation`**: Worker pool integrity checks
//!
//! # Usage
//!
//! ```
//! use chrono::NaiveDate;
//! use std::time::Duration;
//! use u_staffing::config::{GeneratorConfig, PipelineConfig};
//! use u_staffing::ga::CancellationToken;
//! use u_staffing::models::{IntervalMap, WorkerProfile};
//! use u_staffing::pipeline::{PipelineInput, StaffingPipeline};
//!
//! let forecast = IntervalMap::from_pairs((8..12).map(|h| (format!("{h:02}:00"), 24.0))).unwrap();
//! let workers = (0..6).map(|i| WorkerProfile::new(format!("W{i}"), 20.0)).collect();
//! let date = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
//!
//! let config = PipelineConfig {
//!     generator: GeneratorConfig::default()
//!         .with_population_size(10)
//!         .with_max_generations(5)
//!         .with_time_budget(Duration::from_secs(10)),
//!     ..PipelineConfig::default()
//! };
//! let pipeline = StaffingPipeline::new(config).unwrap();
//! let out = pipeline
//!     .run(
//!         &PipelineInput::new(forecast, workers, date),
//!         &mut u_staffing::rng::seeded(42),
//!         &CancellationToken::new(),
//!     )
//!     .unwrap();
//! assert_eq!(out.requirements.len(), 4);
//! assert!(!out.variants.variants.is_empty());
//! ```
//!
//! # References
//!
//! - Gans, Koole & Mandelbaum (2003), "Telephone Call Centers: Tutorial, Review,
//!   and Research Prospects"
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of applications,
//!   methods and models"

pub mod config;
pub mod coverage;
pub mod cost;
pub mod error;
pub mod ga;
pub mod models;
pub mod pipeline;
pub mod rng;
pub mod staffing;
pub mod validation;

pub use error::{StaffingError, StaffingResult};
