//! Queueing-theoretic staffing.
//!
//! Computes how many agents an interval needs so that a target fraction of
//! arrivals is answered within a threshold, under an M/M/c model (Poisson
//! arrivals, exponential handle times, `c` identical agents).
//!
//! # Submodules
//!
//! - [`erlang`]: Overflow-free Erlang B/C recurrences and derived metrics
//! - [`StaffingCalculator`]: Minimum-agent search and forecast conversion
//!
//! # Usage
//!
//! ```
//! use u_staffing::staffing::{utilization, StaffingCalculator};
//!
//! let calc = StaffingCalculator::default();
//! let s = calc.required_staffing(100.0, 6.0, 0.80).unwrap();
//! assert!(s.achieved_service_level >= 0.80 * 0.999);
//! assert!(utilization(100.0, s.agents, 6.0) < 1.0);
//! ```

mod calculator;
pub mod erlang;

pub use calculator::{ForecastProfile, StaffingCalculator, StaffingSolution};
pub use erlang::utilization;
