//! Error taxonomy for the staffing pipeline.
//!
//! Every message names the offending field or value and, where one exists,
//! the valid range or a suggested fix. Presentation layers surface these
//! strings to end users unchanged.

use thiserror::Error;

/// Errors produced by the staffing pipeline.
#[derive(Error, Debug)]
pub enum StaffingError {
    /// A scalar input is outside its valid range.
    #[error("Invalid {field} = {value}: expected {valid_range}. {guidance}")]
    InvalidParameter {
        field: String,
        value: String,
        valid_range: String,
        guidance: String,
    },

    /// Two interval maps used in one computation do not share a key set.
    #[error(
        "Interval mismatch: missing from scheduled [{}], not in forecast [{}]. \
         Both maps must cover the same intervals.",
        missing.join(", "),
        extra.join(", ")
    )]
    IntervalMismatch {
        missing: Vec<String>,
        extra: Vec<String>,
    },

    /// The service-level target cannot be met within the search ceiling.
    #[error(
        "Capacity unattainable: target service level {target:.4} not reached with up to \
         {ceiling} agents (arrival rate {arrival_rate}, service rate {service_rate}, best \
         achieved {best_achieved:.4}). Lower the target or raise the service rate."
    )]
    CapacityUnattainable {
        arrival_rate: f64,
        service_rate: f64,
        target: f64,
        ceiling: u32,
        best_achieved: f64,
    },

    /// A required input collection is empty.
    #[error("Insufficient input: {what}. {guidance}")]
    InsufficientInput { what: String, guidance: String },

    /// No candidate schedule could be built from the inputs.
    #[error("No feasible schedule: {reason}")]
    NoFeasibleSchedule { reason: String },

    /// A single shift record is malformed.
    #[error("Malformed record #{index}: {field} {reason}")]
    MalformedRecord {
        index: usize,
        field: String,
        reason: String,
    },

    #[error("Configuration parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Configuration read error: {0}")]
    Io(#[from] std::io::Error),
}

impl StaffingError {
    /// Builds an [`StaffingError::InvalidParameter`].
    pub fn invalid(
        field: impl Into<String>,
        value: impl ToString,
        valid_range: impl Into<String>,
        guidance: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            field: field.into(),
            value: value.to_string(),
            valid_range: valid_range.into(),
            guidance: guidance.into(),
        }
    }

    /// Builds an [`StaffingError::InsufficientInput`].
    pub fn insufficient(what: impl Into<String>, guidance: impl Into<String>) -> Self {
        Self::InsufficientInput {
            what: what.into(),
            guidance: guidance.into(),
        }
    }
}

pub type StaffingResult<T> = Result<T, StaffingError>;

/// Checks that `value` is finite and strictly positive.
pub(crate) fn require_positive(field: &str, value: f64, guidance: &str) -> StaffingResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(StaffingError::invalid(field, value, "a finite value > 0", guidance))
    }
}

/// Checks that `value` lies in `[lo, hi]`.
pub(crate) fn require_in_range(
    field: &str,
    value: f64,
    lo: f64,
    hi: f64,
    guidance: &str,
) -> StaffingResult<()> {
    if value.is_finite() && value >= lo && value <= hi {
        Ok(())
    } else {
        Err(StaffingError::invalid(
            field,
            value,
            format!("a value in [{lo}, {hi}]"),
            guidance,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_message() {
        let err = StaffingError::invalid(
            "target_service_level",
            1.5,
            "0 < p < 1",
            "Use a fraction such as 0.8 for 80%.",
        );
        let msg = err.to_string();
        assert!(msg.contains("target_service_level"));
        assert!(msg.contains("1.5"));
        assert!(msg.contains("0 < p < 1"));
        assert!(msg.contains("0.8"));
    }

    #[test]
    fn test_interval_mismatch_lists_keys() {
        let err = StaffingError::IntervalMismatch {
            missing: vec!["10:00".into()],
            extra: vec!["12:00".into(), "13:00".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("10:00"));
        assert!(msg.contains("12:00, 13:00"));
    }

    #[test]
    fn test_range_helpers() {
        assert!(require_positive("rate", 1.0, "").is_ok());
        assert!(require_positive("rate", 0.0, "").is_err());
        assert!(require_positive("rate", f64::NAN, "").is_err());
        assert!(require_in_range("p", 0.5, 0.0, 1.0, "").is_ok());
        assert!(require_in_range("p", 1.01, 0.0, 1.0, "").is_err());
    }
}
