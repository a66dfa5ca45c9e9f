//! Input validation for roster searches.
//!
//! Checks structural integrity of the worker pool before a search starts.
//! Detects:
//! - Empty and duplicate worker IDs
//! - Non-positive or non-finite hourly rates
//! - Skill levels outside `[0, 1]`
//! - Malformed availability or blocked windows
//! - Required skills that no worker holds
//!
//! All problems are collected, not just the first.

use crate::error::StaffingError;
use crate::models::WorkerProfile;
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A worker has an empty ID.
    EmptyId,
    /// Two workers share the same ID.
    DuplicateId,
    /// Hourly rate is not a positive finite number.
    InvalidRate,
    /// Skill level outside `[0, 1]`.
    InvalidSkillLevel,
    /// Availability or blocked window with end before start.
    MalformedWindow,
    /// A required skill is held by nobody in the pool.
    UnknownSkill,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a worker pool against the skills a search requires.
///
/// Checks:
/// 1. Every worker has a non-empty, unique ID
/// 2. Hourly rates are finite and > 0
/// 3. Skill levels are within `[0, 1]`
/// 4. Availability and blocked windows are well formed
/// 5. Each required skill is held by at least one worker
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_worker_pool(workers: &[WorkerProfile], required_skills: &[String]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for (idx, w) in workers.iter().enumerate() {
        if w.id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                format!("Worker #{idx} has an empty ID"),
            ));
        } else if !ids.insert(w.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate worker ID: {}", w.id),
            ));
        }

        if !(w.hourly_rate.is_finite() && w.hourly_rate > 0.0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidRate,
                format!("Worker '{}' has hourly rate {} (must be > 0)", w.id, w.hourly_rate),
            ));
        }

        for skill in &w.skills {
            if !(0.0..=1.0).contains(&skill.level) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidSkillLevel,
                    format!(
                        "Worker '{}' skill '{}' has level {} (must be within [0, 1])",
                        w.id, skill.name, skill.level
                    ),
                ));
            }
        }

        let windows = w.availability.windows.iter().map(|win| ("availability", win));
        let blocked = w.availability.blocked.iter().map(|win| ("blocked", win));
        for (what, win) in windows.chain(blocked) {
            if !win.is_well_formed() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MalformedWindow,
                    format!("Worker '{}' has malformed {what} window {}", w.id, win.label()),
                ));
            }
        }
    }

    for skill in required_skills {
        if !workers.iter().any(|w| w.has_skill(skill)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownSkill,
                format!("Required skill '{skill}' is held by no worker in the pool"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Folds validation errors into one [`StaffingError::InvalidParameter`].
pub fn into_staffing_error(errors: &[ValidationError]) -> StaffingError {
    let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
    StaffingError::invalid(
        "workers",
        format!("{} problem(s)", errors.len()),
        "a well-formed worker pool",
        messages.join("; "),
    )
}
