//! Staffing plan (solution) model.
//!
//! A staffing plan is a flat list of per-worker shift records for one or
//! more days, the shape handed to cost evaluation. Records arrive from
//! outside the pipeline and may be incomplete, so every field the cost
//! model needs is optional here and checked record by record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::TimeWindow;

/// A collection of per-worker shift records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaffingPlan {
    /// Shift records in submission order.
    pub records: Vec<ShiftRecord>,
}

/// One worker on one shift on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftRecord {
    /// Worker identifier.
    pub worker_id: String,
    /// Calendar date the shift starts on.
    pub date: NaiveDate,
    /// Shift start (minutes from day start).
    pub start_minute: Option<u32>,
    /// Shift end (minutes, exclusive, may exceed 1440).
    pub end_minute: Option<u32>,
    /// Base hourly rate. May be supplied through rate overrides instead.
    pub hourly_rate: Option<f64>,
    /// Skills the worker brings to the shift.
    pub skills: Vec<String>,
}

/// A constraint violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related worker ID.
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of constraint violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Worker rostered beyond the daily hour cap.
    MaxHoursExceeded,
    /// Worker lacks a qualification required on the shift.
    SkillMismatch,
    /// Worker attribute excludes the shift class.
    DisallowedShift,
    /// Shift falls outside the worker's availability.
    WorkerUnavailable,
}

impl ShiftRecord {
    /// Creates a complete record.
    pub fn new(worker_id: impl Into<String>, date: NaiveDate, window: TimeWindow) -> Self {
        Self {
            worker_id: worker_id.into(),
            date,
            start_minute: Some(window.start_minute),
            end_minute: Some(window.end_minute),
            hourly_rate: None,
            skills: Vec::new(),
        }
    }

    /// Sets the hourly rate.
    pub fn with_rate(mut self, hourly_rate: f64) -> Self {
        self.hourly_rate = Some(hourly_rate);
        self
    }

    /// Sets the skills.
    pub fn with_skills(mut self, skills: Vec<String>) -> Self {
        self.skills = skills;
        self
    }

    /// Shift window, when both ends are present.
    pub fn window(&self) -> Option<TimeWindow> {
        match (self.start_minute, self.end_minute) {
            (Some(s), Some(e)) => Some(TimeWindow::new(s, e)),
            _ => None,
        }
    }
}

impl Violation {
    /// Creates a daily-hours violation.
    pub fn max_hours(worker_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::MaxHoursExceeded,
            entity_id: worker_id.into(),
            message: message.into(),
            severity: 80,
        }
    }

    /// Creates a qualification violation.
    pub fn skill_mismatch(worker_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::SkillMismatch,
            entity_id: worker_id.into(),
            message: message.into(),
            severity: 90,
        }
    }

    /// Creates an attribute exclusion violation.
    pub fn disallowed_shift(worker_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::DisallowedShift,
            entity_id: worker_id.into(),
            message: message.into(),
            severity: 95,
        }
    }

    /// Creates an availability violation.
    pub fn unavailable(worker_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::WorkerUnavailable,
            entity_id: worker_id.into(),
            message: message.into(),
            severity: 100,
        }
    }
}

impl StaffingPlan {
    /// Creates an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record.
    pub fn add_record(&mut self, record: ShiftRecord) {
        self.records.push(record);
    }

    /// Builder: adds a record.
    pub fn with_record(mut self, record: ShiftRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the plan has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records for one worker.
    pub fn records_for_worker(&self, worker_id: &str) -> Vec<&ShiftRecord> {
        self.records
            .iter()
            .filter(|r| r.worker_id == worker_id)
            .collect()
    }
}
