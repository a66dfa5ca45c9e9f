//! Hard roster constraints.
//!
//! Defines the rules a compliant roster must satisfy: daily hour caps,
//! qualification requirements on restricted shifts, and shift classes a
//! worker may not work because of an attribute (minors on nights, a
//! contract type excluded from early starts).
//!
//! An empty [`ConstraintSet`] accepts every assignment.

use serde::{Deserialize, Serialize};

use super::{ShiftAssignment, ShiftClass, Violation, WorkerProfile};

/// A hard roster constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constraint {
    /// A worker may not be rostered for more than `hours` in one day.
    MaxHoursPerDay { hours: f64 },

    /// Shifts of `shift_class` may only be worked by holders of `skill`.
    RequiredSkill {
        shift_class: ShiftClass,
        skill: String,
    },

    /// Workers whose `attribute` equals `value` may not work `shift_class`.
    DisallowedShift {
        attribute: String,
        value: String,
        shift_class: ShiftClass,
    },
}

impl Constraint {
    /// Creates a daily hour cap.
    pub fn max_hours_per_day(hours: f64) -> Self {
        Self::MaxHoursPerDay { hours }
    }

    /// Creates a qualification requirement on a shift class.
    pub fn required_skill(shift_class: ShiftClass, skill: impl Into<String>) -> Self {
        Self::RequiredSkill {
            shift_class,
            skill: skill.into(),
        }
    }

    /// Creates an attribute-based shift exclusion.
    pub fn disallowed_shift(
        attribute: impl Into<String>,
        value: impl Into<String>,
        shift_class: ShiftClass,
    ) -> Self {
        Self::DisallowedShift {
            attribute: attribute.into(),
            value: value.into(),
            shift_class,
        }
    }

    /// Checks one assignment.
    ///
    /// `day_hours` is the worker's total rostered hours for the day,
    /// including this assignment.
    fn check(
        &self,
        assignment: &ShiftAssignment,
        worker: &WorkerProfile,
        day_hours: f64,
    ) -> Option<Violation> {
        match self {
            Self::MaxHoursPerDay { hours } => (day_hours > *hours + 1e-9).then(|| {
                Violation::max_hours(
                    &worker.id,
                    format!(
                        "Worker '{}' rostered {day_hours:.2}h, above the {hours:.2}h daily cap",
                        worker.id
                    ),
                )
            }),
            Self::RequiredSkill { shift_class, skill } => {
                (assignment.class() == *shift_class && !worker.has_skill(skill)).then(|| {
                    Violation::skill_mismatch(
                        &worker.id,
                        format!(
                            "Worker '{}' lacks '{skill}' required on {} shifts",
                            worker.id,
                            shift_class.name()
                        ),
                    )
                })
            }
            Self::DisallowedShift {
                attribute,
                value,
                shift_class,
            } => (assignment.class() == *shift_class
                && worker.attribute(attribute) == Some(value.as_str()))
            .then(|| {
                Violation::disallowed_shift(
                    &worker.id,
                    format!(
                        "Worker '{}' ({attribute}={value}) may not work {} shifts",
                        worker.id,
                        shift_class.name()
                    ),
                )
            }),
        }
    }
}

/// An ordered set of hard constraints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSet {
    pub constraints: Vec<Constraint>,
}

impl ConstraintSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: adds a constraint.
    pub fn with(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Whether no constraints are configured.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Number of constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// All violations raised by one assignment.
    pub fn violations_for(
        &self,
        assignment: &ShiftAssignment,
        worker: &WorkerProfile,
        day_hours: f64,
    ) -> Vec<Violation> {
        self.constraints
            .iter()
            .filter_map(|c| c.check(assignment, worker, day_hours))
            .collect()
    }

    /// Whether one assignment satisfies every constraint.
    pub fn permits(
        &self,
        assignment: &ShiftAssignment,
        worker: &WorkerProfile,
        day_hours: f64,
    ) -> bool {
        self.constraints
            .iter()
            .all(|c| c.check(assignment, worker, day_hours).is_none())
    }
}
