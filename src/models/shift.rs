//! Shift templates and shift assignments.
//!
//! A [`ShiftTemplate`] is a reusable window ("06:00-14:00"); a
//! [`ShiftAssignment`] places one worker on one window and is the gene of
//! the schedule search.

use serde::{Deserialize, Serialize};

use super::TimeWindow;

/// Coarse classification of a shift by its start time.
///
/// | Class | Start |
/// |-------|-------|
/// | Early | 04:00–07:59 |
/// | Day   | 08:00–11:59 |
/// | Late  | 12:00–17:59 |
/// | Night | 18:00–03:59 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftClass {
    Early,
    Day,
    Late,
    Night,
}

impl ShiftClass {
    /// Classifies a shift starting at `start_minute`.
    pub fn of(start_minute: u32) -> Self {
        match start_minute % 1440 {
            240..=479 => Self::Early,
            480..=719 => Self::Day,
            720..=1079 => Self::Late,
            _ => Self::Night,
        }
    }

    /// Stable lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Early => "early",
            Self::Day => "day",
            Self::Late => "late",
            Self::Night => "night",
        }
    }
}

/// Where a template came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateSource {
    /// Listed as a preferred template in the historical hints.
    Preferred,
    /// Centered on a known peak interval.
    Peak,
    /// Generated grid over the requirement span.
    Default,
}

/// A reusable shift window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftTemplate {
    /// Template name (e.g., "early-8h", "Mid").
    pub name: String,
    /// Shift window.
    pub window: TimeWindow,
    /// Relative sampling weight (> 0).
    pub weight: f64,
    /// Origin of the template.
    pub source: TemplateSource,
}

impl ShiftTemplate {
    /// Creates a template with weight 1.0 from the default grid.
    pub fn new(name: impl Into<String>, window: TimeWindow) -> Self {
        Self {
            name: name.into(),
            window,
            weight: 1.0,
            source: TemplateSource::Default,
        }
    }

    /// Sets the sampling weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight.max(f64::MIN_POSITIVE);
        self
    }

    /// Sets the template source.
    pub fn with_source(mut self, source: TemplateSource) -> Self {
        self.source = source;
        self
    }

    /// Shift class of this template.
    pub fn class(&self) -> ShiftClass {
        ShiftClass::of(self.window.start_minute)
    }
}

/// One worker on one shift window. The atomic unit of a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftAssignment {
    /// Assigned worker.
    pub worker_id: String,
    /// Shift start (minutes from day start).
    pub shift_start: u32,
    /// Shift end (minutes, exclusive, may exceed 1440).
    pub shift_end: u32,
    /// Skills the worker brings to the shift.
    pub skills: Vec<String>,
    /// Labor cost of the shift, overtime included.
    pub cost: f64,
    /// Template this shift was drawn from, if any.
    pub template: Option<String>,
}

impl ShiftAssignment {
    /// Creates an assignment with zero cost and no skills.
    pub fn new(worker_id: impl Into<String>, window: TimeWindow) -> Self {
        Self {
            worker_id: worker_id.into(),
            shift_start: window.start_minute,
            shift_end: window.end_minute,
            skills: Vec::new(),
            cost: 0.0,
            template: None,
        }
    }

    /// Sets the skills.
    pub fn with_skills(mut self, skills: Vec<String>) -> Self {
        self.skills = skills;
        self
    }

    /// Sets the cost.
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    /// Sets the source template name.
    pub fn with_template(mut self, name: impl Into<String>) -> Self {
        self.template = Some(name.into());
        self
    }

    /// Shift window.
    #[inline]
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.shift_start, self.shift_end)
    }

    /// Shift length in hours.
    #[inline]
    pub fn hours(&self) -> f64 {
        self.window().duration_hours()
    }

    /// Shift class.
    pub fn class(&self) -> ShiftClass {
        ShiftClass::of(self.shift_start)
    }

    /// Whether this shift is staffed at the time-of-day `minute`.
    pub fn covers(&self, minute: u32) -> bool {
        self.window().covers_time_of_day(minute)
    }
}
