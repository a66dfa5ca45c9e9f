//! Worker model.
//!
//! Workers are the people the pipeline rosters: contact-center agents,
//! nurses, dispatchers. Each worker has skills, an hourly cost rate, an
//! availability window, and free-form attributes used by compliance rules.
//! The worker pool is supplied externally and never modified here.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Availability, TimeWindow};

/// A worker that can be assigned to shifts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerProfile {
    /// Unique worker identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Skills with proficiency levels.
    pub skills: Vec<Skill>,
    /// Base cost per hour.
    pub hourly_rate: f64,
    /// When the worker may be rostered.
    pub availability: Availability,
    /// Domain-specific metadata (contract type, site, seniority).
    pub attributes: HashMap<String, String>,
}

/// A skill with proficiency level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    /// Skill name (e.g., "billing", "spanish", "tier2").
    pub name: String,
    /// Proficiency level (0.0 to 1.0, where 1.0 = expert).
    pub level: f64,
}

impl WorkerProfile {
    /// Creates a worker with the given ID and hourly rate.
    pub fn new(id: impl Into<String>, hourly_rate: f64) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            skills: Vec::new(),
            hourly_rate,
            availability: Availability::always(),
            attributes: HashMap::new(),
        }
    }

    /// Sets the worker name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a skill.
    pub fn with_skill(mut self, name: impl Into<String>, level: f64) -> Self {
        self.skills.push(Skill::new(name, level));
        self
    }

    /// Sets the availability.
    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    /// Adds a domain-specific attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Whether this worker has a given skill.
    pub fn has_skill(&self, name: &str) -> bool {
        self.skills.iter().any(|s| s.name == name)
    }

    /// Returns the proficiency level for a skill (0.0 if not found).
    pub fn skill_level(&self, name: &str) -> f64 {
        self.skills
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.level)
            .unwrap_or(0.0)
    }

    /// Skill names in declaration order.
    pub fn skill_names(&self) -> Vec<String> {
        self.skills.iter().map(|s| s.name.clone()).collect()
    }

    /// Whether the worker may work `shift`.
    pub fn is_available_for(&self, shift: &TimeWindow) -> bool {
        self.availability.permits(shift)
    }

    /// Attribute value, if set.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

impl Skill {
    /// Creates a new skill.
    pub fn new(name: impl Into<String>, level: f64) -> Self {
        Self {
            name: name.into(),
            level: level.clamp(0.0, 1.0),
        }
    }
}
