//! Per-interval staffing requirements.
//!
//! Produced by the staffing calculator and immutable afterwards. Consumed
//! by the gap analyzer and the schedule generator through
//! [`StaffingRequirements::to_interval_map`].

use serde::{Deserialize, Serialize};

use super::IntervalMap;
use crate::error::StaffingResult;

/// Requirement for one interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffingRequirement {
    /// Interval label.
    pub interval: String,
    /// Offered load in Erlangs (arrival rate / service rate).
    pub offered_load: f64,
    /// Minimum productive agents meeting the target.
    pub agents: u32,
    /// Agents to roster once shrinkage is applied.
    pub rostered_agents: u32,
    /// Service level computed for `agents`.
    pub achieved_service_level: f64,
    /// Utilization for `agents`.
    pub utilization: f64,
    /// Probability an arrival waits (Erlang C) for `agents`.
    pub probability_of_wait: f64,
    /// Mean wait of all arrivals, in the forecast's time unit.
    pub average_speed_of_answer: f64,
}

impl StaffingRequirement {
    /// Requirement for an interval with no work.
    pub fn idle(interval: impl Into<String>) -> Self {
        Self {
            interval: interval.into(),
            offered_load: 0.0,
            agents: 0,
            rostered_agents: 0,
            achieved_service_level: 1.0,
            utilization: 0.0,
            probability_of_wait: 0.0,
            average_speed_of_answer: 0.0,
        }
    }
}

/// Ordered requirements for a planning day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaffingRequirements {
    pub intervals: Vec<StaffingRequirement>,
}

impl StaffingRequirements {
    /// Requirement for one interval.
    pub fn get(&self, interval: &str) -> Option<&StaffingRequirement> {
        self.intervals.iter().find(|r| r.interval == interval)
    }

    /// Number of intervals.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Whether there are no intervals.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Peak rostered headcount.
    pub fn peak_agents(&self) -> u32 {
        self.intervals
            .iter()
            .map(|r| r.rostered_agents)
            .max()
            .unwrap_or(0)
    }

    /// Rostered headcount per interval, in order.
    pub fn to_interval_map(&self) -> StaffingResult<IntervalMap> {
        IntervalMap::from_pairs(
            self.intervals
                .iter()
                .map(|r| (r.interval.clone(), f64::from(r.rostered_agents))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_interval_map() {
        let mut busy = StaffingRequirement::idle("10:00");
        busy.agents = 12;
        busy.rostered_agents = 14;
        let reqs = StaffingRequirements {
            intervals: vec![StaffingRequirement::idle("09:00"), busy],
        };

        let map = reqs.to_interval_map().unwrap();
        assert_eq!(map.get("09:00"), Some(0.0));
        assert_eq!(map.get("10:00"), Some(14.0));
        assert_eq!(reqs.peak_agents(), 14);
        assert_eq!(reqs.get("10:00").unwrap().agents, 12);
    }
}
