//! Shift template library built from historical-pattern hints.
//!
//! Hints are free-form key/value pairs supplied by the caller. Recognized
//! keys:
//!
//! | Key | Example | Effect |
//! |-----|---------|--------|
//! | `preferred_shift_templates` | `"06:00-14:00,Mid=10:00-18:00"` | Named templates, weight 3 |
//! | `known_peak_intervals` | `"10:00,11:00"` | Templates centered on each peak, weight 2 |
//! | `shift_lengths` | `"8,10"` | Extra shift lengths (hours) for grid and peak templates |
//!
//! A grid of default templates (weight 1) always covers the requirement
//! span, so an empty hint map still yields a usable library. Unknown keys
//! and malformed entries are skipped with a log line.

use log::{debug, warn};
use rand::Rng;
use std::collections::BTreeMap;

use crate::config::GeneratorConfig;
use crate::models::{
    format_hhmm, parse_hhmm, ShiftTemplate, TemplateSource, TimeWindow, WorkerProfile,
};

/// Free-form historical-pattern hints, iterated in key order.
pub type PatternHints = BTreeMap<String, String>;

pub const PREFERRED_TEMPLATES_KEY: &str = "preferred_shift_templates";
pub const PEAK_INTERVALS_KEY: &str = "known_peak_intervals";
pub const SHIFT_LENGTHS_KEY: &str = "shift_lengths";

const PREFERRED_WEIGHT: f64 = 3.0;
const PEAK_WEIGHT: f64 = 2.0;
const DEFAULT_WEIGHT: f64 = 1.0;

/// Requirement span the templates must serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanningSpan {
    /// First interval start.
    pub start_minute: u32,
    /// End of the last interval.
    pub end_minute: u32,
    /// Interval length.
    pub interval_minutes: u32,
}

impl PlanningSpan {
    /// Interval-aligned start times inside the span.
    pub fn start_slots(&self) -> impl Iterator<Item = u32> + '_ {
        (self.start_minute..self.end_minute).step_by(self.interval_minutes.max(1) as usize)
    }
}

/// Weighted set of shift templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    pub templates: Vec<ShiftTemplate>,
    /// Hint keys that contributed at least one template or length.
    pub hints_used: Vec<String>,
    /// Shift lengths (hours) known to the library.
    pub shift_lengths_hours: Vec<u32>,
}

impl TemplateLibrary {
    /// Builds the library for `span`.
    pub fn from_hints(hints: &PatternHints, span: PlanningSpan, config: &GeneratorConfig) -> Self {
        let mut library = Self {
            shift_lengths_hours: config.shift_lengths_hours.clone(),
            ..Self::default()
        };

        for (key, value) in hints {
            let contributed = match key.as_str() {
                SHIFT_LENGTHS_KEY => library.add_lengths(value),
                PREFERRED_TEMPLATES_KEY | PEAK_INTERVALS_KEY => false,
                _ => {
                    debug!("patterns: ignoring unrecognized hint '{key}'");
                    false
                }
            };
            if contributed {
                library.hints_used.push(key.clone());
            }
        }

        // Preferred before peak before grid, so duplicates keep the richer source.
        if let Some(value) = hints.get(PREFERRED_TEMPLATES_KEY) {
            if library.add_preferred(value) {
                library.hints_used.push(PREFERRED_TEMPLATES_KEY.to_string());
            }
        }
        if let Some(value) = hints.get(PEAK_INTERVALS_KEY) {
            if library.add_peaks(value, span) {
                library.hints_used.push(PEAK_INTERVALS_KEY.to_string());
            }
        }
        library.add_grid(span, config.template_step_minutes);
        library.hints_used.sort();

        debug!(
            "patterns: {} templates from hints {:?}",
            library.templates.len(),
            library.hints_used
        );
        library
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the library is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Indices of templates the worker's availability permits.
    pub fn permitted_for(&self, worker: &WorkerProfile) -> Vec<usize> {
        self.templates
            .iter()
            .enumerate()
            .filter(|(_, t)| worker.is_available_for(&t.window))
            .map(|(i, _)| i)
            .collect()
    }

    /// Draws one of `indices` with probability proportional to weight.
    pub fn sample<R: Rng>(&self, indices: &[usize], rng: &mut R) -> Option<&ShiftTemplate> {
        let total: f64 = indices.iter().map(|&i| self.templates[i].weight).sum();
        if indices.is_empty() || total <= 0.0 {
            return None;
        }
        let mut draw = rng.random::<f64>() * total;
        for &i in indices {
            let weight = self.templates[i].weight;
            if draw < weight {
                return Some(&self.templates[i]);
            }
            draw -= weight;
        }
        indices.last().map(|&i| &self.templates[i])
    }

    fn push(&mut self, template: ShiftTemplate) {
        if !self.templates.iter().any(|t| t.window == template.window) {
            self.templates.push(template);
        }
    }

    fn add_lengths(&mut self, value: &str) -> bool {
        let mut added = false;
        for entry in value.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            match entry.parse::<u32>() {
                Ok(h) if (1..=24).contains(&h) => {
                    if !self.shift_lengths_hours.contains(&h) {
                        self.shift_lengths_hours.push(h);
                    }
                    added = true;
                }
                _ => warn!("patterns: skipping shift length '{entry}' (expected 1-24 hours)"),
            }
        }
        added
    }

    fn add_preferred(&mut self, value: &str) -> bool {
        let mut added = false;
        for entry in value.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (name, window_text) = match entry.split_once('=') {
                Some((name, window)) => (name.trim().to_string(), window),
                None => (entry.to_string(), entry),
            };
            match TimeWindow::parse(window_text) {
                Some(window) if window.is_well_formed() => {
                    self.push(
                        ShiftTemplate::new(name, window)
                            .with_weight(PREFERRED_WEIGHT)
                            .with_source(TemplateSource::Preferred),
                    );
                    added = true;
                }
                _ => warn!("patterns: skipping preferred template '{entry}' (expected HH:MM-HH:MM)"),
            }
        }
        added
    }

    fn add_peaks(&mut self, value: &str, span: PlanningSpan) -> bool {
        let mut added = false;
        for entry in value.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let Some(peak) = parse_hhmm(entry) else {
                warn!("patterns: skipping peak interval '{entry}' (expected HH:MM)");
                continue;
            };
            for &hours in &self.shift_lengths_hours.clone() {
                let length = hours * 60;
                let centered = peak.saturating_sub(length / 2);
                let step = span.interval_minutes.max(1);
                let start = centered - centered % step;
                self.push(
                    ShiftTemplate::new(
                        format!("peak-{}-{hours}h", format_hhmm(peak)),
                        TimeWindow::starting_at(start, length),
                    )
                    .with_weight(PEAK_WEIGHT)
                    .with_source(TemplateSource::Peak),
                );
            }
            added = true;
        }
        added
    }

    fn add_grid(&mut self, span: PlanningSpan, step: u32) {
        let step = step.max(1);
        for &hours in &self.shift_lengths_hours.clone() {
            let length = hours * 60;
            let mut start = span.start_minute;
            loop {
                self.push(
                    ShiftTemplate::new(
                        format!("grid-{}-{hours}h", format_hhmm(start)),
                        TimeWindow::starting_at(start, length),
                    )
                    .with_weight(DEFAULT_WEIGHT),
                );
                start += step;
                if start + length > span.end_minute || start >= span.end_minute {
                    break;
                }
            }
        }
    }
}
