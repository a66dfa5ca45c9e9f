//! Time windows and worker availability.
//!
//! Defines when a worker may be rostered: availability windows and
//! blocked periods (training, leave) within one planning day.
//!
//! # Time Model
//! All times are minutes from the start of the planning day. A window may
//! run past midnight (`end_minute > 1440`) but never spans more than one
//! day, so overnight shifts such as 22:00–06:00 are `[1320, 1800)`.
//!
//! # Precedence
//! Blocked periods override availability windows. A shift is permitted iff:
//! - It lies entirely within one `windows` entry (or no windows are set), AND
//! - It overlaps no `blocked` entry.

use serde::{Deserialize, Serialize};

use super::interval::{format_hhmm, parse_hhmm, MINUTES_PER_DAY};

/// A half-open interval `[start_minute, end_minute)` of the planning day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Window start (minutes, inclusive).
    pub start_minute: u32,
    /// Window end (minutes, exclusive).
    pub end_minute: u32,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start_minute: u32, end_minute: u32) -> Self {
        Self {
            start_minute,
            end_minute,
        }
    }

    /// Creates a window from a start minute and a length in minutes.
    pub fn starting_at(start_minute: u32, length_minutes: u32) -> Self {
        Self::new(start_minute, start_minute + length_minutes)
    }

    /// Parses `"HH:MM-HH:MM"`. An end at or before the start wraps past
    /// midnight, so `"22:00-06:00"` becomes `[1320, 1800)`.
    pub fn parse(text: &str) -> Option<Self> {
        let (start, end) = text.trim().split_once('-')?;
        let start = parse_hhmm(start)?;
        let mut end = parse_hhmm(end)?;
        if end <= start {
            end += MINUTES_PER_DAY;
        }
        Some(Self::new(start, end))
    }

    /// Duration in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        self.end_minute.saturating_sub(self.start_minute)
    }

    /// Duration in hours.
    #[inline]
    pub fn duration_hours(&self) -> f64 {
        f64::from(self.duration_minutes()) / 60.0
    }

    /// Whether the window is non-empty and spans at most one day.
    pub fn is_well_formed(&self) -> bool {
        self.end_minute > self.start_minute
            && self.start_minute < MINUTES_PER_DAY
            && self.duration_minutes() <= MINUTES_PER_DAY
    }

    /// Whether a raw minute falls within this window.
    #[inline]
    pub fn contains(&self, minute: u32) -> bool {
        minute >= self.start_minute && minute < self.end_minute
    }

    /// Whether a time-of-day minute (`0..1440`) is covered, including the
    /// part of the window that runs past midnight.
    pub fn covers_time_of_day(&self, minute: u32) -> bool {
        self.contains(minute) || self.contains(minute + MINUTES_PER_DAY)
    }

    /// Whether `other` lies entirely within this window.
    pub fn encloses(&self, other: &TimeWindow) -> bool {
        other.start_minute >= self.start_minute && other.end_minute <= self.end_minute
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_minute < other.end_minute && other.start_minute < self.end_minute
    }

    /// Overlap in minutes with the time-of-day interval
    /// `[minute, minute + length)`, counting the post-midnight tail.
    pub fn overlap_with_interval(&self, minute: u32, length: u32) -> u32 {
        let day = overlap_minutes(self, &TimeWindow::starting_at(minute, length));
        let next = overlap_minutes(
            self,
            &TimeWindow::starting_at(minute + MINUTES_PER_DAY, length),
        );
        day + next
    }

    /// `"HH:MM-HH:MM"` rendering.
    pub fn label(&self) -> String {
        format!(
            "{}-{}",
            format_hhmm(self.start_minute),
            format_hhmm(self.end_minute)
        )
    }
}

/// Overlap duration between two windows, in minutes.
pub fn overlap_minutes(a: &TimeWindow, b: &TimeWindow) -> u32 {
    let start = a.start_minute.max(b.start_minute);
    let end = a.end_minute.min(b.end_minute);
    end.saturating_sub(start)
}

/// Worker availability for one planning day.
///
/// If no windows are defined the worker is always available, subject to
/// blocked periods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    /// Periods when the worker may be rostered. Empty = always.
    pub windows: Vec<TimeWindow>,
    /// Periods when the worker is unavailable (overrides `windows`).
    pub blocked: Vec<TimeWindow>,
}

impl Availability {
    /// Availability with no restrictions.
    pub fn always() -> Self {
        Self::default()
    }

    /// Adds an availability window.
    pub fn with_window(mut self, start_minute: u32, end_minute: u32) -> Self {
        self.windows.push(TimeWindow::new(start_minute, end_minute));
        self
    }

    /// Adds a blocked period.
    pub fn with_blocked(mut self, start_minute: u32, end_minute: u32) -> Self {
        self.blocked.push(TimeWindow::new(start_minute, end_minute));
        self
    }

    /// Whether a shift over `shift` may be rostered.
    pub fn permits(&self, shift: &TimeWindow) -> bool {
        if self.blocked.iter().any(|b| b.overlaps(shift)) {
            return false;
        }
        self.windows.is_empty() || self.windows.iter().any(|w| w.encloses(shift))
    }

    /// Total available minutes within `[start, end)`.
    pub fn available_minutes_in(&self, range: &TimeWindow) -> u32 {
        let open: u32 = if self.windows.is_empty() {
            range.duration_minutes()
        } else {
            self.windows.iter().map(|w| overlap_minutes(range, w)).sum()
        };
        let blocked: u32 = self.blocked.iter().map(|b| overlap_minutes(range, b)).sum();
        open.saturating_sub(blocked)
    }
}
