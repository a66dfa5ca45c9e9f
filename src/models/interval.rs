//! Ordered per-interval quantities.
//!
//! An [`IntervalMap`] maps a time-bucket label (usually `"HH:MM"`) to a
//! number: call volume, required agents, scheduled agents, or cost. Keys are
//! unique and keep insertion order, which callers use to follow the day
//! timeline. Every component of the pipeline speaks this one shape.
//!
//! # Time Model
//! Labels parse to minutes from the start of the planning day. A label's
//! interval is `[minute, minute + interval_minutes)`.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{StaffingError, StaffingResult};

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 1440;

/// Interval length assumed when it cannot be inferred from labels.
pub const DEFAULT_INTERVAL_MINUTES: u32 = 60;

/// Insertion-ordered, duplicate-free `(label, value)` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntervalMap {
    entries: Vec<(String, f64)>,
}

impl IntervalMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from `(label, value)` pairs.
    ///
    /// Fails with `InvalidParameter` on a duplicate label.
    pub fn from_pairs<I, K>(pairs: I) -> StaffingResult<Self>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut map = Self::new();
        for (key, value) in pairs {
            map.insert(key, value)?;
        }
        Ok(map)
    }

    /// Appends an entry. Fails if the label already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) -> StaffingResult<()> {
        let key = key.into();
        if self.contains_key(&key) {
            return Err(StaffingError::invalid(
                "interval",
                &key,
                "unique interval labels",
                "Each interval may appear only once per map.",
            ));
        }
        self.entries.push((key, value));
        Ok(())
    }

    /// Builder-style insert for literals in tests and fixtures.
    ///
    /// Replaces the value if the label already exists.
    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Value for a label.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    /// Whether the label is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Labels in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Values in order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(_, v)| *v)
    }

    /// `(label, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of intervals.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no intervals.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all values.
    pub fn total(&self) -> f64 {
        self.values().sum()
    }

    /// Lookup table borrowed from this map.
    pub fn as_lookup(&self) -> HashMap<&str, f64> {
        self.iter().collect()
    }

    /// Ensures `other` covers exactly this map's key set.
    ///
    /// `missing` lists labels of `self` absent from `other`; `extra` lists
    /// labels of `other` absent from `self`. Both keep their map's order.
    pub fn ensure_same_keys(&self, other: &IntervalMap) -> StaffingResult<()> {
        let mine: HashSet<&str> = self.keys().collect();
        let theirs: HashSet<&str> = other.keys().collect();

        let missing: Vec<String> = self
            .keys()
            .filter(|k| !theirs.contains(k))
            .map(String::from)
            .collect();
        let extra: Vec<String> = other
            .keys()
            .filter(|k| !mine.contains(k))
            .map(String::from)
            .collect();

        if missing.is_empty() && extra.is_empty() {
            Ok(())
        } else {
            Err(StaffingError::IntervalMismatch { missing, extra })
        }
    }

    /// Parses every label as `"HH:MM"`, returning `(label, minute, value)`.
    pub fn timeline(&self) -> StaffingResult<Vec<(String, u32, f64)>> {
        self.entries
            .iter()
            .map(|(label, value)| {
                let minute = parse_hhmm(label).ok_or_else(|| {
                    StaffingError::invalid(
                        "interval",
                        label,
                        "an \"HH:MM\" label between 00:00 and 23:59",
                        "Label intervals by their start time, e.g. \"09:30\".",
                    )
                })?;
                Ok((label.clone(), minute, *value))
            })
            .collect()
    }

    /// Infers the interval length from the smallest positive gap between
    /// consecutive parsed labels. Falls back to [`DEFAULT_INTERVAL_MINUTES`].
    pub fn interval_minutes(&self) -> u32 {
        let mut minutes: Vec<u32> = self.keys().filter_map(parse_hhmm).collect();
        minutes.sort_unstable();
        minutes.dedup();
        minutes
            .windows(2)
            .map(|w| w[1] - w[0])
            .filter(|gap| *gap > 0)
            .min()
            .unwrap_or(DEFAULT_INTERVAL_MINUTES)
    }
}

/// Parses `"HH:MM"` into minutes from day start.
pub fn parse_hhmm(label: &str) -> Option<u32> {
    let (h, m) = label.trim().split_once(':')?;
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    if h < 24 && m < 60 {
        Some(h * 60 + m)
    } else {
        None
    }
}

/// Formats minutes as `"HH:MM"`, wrapping past midnight.
pub fn format_hhmm(minute: u32) -> String {
    let m = minute % MINUTES_PER_DAY;
    format!("{:02}:{:02}", m / 60, m % 60)
}
