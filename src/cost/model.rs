//! Labor cost model.
//!
//! # Pricing
//! Hours up to the daily threshold are paid at the base rate; hours beyond
//! it at `rate × overtime_multiplier`. Premiums are additive line items,
//! each `hours × rate × premium_rate`, and never change the regular or
//! overtime split:
//!
//! | Premium | Hours it applies to |
//! |---------|---------------------|
//! | Weekend | All hours of a shift starting Saturday or Sunday |
//! | Holiday | All hours of a shift starting on a listed holiday |
//! | Night   | Hours inside the night band (default 22:00–06:00) |

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::config::{CostConfig, PremiumRates};
use crate::models::{overlap_minutes, TimeWindow, MINUTES_PER_DAY};

/// Kind of premium pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PremiumKind {
    Weekend,
    Night,
    Holiday,
}

/// One premium line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumLine {
    pub kind: PremiumKind,
    /// Hours the premium applies to.
    pub hours: f64,
    /// Premium as a fraction of the base rate.
    pub premium_rate: f64,
    /// `hours × base rate × premium_rate`.
    pub amount: f64,
}

/// Regular/overtime pricing with optional premiums.
#[derive(Debug, Clone, PartialEq)]
pub struct CostModel {
    pub overtime_threshold_hours: f64,
    pub overtime_multiplier: f64,
    pub premiums: PremiumRates,
}

impl Default for CostModel {
    fn default() -> Self {
        Self::from(&CostConfig::default())
    }
}

impl From<&CostConfig> for CostModel {
    fn from(config: &CostConfig) -> Self {
        Self {
            overtime_threshold_hours: config.overtime_threshold_hours,
            overtime_multiplier: config.overtime_multiplier,
            premiums: config.premiums.clone(),
        }
    }
}

impl CostModel {
    /// Splits `hours` into `(regular, overtime)` given `regular_used` hours
    /// already paid at the base rate the same day.
    pub fn split_hours(&self, hours: f64, regular_used: f64) -> (f64, f64) {
        let remaining = (self.overtime_threshold_hours - regular_used).max(0.0);
        let regular = hours.min(remaining);
        (regular, hours - regular)
    }

    /// Cost of a single shift worked alone that day, premiums excluded.
    pub fn shift_cost(&self, hours: f64, rate: f64) -> f64 {
        let (regular, overtime) = self.split_hours(hours, 0.0);
        regular * rate + overtime * rate * self.overtime_multiplier
    }

    /// Premium line items for one shift.
    pub fn premium_lines(&self, date: NaiveDate, window: &TimeWindow, rate: f64) -> Vec<PremiumLine> {
        let hours = window.duration_hours();
        let mut lines = Vec::new();

        if let Some(p) = self.premiums.weekend {
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                lines.push(line(PremiumKind::Weekend, hours, p, rate));
            }
        }
        if let Some(p) = self.premiums.night {
            let night = f64::from(self.night_minutes(window)) / 60.0;
            if night > 0.0 {
                lines.push(line(PremiumKind::Night, night, p, rate));
            }
        }
        if let Some(p) = self.premiums.holiday {
            if self.premiums.holidays.contains(&date) {
                lines.push(line(PremiumKind::Holiday, hours, p, rate));
            }
        }
        lines
    }

    /// Minutes of `window` inside the night band.
    pub fn night_minutes(&self, window: &TimeWindow) -> u32 {
        let start = self.premiums.night_start_minute % MINUTES_PER_DAY;
        let end = self.premiums.night_end_minute % MINUTES_PER_DAY;
        let band_len = if end > start {
            end - start
        } else {
            MINUTES_PER_DAY - start + end
        };
        // The band that starts the previous evening reaches into this morning.
        let mut total = 0;
        if end <= start {
            total += overlap_minutes(window, &TimeWindow::new(0, end));
        }
        for day in 0..2 {
            let band_start = start + day * MINUTES_PER_DAY;
            total += overlap_minutes(window, &TimeWindow::starting_at(band_start, band_len));
        }
        total
    }
}

fn line(kind: PremiumKind, hours: f64, premium_rate: f64, rate: f64) -> PremiumLine {
    PremiumLine {
        kind,
        hours,
        premium_rate,
        amount: hours * rate * premium_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with_premiums() -> CostModel {
        let mut cfg = CostConfig::default();
        cfg.premiums.weekend = Some(0.25);
        cfg.premiums.night = Some(0.10);
        cfg.premiums.holiday = Some(1.0);
        cfg.premiums.holidays = vec![NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()];
        CostModel::from(&cfg)
    }

    #[test]
    fn test_split_hours() {
        let m = CostModel::default();
        assert_eq!(m.split_hours(10.0, 0.0), (8.0, 2.0));
        assert_eq!(m.split_hours(6.0, 0.0), (6.0, 0.0));
        assert_eq!(m.split_hours(4.0, 6.0), (2.0, 2.0));
        assert_eq!(m.split_hours(3.0, 9.0), (0.0, 3.0));
    }

    #[test]
    fn test_shift_cost_reference() {
        let m = CostModel::default();
        assert!((m.shift_cost(10.0, 30.0) - 330.0).abs() < 1e-10);
        assert!((m.shift_cost(8.0, 30.0) - 240.0).abs() < 1e-10);
    }

    #[test]
    fn test_no_premiums_by_default() {
        let m = CostModel::default();
        let sat = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert!(m
            .premium_lines(sat, &TimeWindow::new(1320, 1800), 20.0)
            .is_empty());
    }

    #[test]
    fn test_night_minutes() {
        let m = model_with_premiums();
        // 22:00-06:00 fully inside
        assert_eq!(m.night_minutes(&TimeWindow::new(1320, 1800)), 480);
        // 04:00-12:00 catches 04:00-06:00
        assert_eq!(m.night_minutes(&TimeWindow::new(240, 720)), 120);
        // 18:00-02:00 catches 22:00-02:00
        assert_eq!(m.night_minutes(&TimeWindow::new(1080, 1560)), 240);
        // Day shift
        assert_eq!(m.night_minutes(&TimeWindow::new(480, 960)), 0);
    }

    #[test]
    fn test_premium_lines() {
        let m = model_with_premiums();
        let sat = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let lines = m.premium_lines(sat, &TimeWindow::new(1080, 1560), 20.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].kind, PremiumKind::Weekend);
        assert!((lines[0].amount - 8.0 * 20.0 * 0.25).abs() < 1e-10);
        assert_eq!(lines[1].kind, PremiumKind::Night);
        assert!((lines[1].amount - 4.0 * 20.0 * 0.10).abs() < 1e-10);

        let xmas = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        let lines = m.premium_lines(xmas, &TimeWindow::new(480, 960), 20.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].kind, PremiumKind::Holiday);
        assert!((lines[0].amount - 160.0).abs() < 1e-10);
    }
}
