//! Labor cost evaluation of a staffing plan.
//!
//! # Algorithm
//!
//! 1. Check every record; malformed ones are reported in
//!    [`FinancialImpact::record_errors`] and skipped.
//! 2. Group valid records by worker and date. Within a day, records are
//!    taken in start order and fill the regular-hours allowance before any
//!    overtime accrues, so regular and overtime hours partition the hours
//!    worked.
//! 3. Spread each record's cost over the requirement intervals in
//!    proportion to overlap.
//! 4. Derive coverage, savings opportunities and the ROI projection.

use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::insights::{self, RoiProjection, SavingsOpportunity};
use super::model::{CostModel, PremiumLine};
use crate::config::CostConfig;
use crate::coverage::scheduled_coverage;
use crate::error::{StaffingError, StaffingResult};
use crate::models::{IntervalMap, ShiftRecord, StaffingPlan, TimeWindow, MINUTES_PER_DAY};

/// Caller-supplied adjustments to the configured rates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateOverrides {
    /// Hourly rate per worker, replacing the record's rate.
    pub worker_rates: HashMap<String, f64>,
    pub overtime_threshold_hours: Option<f64>,
    pub overtime_multiplier: Option<f64>,
}

impl RateOverrides {
    pub fn with_worker_rate(mut self, worker_id: impl Into<String>, rate: f64) -> Self {
        self.worker_rates.insert(worker_id.into(), rate);
        self
    }
}

/// Pay category of a worker-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostType {
    /// Regular hours only.
    Regular,
    /// Overtime hours only (threshold used up earlier the same day).
    Overtime,
    /// Both regular and overtime hours.
    Mixed,
}

/// Cost of one worker on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub agent_id: String,
    pub date: NaiveDate,
    pub regular_hours: f64,
    pub overtime_hours: f64,
    pub cost_type: CostType,
    /// Base hourly rate of the day's first shift.
    pub rate: f64,
    pub regular_cost: f64,
    pub overtime_cost: f64,
    pub premium_cost: f64,
    pub premiums: Vec<PremiumLine>,
    /// `total_cost / (hours × rate)`; 1.0 for a plain regular day.
    pub premium_multiplier: f64,
    pub total_cost: f64,
}

impl CostBreakdown {
    /// Hours worked.
    pub fn hours(&self) -> f64 {
        self.regular_hours + self.overtime_hours
    }
}

/// A record rejected during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordError {
    /// Position in the submitted plan.
    pub index: usize,
    pub worker_id: String,
    pub field: String,
    pub reason: String,
}

impl RecordError {
    fn new(index: usize, record: &ShiftRecord, field: &str, reason: impl Into<String>) -> Self {
        Self {
            index,
            worker_id: record.worker_id.clone(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// The error as a [`StaffingError::MalformedRecord`].
    pub fn to_error(&self) -> StaffingError {
        StaffingError::MalformedRecord {
            index: self.index,
            field: self.field.clone(),
            reason: format!("{} (worker '{}')", self.reason, self.worker_id),
        }
    }
}

/// Full financial picture of a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialImpact {
    /// One entry per worker-day, in first-appearance order.
    pub breakdowns: Vec<CostBreakdown>,
    pub record_errors: Vec<RecordError>,
    pub total_regular_cost: f64,
    pub total_overtime_cost: f64,
    pub total_premium_cost: f64,
    pub total_cost: f64,
    pub regular_hours: f64,
    pub overtime_hours: f64,
    /// Cost attributed to each requirement interval.
    pub interval_costs: IntervalMap,
    /// Cost falling outside every requirement interval.
    pub unallocated_cost: f64,
    /// Scheduled headcount per requirement interval.
    pub scheduled_coverage: IntervalMap,
    pub under_covered_intervals: Vec<String>,
    pub savings_opportunities: Vec<SavingsOpportunity>,
    pub optimization_recommendations: Vec<String>,
    pub roi: RoiProjection,
}

impl FinancialImpact {
    /// Hours worked.
    pub fn total_hours(&self) -> f64 {
        self.regular_hours + self.overtime_hours
    }

    /// Whether the components add up to the total within one cent.
    pub fn reconciles(&self) -> bool {
        let sum = self.total_regular_cost + self.total_overtime_cost + self.total_premium_cost;
        (sum - self.total_cost).abs() <= 0.01
    }
}

/// A validated record ready for pricing.
struct PricedRecord<'a> {
    record: &'a ShiftRecord,
    window: TimeWindow,
    rate: f64,
}

/// Plan cost evaluator.
#[derive(Debug, Clone, Default)]
pub struct CostEvaluator {
    config: CostConfig,
}

impl CostEvaluator {
    pub fn new(config: CostConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CostConfig {
        &self.config
    }

    /// Cost model after applying `overrides`.
    pub fn model(&self, overrides: Option<&RateOverrides>) -> CostModel {
        let mut model = CostModel::from(&self.config);
        if let Some(o) = overrides {
            if let Some(t) = o.overtime_threshold_hours {
                model.overtime_threshold_hours = t;
            }
            if let Some(m) = o.overtime_multiplier {
                model.overtime_multiplier = m;
            }
        }
        model
    }

    /// Evaluates `plan` against the per-interval `requirements`.
    ///
    /// # Errors
    /// - `InsufficientInput` for an empty plan
    /// - `InvalidParameter` for invalid overrides or unparsable interval labels
    ///
    /// Malformed records do not fail the batch.
    pub fn evaluate(
        &self,
        plan: &StaffingPlan,
        requirements: &IntervalMap,
        overrides: Option<&RateOverrides>,
    ) -> StaffingResult<FinancialImpact> {
        if plan.is_empty() {
            return Err(StaffingError::insufficient(
                "the staffing plan has no shift records",
                "Submit at least one shift record.",
            ));
        }
        let model = self.model(overrides);
        check_model(&model)?;
        let timeline = requirements.timeline()?;
        let interval_minutes = requirements.interval_minutes();

        let mut record_errors = Vec::new();
        let mut priced = Vec::with_capacity(plan.len());
        for (index, record) in plan.records.iter().enumerate() {
            match check_record(index, record, overrides) {
                Ok(p) => priced.push(p),
                Err(e) => {
                    warn!(
                        "cost: rejecting record #{index} for '{}': {} {}",
                        e.worker_id, e.field, e.reason
                    );
                    record_errors.push(e);
                }
            }
        }

        // Group by worker-day in first-appearance order.
        let mut day_index: HashMap<(&str, NaiveDate), usize> = HashMap::new();
        let mut days: Vec<Vec<&PricedRecord>> = Vec::new();
        for p in &priced {
            let key = (p.record.worker_id.as_str(), p.record.date);
            let slot = *day_index.entry(key).or_insert_with(|| {
                days.push(Vec::new());
                days.len() - 1
            });
            days[slot].push(p);
        }

        let mut breakdowns = Vec::with_capacity(days.len());
        let mut interval_costs = vec![0.0; timeline.len()];
        let mut unallocated_cost = 0.0;

        for mut day in days {
            day.sort_by_key(|p| p.window.start_minute);
            let first = day[0];
            let mut regular_used = 0.0;
            let mut b = CostBreakdown {
                agent_id: first.record.worker_id.clone(),
                date: first.record.date,
                regular_hours: 0.0,
                overtime_hours: 0.0,
                cost_type: CostType::Regular,
                rate: first.rate,
                regular_cost: 0.0,
                overtime_cost: 0.0,
                premium_cost: 0.0,
                premiums: Vec::new(),
                premium_multiplier: 1.0,
                total_cost: 0.0,
            };

            for p in day {
                let hours = p.window.duration_hours();
                let (regular, overtime) = model.split_hours(hours, regular_used);
                regular_used += regular;

                let regular_cost = regular * p.rate;
                let overtime_cost = overtime * p.rate * model.overtime_multiplier;
                let premiums = model.premium_lines(p.record.date, &p.window, p.rate);
                let premium_cost: f64 = premiums.iter().map(|l| l.amount).sum();
                let record_cost = regular_cost + overtime_cost + premium_cost;

                b.regular_hours += regular;
                b.overtime_hours += overtime;
                b.regular_cost += regular_cost;
                b.overtime_cost += overtime_cost;
                b.premium_cost += premium_cost;
                b.premiums.extend(premiums);

                let minutes = f64::from(p.window.duration_minutes());
                let mut allocated = 0.0;
                for (slot, (_, minute, _)) in interval_costs.iter_mut().zip(&timeline) {
                    let overlap = p.window.overlap_with_interval(*minute, interval_minutes);
                    if overlap > 0 {
                        let share = record_cost * f64::from(overlap) / minutes;
                        *slot += share;
                        allocated += share;
                    }
                }
                unallocated_cost += (record_cost - allocated).max(0.0);
            }

            b.total_cost = b.regular_cost + b.overtime_cost + b.premium_cost;
            b.cost_type = match (b.regular_hours > 0.0, b.overtime_hours > 0.0) {
                (true, true) => CostType::Mixed,
                (false, true) => CostType::Overtime,
                _ => CostType::Regular,
            };
            let base = b.hours() * b.rate;
            b.premium_multiplier = if base > 0.0 { b.total_cost / base } else { 1.0 };
            breakdowns.push(b);
        }

        let total_regular_cost: f64 = breakdowns.iter().map(|b| b.regular_cost).sum();
        let total_overtime_cost: f64 = breakdowns.iter().map(|b| b.overtime_cost).sum();
        let total_premium_cost: f64 = breakdowns.iter().map(|b| b.premium_cost).sum();
        let total_cost: f64 = breakdowns.iter().map(|b| b.total_cost).sum();
        let regular_hours: f64 = breakdowns.iter().map(|b| b.regular_hours).sum();
        let overtime_hours: f64 = breakdowns.iter().map(|b| b.overtime_hours).sum();

        let scheduled = scheduled_coverage(requirements, priced.iter().map(|p| &p.window))?;
        let under_covered_intervals: Vec<String> = requirements
            .iter()
            .zip(scheduled.values())
            .filter(|((_, required), scheduled)| scheduled < required)
            .map(|((label, _), _)| label.to_string())
            .collect();
        let surplus_hours: f64 = requirements
            .values()
            .zip(scheduled.values())
            .map(|(r, s)| (s - r).max(0.0))
            .sum::<f64>()
            * f64::from(interval_minutes)
            / 60.0;

        let interval_costs = IntervalMap::from_pairs(
            timeline
                .iter()
                .map(|(label, _, _)| label.clone())
                .zip(interval_costs),
        )?;

        let mut impact = FinancialImpact {
            breakdowns,
            record_errors,
            total_regular_cost,
            total_overtime_cost,
            total_premium_cost,
            total_cost,
            regular_hours,
            overtime_hours,
            interval_costs,
            unallocated_cost,
            scheduled_coverage: scheduled,
            under_covered_intervals,
            savings_opportunities: Vec::new(),
            optimization_recommendations: Vec::new(),
            roi: RoiProjection::default(),
        };

        let skill_hours = skill_hours(&priced);
        impact.savings_opportunities = insights::savings_opportunities(
            &impact,
            &skill_hours,
            surplus_hours,
            model.overtime_multiplier,
            &self.config.insights,
        );
        impact.optimization_recommendations =
            insights::recommendations(&impact, &impact.savings_opportunities);
        impact.roi = insights::roi_projection(
            impact.total_cost,
            &impact.savings_opportunities,
            self.config.annualization_factor,
        );

        debug!(
            "cost: {} worker-days, total {:.2}, {} rejected records",
            impact.breakdowns.len(),
            impact.total_cost,
            impact.record_errors.len()
        );
        Ok(impact)
    }
}

fn check_model(model: &CostModel) -> StaffingResult<()> {
    if !(model.overtime_threshold_hours.is_finite() && model.overtime_threshold_hours > 0.0) {
        return Err(StaffingError::invalid(
            "overtime_threshold_hours",
            model.overtime_threshold_hours,
            "a finite value > 0",
            "The default daily threshold is 8 hours.",
        ));
    }
    if !(model.overtime_multiplier.is_finite() && model.overtime_multiplier >= 1.0) {
        return Err(StaffingError::invalid(
            "overtime_multiplier",
            model.overtime_multiplier,
            "a finite value >= 1",
            "Time-and-a-half is 1.5.",
        ));
    }
    Ok(())
}

fn check_record<'a>(
    index: usize,
    record: &'a ShiftRecord,
    overrides: Option<&RateOverrides>,
) -> Result<PricedRecord<'a>, RecordError> {
    let start = record
        .start_minute
        .ok_or_else(|| RecordError::new(index, record, "start", "is missing"))?;
    if start >= MINUTES_PER_DAY {
        return Err(RecordError::new(
            index,
            record,
            "start",
            format!("must be before 24:00 (got minute {start})"),
        ));
    }
    let end = record
        .end_minute
        .ok_or_else(|| RecordError::new(index, record, "end", "is missing"))?;
    if end <= start {
        return Err(RecordError::new(
            index,
            record,
            "end",
            format!("must be after start ({end} <= {start}); hours must be positive"),
        ));
    }
    if end - start > MINUTES_PER_DAY {
        return Err(RecordError::new(
            index,
            record,
            "end",
            "gives a shift longer than 24 hours",
        ));
    }

    let rate = overrides
        .and_then(|o| o.worker_rates.get(&record.worker_id).copied())
        .or(record.hourly_rate)
        .ok_or_else(|| RecordError::new(index, record, "hourly_rate", "is missing"))?;
    if !(rate.is_finite() && rate > 0.0) {
        return Err(RecordError::new(
            index,
            record,
            "hourly_rate",
            format!("must be > 0 (got {rate})"),
        ));
    }

    Ok(PricedRecord {
        record,
        window: TimeWindow::new(start, end),
        rate,
    })
}

/// Hours worked per skill, in first-appearance order.
fn skill_hours(priced: &[PricedRecord]) -> Vec<(String, f64)> {
    let mut out: Vec<(String, f64)> = Vec::new();
    for p in priced {
        let hours = p.window.duration_hours();
        for skill in &p.record.skills {
            match out.iter_mut().find(|(s, _)| s == skill) {
                Some(entry) => entry.1 += hours,
                None => out.push((skill.clone(), hours)),
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::model::PremiumKind;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 6).unwrap() // Wednesday
    }

    fn hourly(from: u32, to: u32) -> IntervalMap {
        IntervalMap::from_pairs((from..to).map(|h| (format!("{h:02}:00"), 1.0))).unwrap()
    }

    #[test]
    fn test_reference_scenario() {
        let plan = StaffingPlan::new()
            .with_record(ShiftRecord::new("A1", date(), TimeWindow::new(480, 1080)).with_rate(30.0));
        let impact = CostEvaluator::default()
            .evaluate(&plan, &hourly(8, 18), None)
            .unwrap();

        let b = &impact.breakdowns[0];
        assert!((b.regular_hours - 8.0).abs() < 1e-10);
        assert!((b.overtime_hours - 2.0).abs() < 1e-10);
        assert!((b.regular_cost - 240.0).abs() < 1e-10);
        assert!((b.overtime_cost - 90.0).abs() < 1e-10);
        assert!((b.total_cost - 330.0).abs() < 1e-10);
        assert_eq!(b.cost_type, CostType::Mixed);
        assert!((b.premium_multiplier - 1.1).abs() < 1e-10);
        assert!((impact.total_cost - 330.0).abs() < 1e-10);
        assert!(impact.reconciles());
    }

    #[test]
    fn test_same_day_records_share_threshold() {
        // Submitted out of order: afternoon first
        let plan = StaffingPlan::new()
            .with_record(ShiftRecord::new("A1", date(), TimeWindow::new(780, 1080)).with_rate(20.0))
            .with_record(ShiftRecord::new("A1", date(), TimeWindow::new(360, 720)).with_rate(20.0));
        let impact = CostEvaluator::default()
            .evaluate(&plan, &hourly(6, 18), None)
            .unwrap();
        assert_eq!(impact.breakdowns.len(), 1);
        let b = &impact.breakdowns[0];
        // 6h morning regular, then 2h regular + 3h overtime
        assert!((b.regular_hours - 8.0).abs() < 1e-10);
        assert!((b.overtime_hours - 3.0).abs() < 1e-10);
        assert!((b.hours() - 11.0).abs() < 1e-10);
        assert!((b.total_cost - (160.0 + 90.0)).abs() < 1e-10);
    }

    #[test]
    fn test_malformed_records_are_isolated() {
        let mut missing_end = ShiftRecord::new("B", date(), TimeWindow::new(480, 960)).with_rate(20.0);
        missing_end.end_minute = None;
        let inverted = ShiftRecord::new("C", date(), TimeWindow::new(960, 480)).with_rate(20.0);
        let no_rate = ShiftRecord::new("D", date(), TimeWindow::new(480, 960));
        let zero_rate = ShiftRecord::new("E", date(), TimeWindow::new(480, 960)).with_rate(0.0);

        let plan = StaffingPlan::new()
            .with_record(ShiftRecord::new("A", date(), TimeWindow::new(480, 960)).with_rate(20.0))
            .with_record(missing_end)
            .with_record(inverted)
            .with_record(no_rate)
            .with_record(zero_rate);
        let impact = CostEvaluator::default()
            .evaluate(&plan, &hourly(8, 16), None)
            .unwrap();

        assert_eq!(impact.breakdowns.len(), 1);
        assert!((impact.total_cost - 160.0).abs() < 1e-10);
        let fields: Vec<(usize, &str)> = impact
            .record_errors
            .iter()
            .map(|e| (e.index, e.field.as_str()))
            .collect();
        assert_eq!(
            fields,
            vec![(1, "end"), (2, "end"), (3, "hourly_rate"), (4, "hourly_rate")]
        );
        let msg = impact.record_errors[0].to_error().to_string();
        assert!(msg.contains("#1") && msg.contains("end") && msg.contains("'B'"));
    }

    #[test]
    fn test_start_past_midnight_rejected() {
        let plan = StaffingPlan::new()
            .with_record(ShiftRecord::new("A", date(), TimeWindow::new(480, 960)).with_rate(20.0))
            .with_record(ShiftRecord::new("Late", date(), TimeWindow::new(1500, 1560)).with_rate(20.0));
        let impact = CostEvaluator::default()
            .evaluate(&plan, &hourly(8, 16), None)
            .unwrap();

        assert_eq!(impact.breakdowns.len(), 1);
        assert!((impact.total_cost - 160.0).abs() < 1e-10);
        assert_eq!(impact.record_errors.len(), 1);
        assert_eq!(impact.record_errors[0].index, 1);
        assert_eq!(impact.record_errors[0].field, "start");
    }

    #[test]
    fn test_empty_plan_fails() {
        let err = CostEvaluator::default()
            .evaluate(&StaffingPlan::new(), &hourly(8, 9), None)
            .unwrap_err();
        assert!(matches!(err, StaffingError::InsufficientInput { .. }));
    }

    #[test]
    fn test_rate_overrides() {
        let plan = StaffingPlan::new()
            .with_record(ShiftRecord::new("A1", date(), TimeWindow::new(480, 1080)).with_rate(30.0))
            .with_record(ShiftRecord::new("A2", date(), TimeWindow::new(480, 960)));
        let overrides = RateOverrides {
            overtime_threshold_hours: Some(9.0),
            overtime_multiplier: Some(2.0),
            ..RateOverrides::default()
        }
        .with_worker_rate("A2", 10.0);
        let impact = CostEvaluator::default()
            .evaluate(&plan, &hourly(8, 18), Some(&overrides))
            .unwrap();
        assert!(impact.record_errors.is_empty());
        // A1: 9h × 30 + 1h × 60 = 330; A2: 8h × 10 = 80
        assert!((impact.breakdowns[0].total_cost - 330.0).abs() < 1e-10);
        assert!((impact.breakdowns[1].total_cost - 80.0).abs() < 1e-10);
    }

    #[test]
    fn test_premiums_reconcile() {
        let mut cfg = CostConfig::default();
        cfg.premiums.weekend = Some(0.25);
        cfg.premiums.night = Some(0.15);
        let saturday = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let plan = StaffingPlan::new()
            .with_record(ShiftRecord::new("N1", saturday, TimeWindow::new(1320, 1920)).with_rate(22.5))
            .with_record(ShiftRecord::new("N2", date(), TimeWindow::new(1200, 1680)).with_rate(19.75));
        let impact = CostEvaluator::new(cfg)
            .evaluate(&plan, &hourly(0, 24), None)
            .unwrap();

        let n1 = &impact.breakdowns[0];
        assert_eq!(n1.premiums.len(), 2);
        assert_eq!(n1.premiums[0].kind, PremiumKind::Weekend);
        assert!(n1.premium_multiplier > 1.0);
        assert!(impact.total_premium_cost > 0.0);
        assert!(impact.reconciles());
        for b in &impact.breakdowns {
            let parts = b.regular_cost + b.overtime_cost + b.premium_cost;
            assert!((parts - b.total_cost).abs() <= 0.01);
        }
    }

    #[test]
    fn test_interval_cost_distribution() {
        let plan = StaffingPlan::new()
            .with_record(ShiftRecord::new("A1", date(), TimeWindow::new(480, 720)).with_rate(20.0));
        // Only 09:00 and 10:00 are planned intervals
        let reqs = IntervalMap::new().with("09:00", 1.0).with("10:00", 2.0);
        let impact = CostEvaluator::default().evaluate(&plan, &reqs, None).unwrap();
        assert_eq!(impact.interval_costs.get("09:00"), Some(20.0));
        assert_eq!(impact.interval_costs.get("10:00"), Some(20.0));
        assert!((impact.unallocated_cost - 40.0).abs() < 1e-10);
        assert_eq!(impact.scheduled_coverage.get("10:00"), Some(1.0));
        assert_eq!(impact.under_covered_intervals, vec!["10:00".to_string()]);
    }

    #[test]
    fn test_stable_output() {
        let plan = StaffingPlan::new()
            .with_record(ShiftRecord::new("A1", date(), TimeWindow::new(360, 1080)).with_rate(25.0))
            .with_record(ShiftRecord::new("A2", date(), TimeWindow::new(360, 1080)).with_rate(25.0));
        let evaluator = CostEvaluator::default();
        let a = evaluator.evaluate(&plan, &hourly(6, 18), None).unwrap();
        let b = evaluator.evaluate(&plan, &hourly(6, 18), None).unwrap();
        assert_eq!(a.savings_opportunities, b.savings_opportunities);
        assert_eq!(a.optimization_recommendations, b.optimization_recommendations);
        assert_eq!(a.breakdowns, b.breakdowns);
    }
}
