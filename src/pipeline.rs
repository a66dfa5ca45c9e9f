//! End-to-end staffing pipeline.
//!
//! # Flow
//!
//! 1. Volume forecast → per-interval requirements ([`StaffingCalculator`]).
//! 2. Requirements vs. the current schedule, if one is supplied
//!    ([`CoverageGapAnalyzer`]).
//! 3. Roster search ([`ScheduleVariantGenerator`]).
//! 4. Financial impact of each variant ([`CostEvaluator`]).
//! 5. Least-cost selection over the shifts the variants proposed
//!    ([`CostOptimizer`]).
//!
//! Every intermediate product is returned. Components are stateless, so
//! one pipeline can serve many runs.

use chrono::NaiveDate;
use log::{info, warn};
use rand::Rng;
use std::collections::HashSet;

use crate::config::PipelineConfig;
use crate::cost::{
    CostEvaluator, CostModel, CostOptimizer, FinancialImpact, GreedyCostOptimizer, OptimizedPlan,
    RateOverrides, ShiftOption,
};
use crate::coverage::{CoverageGapAnalyzer, GapReport};
use crate::error::{StaffingError, StaffingResult};
use crate::ga::{
    CancellationToken, GenerationRequest, PatternHints, ScheduleVariantGenerator, ScheduleVariants,
};
use crate::models::{ConstraintSet, IntervalMap, StaffingRequirements, TimeWindow, WorkerProfile};
use crate::staffing::{ForecastProfile, StaffingCalculator};
use crate::validation::{into_staffing_error, validate_worker_pool, ValidationErrorKind};

/// Inputs for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineInput {
    /// Contacts per interval (`"HH:MM"` labels).
    pub volume_forecast: IntervalMap,
    pub profile: ForecastProfile,
    pub workers: Vec<WorkerProfile>,
    pub hints: PatternHints,
    pub constraints: ConstraintSet,
    pub required_skills: Vec<String>,
    /// Headcount currently scheduled per interval, for the gap report.
    pub current_schedule: Option<IntervalMap>,
    /// Date stamped on generated shift records.
    pub plan_date: NaiveDate,
    pub rate_overrides: Option<RateOverrides>,
    pub baseline_fitness: Option<f64>,
}

impl PipelineInput {
    pub fn new(volume_forecast: IntervalMap, workers: Vec<WorkerProfile>, plan_date: NaiveDate) -> Self {
        Self {
            volume_forecast,
            profile: ForecastProfile::default(),
            workers,
            hints: PatternHints::new(),
            constraints: ConstraintSet::new(),
            required_skills: Vec::new(),
            current_schedule: None,
            plan_date,
            rate_overrides: None,
            baseline_fitness: None,
        }
    }

    pub fn with_profile(mut self, profile: ForecastProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_hint(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.hints.insert(key.into(), value.into());
        self
    }

    pub fn with_constraints(mut self, constraints: ConstraintSet) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_required_skill(mut self, skill: impl Into<String>) -> Self {
        self.required_skills.push(skill.into());
        self
    }

    pub fn with_current_schedule(mut self, scheduled: IntervalMap) -> Self {
        self.current_schedule = Some(scheduled);
        self
    }

    pub fn with_rate_overrides(mut self, overrides: RateOverrides) -> Self {
        self.rate_overrides = Some(overrides);
        self
    }

    pub fn with_baseline_fitness(mut self, fitness: f64) -> Self {
        self.baseline_fitness = Some(fitness);
        self
    }
}

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub requirements: StaffingRequirements,
    /// Rostered headcount per interval, as searched and priced.
    pub required: IntervalMap,
    pub gap_report: Option<GapReport>,
    pub variants: ScheduleVariants,
    /// Aligned with `variants.variants`; `None` for a variant that rosters nobody.
    pub financial_impacts: Vec<Option<FinancialImpact>>,
    /// `None` when the proposed shifts cannot cover every interval.
    pub cost_optimized: Option<OptimizedPlan>,
}

/// Staffing pipeline with a pluggable cost optimizer.
pub struct StaffingPipeline {
    config: PipelineConfig,
    optimizer: Box<dyn CostOptimizer + Send + Sync>,
}

impl StaffingPipeline {
    /// Creates a pipeline using [`GreedyCostOptimizer`].
    ///
    /// # Errors
    /// `InvalidParameter` if any config section is invalid.
    pub fn new(config: PipelineConfig) -> StaffingResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            optimizer: Box::new(GreedyCostOptimizer::new()),
        })
    }

    /// Replaces the cost optimizer.
    pub fn with_optimizer(mut self, optimizer: impl CostOptimizer + Send + Sync + 'static) -> Self {
        self.optimizer = Box::new(optimizer);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs every stage.
    ///
    /// # Errors
    /// - `InvalidParameter` for a malformed worker pool or invalid inputs
    /// - `InsufficientInput` for an empty forecast or pool
    /// - `CapacityUnattainable` when an interval's target cannot be met
    /// - `IntervalMismatch` when the current schedule's intervals differ
    ///   from the forecast's
    /// - `NoFeasibleSchedule` when the search cannot roster anyone
    pub fn run<R: Rng>(
        &self,
        input: &PipelineInput,
        rng: &mut R,
        cancel: &CancellationToken,
    ) -> StaffingResult<PipelineOutput> {
        if let Err(errors) = validate_worker_pool(&input.workers, &input.required_skills) {
            let (fatal, advisory): (Vec<_>, Vec<_>) = errors
                .into_iter()
                .partition(|e| e.kind != ValidationErrorKind::UnknownSkill);
            for e in &advisory {
                warn!("pipeline: {}", e.message);
            }
            if !fatal.is_empty() {
                return Err(into_staffing_error(&fatal));
            }
        }

        let calculator = StaffingCalculator::new(self.config.staffing.clone());
        let requirements =
            calculator.requirements_for_forecast(&input.volume_forecast, &input.profile)?;
        let required = requirements.to_interval_map()?;
        info!(
            "pipeline: {} intervals, peak {} rostered agents",
            requirements.len(),
            requirements.peak_agents()
        );

        let gap_report = input
            .current_schedule
            .as_ref()
            .map(|current| {
                CoverageGapAnalyzer::new(self.config.coverage.clone())
                    .analyze_coverage_gaps(&required, current)
            })
            .transpose()?;

        let request = GenerationRequest {
            requirements: required.clone(),
            workers: input.workers.clone(),
            hints: input.hints.clone(),
            constraints: input.constraints.clone(),
            required_skills: input.required_skills.clone(),
            baseline_fitness: input.baseline_fitness,
        };
        let generator = ScheduleVariantGenerator::new(
            self.config.generator.clone(),
            self.config.fitness.clone(),
            self.config.cost.clone(),
        );
        let variants = generator.generate(&request, rng, cancel)?;

        let evaluator = CostEvaluator::new(self.config.cost.clone());
        let mut financial_impacts = Vec::with_capacity(variants.variants.len());
        for variant in &variants.variants {
            let plan = variant.to_plan(input.plan_date, &input.workers);
            if plan.is_empty() {
                financial_impacts.push(None);
                continue;
            }
            let impact = evaluator.evaluate(&plan, &required, input.rate_overrides.as_ref())?;
            financial_impacts.push(Some(impact));
        }

        let options = self.shift_options(input, &variants, &evaluator);
        let cost_optimized = match self.optimizer.optimize(&required, &options) {
            Ok(plan) => Some(plan),
            Err(e @ StaffingError::NoFeasibleSchedule { .. }) => {
                warn!("pipeline: cost optimization skipped: {e}");
                None
            }
            Err(e) => return Err(e),
        };

        Ok(PipelineOutput {
            requirements,
            required,
            gap_report,
            variants,
            financial_impacts,
            cost_optimized,
        })
    }

    /// Every worker paired with every distinct window the variants used,
    /// where the worker is available for it, priced as a single shift.
    fn shift_options(
        &self,
        input: &PipelineInput,
        variants: &ScheduleVariants,
        evaluator: &CostEvaluator,
    ) -> Vec<ShiftOption> {
        let mut seen = HashSet::new();
        let windows: Vec<TimeWindow> = variants
            .variants
            .iter()
            .flat_map(|v| v.assignments())
            .map(|a| a.window())
            .filter(|w| seen.insert(*w))
            .collect();

        let model: CostModel = evaluator.model(input.rate_overrides.as_ref());
        let eligible = |w: &WorkerProfile| {
            input.required_skills.is_empty()
                || input.required_skills.iter().any(|s| w.has_skill(s))
        };
        let mut options = Vec::new();
        for worker in input.workers.iter().filter(|w| eligible(w)) {
            let rate = input
                .rate_overrides
                .as_ref()
                .and_then(|o| o.worker_rates.get(&worker.id).copied())
                .unwrap_or(worker.hourly_rate);
            for window in windows.iter().filter(|w| worker.is_available_for(w)) {
                let premiums: f64 = model
                    .premium_lines(input.plan_date, window, rate)
                    .iter()
                    .map(|l| l.amount)
                    .sum();
                let cost = model.shift_cost(window.duration_hours(), rate) + premiums;
                options.push(ShiftOption::new(worker.id.clone(), *window, cost));
            }
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::rng;
    use std::time::Duration;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()
    }

    fn forecast() -> IntervalMap {
        IntervalMap::from_pairs((8..16).map(|h| {
            let contacts = if (10..14).contains(&h) { 60.0 } else { 30.0 };
            (format!("{h:02}:00"), contacts)
        }))
        .unwrap()
    }

    fn workers(n: usize) -> Vec<WorkerProfile> {
        (0..n)
            .map(|i| WorkerProfile::new(format!("W{i}"), 18.0 + (i % 3) as f64))
            .collect()
    }

    fn pipeline() -> StaffingPipeline {
        let config = PipelineConfig {
            generator: GeneratorConfig::default()
                .with_population_size(16)
                .with_max_generations(10)
                .with_time_budget(Duration::from_secs(30)),
            ..PipelineConfig::default()
        };
        StaffingPipeline::new(config).unwrap()
    }

    #[test]
    fn test_run_produces_every_stage() {
        let current = IntervalMap::from_pairs((8..16).map(|h| (format!("{h:02}:00"), 2.0))).unwrap();
        let input = PipelineInput::new(forecast(), workers(14), date())
            .with_hint("preferred_shift_templates", "08:00-16:00,10:00-14:00")
            .with_current_schedule(current);
        let out = pipeline()
            .run(&input, &mut rng::seeded(5), &CancellationToken::new())
            .unwrap();

        assert_eq!(out.requirements.len(), 8);
        assert_eq!(out.required.len(), 8);
        let report = out.gap_report.as_ref().unwrap();
        assert_eq!(report.gaps.len(), 8);
        assert!(report.total_gap > 0.0);

        assert!(!out.variants.variants.is_empty());
        assert_eq!(out.financial_impacts.len(), out.variants.variants.len());
        for impact in out.financial_impacts.iter().flatten() {
            assert!(impact.reconciles());
            assert!(impact.record_errors.is_empty());
        }
        if let Some(plan) = &out.cost_optimized {
            for ((_, need), (_, have)) in out.required.iter().zip(plan.coverage.iter()) {
                assert!(have >= need.ceil());
            }
        }
    }

    #[test]
    fn test_invalid_pool_rejected() {
        let mut pool = workers(3);
        pool.push(WorkerProfile::new("W0", 20.0));
        let input = PipelineInput::new(forecast(), pool, date());
        let err = pipeline()
            .run(&input, &mut rng::seeded(1), &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, StaffingError::InvalidParameter { .. }));
        assert!(err.to_string().contains("Duplicate worker ID: W0"));
    }

    #[test]
    fn test_mismatched_current_schedule() {
        let current = IntervalMap::new().with("08:00", 1.0);
        let input = PipelineInput::new(forecast(), workers(4), date()).with_current_schedule(current);
        let err = pipeline()
            .run(&input, &mut rng::seeded(1), &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, StaffingError::IntervalMismatch { .. }));
    }

    #[test]
    fn test_empty_pool() {
        let input = PipelineInput::new(forecast(), Vec::new(), date());
        let err = pipeline()
            .run(&input, &mut rng::seeded(1), &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, StaffingError::InsufficientInput { .. }));
    }

    /// Fails every selection with a fixed error.
    struct FailingOptimizer(fn() -> StaffingError);

    impl CostOptimizer for FailingOptimizer {
        fn optimize(
            &self,
            _requirements: &IntervalMap,
            _options: &[ShiftOption],
        ) -> StaffingResult<OptimizedPlan> {
            Err((self.0)())
        }
    }

    #[test]
    fn test_infeasible_selection_is_not_fatal() {
        let input = PipelineInput::new(forecast(), workers(10), date());
        let out = pipeline()
            .with_optimizer(FailingOptimizer(|| StaffingError::NoFeasibleSchedule {
                reason: "nothing fits".into(),
            }))
            .run(&input, &mut rng::seeded(2), &CancellationToken::new())
            .unwrap();
        assert!(out.cost_optimized.is_none());
        assert!(!out.variants.variants.is_empty());
    }

    #[test]
    fn test_optimizer_errors_propagate() {
        let input = PipelineInput::new(forecast(), workers(10), date());
        let err = pipeline()
            .with_optimizer(FailingOptimizer(|| {
                StaffingError::invalid("label", "25:00", "HH:MM", "Use 24-hour labels.")
            }))
            .run(&input, &mut rng::seeded(2), &CancellationToken::new())
            .unwrap_err();
        match err {
            StaffingError::InvalidParameter { field, .. } => assert_eq!(field, "label"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PipelineConfig::default();
        config.fitness.coverage = -1.0;
        assert!(StaffingPipeline::new(config).is_err());
    }
}
