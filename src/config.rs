//! Pipeline configuration.
//!
//! Every tunable of the pipeline lives in one of these structs and is passed
//! explicitly into each component. There is no module-level state, so
//! concurrent calls with different policies cannot interfere.
//!
//! All structs deserialize with `#[serde(default)]`; a JSON document only
//! needs the fields it overrides:
//!
//! ```
//! use u_staffing::config::PipelineConfig;
//!
//! let cfg = PipelineConfig::from_json_str(r#"{ "cost": { "overtime_multiplier": 2.0 } }"#).unwrap();
//! assert_eq!(cfg.cost.overtime_multiplier, 2.0);
//! assert_eq!(cfg.cost.overtime_threshold_hours, 8.0);
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{require_in_range, require_positive, StaffingError, StaffingResult};
use crate::ga::{CrossoverType, MutationType};

// ── Staffing calculator ────────────────────────────────────────────

/// Erlang-C calculator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffingConfig {
    /// Answer-time threshold `t` in the service-level formula
    /// `1 − C·e^{−(cμ−λ)t}`, in the rate's time unit. 0 = probability of
    /// not waiting at all.
    pub target_answer_time: f64,
    /// A count is accepted once its service level reaches
    /// `target × tolerance`.
    pub tolerance: f64,
    /// Search ceiling as a multiple of the offered load λ/μ.
    pub ceiling_factor: f64,
    /// Minimum search headroom above the offered load, in agents.
    pub min_headroom: u32,
    /// Optional cap on utilization; counts above it are rejected.
    pub max_occupancy: Option<f64>,
}

impl Default for StaffingConfig {
    fn default() -> Self {
        Self {
            target_answer_time: 0.0,
            tolerance: 0.999,
            ceiling_factor: 10.0,
            min_headroom: 10,
            max_occupancy: None,
        }
    }
}

impl StaffingConfig {
    pub fn validate(&self) -> StaffingResult<()> {
        if !(self.target_answer_time.is_finite() && self.target_answer_time >= 0.0) {
            return Err(StaffingError::invalid(
                "staffing.target_answer_time",
                self.target_answer_time,
                "a finite value >= 0",
                "Express the answer-time threshold in the same time unit as the rates.",
            ));
        }
        require_in_range(
            "staffing.tolerance",
            self.tolerance,
            0.5,
            1.0,
            "Use 0.999 to accept counts within 0.1% of the target.",
        )?;
        if !(self.ceiling_factor.is_finite() && self.ceiling_factor >= 1.0) {
            return Err(StaffingError::invalid(
                "staffing.ceiling_factor",
                self.ceiling_factor,
                "a finite value >= 1",
                "The default of 10 searches up to ten times the offered load.",
            ));
        }
        if let Some(occ) = self.max_occupancy {
            if !(occ > 0.0 && occ <= 1.0) {
                return Err(StaffingError::invalid(
                    "staffing.max_occupancy",
                    occ,
                    "a value in (0, 1]",
                    "Typical contact-center caps are 0.85 to 0.90.",
                ));
            }
        }
        Ok(())
    }
}

// ── Coverage analyzer ──────────────────────────────────────────────

/// Gap-percentage lower bounds for each severity bucket.
///
/// A gap is `Low` at `>= low`, `Medium` at `>= medium`, and so on; below
/// `low` it is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityThresholds {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            low: 0.05,
            medium: 0.10,
            high: 0.20,
            critical: 0.35,
        }
    }
}

impl SeverityThresholds {
    pub fn validate(&self) -> StaffingResult<()> {
        let ordered = 0.0 <= self.low
            && self.low <= self.medium
            && self.medium <= self.high
            && self.high <= self.critical
            && self.critical <= 1.0;
        if ordered {
            Ok(())
        } else {
            Err(StaffingError::invalid(
                "coverage.thresholds",
                format!(
                    "{}/{}/{}/{}",
                    self.low, self.medium, self.high, self.critical
                ),
                "0 <= low <= medium <= high <= critical <= 1",
                "Thresholds are gap fractions, e.g. 0.05/0.10/0.20/0.35.",
            ))
        }
    }
}

/// Gap analyzer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    pub thresholds: SeverityThresholds,
    /// Soft latency target; exceeding it only logs a warning.
    pub soft_time_target_ms: u64,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            thresholds: SeverityThresholds::default(),
            soft_time_target_ms: 1000,
        }
    }
}

// ── Schedule generator ─────────────────────────────────────────────

/// Fitness weights and scoring targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    pub coverage: f64,
    pub cost: f64,
    pub compliance: f64,
    pub pattern: f64,
    /// Cost per rostered worker that still scores 100.
    pub target_cost_per_worker: f64,
    /// Distinct shift classes needed for a full pattern score.
    pub min_distinct_shift_classes: usize,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            coverage: 0.40,
            cost: 0.30,
            compliance: 0.20,
            pattern: 0.10,
            target_cost_per_worker: 200.0,
            min_distinct_shift_classes: 3,
        }
    }
}

impl FitnessWeights {
    pub fn validate(&self) -> StaffingResult<()> {
        let weights = [
            ("fitness.coverage", self.coverage),
            ("fitness.cost", self.cost),
            ("fitness.compliance", self.compliance),
            ("fitness.pattern", self.pattern),
        ];
        for (field, w) in weights {
            if !(w.is_finite() && w >= 0.0) {
                return Err(StaffingError::invalid(
                    field,
                    w,
                    "a finite weight >= 0",
                    "Weights are relative; the defaults are 0.40/0.30/0.20/0.10.",
                ));
            }
        }
        if self.weight_sum() <= 0.0 {
            return Err(StaffingError::invalid(
                "fitness",
                self.weight_sum(),
                "a weight sum > 0",
                "At least one fitness component must carry weight.",
            ));
        }
        require_positive(
            "fitness.target_cost_per_worker",
            self.target_cost_per_worker,
            "Set the cost per rostered worker that should still score 100.",
        )
    }

    /// Sum of the four weights.
    pub fn weight_sum(&self) -> f64 {
        self.coverage + self.cost + self.compliance + self.pattern
    }
}

/// Genetic search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub population_size: usize,
    pub max_generations: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub tournament_size: usize,
    /// Candidates copied unmodified into the next generation.
    pub elite_count: usize,
    /// Variants returned to the caller.
    pub variant_count: usize,
    /// Wall-clock budget for the whole search.
    pub time_budget_ms: u64,
    /// Evaluate fitness across threads.
    pub parallel: bool,
    pub crossover_type: CrossoverType,
    pub mutation_type: MutationType,
    /// Shift lengths used for default templates and random windows.
    pub shift_lengths_hours: Vec<u32>,
    /// Start-time step of the default template grid.
    pub template_step_minutes: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_generations: 100,
            crossover_rate: 0.8,
            mutation_rate: 0.1,
            tournament_size: 3,
            elite_count: 5,
            variant_count: 5,
            time_budget_ms: 5_000,
            parallel: true,
            crossover_type: CrossoverType::SinglePoint,
            mutation_type: MutationType::ShiftWindow,
            shift_lengths_hours: vec![8],
            template_step_minutes: 120,
        }
    }
}

impl GeneratorConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the generation limit.
    pub fn with_max_generations(mut self, generations: usize) -> Self {
        self.max_generations = generations;
        self
    }

    /// Sets the time budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget_ms = budget.as_millis() as u64;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the elite count.
    pub fn with_elite_count(mut self, elite_count: usize) -> Self {
        self.elite_count = elite_count;
        self
    }

    /// Time budget as a `Duration`.
    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }

    pub fn validate(&self) -> StaffingResult<()> {
        if self.population_size < 2 {
            return Err(StaffingError::invalid(
                "generator.population_size",
                self.population_size,
                "at least 2",
                "Selection needs two parents; 50 is the default.",
            ));
        }
        if self.tournament_size == 0 {
            return Err(StaffingError::invalid(
                "generator.tournament_size",
                self.tournament_size,
                "at least 1",
                "Tournaments of 3 are the default.",
            ));
        }
        if self.elite_count >= self.population_size {
            return Err(StaffingError::invalid(
                "generator.elite_count",
                self.elite_count,
                format!("fewer than population_size ({})", self.population_size),
                "Leave room for offspring; 5 elites is the default.",
            ));
        }
        if self.variant_count == 0 {
            return Err(StaffingError::invalid(
                "generator.variant_count",
                self.variant_count,
                "at least 1",
                "Return at least the best variant.",
            ));
        }
        require_in_range(
            "generator.crossover_rate",
            self.crossover_rate,
            0.0,
            1.0,
            "Use a probability such as 0.8.",
        )?;
        require_in_range(
            "generator.mutation_rate",
            self.mutation_rate,
            0.0,
            1.0,
            "Use a probability such as 0.1.",
        )?;
        if self.shift_lengths_hours.is_empty()
            || self.shift_lengths_hours.iter().any(|h| *h == 0 || *h > 24)
        {
            return Err(StaffingError::invalid(
                "generator.shift_lengths_hours",
                format!("{:?}", self.shift_lengths_hours),
                "a non-empty list of lengths in 1..=24",
                "List the shift lengths you roster, e.g. [8, 10].",
            ));
        }
        if self.template_step_minutes == 0 {
            return Err(StaffingError::invalid(
                "generator.template_step_minutes",
                self.template_step_minutes,
                "at least 1",
                "Use the interval length or a multiple of it.",
            ));
        }
        Ok(())
    }
}

// ── Cost evaluator ─────────────────────────────────────────────────

/// Additive premium rates, each a fraction of the base rate.
///
/// `None` disables the premium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PremiumRates {
    /// Extra fraction for shifts starting on Saturday or Sunday.
    pub weekend: Option<f64>,
    /// Extra fraction for hours inside the night band.
    pub night: Option<f64>,
    /// Extra fraction for shifts starting on a listed holiday.
    pub holiday: Option<f64>,
    /// Night band start (minutes from day start).
    pub night_start_minute: u32,
    /// Night band end (minutes from day start, next morning).
    pub night_end_minute: u32,
    pub holidays: Vec<NaiveDate>,
}

impl Default for PremiumRates {
    fn default() -> Self {
        Self {
            weekend: None,
            night: None,
            holiday: None,
            night_start_minute: 1320,
            night_end_minute: 360,
            holidays: Vec::new(),
        }
    }
}

/// Thresholds driving savings opportunities and recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightThresholds {
    /// Overtime share of hours that triggers an overtime finding.
    pub overtime_share: f64,
    /// Top worker's share of cost that counts as concentrated.
    pub cost_concentration_share: f64,
    /// Minimum workers before concentration is assessed.
    pub concentration_min_workers: usize,
    /// Dominant skill's share of hours that counts as imbalanced.
    pub skill_imbalance_share: f64,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            overtime_share: 0.10,
            cost_concentration_share: 0.25,
            concentration_min_workers: 4,
            skill_imbalance_share: 0.60,
        }
    }
}

/// Labor cost model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Daily hours paid at the base rate.
    pub overtime_threshold_hours: f64,
    /// Multiplier applied to hours beyond the threshold.
    pub overtime_multiplier: f64,
    pub premiums: PremiumRates,
    pub insights: InsightThresholds,
    /// Plans per year used to annualize savings (52 = weekly plans).
    pub annualization_factor: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            overtime_threshold_hours: 8.0,
            overtime_multiplier: 1.5,
            premiums: PremiumRates::default(),
            insights: InsightThresholds::default(),
            annualization_factor: 52.0,
        }
    }
}

impl CostConfig {
    pub fn validate(&self) -> StaffingResult<()> {
        require_positive(
            "cost.overtime_threshold_hours",
            self.overtime_threshold_hours,
            "The default daily threshold is 8 hours.",
        )?;
        if !(self.overtime_multiplier.is_finite() && self.overtime_multiplier >= 1.0) {
            return Err(StaffingError::invalid(
                "cost.overtime_multiplier",
                self.overtime_multiplier,
                "a finite value >= 1",
                "Time-and-a-half is 1.5.",
            ));
        }
        let premiums = [
            ("cost.premiums.weekend", self.premiums.weekend),
            ("cost.premiums.night", self.premiums.night),
            ("cost.premiums.holiday", self.premiums.holiday),
        ];
        for (field, rate) in premiums {
            if let Some(r) = rate {
                if !(r.is_finite() && r >= 0.0) {
                    return Err(StaffingError::invalid(
                        field,
                        r,
                        "a finite fraction >= 0",
                        "A 25% premium is 0.25.",
                    ));
                }
            }
        }
        require_positive(
            "cost.annualization_factor",
            self.annualization_factor,
            "Use 52 for weekly plans or 365 for daily plans.",
        )
    }
}

// ── Whole pipeline ─────────────────────────────────────────────────

/// Configuration for every pipeline component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub staffing: StaffingConfig,
    pub coverage: CoverageConfig,
    pub generator: GeneratorConfig,
    pub fitness: FitnessWeights,
    pub cost: CostConfig,
}

impl PipelineConfig {
    /// Parses a JSON document; absent fields keep their defaults.
    pub fn from_json_str(json: &str) -> StaffingResult<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads and parses a JSON file.
    pub fn load(path: impl AsRef<Path>) -> StaffingResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Validates every section.
    pub fn validate(&self) -> StaffingResult<()> {
        self.staffing.validate()?;
        self.coverage.thresholds.validate()?;
        self.generator.validate()?;
        self.fitness.validate()?;
        self.cost.validate()
    }
}
