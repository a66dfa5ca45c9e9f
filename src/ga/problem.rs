//! Roster search problem definition.
//!
//! Bridges the domain inputs (requirements, worker pool, constraints,
//! template library) to the candidate encoding, and scores candidates.
//!
//! # Fitness
//!
//! | Score | Definition |
//! |-------|------------|
//! | coverage | `Σ min(scheduled, required) / Σ required × 100` (100 if nothing is required) |
//! | cost | 100 at or below the target cost per rostered worker, falling linearly to 0 at twice the target |
//! | compliance | compliant assignments / assignments × 100 (100 without constraints or assignments) |
//! | pattern | `100 × min(distinct shift classes / minimum, 1)` |
//!
//! `fitness = w_cov·coverage + w_cost·cost + w_comp·compliance + w_pat·pattern`.

use rand::Rng;
use std::collections::HashSet;

use super::chromosome::ScheduleCandidate;
use super::patterns::{PatternHints, PlanningSpan, TemplateLibrary};
use crate::config::{CostConfig, FitnessWeights, GeneratorConfig};
use crate::cost::CostModel;
use crate::error::{StaffingError, StaffingResult};
use crate::models::{
    ConstraintSet, IntervalMap, ShiftAssignment, ShiftClass, TimeWindow, WorkerProfile,
};
use crate::validation::{into_staffing_error, validate_worker_pool, ValidationErrorKind};

/// Lower bound of the initial rostering probability.
const MIN_ROSTER_PROBABILITY: f64 = 0.1;

/// Inputs describing one roster search.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    /// Required headcount per interval (`"HH:MM"` labels).
    pub requirements: IntervalMap,
    /// Worker pool.
    pub workers: Vec<WorkerProfile>,
    /// Historical-pattern hints.
    pub hints: PatternHints,
    /// Hard constraints scored by compliance.
    pub constraints: ConstraintSet,
    /// Workers holding none of these skills are excluded. Empty = no filter.
    pub required_skills: Vec<String>,
    /// Fitness the improvement percentage is measured against.
    pub baseline_fitness: Option<f64>,
}

/// Search problem over one planning day.
#[derive(Debug, Clone)]
pub struct StaffingGaProblem {
    /// Eligible workers, in gene order.
    pub workers: Vec<WorkerProfile>,
    pub library: TemplateLibrary,
    /// `(label, minute, required)` per interval.
    pub timeline: Vec<(String, u32, f64)>,
    pub span: PlanningSpan,
    pub constraints: ConstraintSet,
    pub weights: FitnessWeights,
    cost_model: CostModel,
    /// Template indices each worker may take.
    permitted: Vec<Vec<usize>>,
    roster_probability: f64,
    required_total: f64,
}

impl StaffingGaProblem {
    /// Builds the problem.
    ///
    /// # Errors
    /// - `InsufficientInput` for empty requirements or an empty pool
    /// - `InvalidParameter` for unparsable labels, negative requirements or
    ///   a malformed worker pool
    /// - `NoFeasibleSchedule` when no worker is eligible for any template
    pub fn new(
        request: &GenerationRequest,
        config: &GeneratorConfig,
        weights: &FitnessWeights,
        cost: &CostConfig,
    ) -> StaffingResult<Self> {
        if request.requirements.is_empty() {
            return Err(StaffingError::insufficient(
                "the coverage requirement map is empty",
                "Compute requirements for at least one interval first.",
            ));
        }
        if request.workers.is_empty() {
            return Err(StaffingError::insufficient(
                "the worker pool is empty",
                "Supply at least one worker profile.",
            ));
        }
        if let Err(errors) = validate_worker_pool(&request.workers, &request.required_skills) {
            let fatal: Vec<_> = errors
                .into_iter()
                .filter(|e| e.kind != ValidationErrorKind::UnknownSkill)
                .collect();
            if !fatal.is_empty() {
                return Err(into_staffing_error(&fatal));
            }
        }

        let timeline = request.requirements.timeline()?;
        for (label, _, required) in &timeline {
            if !(required.is_finite() && *required >= 0.0) {
                return Err(StaffingError::invalid(
                    format!("requirements[{label}]"),
                    required,
                    "a finite headcount >= 0",
                    "Requirements are worker counts per interval.",
                ));
            }
        }

        let interval_minutes = request.requirements.interval_minutes();
        let start_minute = timeline.iter().map(|(_, m, _)| *m).min().unwrap_or(0);
        let last_minute = timeline.iter().map(|(_, m, _)| *m).max().unwrap_or(0);
        let span = PlanningSpan {
            start_minute,
            end_minute: last_minute + interval_minutes,
            interval_minutes,
        };
        let library = TemplateLibrary::from_hints(&request.hints, span, config);

        let mut workers = Vec::new();
        let mut permitted = Vec::new();
        for worker in &request.workers {
            let skilled = request.required_skills.is_empty()
                || request.required_skills.iter().any(|s| worker.has_skill(s));
            if !skilled {
                continue;
            }
            let allowed = library.permitted_for(worker);
            if allowed.is_empty() {
                continue;
            }
            workers.push(worker.clone());
            permitted.push(allowed);
        }
        if workers.is_empty() {
            let reason = if request.required_skills.is_empty() {
                format!(
                    "no worker's availability permits any of the {} shift templates",
                    library.len()
                )
            } else {
                format!(
                    "no available worker holds any required skill ({})",
                    request.required_skills.join(", ")
                )
            };
            return Err(StaffingError::NoFeasibleSchedule { reason });
        }

        let required_total: f64 = timeline.iter().map(|(_, _, r)| r).sum();
        let lengths = &library.shift_lengths_hours;
        let mean_shift_minutes =
            lengths.iter().map(|h| f64::from(h * 60)).sum::<f64>() / lengths.len().max(1) as f64;
        let needed = required_total * f64::from(interval_minutes) / mean_shift_minutes.max(1.0);
        let roster_probability =
            (needed / workers.len() as f64).clamp(MIN_ROSTER_PROBABILITY, 1.0);

        Ok(Self {
            workers,
            library,
            timeline,
            span,
            constraints: request.constraints.clone(),
            weights: weights.clone(),
            cost_model: CostModel::from(cost),
            permitted,
            roster_probability,
            required_total,
        })
    }

    /// Number of genes per candidate.
    pub fn gene_count(&self) -> usize {
        self.workers.len()
    }

    /// Probability a worker is rostered in a fresh candidate.
    pub fn roster_probability(&self) -> f64 {
        self.roster_probability
    }

    /// Builds a random candidate from the template library.
    pub fn random_candidate<R: Rng>(&self, generation: usize, rng: &mut R) -> ScheduleCandidate {
        let jitter = rng.random_range(0.7..=1.3);
        let p = (self.roster_probability * jitter).clamp(0.05, 1.0);
        let mut genes: Vec<Option<ShiftAssignment>> = (0..self.workers.len())
            .map(|idx| {
                if rng.random_bool(p) {
                    self.template_gene(idx, rng)
                } else {
                    None
                }
            })
            .collect();
        // Every eligible worker has a permitted template, so one is always rosterable
        if !genes.is_empty() && genes.iter().all(Option::is_none) {
            let idx = rng.random_range(0..genes.len());
            genes[idx] = self
                .template_gene(idx, rng)
                .or_else(|| self.random_window_gene(idx, rng));
        }
        ScheduleCandidate::new(genes, generation)
    }

    /// A gene for worker `idx` from a permitted template.
    pub fn template_gene<R: Rng>(&self, idx: usize, rng: &mut R) -> Option<ShiftAssignment> {
        let template = self.library.sample(&self.permitted[idx], rng)?;
        Some(
            self.make_gene(idx, template.window)
                .with_template(template.name.clone()),
        )
    }

    /// A gene with a random interval-aligned window, if the worker's
    /// availability permits it.
    pub fn random_window_gene<R: Rng>(&self, idx: usize, rng: &mut R) -> Option<ShiftAssignment> {
        let step = self.span.interval_minutes.max(1);
        let slots = (self.span.end_minute - self.span.start_minute).div_ceil(step).max(1);
        let start = self.span.start_minute + rng.random_range(0..slots) * step;
        let lengths = &self.library.shift_lengths_hours;
        let hours = lengths[rng.random_range(0..lengths.len())];
        let window = TimeWindow::starting_at(start, hours * 60);
        self.workers[idx]
            .is_available_for(&window)
            .then(|| self.make_gene(idx, window))
    }

    fn make_gene(&self, idx: usize, window: TimeWindow) -> ShiftAssignment {
        let worker = &self.workers[idx];
        let cost = self
            .cost_model
            .shift_cost(window.duration_hours(), worker.hourly_rate);
        ShiftAssignment::new(&worker.id, window)
            .with_skills(worker.skill_names())
            .with_cost(cost)
    }

    /// Headcount per interval, in timeline order.
    pub fn scheduled_counts(&self, candidate: &ScheduleCandidate) -> Vec<f64> {
        let mut counts = vec![0.0; self.timeline.len()];
        for a in candidate.assignments() {
            for (slot, (_, minute, _)) in counts.iter_mut().zip(&self.timeline) {
                if a.covers(*minute) {
                    *slot += 1.0;
                }
            }
        }
        counts
    }

    /// Computes and stores all scores.
    pub fn evaluate(&self, candidate: &mut ScheduleCandidate) {
        let counts = self.scheduled_counts(candidate);
        candidate.coverage_score = if self.required_total > 0.0 {
            let met: f64 = counts
                .iter()
                .zip(&self.timeline)
                .map(|(s, (_, _, r))| s.min(*r))
                .sum();
            met / self.required_total * 100.0
        } else {
            100.0
        };

        let rostered = candidate.assignment_count();
        candidate.cost_score = if rostered == 0 {
            100.0
        } else {
            let per_worker = candidate.total_cost() / rostered as f64;
            let target = self.weights.target_cost_per_worker;
            if per_worker <= target {
                100.0
            } else {
                (100.0 * (1.0 - (per_worker - target) / target)).max(0.0)
            }
        };

        candidate.compliance_score = if self.constraints.is_empty() || rostered == 0 {
            100.0
        } else {
            let compliant = candidate
                .genes
                .iter()
                .zip(&self.workers)
                .filter_map(|(g, w)| g.as_ref().map(|a| (a, w)))
                .filter(|(a, w)| self.constraints.permits(a, w, a.hours()))
                .count();
            compliant as f64 / rostered as f64 * 100.0
        };

        let classes: HashSet<ShiftClass> = candidate.assignments().map(|a| a.class()).collect();
        let wanted = self.weights.min_distinct_shift_classes.max(1) as f64;
        candidate.pattern_score = 100.0 * (classes.len() as f64 / wanted).min(1.0);

        candidate.fitness = self.weights.coverage * candidate.coverage_score
            + self.weights.cost * candidate.cost_score
            + self.weights.compliance * candidate.compliance_score
            + self.weights.pattern * candidate.pattern_score;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Availability, Constraint};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn requirements() -> IntervalMap {
        IntervalMap::from_pairs(
            (6..22).map(|h| (format!("{h:02}:00"), if (9..17).contains(&h) { 3.0 } else { 1.0 })),
        )
        .unwrap()
    }

    fn pool(n: usize) -> Vec<WorkerProfile> {
        (0..n)
            .map(|i| WorkerProfile::new(format!("W{i}"), 20.0).with_skill("voice", 1.0))
            .collect()
    }

    fn problem(request: &GenerationRequest) -> StaffingResult<StaffingGaProblem> {
        StaffingGaProblem::new(
            request,
            &GeneratorConfig::default(),
            &FitnessWeights::default(),
            &CostConfig::default(),
        )
    }

    fn request(workers: Vec<WorkerProfile>) -> GenerationRequest {
        GenerationRequest {
            requirements: requirements(),
            workers,
            ..GenerationRequest::default()
        }
    }

    #[test]
    fn test_insufficient_input() {
        let err = problem(&request(vec![])).unwrap_err();
        assert!(matches!(err, StaffingError::InsufficientInput { .. }));

        let empty = GenerationRequest {
            workers: pool(2),
            ..GenerationRequest::default()
        };
        let err = problem(&empty).unwrap_err();
        assert!(matches!(err, StaffingError::InsufficientInput { .. }));
    }

    #[test]
    fn test_no_worker_with_required_skill() {
        let mut req = request(pool(3));
        req.required_skills = vec!["spanish".into()];
        let err = problem(&req).unwrap_err();
        match err {
            StaffingError::NoFeasibleSchedule { reason } => assert!(reason.contains("spanish")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unavailable_workers_excluded() {
        let mut workers = pool(2);
        workers.push(
            WorkerProfile::new("Tiny", 20.0).with_availability(Availability::always().with_window(600, 660)),
        );
        let p = problem(&request(workers)).unwrap();
        assert_eq!(p.gene_count(), 2);
    }

    #[test]
    fn test_invalid_rate_rejected() {
        let mut workers = pool(2);
        workers.push(WorkerProfile::new("Broken", f64::NAN));
        let err = problem(&request(workers)).unwrap_err();
        match err {
            StaffingError::InvalidParameter { field, guidance, .. } => {
                assert_eq!(field, "workers");
                assert!(guidance.contains("Broken"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_random_candidate_never_empty() {
        // One worker against one low-demand interval rosters rarely by chance
        let req = GenerationRequest {
            requirements: IntervalMap::new().with("10:00", 1.0),
            workers: pool(1),
            ..GenerationRequest::default()
        };
        let p = problem(&req).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..200 {
            let c = p.random_candidate(0, &mut rng);
            assert_eq!(c.assignment_count(), 1);
        }
    }

    #[test]
    fn test_random_candidate_respects_availability() {
        let workers = vec![
            WorkerProfile::new("AM", 20.0).with_availability(Availability::always().with_window(360, 900)),
            WorkerProfile::new("PM", 20.0).with_availability(Availability::always().with_window(780, 1320)),
        ];
        let p = problem(&request(workers)).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..50 {
            let c = p.random_candidate(0, &mut rng);
            assert_eq!(c.genes.len(), 2);
            for (gene, worker) in c.genes.iter().zip(&p.workers) {
                if let Some(a) = gene {
                    assert_eq!(a.worker_id, worker.id);
                    assert!(worker.is_available_for(&a.window()));
                    assert!(a.template.is_some());
                }
            }
            if let Some(g) = p.random_window_gene(0, &mut rng) {
                assert!(p.workers[0].is_available_for(&g.window()));
            }
        }
    }

    #[test]
    fn test_evaluate_scores() {
        let p = problem(&request(pool(3))).unwrap();
        let shift = |w: &str, start: u32| {
            Some(
                ShiftAssignment::new(w, TimeWindow::starting_at(start, 480))
                    .with_cost(160.0),
            )
        };
        // Early, Day and Late classes
        let mut c = ScheduleCandidate::new(
            vec![shift("W0", 360), shift("W1", 540), shift("W2", 840)],
            0,
        );
        p.evaluate(&mut c);
        assert!(c.is_evaluated());
        assert!((c.pattern_score - 100.0).abs() < 1e-10);
        assert!((c.cost_score - 100.0).abs() < 1e-10);
        assert!((c.compliance_score - 100.0).abs() < 1e-10);
        assert!(c.coverage_score > 0.0 && c.coverage_score < 100.0);
        let expected = 0.4 * c.coverage_score + 0.3 * 100.0 + 0.2 * 100.0 + 0.1 * 100.0;
        assert!((c.fitness - expected).abs() < 1e-9);

        let mut empty = ScheduleCandidate::new(vec![None, None, None], 0);
        p.evaluate(&mut empty);
        assert_eq!(empty.coverage_score, 0.0);
        assert_eq!(empty.pattern_score, 0.0);
        assert!(empty.fitness < c.fitness);
    }

    #[test]
    fn test_cost_score_decays_above_target() {
        let p = problem(&request(pool(1))).unwrap();
        let mut c = ScheduleCandidate::new(
            vec![Some(
                ShiftAssignment::new("W0", TimeWindow::new(360, 840)).with_cost(300.0),
            )],
            0,
        );
        p.evaluate(&mut c);
        // Target 200: 300 is 50% over → 50
        assert!((c.cost_score - 50.0).abs() < 1e-10);

        c.genes[0].as_mut().unwrap().cost = 500.0;
        p.evaluate(&mut c);
        assert_eq!(c.cost_score, 0.0);
    }

    #[test]
    fn test_compliance_counts_violations() {
        let mut req = request(pool(2));
        req.constraints = ConstraintSet::new().with(Constraint::max_hours_per_day(8.0));
        let p = problem(&req).unwrap();
        let mut c = ScheduleCandidate::new(
            vec![
                Some(ShiftAssignment::new("W0", TimeWindow::new(360, 840))),
                Some(ShiftAssignment::new("W1", TimeWindow::new(360, 960))),
            ],
            0,
        );
        p.evaluate(&mut c);
        assert!((c.compliance_score - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_scheduled_counts() {
        let p = problem(&request(pool(2))).unwrap();
        let c = ScheduleCandidate::new(
            vec![
                Some(ShiftAssignment::new("W0", TimeWindow::new(360, 840))),
                Some(ShiftAssignment::new("W1", TimeWindow::new(600, 1080))),
            ],
            0,
        );
        let counts = p.scheduled_counts(&c);
        // 06:00 → 1, 10:00 → 2, 20:00 → 0
        assert_eq!(counts[0], 1.0);
        assert_eq!(counts[4], 2.0);
        assert_eq!(counts[14], 0.0);
    }
}
