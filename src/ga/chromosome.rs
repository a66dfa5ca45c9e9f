//! Worker-slot chromosome for roster search.
//!
//! # Encoding
//!
//! One gene per eligible worker, in a fixed worker order shared by the whole
//! population. A gene is either `None` (worker not rostered) or the worker's
//! [`ShiftAssignment`]. Keeping positions fixed means crossover can never
//! give a worker two shifts or hand one worker's shift to another.
//!
//! Fitness is higher-is-better and `NaN` until evaluated.

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::problem::StaffingGaProblem;
use crate::models::{ShiftAssignment, ShiftRecord, StaffingPlan, WorkerProfile};

/// Attempts at drawing an available random window before falling back to
/// the worker's templates.
const WINDOW_RETRIES: usize = 8;

/// A candidate roster with its scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleCandidate {
    /// One slot per eligible worker.
    pub genes: Vec<Option<ShiftAssignment>>,
    /// Weighted total (higher = better). `NaN` until evaluated.
    pub fitness: f64,
    pub coverage_score: f64,
    pub cost_score: f64,
    pub compliance_score: f64,
    pub pattern_score: f64,
    /// Generation the candidate was created in.
    pub generation: usize,
}

impl ScheduleCandidate {
    /// Creates an unevaluated candidate.
    pub fn new(genes: Vec<Option<ShiftAssignment>>, generation: usize) -> Self {
        Self {
            genes,
            fitness: f64::NAN,
            coverage_score: f64::NAN,
            cost_score: f64::NAN,
            compliance_score: f64::NAN,
            pattern_score: f64::NAN,
            generation,
        }
    }

    /// Whether scores have been computed.
    pub fn is_evaluated(&self) -> bool {
        !self.fitness.is_nan()
    }

    /// Clears scores after the genes changed.
    pub fn invalidate(&mut self, generation: usize) {
        self.fitness = f64::NAN;
        self.coverage_score = f64::NAN;
        self.cost_score = f64::NAN;
        self.compliance_score = f64::NAN;
        self.pattern_score = f64::NAN;
        self.generation = generation;
    }

    /// Rostered assignments in worker order.
    pub fn assignments(&self) -> impl Iterator<Item = &ShiftAssignment> {
        self.genes.iter().flatten()
    }

    /// Number of rostered workers.
    pub fn assignment_count(&self) -> usize {
        self.genes.iter().filter(|g| g.is_some()).count()
    }

    /// Sum of assignment costs.
    pub fn total_cost(&self) -> f64 {
        self.assignments().map(|a| a.cost).sum()
    }

    /// Gene content key for de-duplication.
    pub fn gene_key(&self) -> Vec<Option<(u32, u32)>> {
        self.genes
            .iter()
            .map(|g| g.as_ref().map(|a| (a.shift_start, a.shift_end)))
            .collect()
    }

    /// Converts the roster into a staffing plan for `date`.
    ///
    /// Hourly rates come from `workers`; an unknown worker yields a record
    /// without a rate, which the cost evaluator reports.
    pub fn to_plan(&self, date: NaiveDate, workers: &[WorkerProfile]) -> StaffingPlan {
        let rates: HashMap<&str, f64> = workers
            .iter()
            .map(|w| (w.id.as_str(), w.hourly_rate))
            .collect();
        let mut plan = StaffingPlan::new();
        for a in self.assignments() {
            let mut record =
                ShiftRecord::new(&a.worker_id, date, a.window()).with_skills(a.skills.clone());
            record.hourly_rate = rates.get(a.worker_id.as_str()).copied();
            plan.add_record(record);
        }
        plan
    }
}

/// Single-point crossover.
///
/// Genes before a random cut come from one parent, the rest from the other.
pub fn single_point_crossover<R: Rng>(
    p1: &ScheduleCandidate,
    p2: &ScheduleCandidate,
    generation: usize,
    rng: &mut R,
) -> (ScheduleCandidate, ScheduleCandidate) {
    let n = p1.genes.len().min(p2.genes.len());
    if n < 2 {
        return (
            ScheduleCandidate::new(p1.genes.clone(), generation),
            ScheduleCandidate::new(p2.genes.clone(), generation),
        );
    }
    let cut = rng.random_range(1..n);
    let mut g1 = Vec::with_capacity(n);
    let mut g2 = Vec::with_capacity(n);
    g1.extend_from_slice(&p1.genes[..cut]);
    g1.extend_from_slice(&p2.genes[cut..n]);
    g2.extend_from_slice(&p2.genes[..cut]);
    g2.extend_from_slice(&p1.genes[cut..n]);
    (
        ScheduleCandidate::new(g1, generation),
        ScheduleCandidate::new(g2, generation),
    )
}

/// Uniform crossover: each gene position swaps parents with probability ½.
pub fn uniform_crossover<R: Rng>(
    p1: &ScheduleCandidate,
    p2: &ScheduleCandidate,
    generation: usize,
    rng: &mut R,
) -> (ScheduleCandidate, ScheduleCandidate) {
    let n = p1.genes.len().min(p2.genes.len());
    let mut g1 = Vec::with_capacity(n);
    let mut g2 = Vec::with_capacity(n);
    for i in 0..n {
        if rng.random_bool(0.5) {
            g1.push(p2.genes[i].clone());
            g2.push(p1.genes[i].clone());
        } else {
            g1.push(p1.genes[i].clone());
            g2.push(p2.genes[i].clone());
        }
    }
    (
        ScheduleCandidate::new(g1, generation),
        ScheduleCandidate::new(g2, generation),
    )
}

/// Re-randomizes the shift window of one rostered gene.
///
/// The new window is a random interval-aligned start with a known shift
/// length, redrawn until the worker's availability permits it; after
/// [`WINDOW_RETRIES`] misses a permitted template is used instead. With no
/// rostered gene, one idle worker is rostered.
pub fn shift_window_mutation<R: Rng>(
    candidate: &mut ScheduleCandidate,
    problem: &StaffingGaProblem,
    rng: &mut R,
) {
    let rostered: Vec<usize> = (0..candidate.genes.len())
        .filter(|&i| candidate.genes[i].is_some())
        .collect();
    if rostered.is_empty() {
        reassign_mutation(candidate, problem, rng);
        return;
    }
    let idx = rostered[rng.random_range(0..rostered.len())];

    for _ in 0..WINDOW_RETRIES {
        if let Some(gene) = problem.random_window_gene(idx, rng) {
            candidate.genes[idx] = Some(gene);
            return;
        }
    }
    if let Some(gene) = problem.template_gene(idx, rng) {
        candidate.genes[idx] = Some(gene);
    }
}

/// Toggles one worker on or off the roster.
///
/// Rostering draws a permitted template for the worker.
pub fn reassign_mutation<R: Rng>(
    candidate: &mut ScheduleCandidate,
    problem: &StaffingGaProblem,
    rng: &mut R,
) {
    if candidate.genes.is_empty() {
        return;
    }
    let idx = rng.random_range(0..candidate.genes.len());
    candidate.genes[idx] = match candidate.genes[idx] {
        Some(_) => None,
        None => problem.template_gene(idx, rng),
    };
}
