//! Generational search loop.
//!
//! # Algorithm
//!
//! 1. Seed `population_size` candidates from the template library and
//!    evaluate them. Every seeded candidate rosters at least one worker.
//! 2. Until the generation limit, the time budget, or cancellation:
//!    copy the top `elite_count` candidates unchanged, then fill the rest
//!    with offspring of tournament-selected parents (crossover with
//!    probability `crossover_rate`, otherwise the fitter parent is copied;
//!    mutation with probability `mutation_rate`), and evaluate the new
//!    candidates.
//! 3. Return the best distinct candidates.
//!
//! Each generation is a fresh vector; the previous one is dropped once the
//! next is built. Evaluation touches one candidate at a time, so it runs
//! across threads with `rayon` and synchronizes only at the generation
//! boundary. All random draws happen on the calling thread, so results for
//! a given seed do not depend on the thread count.
//!
//! Termination checks sample a monotonic clock between generations, so a
//! run overshoots its budget by at most one generation.

use log::{debug, info};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::chromosome::ScheduleCandidate;
use super::operators::GeneticOperators;
use super::problem::{GenerationRequest, StaffingGaProblem};
use crate::config::{CostConfig, FitnessWeights, GeneratorConfig};
use crate::error::StaffingResult;

/// External stop signal, checked between generations.
///
/// Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the search to stop.
    pub fn cancel(&self) {
        self.flag.store(true, AtomicOrdering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(AtomicOrdering::Relaxed)
    }
}

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    GenerationLimit,
    TimeBudget,
    Cancelled,
}

/// Ranked search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleVariants {
    /// Best distinct candidates, best first.
    pub variants: Vec<ScheduleCandidate>,
    pub best_variant: ScheduleCandidate,
    /// Generations evolved after initialization.
    pub generation_count: usize,
    /// Hint keys that contributed templates.
    pub historical_patterns_used: Vec<String>,
    /// Best fitness relative to the baseline, in percent.
    pub improvement_percentage: f64,
    /// Baseline used for `improvement_percentage`.
    pub baseline_fitness: f64,
    pub termination: TerminationReason,
    /// Best fitness after initialization and after each generation.
    pub fitness_history: Vec<f64>,
    pub elapsed: Duration,
    pub time_budget_exhausted: bool,
}

/// Genetic roster search.
#[derive(Debug, Clone, Default)]
pub struct ScheduleVariantGenerator {
    config: GeneratorConfig,
    weights: FitnessWeights,
    cost: CostConfig,
}

impl ScheduleVariantGenerator {
    pub fn new(config: GeneratorConfig, weights: FitnessWeights, cost: CostConfig) -> Self {
        Self {
            config,
            weights,
            cost,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Runs the search.
    ///
    /// # Errors
    /// - `InvalidParameter` for an invalid configuration or worker pool
    /// - `InsufficientInput` for an empty pool or empty requirements
    /// - `NoFeasibleSchedule` when no worker is eligible for any template
    ///
    /// Running out of time or being cancelled is not an error.
    pub fn generate<R: Rng>(
        &self,
        request: &GenerationRequest,
        rng: &mut R,
        cancel: &CancellationToken,
    ) -> StaffingResult<ScheduleVariants> {
        let started = Instant::now();
        self.config.validate()?;
        self.weights.validate()?;

        let problem = StaffingGaProblem::new(request, &self.config, &self.weights, &self.cost)?;
        let ops = GeneticOperators {
            crossover_type: self.config.crossover_type,
            mutation_type: self.config.mutation_type,
        };
        let budget = self.config.time_budget();
        // At least one elite keeps the best fitness from regressing.
        let elite_count = self.config.elite_count.max(1);

        info!(
            "ga: {} eligible workers, {} templates, population {}, budget {:?}",
            problem.gene_count(),
            problem.library.len(),
            self.config.population_size,
            budget
        );

        let mut population: Vec<ScheduleCandidate> = (0..self.config.population_size)
            .map(|_| problem.random_candidate(0, rng))
            .collect();
        self.evaluate_all(&problem, &mut population);
        sort_by_fitness(&mut population);

        let initial_best = population[0].fitness;
        let mut history = vec![initial_best];
        let mut generation = 0;

        let termination = loop {
            if generation >= self.config.max_generations {
                break TerminationReason::GenerationLimit;
            }
            if cancel.is_cancelled() {
                break TerminationReason::Cancelled;
            }
            if started.elapsed() >= budget {
                break TerminationReason::TimeBudget;
            }

            let next_generation = generation + 1;
            let mut next: Vec<ScheduleCandidate> = Vec::with_capacity(population.len());
            next.extend(population.iter().take(elite_count).cloned());

            while next.len() < population.len() {
                let p1 = tournament(&population, self.config.tournament_size, rng);
                let p2 = tournament(&population, self.config.tournament_size, rng);

                let children = if rng.random_bool(self.config.crossover_rate) {
                    let (c1, c2) = ops.crossover(p1, p2, next_generation, rng);
                    vec![c1, c2]
                } else {
                    let fitter = if p2.fitness > p1.fitness { p2 } else { p1 };
                    vec![fitter.clone()]
                };

                for mut child in children {
                    if next.len() >= population.len() {
                        break;
                    }
                    if rng.random_bool(self.config.mutation_rate) {
                        ops.mutate(&mut child, &problem, rng);
                        child.invalidate(next_generation);
                    }
                    next.push(child);
                }
            }

            self.evaluate_all(&problem, &mut next);
            sort_by_fitness(&mut next);
            population = next;
            generation = next_generation;

            let best = population[0].fitness;
            if let Some(&previous) = history.last() {
                if best > previous {
                    debug!("ga: generation {generation} new best {best:.3}");
                }
            }
            history.push(best);
        };

        let elapsed = started.elapsed();
        let variants = distinct_top(&population, self.config.variant_count);
        let best_variant = population[0].clone();
        let baseline_fitness = request.baseline_fitness.unwrap_or(initial_best);
        let improvement_percentage = if baseline_fitness > 0.0 {
            (best_variant.fitness - baseline_fitness) / baseline_fitness * 100.0
        } else {
            0.0
        };

        info!(
            "ga: stopped after {generation} generations ({termination:?}), best {:.3} in {elapsed:?}",
            best_variant.fitness
        );

        Ok(ScheduleVariants {
            variants,
            best_variant,
            generation_count: generation,
            historical_patterns_used: problem.library.hints_used.clone(),
            improvement_percentage,
            baseline_fitness,
            termination,
            fitness_history: history,
            elapsed,
            time_budget_exhausted: termination == TerminationReason::TimeBudget,
        })
    }

    fn evaluate_all(&self, problem: &StaffingGaProblem, population: &mut [ScheduleCandidate]) {
        if self.config.parallel {
            population
                .par_iter_mut()
                .filter(|c| !c.is_evaluated())
                .for_each(|c| problem.evaluate(c));
        } else {
            population
                .iter_mut()
                .filter(|c| !c.is_evaluated())
                .for_each(|c| problem.evaluate(c));
        }
    }
}

/// Best first; stable, so equal candidates keep their order.
fn sort_by_fitness(population: &mut [ScheduleCandidate]) {
    population.sort_by(|a, b| b.fitness.partial_cmp(&a.fitness).unwrap_or(Ordering::Equal));
}

/// Tournament selection with replacement; ties go to the first drawn.
fn tournament<'a, R: Rng>(
    population: &'a [ScheduleCandidate],
    size: usize,
    rng: &mut R,
) -> &'a ScheduleCandidate {
    let mut best = &population[rng.random_range(0..population.len())];
    for _ in 1..size {
        let challenger = &population[rng.random_range(0..population.len())];
        if challenger.fitness > best.fitness {
            best = challenger;
        }
    }
    best
}

/// Up to `k` candidates with distinct genes, in population order.
fn distinct_top(population: &[ScheduleCandidate], k: usize) -> Vec<ScheduleCandidate> {
    let mut seen = HashSet::new();
    population
        .iter()
        .filter(|c| seen.insert(c.gene_key()))
        .take(k)
        .cloned()
        .collect()
}
