//! Configurable genetic operators for roster search.
//!
//! Provides runtime-selectable crossover and mutation strategies
//! via [`GeneticOperators`].
//!
//! # Usage
//!
//! ```
//! use u_staffing::ga::operators::{GeneticOperators, CrossoverType, MutationType};
//!
//! let ops = GeneticOperators::default();
//! assert_eq!(ops.crossover_type, CrossoverType::SinglePoint);
//! assert_eq!(ops.mutation_type, MutationType::ShiftWindow);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::chromosome::{
    reassign_mutation, shift_window_mutation, single_point_crossover, uniform_crossover,
    ScheduleCandidate,
};
use super::problem::StaffingGaProblem;

/// Crossover strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverType {
    /// One cut point; head from one parent, tail from the other.
    SinglePoint,
    /// Independent coin flip per worker slot.
    Uniform,
}

/// Mutation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationType {
    /// Redraw one rostered worker's shift window.
    ShiftWindow,
    /// Toggle one worker on or off the roster.
    Reassign,
}

/// Runtime-selectable genetic operators.
///
/// # Example
///
/// ```
/// use u_staffing::ga::operators::{GeneticOperators, CrossoverType, MutationType};
///
/// let ops = GeneticOperators {
///     crossover_type: CrossoverType::Uniform,
///     mutation_type: MutationType::Reassign,
/// };
/// ```
#[derive(Debug, Clone)]
pub struct GeneticOperators {
    pub crossover_type: CrossoverType,
    pub mutation_type: MutationType,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self {
            crossover_type: CrossoverType::SinglePoint,
            mutation_type: MutationType::ShiftWindow,
        }
    }
}

impl GeneticOperators {
    /// Performs crossover using the configured strategy.
    pub fn crossover<R: Rng>(
        &self,
        p1: &ScheduleCandidate,
        p2: &ScheduleCandidate,
        generation: usize,
        rng: &mut R,
    ) -> (ScheduleCandidate, ScheduleCandidate) {
        match self.crossover_type {
            CrossoverType::SinglePoint => single_point_crossover(p1, p2, generation, rng),
            CrossoverType::Uniform => uniform_crossover(p1, p2, generation, rng),
        }
    }

    /// Performs mutation using the configured strategy.
    pub fn mutate<R: Rng>(
        &self,
        candidate: &mut ScheduleCandidate,
        problem: &StaffingGaProblem,
        rng: &mut R,
    ) {
        match self.mutation_type {
            MutationType::ShiftWindow => shift_window_mutation(candidate, problem, rng),
            MutationType::Reassign => reassign_mutation(candidate, problem, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CostConfig, FitnessWeights, GeneratorConfig};
    use crate::ga::GenerationRequest;
    use crate::models::{IntervalMap, WorkerProfile};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn sample_problem() -> StaffingGaProblem {
        let request = GenerationRequest {
            requirements: IntervalMap::from_pairs(
                (8..18).map(|h| (format!("{h:02}:00"), 2.0)),
            )
            .unwrap(),
            workers: (0..4)
                .map(|i| WorkerProfile::new(format!("W{i}"), 20.0))
                .collect(),
            ..GenerationRequest::default()
        };
        StaffingGaProblem::new(
            &request,
            &GeneratorConfig::default(),
            &FitnessWeights::default(),
            &CostConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_default_operators() {
        let ops = GeneticOperators::default();
        assert_eq!(ops.crossover_type, CrossoverType::SinglePoint);
        assert_eq!(ops.mutation_type, MutationType::ShiftWindow);
    }

    #[test]
    fn test_crossover_variants_preserve_length() {
        let problem = sample_problem();
        let mut rng = SmallRng::seed_from_u64(42);
        let p1 = problem.random_candidate(0, &mut rng);
        let p2 = problem.random_candidate(0, &mut rng);
        for crossover_type in [CrossoverType::SinglePoint, CrossoverType::Uniform] {
            let ops = GeneticOperators {
                crossover_type,
                ..GeneticOperators::default()
            };
            let (c1, c2) = ops.crossover(&p1, &p2, 1, &mut rng);
            assert_eq!(c1.genes.len(), problem.gene_count());
            assert_eq!(c2.genes.len(), problem.gene_count());
            assert!(!c1.is_evaluated());
        }
    }

    #[test]
    fn test_shift_window_mutation_stays_available() {
        let problem = sample_problem();
        let ops = GeneticOperators::default();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut c = problem.random_candidate(0, &mut rng);
        for _ in 0..50 {
            ops.mutate(&mut c, &problem, &mut rng);
            for (gene, worker) in c.genes.iter().zip(&problem.workers) {
                if let Some(a) = gene {
                    assert_eq!(a.worker_id, worker.id);
                    assert!(worker.is_available_for(&a.window()));
                }
            }
        }
        // Shift-window mutation never empties a roster
        assert!(c.assignment_count() > 0);
    }

    #[test]
    fn test_reassign_toggles_one_gene() {
        let problem = sample_problem();
        let ops = GeneticOperators {
            mutation_type: MutationType::Reassign,
            ..GeneticOperators::default()
        };
        let mut rng = SmallRng::seed_from_u64(11);
        let original = problem.random_candidate(0, &mut rng);
        let mut c = original.clone();
        ops.mutate(&mut c, &problem, &mut rng);
        let changed = original
            .genes
            .iter()
            .zip(&c.genes)
            .filter(|(a, b)| a.is_some() != b.is_some())
            .count();
        assert_eq!(changed, 1);
    }
}
