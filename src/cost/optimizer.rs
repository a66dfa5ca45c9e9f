//! Least-cost shift selection.
//!
//! # Algorithm
//!
//! Greedy weighted set multicover. Each interval needs `ceil(required)`
//! covering shifts; a shift covers an interval when it covers the
//! interval's start.
//!
//! 1. Repeatedly pick the option with the lowest cost per still-unmet
//!    interval it would cover, at most one option per worker. Ties go to
//!    the cheaper option, then to input order.
//! 2. When no option helps while some interval is still short, move one
//!    already selected worker to another of their options that covers a
//!    short interval and refill; keep the move that covers the most
//!    demand. Fail when no move covers more than before.
//! 3. Drop selected options, most expensive first, whenever coverage
//!    stays complete without them.
//!
//! # Complexity
//! O(s * n * k) where s=selected shifts, n=options, k=intervals, plus
//! O(s * n) refills per move.
//!
//! # Reference
//! Chvátal (1979), "A Greedy Heuristic for the Set-Covering Problem"

use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::error::{StaffingError, StaffingResult};
use crate::models::{IntervalMap, TimeWindow};

/// One worker-shift the optimizer may select.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftOption {
    pub worker_id: String,
    pub window: TimeWindow,
    pub cost: f64,
}

impl ShiftOption {
    pub fn new(worker_id: impl Into<String>, window: TimeWindow, cost: f64) -> Self {
        Self {
            worker_id: worker_id.into(),
            window,
            cost,
        }
    }
}

/// Selected shifts and the coverage they give.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizedPlan {
    /// Selected options in input order.
    pub selected: Vec<ShiftOption>,
    pub total_cost: f64,
    /// Headcount per requirement interval.
    pub coverage: IntervalMap,
}

/// Chooses a subset of shift options that covers the requirements.
///
/// Implementations other than [`GreedyCostOptimizer`] (for example an
/// exact LP solver) can be plugged into the pipeline through this trait.
pub trait CostOptimizer {
    /// # Errors
    /// - `InvalidParameter` for a negative or non-finite option cost
    /// - `NoFeasibleSchedule` when no covering selection is found
    fn optimize(
        &self,
        requirements: &IntervalMap,
        options: &[ShiftOption],
    ) -> StaffingResult<OptimizedPlan>;
}

/// Greedy cost-per-coverage optimizer with redundancy pruning.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyCostOptimizer;

impl GreedyCostOptimizer {
    pub fn new() -> Self {
        Self
    }
}

impl CostOptimizer for GreedyCostOptimizer {
    fn optimize(
        &self,
        requirements: &IntervalMap,
        options: &[ShiftOption],
    ) -> StaffingResult<OptimizedPlan> {
        for o in options {
            if !(o.cost.is_finite() && o.cost >= 0.0) {
                return Err(StaffingError::invalid(
                    format!("cost of shift option for '{}'", o.worker_id),
                    o.cost,
                    "a finite value >= 0",
                    "Price every option before optimizing.",
                ));
            }
        }

        let timeline = requirements.timeline()?;
        let need: Vec<u32> = timeline
            .iter()
            .map(|(_, _, required)| required.max(0.0).ceil() as u32)
            .collect();
        let covers: Vec<Vec<usize>> = options
            .iter()
            .map(|o| {
                timeline
                    .iter()
                    .enumerate()
                    .filter(|(_, (_, minute, _))| o.window.covers_time_of_day(*minute))
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();

        let mut selection = Selection::new(options.len(), timeline.len());
        loop {
            selection.fill(options, &covers, &need);
            if selection.met(&need) == need.iter().sum::<u32>() {
                break;
            }
            match selection.repaired(options, &covers, &need) {
                Some(next) => {
                    debug!("optimizer: moved a worker to another shift option");
                    selection = next;
                }
                None => {
                    let uncovered: Vec<&str> = timeline
                        .iter()
                        .zip(selection.have.iter().zip(&need))
                        .filter(|(_, (h, n))| h < n)
                        .map(|((label, _, _), _)| label.as_str())
                        .collect();
                    return Err(StaffingError::NoFeasibleSchedule {
                        reason: format!(
                            "greedy selection could not cover interval(s) {}; add workers or shift options",
                            uncovered.join(", ")
                        ),
                    });
                }
            }
        }
        let Selection {
            mut have,
            mut chosen,
            ..
        } = selection;

        // Costliest first; later input first among equal costs.
        let mut order: Vec<usize> = (0..options.len()).filter(|&i| chosen[i]).collect();
        order.sort_by(|&a, &b| {
            options[b]
                .cost
                .partial_cmp(&options[a].cost)
                .unwrap_or(Ordering::Equal)
                .then(b.cmp(&a))
        });
        for idx in order {
            if covers[idx].iter().all(|&i| have[i] > need[i]) {
                chosen[idx] = false;
                for &i in &covers[idx] {
                    have[i] -= 1;
                }
            }
        }

        let selected: Vec<ShiftOption> = options
            .iter()
            .zip(&chosen)
            .filter(|(_, c)| **c)
            .map(|(o, _)| o.clone())
            .collect();
        let total_cost = selected.iter().map(|o| o.cost).sum();
        let coverage = IntervalMap::from_pairs(
            timeline
                .into_iter()
                .zip(have)
                .map(|((label, _, _), h)| (label, f64::from(h))),
        )?;
        debug!(
            "optimizer: selected {} of {} options, cost {:.2}",
            selected.len(),
            options.len(),
            total_cost
        );

        Ok(OptimizedPlan {
            selected,
            total_cost,
            coverage,
        })
    }
}

/// Partial selection: coverage per interval, chosen options, busy workers.
#[derive(Debug, Clone)]
struct Selection<'a> {
    have: Vec<u32>,
    chosen: Vec<bool>,
    used_workers: HashSet<&'a str>,
}

impl<'a> Selection<'a> {
    fn new(options: usize, intervals: usize) -> Self {
        Self {
            have: vec![0; intervals],
            chosen: vec![false; options],
            used_workers: HashSet::new(),
        }
    }

    /// Covered demand, counting each interval up to its need.
    fn met(&self, need: &[u32]) -> u32 {
        self.have.iter().zip(need).map(|(h, n)| (*h).min(*n)).sum()
    }

    fn cost(&self, options: &[ShiftOption]) -> f64 {
        options
            .iter()
            .zip(&self.chosen)
            .filter(|(_, c)| **c)
            .map(|(o, _)| o.cost)
            .sum()
    }

    fn set(&mut self, idx: usize, on: bool, covers: &[Vec<usize>]) {
        self.chosen[idx] = on;
        for &i in &covers[idx] {
            if on {
                self.have[i] += 1;
            } else {
                self.have[i] -= 1;
            }
        }
    }

    /// Adds the option with the lowest cost per short interval covered
    /// until none helps. Ties go to the cheaper option, then input order.
    fn fill(&mut self, options: &'a [ShiftOption], covers: &[Vec<usize>], need: &[u32]) {
        while self.have.iter().zip(need).any(|(h, n)| h < n) {
            let mut best: Option<(usize, f64)> = None;
            for (idx, o) in options.iter().enumerate() {
                if self.chosen[idx] || self.used_workers.contains(o.worker_id.as_str()) {
                    continue;
                }
                let gain = covers[idx]
                    .iter()
                    .filter(|&&i| self.have[i] < need[i])
                    .count();
                if gain == 0 {
                    continue;
                }
                let ratio = o.cost / gain as f64;
                let better = match best {
                    None => true,
                    Some((b, b_ratio)) => match ratio.partial_cmp(&b_ratio) {
                        Some(Ordering::Less) => true,
                        Some(Ordering::Equal) => o.cost < options[b].cost,
                        _ => false,
                    },
                };
                if better {
                    best = Some((idx, ratio));
                }
            }
            let Some((idx, _)) = best else {
                return;
            };
            self.set(idx, true, covers);
            self.used_workers.insert(options[idx].worker_id.as_str());
        }
    }

    /// Moves one busy worker to another of their options that covers a
    /// short interval, then refills. Returns the move covering the most
    /// demand, cheapest first, if it covers more than now.
    fn repaired(
        &self,
        options: &'a [ShiftOption],
        covers: &[Vec<usize>],
        need: &[u32],
    ) -> Option<Self> {
        let current = self.met(need);
        let mut best: Option<(Self, u32, f64)> = None;
        for from in (0..options.len()).filter(|&i| self.chosen[i]) {
            for to in 0..options.len() {
                if self.chosen[to]
                    || options[to].worker_id != options[from].worker_id
                    || !covers[to].iter().any(|&i| self.have[i] < need[i])
                {
                    continue;
                }
                let mut trial = self.clone();
                trial.set(from, false, covers);
                trial.set(to, true, covers);
                trial.fill(options, covers, need);
                let met = trial.met(need);
                if met <= current {
                    continue;
                }
                let cost = trial.cost(options);
                let better = match &best {
                    None => true,
                    Some((_, b_met, b_cost)) => met > *b_met || (met == *b_met && cost < *b_cost),
                };
                if better {
                    best = Some((trial, met, cost));
                }
            }
        }
        best.map(|(selection, _, _)| selection)
    }
}
