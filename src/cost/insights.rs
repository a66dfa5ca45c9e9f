//! Savings opportunities, recommendations and ROI projection.
//!
//! Findings are derived from fixed thresholds and always come out in the
//! same order: overtime, over-coverage, cost concentration, skill mix.

use serde::{Deserialize, Serialize};

use super::evaluator::FinancialImpact;
use crate::config::InsightThresholds;

/// Category of a savings finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityKind {
    OvertimeReduction,
    OverCoverage,
    CostConcentration,
    SkillMixImbalance,
}

/// One savings finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsOpportunity {
    pub kind: OpportunityKind,
    pub description: String,
    /// Estimated saving per plan; 0 for risk findings.
    pub estimated_savings: f64,
}

/// Projected effect of acting on every opportunity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoiProjection {
    pub current_cost: f64,
    pub projected_cost: f64,
    pub projected_savings: f64,
    /// `projected_savings / current_cost × 100`.
    pub savings_percentage: f64,
    /// `projected_savings × annualization_factor`.
    pub annualized_savings: f64,
}

/// Derives savings opportunities from an evaluated plan.
pub(crate) fn savings_opportunities(
    impact: &FinancialImpact,
    skill_hours: &[(String, f64)],
    surplus_hours: f64,
    overtime_multiplier: f64,
    thresholds: &InsightThresholds,
) -> Vec<SavingsOpportunity> {
    let mut out = Vec::new();
    let hours = impact.total_hours();
    let average_rate = if hours > 0.0 {
        (impact.total_regular_cost + impact.total_overtime_cost / overtime_multiplier) / hours
    } else {
        0.0
    };

    let overtime_share = if hours > 0.0 {
        impact.overtime_hours / hours
    } else {
        0.0
    };
    if overtime_share > thresholds.overtime_share {
        let premium_paid = impact.total_overtime_cost * (1.0 - 1.0 / overtime_multiplier);
        out.push(SavingsOpportunity {
            kind: OpportunityKind::OvertimeReduction,
            description: format!(
                "Overtime is {:.1}% of hours worked ({:.1}h); covering it with regular shifts saves the overtime premium",
                overtime_share * 100.0,
                impact.overtime_hours
            ),
            estimated_savings: premium_paid,
        });
    }

    if surplus_hours > 0.0 {
        out.push(SavingsOpportunity {
            kind: OpportunityKind::OverCoverage,
            description: format!(
                "{surplus_hours:.1} staffed hours exceed the per-interval requirement"
            ),
            estimated_savings: surplus_hours * average_rate,
        });
    }

    let mut worker_costs: Vec<(&str, f64)> = Vec::new();
    for b in &impact.breakdowns {
        match worker_costs.iter_mut().find(|(id, _)| *id == b.agent_id) {
            Some(entry) => entry.1 += b.total_cost,
            None => worker_costs.push((b.agent_id.as_str(), b.total_cost)),
        }
    }
    if worker_costs.len() >= thresholds.concentration_min_workers && impact.total_cost > 0.0 {
        // First worker wins ties, keeping the output stable.
        let (top_id, top_cost) = worker_costs
            .iter()
            .fold(worker_costs[0], |best, &w| if w.1 > best.1 { w } else { best });
        let share = top_cost / impact.total_cost;
        if share > thresholds.cost_concentration_share {
            out.push(SavingsOpportunity {
                kind: OpportunityKind::CostConcentration,
                description: format!(
                    "Worker '{top_id}' accounts for {:.1}% of labor cost; spread hours across the pool",
                    share * 100.0
                ),
                estimated_savings: 0.0,
            });
        }
    }

    let skill_total: f64 = skill_hours.iter().map(|(_, h)| h).sum();
    if skill_hours.len() >= 2 && skill_total > 0.0 {
        let (skill, top) = skill_hours
            .iter()
            .fold(&skill_hours[0], |best, s| if s.1 > best.1 { s } else { best });
        let share = top / skill_total;
        if share > thresholds.skill_imbalance_share {
            out.push(SavingsOpportunity {
                kind: OpportunityKind::SkillMixImbalance,
                description: format!(
                    "Skill '{skill}' carries {:.1}% of skilled hours; cross-train to balance the mix",
                    share * 100.0
                ),
                estimated_savings: 0.0,
            });
        }
    }

    out
}

/// Turns opportunities into recommendation sentences.
pub(crate) fn recommendations(
    impact: &FinancialImpact,
    opportunities: &[SavingsOpportunity],
) -> Vec<String> {
    let mut out: Vec<String> = opportunities
        .iter()
        .map(|o| match o.kind {
            OpportunityKind::OvertimeReduction => format!(
                "Add regular shifts to absorb overtime (est. saving {:.2} per plan).",
                o.estimated_savings
            ),
            OpportunityKind::OverCoverage => format!(
                "Trim or shift staffing in over-covered intervals (est. saving {:.2} per plan).",
                o.estimated_savings
            ),
            OpportunityKind::CostConcentration => {
                "Rebalance hours so no single worker dominates labor cost.".to_string()
            }
            OpportunityKind::SkillMixImbalance => {
                "Cross-train staff to reduce dependence on a single skill.".to_string()
            }
        })
        .collect();
    if !impact.under_covered_intervals.is_empty() {
        out.push(format!(
            "Close coverage gaps in {} interval(s): {}.",
            impact.under_covered_intervals.len(),
            impact.under_covered_intervals.join(", ")
        ));
    }
    if !impact.record_errors.is_empty() {
        out.push(format!(
            "Fix {} rejected shift record(s) and re-evaluate.",
            impact.record_errors.len()
        ));
    }
    if out.is_empty() {
        out.push("Plan is within all cost thresholds; no changes recommended.".to_string());
    }
    out
}

/// Projects savings from acting on every opportunity.
pub(crate) fn roi_projection(
    current_cost: f64,
    opportunities: &[SavingsOpportunity],
    annualization_factor: f64,
) -> RoiProjection {
    let savings: f64 = opportunities.iter().map(|o| o.estimated_savings).sum();
    let projected_savings = savings.clamp(0.0, current_cost.max(0.0));
    RoiProjection {
        current_cost,
        projected_cost: current_cost - projected_savings,
        projected_savings,
        savings_percentage: if current_cost > 0.0 {
            projected_savings / current_cost * 100.0
        } else {
            0.0
        },
        annualized_savings: projected_savings * annualization_factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CostConfig;
    use crate::cost::CostEvaluator;
    use crate::models::{IntervalMap, ShiftRecord, StaffingPlan, TimeWindow};
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()
    }

    fn hourly(from: u32, to: u32, need: f64) -> IntervalMap {
        IntervalMap::from_pairs((from..to).map(|h| (format!("{h:02}:00"), need))).unwrap()
    }

    #[test]
    fn test_overtime_finding() {
        // Two 12h shifts: 8 of 24 hours are overtime
        let plan = StaffingPlan::new()
            .with_record(ShiftRecord::new("A", date(), TimeWindow::new(360, 1080)).with_rate(20.0))
            .with_record(ShiftRecord::new("B", date(), TimeWindow::new(360, 1080)).with_rate(20.0));
        let impact = CostEvaluator::default()
            .evaluate(&plan, &hourly(6, 18, 2.0), None)
            .unwrap();
        let ot = &impact.savings_opportunities[0];
        assert_eq!(ot.kind, OpportunityKind::OvertimeReduction);
        // Premium portion of 8h × 30 = 240 is 80
        assert!((ot.estimated_savings - 80.0).abs() < 1e-9);
        assert!(impact.optimization_recommendations[0].contains("overtime"));
        assert!((impact.roi.projected_savings - 80.0).abs() < 1e-9);
        assert!((impact.roi.annualized_savings - 80.0 * 52.0).abs() < 1e-6);
    }

    #[test]
    fn test_over_coverage_finding() {
        let plan = StaffingPlan::new()
            .with_record(ShiftRecord::new("A", date(), TimeWindow::new(480, 960)).with_rate(20.0))
            .with_record(ShiftRecord::new("B", date(), TimeWindow::new(480, 960)).with_rate(20.0));
        let impact = CostEvaluator::default()
            .evaluate(&plan, &hourly(8, 16, 1.0), None)
            .unwrap();
        assert_eq!(impact.savings_opportunities.len(), 1);
        let o = &impact.savings_opportunities[0];
        assert_eq!(o.kind, OpportunityKind::OverCoverage);
        // 8 surplus hours at 20
        assert!((o.estimated_savings - 160.0).abs() < 1e-9);
        assert!((impact.roi.savings_percentage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_concentration_and_skill_mix() {
        let mut plan = StaffingPlan::new().with_record(
            ShiftRecord::new("Big", date(), TimeWindow::new(480, 960))
                .with_rate(80.0)
                .with_skills(vec!["voice".into()]),
        );
        for id in ["s1", "s2", "s3"] {
            plan.add_record(
                ShiftRecord::new(id, date(), TimeWindow::new(480, 960))
                    .with_rate(15.0)
                    .with_skills(vec!["voice".into()]),
            );
        }
        plan.add_record(
            ShiftRecord::new("e1", date(), TimeWindow::new(480, 600))
                .with_rate(15.0)
                .with_skills(vec!["email".into()]),
        );
        let impact = CostEvaluator::default()
            .evaluate(&plan, &hourly(8, 16, 5.0), None)
            .unwrap();
        let kinds: Vec<OpportunityKind> =
            impact.savings_opportunities.iter().map(|o| o.kind).collect();
        assert_eq!(
            kinds,
            vec![OpportunityKind::CostConcentration, OpportunityKind::SkillMixImbalance]
        );
        assert!(impact.savings_opportunities[0].description.contains("'Big'"));
    }

    #[test]
    fn test_clean_plan_recommendation() {
        let plan = StaffingPlan::new()
            .with_record(ShiftRecord::new("A", date(), TimeWindow::new(480, 960)).with_rate(20.0));
        let impact = CostEvaluator::new(CostConfig::default())
            .evaluate(&plan, &hourly(8, 16, 1.0), None)
            .unwrap();
        assert!(impact.savings_opportunities.is_empty());
        assert_eq!(impact.optimization_recommendations.len(), 1);
        assert!(impact.optimization_recommendations[0].contains("no changes"));
        assert_eq!(impact.roi.projected_savings, 0.0);
    }

    #[test]
    fn test_roi_never_exceeds_cost() {
        let opportunities = vec![SavingsOpportunity {
            kind: OpportunityKind::OverCoverage,
            description: String::new(),
            estimated_savings: 500.0,
        }];
        let roi = roi_projection(300.0, &opportunities, 52.0);
        assert_eq!(roi.projected_savings, 300.0);
        assert_eq!(roi.projected_cost, 0.0);
        assert!((roi.savings_percentage - 100.0).abs() < 1e-12);
    }
}
