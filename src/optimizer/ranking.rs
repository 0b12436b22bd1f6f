use serde::Serialize;

use crate::workforce::{Plan, PlanResult};

#[derive(Debug, Clone, Serialize)]
pub struct RankedPlan {
    /// Position of the plan in the caller's input.
    pub index: usize,
    pub plan: Plan,
    pub feasible: bool,
    pub total_cost: f64,
    pub total_trainees: f64,
    pub short_periods: usize,
}

/// Orders evaluated plans: feasible first, then fewest short periods, then
/// by cost, then by fewest trainees, then by input order.
pub fn rank_plans(evaluated: Vec<(Plan, PlanResult)>) -> Vec<RankedPlan> {
    let mut ranked: Vec<RankedPlan> = evaluated
        .into_iter()
        .enumerate()
        .map(|(index, (plan, result))| RankedPlan {
            index,
            total_trainees: plan.total_trainees(),
            short_periods: result.verdict.shortfall_periods().len(),
            feasible: result.verdict.feasible,
            total_cost: result.total_cost,
            plan,
        })
        .collect();

    ranked.sort_by(|left, right| {
        right
            .feasible
            .cmp(&left.feasible)
            .then_with(|| left.short_periods.cmp(&right.short_periods))
            .then_with(|| left.total_cost.total_cmp(&right.total_cost))
            .then_with(|| left.total_trainees.total_cmp(&right.total_trainees))
            .then_with(|| left.index.cmp(&right.index))
    });

    ranked
}
