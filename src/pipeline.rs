//! Single planning path: problem → optional solve → evaluate → report.

use tracing::info;

use crate::data::Problem;
use crate::error::Result;
use crate::optimizer::{optimize, OptimizeOptions};
use crate::report::{PlanReport, PlanSource};
use crate::workforce::{evaluate, Plan};

/// Where the plan to evaluate comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanStage {
    /// Solve the model and evaluate the solver's plan.
    Optimize(OptimizeOptions),
    /// Evaluate this plan as given.
    Supplied(Plan),
    /// Evaluate the plan stored in the scenario, or an all-zero plan.
    FromScenario,
}

pub fn run(problem: &Problem, stage: PlanStage) -> Result<PlanReport> {
    let horizon = &problem.horizon;
    let params = &problem.params;

    match stage {
        PlanStage::Optimize(options) => {
            let optimized = optimize(horizon, params, options)?;
            Ok(PlanReport::new(
                &problem.name,
                PlanSource::Optimizer,
                horizon,
                optimized.plan.clone(),
                &optimized.result,
            )
            .with_solver(optimized.status, optimized.solver_objective))
        }
        PlanStage::Supplied(plan) => evaluate_supplied(problem, plan),
        PlanStage::FromScenario => {
            let plan = problem
                .plan
                .clone()
                .unwrap_or_else(|| Plan::zeros(horizon.len()));
            evaluate_supplied(problem, plan)
        }
    }
}

fn evaluate_supplied(problem: &Problem, plan: Plan) -> Result<PlanReport> {
    let result = evaluate(&problem.horizon, &problem.params, plan.as_slice())?;
    info!(
        scenario = %problem.name,
        feasible = result.verdict.feasible,
        total_cost = result.total_cost,
        "evaluated supplied plan"
    );
    Ok(PlanReport::new(
        &problem.name,
        PlanSource::Supplied,
        &problem.horizon,
        plan,
        &result,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Scenario;
    use crate::error::PlanError;

    fn published() -> Problem {
        Scenario::published().into_problem().unwrap()
    }

    #[test]
    fn scenario_without_plan_evaluates_zeros() {
        let report = run(&published(), PlanStage::FromScenario).unwrap();
        assert_eq!(report.plan, Plan::zeros(6));
        assert_eq!(report.source, PlanSource::Supplied);
        assert!(!report.feasible);
    }

    #[test]
    fn supplied_plan_shape_is_checked() {
        let err = run(&published(), PlanStage::Supplied(Plan::zeros(3))).unwrap_err();
        assert!(matches!(err, PlanError::InvalidPlanShape { expected: 6, actual: 3 }));
    }

    #[test]
    fn optimize_stage_reports_solver_fields() {
        let report = run(&published(), PlanStage::Optimize(OptimizeOptions::default())).unwrap();
        assert_eq!(report.source, PlanSource::Optimizer);
        assert!(report.feasible);
        assert!(report.solver_status.is_some());
        let objective = report.solver_objective.unwrap();
        assert!((objective - report.total_cost).abs() <= 1e-6 * report.total_cost);
    }
}
