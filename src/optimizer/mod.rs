pub mod backend;
pub mod model;
pub mod ranking;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{PlanError, Result};
use crate::optimizer::backend::{GoodLpBackend, LpBackend, SolveStatus};
use crate::optimizer::model::{formulate, FormulationOptions};
use crate::workforce::{evaluate, Horizon, Parameters, Plan, PlanResult};

/// Negative solver values closer to zero than this are treated as zero.
pub const ZERO_SNAP_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizeOptions {
    /// Solve with whole-worker training starts instead of the LP relaxation.
    pub integer_trainees: bool,
}

impl From<OptimizeOptions> for FormulationOptions {
    fn from(options: OptimizeOptions) -> Self {
        Self {
            integer_trainees: options.integer_trainees,
        }
    }
}

/// Raw solver outcome before replay through the dynamics engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub plan: Option<Plan>,
    /// Objective value as computed from the solver's assignment.
    pub objective: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// A solver plan together with the engine's independent evaluation of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizedPlan {
    pub status: SolveStatus,
    pub plan: Plan,
    pub solver_objective: f64,
    /// Authoritative verdict and cost.
    pub result: PlanResult,
}

impl OptimizedPlan {
    /// Gap between the solver objective and the replayed cost.
    pub fn objective_gap(&self) -> f64 {
        (self.solver_objective - self.result.total_cost).abs()
    }
}

/// Removes sign noise around zero; anything outside the band is kept as is.
pub fn snap_noise(value: f64) -> f64 {
    if value < 0.0 && value > -ZERO_SNAP_TOLERANCE {
        0.0
    } else {
        value
    }
}

/// Builds and solves the model on `backend`, extracting a plan when the
/// status allows it.
pub fn solve_with<B: LpBackend>(
    backend: &mut B,
    horizon: &Horizon,
    params: &Parameters,
    options: OptimizeOptions,
) -> SolveOutcome {
    let formulation = formulate(backend, horizon, params, options.into());
    let status = backend.optimize();
    debug!(%status, periods = horizon.len(), "solver finished");

    if !status.has_solution() {
        return SolveOutcome {
            status,
            plan: None,
            objective: None,
            detail: backend.detail(),
        };
    }

    let extracted: Option<Vec<f64>> = formulation
        .trainees
        .iter()
        .map(|&var| backend.value_of(var))
        .collect();
    let Some(raw) = extracted else {
        return SolveOutcome {
            status: SolveStatus::Error,
            plan: None,
            objective: None,
            detail: Some(format!("solver reported {status} without an assignment")),
        };
    };

    let trainees: Vec<f64> = raw
        .into_iter()
        .enumerate()
        .map(|(t, value)| {
            let snapped = snap_noise(value);
            if snapped < 0.0 {
                warn!(period = t, value = snapped, "solver returned a negative training value");
            }
            snapped
        })
        .collect();
    let objective = formulation
        .objective
        .evaluate(|var| backend.value_of(var).unwrap_or(0.0));

    SolveOutcome {
        status,
        plan: Some(Plan::new(trainees)),
        objective: Some(objective),
        detail: backend.detail(),
    }
}

/// Solves with the default `good_lp` backend.
pub fn solve(horizon: &Horizon, params: &Parameters, options: OptimizeOptions) -> SolveOutcome {
    solve_with(&mut GoodLpBackend::new(), horizon, params, options)
}

/// Solves on `backend` and replays the plan through the dynamics engine.
pub fn optimize_with<B: LpBackend>(
    backend: &mut B,
    horizon: &Horizon,
    params: &Parameters,
    options: OptimizeOptions,
) -> Result<OptimizedPlan> {
    let outcome = solve_with(backend, horizon, params, options);
    let (Some(plan), Some(solver_objective)) = (outcome.plan, outcome.objective) else {
        return Err(PlanError::SolverFailure {
            status: outcome.status,
            detail: outcome.detail,
        });
    };

    let result = evaluate(horizon, params, plan.as_slice())?;
    let optimized = OptimizedPlan {
        status: outcome.status,
        plan,
        solver_objective,
        result,
    };
    if !optimized.result.is_feasible() {
        warn!(
            first_shortfall = ?optimized.result.verdict.first_shortfall(),
            "solver plan fails replay"
        );
    }
    info!(
        status = %optimized.status,
        total_cost = optimized.result.total_cost,
        objective_gap = optimized.objective_gap(),
        "optimized training plan"
    );
    Ok(optimized)
}

pub fn optimize(
    horizon: &Horizon,
    params: &Parameters,
    options: OptimizeOptions,
) -> Result<OptimizedPlan> {
    optimize_with(&mut GoodLpBackend::new(), horizon, params, options)
}
