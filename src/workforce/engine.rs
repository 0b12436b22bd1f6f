//! Forward simulation of the workforce for a given training plan.
//!
//! Every evaluation allocates a fresh trajectory; nothing is cached between
//! calls, so the engine can serve as an independent oracle for whatever the
//! optimizer produces.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlanError, Result};
use crate::workforce::horizon::Horizon;
use crate::workforce::params::Parameters;

/// Slack added to available hours before comparing against demand, absorbing
/// rounding noise in solver output.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Number of workers starting training in each period.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan(Vec<f64>);

impl Plan {
    pub fn new(trainees: Vec<f64>) -> Self {
        Self(trainees)
    }

    pub fn zeros(periods: usize) -> Self {
        Self(vec![0.0; periods])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn total_trainees(&self) -> f64 {
        self.0.iter().map(|value| value.max(0.0)).sum()
    }
}

impl From<Vec<f64>> for Plan {
    fn from(trainees: Vec<f64>) -> Self {
        Self(trainees)
    }
}

impl AsRef<[f64]> for Plan {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// Every derived per-period quantity for one plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    /// The plan after negative entries were replaced by zero.
    pub trainees: Vec<f64>,
    /// Workers who finished training last period; not yet subject to attrition.
    pub new_experienced: Vec<f64>,
    /// Previously experienced workers after attrition.
    pub old_experienced: Vec<f64>,
    pub experienced: Vec<f64>,
    pub available_hours: Vec<f64>,
    pub monthly_cost: Vec<f64>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.experienced.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experienced.is_empty()
    }

    pub fn total_cost(&self) -> f64 {
        self.monthly_cost.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeasibilityVerdict {
    pub per_period: Vec<bool>,
    pub feasible: bool,
}

impl FeasibilityVerdict {
    fn check(available_hours: &[f64], horizon: &Horizon) -> Self {
        let per_period: Vec<bool> = available_hours
            .iter()
            .zip(horizon.demand())
            .map(|(&hours, demand)| hours + FEASIBILITY_TOLERANCE >= demand)
            .collect();
        let feasible = per_period.iter().all(|&ok| ok);
        Self {
            per_period,
            feasible,
        }
    }

    /// Index of the first period whose demand is not met.
    pub fn first_shortfall(&self) -> Option<usize> {
        self.per_period.iter().position(|&ok| !ok)
    }

    pub fn shortfall_periods(&self) -> Vec<usize> {
        self.per_period
            .iter()
            .enumerate()
            .filter_map(|(index, &ok)| (!ok).then_some(index))
            .collect()
    }
}

/// Outcome of evaluating a plan: verdict, realized cost and the capacity
/// figures callers usually report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanResult {
    pub verdict: FeasibilityVerdict,
    pub total_cost: f64,
    /// The plan as replayed, with negative and NaN entries set to zero.
    pub trainees: Vec<f64>,
    pub available_hours: Vec<f64>,
    pub experienced: Vec<f64>,
    pub monthly_cost: Vec<f64>,
}

impl PlanResult {
    pub fn is_feasible(&self) -> bool {
        self.verdict.feasible
    }
}

/// Replays `plan` over the horizon and returns the full trajectory.
pub fn simulate(horizon: &Horizon, params: &Parameters, plan: &[f64]) -> Result<Trajectory> {
    let periods = horizon.len();
    if plan.len() != periods {
        return Err(PlanError::InvalidPlanShape {
            expected: periods,
            actual: plan.len(),
        });
    }

    // `f64::max` also maps NaN to zero.
    let trainees: Vec<f64> = plan.iter().map(|&value| value.max(0.0)).collect();

    let mut new_experienced = vec![0.0; periods];
    let mut old_experienced = vec![0.0; periods];
    old_experienced[0] = params.initial_experienced;
    for t in 1..periods {
        new_experienced[t] = trainees[t - 1];
        old_experienced[t] = params.retention() * old_experienced[t - 1] + new_experienced[t - 1];
    }

    let experienced: Vec<f64> = old_experienced
        .iter()
        .zip(&new_experienced)
        .map(|(old, new)| old + new)
        .collect();
    let available_hours = experienced
        .iter()
        .zip(&trainees)
        .map(|(workers, trainees)| {
            params.hours_per_experienced * workers - params.hours_lost_per_trainee * trainees
        })
        .collect();
    let monthly_cost = experienced
        .iter()
        .zip(&trainees)
        .map(|(workers, trainees)| {
            params.cost_per_experienced * workers + params.cost_per_trainee * trainees
        })
        .collect();

    Ok(Trajectory {
        trainees,
        new_experienced,
        old_experienced,
        experienced,
        available_hours,
        monthly_cost,
    })
}

/// Evaluates a plan: feasibility against demand and total cost.
pub fn evaluate(horizon: &Horizon, params: &Parameters, plan: &[f64]) -> Result<PlanResult> {
    let trajectory = simulate(horizon, params, plan)?;
    let verdict = FeasibilityVerdict::check(&trajectory.available_hours, horizon);
    let total_cost = trajectory.total_cost();
    debug!(
        periods = horizon.len(),
        feasible = verdict.feasible,
        total_cost,
        "evaluated plan"
    );
    Ok(PlanResult {
        verdict,
        total_cost,
        trainees: trajectory.trainees,
        available_hours: trajectory.available_hours,
        experienced: trajectory.experienced,
        monthly_cost: trajectory.monthly_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_period_horizon() -> Horizon {
        Horizon::from_demand(&["A", "B"], &[100.0, 100.0]).unwrap()
    }

    #[test]
    fn period_zero_uses_initial_workers_only() {
        let horizon = two_period_horizon();
        let trajectory = simulate(&horizon, &Parameters::PUBLISHED, &[4.0, 0.0]).unwrap();
        assert_eq!(trajectory.old_experienced[0], 60.0);
        assert_eq!(trajectory.new_experienced[0], 0.0);
        assert_eq!(trajectory.experienced[0], 60.0);
        assert_eq!(trajectory.available_hours[0], 150.0 * 60.0 - 100.0 * 4.0);
        assert_eq!(trajectory.monthly_cost[0], 3000.0 * 60.0 + 500.0 * 4.0);
    }

    #[test]
    fn trainees_join_next_period_without_attrition() {
        let horizon = two_period_horizon();
        let trajectory = simulate(&horizon, &Parameters::PUBLISHED, &[4.0, 0.0]).unwrap();
        assert_eq!(trajectory.new_experienced[1], 4.0);
        assert!((trajectory.old_experienced[1] - 54.0).abs() < 1e-12);
        assert!((trajectory.experienced[1] - 58.0).abs() < 1e-12);
    }

    #[test]
    fn nan_entries_are_treated_as_zero() {
        let horizon = two_period_horizon();
        let with_nan = simulate(&horizon, &Parameters::PUBLISHED, &[f64::NAN, 0.0]).unwrap();
        let zeros = simulate(&horizon, &Parameters::PUBLISHED, &[0.0, 0.0]).unwrap();
        assert_eq!(with_nan, zeros);
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let horizon = two_period_horizon();
        let err = evaluate(&horizon, &Parameters::PUBLISHED, &[0.0]).unwrap_err();
        assert_eq!(
            err,
            PlanError::InvalidPlanShape {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn tolerance_absorbs_rounding_below_demand() {
        let horizon = Horizon::from_demand(&["A"], &[9000.0]).unwrap();
        let params = Parameters {
            initial_experienced: 60.0 - 1e-9,
            ..Parameters::PUBLISHED
        };
        let result = evaluate(&horizon, &params, &[0.0]).unwrap();
        assert!(result.is_feasible());
    }

    #[test]
    fn result_carries_repaired_plan_and_monthly_cost() {
        let horizon = two_period_horizon();
        let result = evaluate(&horizon, &Parameters::PUBLISHED, &[-3.0, f64::NAN]).unwrap();
        assert_eq!(result.trainees, vec![0.0, 0.0]);
        assert_eq!(result.monthly_cost, vec![180_000.0, 162_000.0]);
        assert_eq!(result.total_cost, result.monthly_cost.iter().sum::<f64>());
    }

    #[test]
    fn verdict_lists_every_short_period() {
        let verdict = FeasibilityVerdict {
            per_period: vec![true, false, true, false],
            feasible: false,
        };
        assert_eq!(verdict.first_shortfall(), Some(1));
        assert_eq!(verdict.shortfall_periods(), vec![1, 3]);
    }
}
