//! Period-ordered view of an evaluated plan for tables, CSV and JSON.

pub mod export_csv;

use std::fmt::Write as _;

use serde::Serialize;

use crate::optimizer::backend::SolveStatus;
use crate::workforce::{Horizon, Plan, PlanResult};

pub use export_csv::{export_report_csv, write_report_csv, ExportError};

/// Where the evaluated plan came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    Optimizer,
    Supplied,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodRow {
    pub label: String,
    pub demand: f64,
    pub trainees: f64,
    pub experienced: f64,
    pub available_hours: f64,
    /// Available hours minus demand; negative when the period is short.
    pub surplus: f64,
    pub monthly_cost: f64,
    pub feasible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanReport {
    pub scenario: String,
    pub source: PlanSource,
    /// The plan as replayed by the engine.
    pub plan: Plan,
    /// The plan as given, when repair changed it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_plan: Option<Plan>,
    pub feasible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_short_period: Option<String>,
    pub total_cost: f64,
    pub periods: Vec<PeriodRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver_status: Option<SolveStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver_objective: Option<f64>,
}

impl PlanReport {
    /// Combines a plan and its evaluation into per-period rows.
    ///
    /// `result` must come from evaluating `requested` over `horizon`; every
    /// figure is read from it.
    pub fn new(
        scenario: impl Into<String>,
        source: PlanSource,
        horizon: &Horizon,
        requested: Plan,
        result: &PlanResult,
    ) -> Self {
        let periods = horizon
            .periods()
            .iter()
            .enumerate()
            .map(|(t, period)| PeriodRow {
                label: period.label.clone(),
                demand: period.demand,
                trainees: result.trainees[t],
                experienced: result.experienced[t],
                available_hours: result.available_hours[t],
                surplus: result.available_hours[t] - period.demand,
                monthly_cost: result.monthly_cost[t],
                feasible: result.verdict.per_period[t],
            })
            .collect();

        let plan = Plan::new(result.trainees.clone());
        let requested_plan = (requested != plan).then_some(requested);

        let first_short_period = result
            .verdict
            .first_shortfall()
            .and_then(|t| horizon.label(t))
            .map(str::to_string);

        Self {
            scenario: scenario.into(),
            source,
            plan,
            requested_plan,
            feasible: result.verdict.feasible,
            first_short_period,
            total_cost: result.total_cost,
            periods,
            solver_status: None,
            solver_objective: None,
        }
    }

    pub fn with_solver(mut self, status: SolveStatus, objective: f64) -> Self {
        self.solver_status = Some(status);
        self.solver_objective = Some(objective);
        self
    }
}

/// Tab-separated table with one row per period and a summary line.
pub fn render_table(report: &PlanReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "period\tdemand\ttrainees\texperienced\tavailable_hours\tsurplus\tmonthly_cost\tfeasible"
    );
    for row in &report.periods {
        let _ = writeln!(
            out,
            "{}\t{:.2}\t{:.4}\t{:.4}\t{:.2}\t{:.2}\t{:.2}\t{}",
            row.label,
            row.demand,
            row.trainees,
            row.experienced,
            row.available_hours,
            row.surplus,
            row.monthly_cost,
            if row.feasible { "yes" } else { "NO" }
        );
    }
    let _ = write!(
        out,
        "total_cost\t{:.2}\tfeasible\t{}",
        report.total_cost, report.feasible
    );
    if let Some(label) = &report.first_short_period {
        let _ = write!(out, "\tfirst_short\t{label}");
    }
    out.push('\n');
    out
}
