use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{Scenario, ScenarioError, ValidationReport};
use crate::error::PlanError;
use crate::optimizer::ranking::RankedPlan;
use crate::optimizer::OptimizeOptions;
use crate::parallel::rank_batch;
use crate::pipeline::{run, PlanStage};
use crate::report::PlanReport;
use crate::workforce::Plan;

/// Upper bound on plans accepted by a single rank request.
pub const MAX_RANK_PLANS: usize = 10_000;

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluateRequest {
    /// Defaults to the published scenario.
    pub scenario: Option<Scenario>,
    /// Defaults to the scenario's own plan, then to all zeros.
    pub plan: Option<Plan>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptimizeRequest {
    pub scenario: Option<Scenario>,
    #[serde(default)]
    pub integer_trainees: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankRequest {
    pub scenario: Option<Scenario>,
    pub plans: Vec<Plan>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportResponse {
    pub status: &'static str,
    pub report: PlanReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankResponse {
    pub status: &'static str,
    pub scenario: String,
    pub ranking: Vec<RankedPlan>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub report: ValidationReport,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request body: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0}")]
    BadRequest(String),
    #[error("scenario failed validation")]
    Validation(ValidationReport),
    #[error(transparent)]
    Plan(#[from] PlanError),
}

impl From<ScenarioError> for ApiError {
    fn from(err: ScenarioError) -> Self {
        match err {
            ScenarioError::Validation(report) => Self::Validation(report),
            ScenarioError::Invalid(err) => Self::Plan(err),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "staffing-api",
        "version": env!("CARGO_PKG_VERSION"),
        "time": chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }))
}

pub fn scenario_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&Scenario::published())
}

pub fn evaluate_payload(body: &str) -> Result<String, ApiError> {
    let request: EvaluateRequest = serde_json::from_str(body)?;
    let problem = request.scenario.unwrap_or_default().into_problem()?;
    let stage = match request.plan {
        Some(plan) => PlanStage::Supplied(plan),
        None => PlanStage::FromScenario,
    };
    let report = run(&problem, stage)?;
    Ok(serde_json::to_string_pretty(&ReportResponse {
        status: "ok",
        report,
    })?)
}

pub fn optimize_payload(body: &str) -> Result<String, ApiError> {
    let request: OptimizeRequest = if body.trim().is_empty() {
        OptimizeRequest {
            scenario: None,
            integer_trainees: false,
        }
    } else {
        serde_json::from_str(body)?
    };
    let problem = request.scenario.unwrap_or_default().into_problem()?;
    let options = OptimizeOptions {
        integer_trainees: request.integer_trainees,
    };
    let report = run(&problem, PlanStage::Optimize(options))?;
    Ok(serde_json::to_string_pretty(&ReportResponse {
        status: "ok",
        report,
    })?)
}

pub fn rank_payload(body: &str) -> Result<String, ApiError> {
    let request: RankRequest = serde_json::from_str(body)?;
    if request.plans.is_empty() {
        return Err(ApiError::BadRequest("plans must not be empty".to_string()));
    }
    if request.plans.len() > MAX_RANK_PLANS {
        return Err(ApiError::BadRequest(format!(
            "at most {MAX_RANK_PLANS} plans per request"
        )));
    }
    let problem = request.scenario.unwrap_or_default().into_problem()?;
    let ranking = rank_batch(&problem.horizon, &problem.params, request.plans)?;
    Ok(serde_json::to_string_pretty(&RankResponse {
        status: "ok",
        scenario: problem.name,
        ranking,
    })?)
}
