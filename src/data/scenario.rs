//! Scenario files: a horizon, its parameters and optionally a plan to test.
//! YAML by default; `.json` files are read as JSON.

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn, Level};

use crate::data::validate::{validate_scenario, ValidationDiagnostic, ValidationReport};
use crate::error::PlanError;
use crate::workforce::{Horizon, Parameters, Period, Plan};

/// Environment variable naming the scenario file used when none is given.
pub const SCENARIO_ENV: &str = "STAFFING_SCENARIO";

pub const PUBLISHED_LABELS: [&str; 6] = ["Jan", "Feb", "Mrt", "Apr", "Mei", "Jun"];
pub const PUBLISHED_DEMAND: [f64; 6] = [8000.0, 9000.0, 7000.0, 10000.0, 9000.0, 8000.0];

/// Unvalidated scenario as written on disk or sent over the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_name")]
    pub name: String,
    pub periods: Vec<Period>,
    pub parameters: Parameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
}

fn default_name() -> String {
    "unnamed".to_string()
}

/// A validated scenario ready for the engine and optimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub name: String,
    pub horizon: Horizon,
    pub params: Parameters,
    pub plan: Option<Plan>,
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("unable to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unable to parse json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("scenario failed validation with {} error(s)", .0.error_count())]
    Validation(ValidationReport),
    #[error(transparent)]
    Invalid(#[from] PlanError),
}

impl Scenario {
    /// The reference cabin-crew instance: six months, 60 experienced workers.
    pub fn published() -> Self {
        Self {
            name: "published".to_string(),
            periods: PUBLISHED_LABELS
                .iter()
                .zip(PUBLISHED_DEMAND)
                .map(|(label, demand)| Period::new(*label, demand))
                .collect(),
            parameters: Parameters::PUBLISHED,
            plan: None,
        }
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ScenarioError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Validates and converts into engine types. Warnings are logged, errors
    /// reject the scenario.
    pub fn into_problem(self) -> Result<Problem, ScenarioError> {
        let report = validate_scenario(&self);
        if report.has_errors() {
            return Err(ScenarioError::Validation(report));
        }
        for diagnostic in &report.diagnostics {
            log_diagnostic(&self.name, diagnostic);
        }
        let horizon = Horizon::new(self.periods)?;
        self.parameters.validate()?;
        Ok(Problem {
            name: self.name,
            horizon,
            params: self.parameters,
            plan: self.plan,
        })
    }
}

fn log_diagnostic(scenario: &str, diagnostic: &ValidationDiagnostic) {
    let context = diagnostic.context.as_str();
    let message = diagnostic.message.as_str();
    let level = diagnostic.severity.log_level();
    if level == Level::ERROR {
        error!(scenario, context, "{message}");
    } else if level == Level::WARN {
        warn!(scenario, context, "{message}");
    } else {
        info!(scenario, context, "{message}");
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::published()
    }
}

pub fn load_scenario(path: impl AsRef<Path>) -> Result<Scenario, ScenarioError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let is_json = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
    let scenario = if is_json {
        Scenario::from_json(&raw)?
    } else {
        Scenario::from_yaml(&raw)?
    };
    info!(path = %path.display(), name = %scenario.name, periods = scenario.periods.len(), "loaded scenario");
    Ok(scenario)
}

/// Scenario from `path`, else from `STAFFING_SCENARIO`, else the published one.
pub fn resolve_scenario(path: Option<&Path>) -> Result<Scenario, ScenarioError> {
    if let Some(path) = path {
        return load_scenario(path);
    }
    match env::var(SCENARIO_ENV) {
        Ok(from_env) if !from_env.trim().is_empty() => load_scenario(from_env.trim()),
        _ => Ok(Scenario::published()),
    }
}
