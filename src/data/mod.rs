pub mod scenario;
pub mod validate;

pub use scenario::{load_scenario, resolve_scenario, Problem, Scenario, ScenarioError, SCENARIO_ENV};
pub use validate::{validate_scenario, ValidationDiagnostic, ValidationReport, ValidationSeverity};
