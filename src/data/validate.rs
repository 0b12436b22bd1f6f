use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::Level;

use crate::data::scenario::Scenario;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    /// Level at which an accepted scenario's diagnostic is logged.
    pub fn log_level(self) -> Level {
        match self {
            Self::Error => Level::ERROR,
            Self::Warning => Level::WARN,
            Self::Info => Level::INFO,
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.count(ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

fn check_non_negative(report: &mut ValidationReport, context: &str, value: f64) {
    if !value.is_finite() {
        report.push(ValidationSeverity::Error, context, format!("must be finite, got {value}"));
    } else if value < 0.0 {
        report.push(
            ValidationSeverity::Error,
            context,
            format!("must be non-negative, got {value}"),
        );
    }
}

/// Checks a scenario without building engine types, collecting every issue.
pub fn validate_scenario(scenario: &Scenario) -> ValidationReport {
    let mut report = ValidationReport::default();

    if scenario.periods.is_empty() {
        report.push(
            ValidationSeverity::Error,
            "periods",
            "horizon must contain at least one period",
        );
    }

    let mut seen_labels = HashSet::new();
    for (index, period) in scenario.periods.iter().enumerate() {
        let context = format!("periods[{index}]");
        check_non_negative(&mut report, &format!("{context}.demand"), period.demand);
        if period.label.trim().is_empty() {
            report.push(ValidationSeverity::Warning, &context, "label is empty");
        } else if !seen_labels.insert(period.label.as_str()) {
            report.push(
                ValidationSeverity::Warning,
                &context,
                format!("duplicate label '{}'", period.label),
            );
        }
    }

    let params = &scenario.parameters;
    for (name, value) in [
        ("hours_per_experienced", params.hours_per_experienced),
        ("hours_lost_per_trainee", params.hours_lost_per_trainee),
        ("cost_per_experienced", params.cost_per_experienced),
        ("cost_per_trainee", params.cost_per_trainee),
        ("attrition_rate", params.attrition_rate),
        ("initial_experienced", params.initial_experienced),
    ] {
        check_non_negative(&mut report, &format!("parameters.{name}"), value);
    }
    if params.attrition_rate >= 1.0 {
        report.push(
            ValidationSeverity::Error,
            "parameters.attrition_rate",
            format!("must be below 1, got {}", params.attrition_rate),
        );
    } else if params.attrition_rate == 0.0 {
        report.push(
            ValidationSeverity::Info,
            "parameters.attrition_rate",
            "no attrition: experienced workers never leave",
        );
    }

    if let Some(plan) = &scenario.plan {
        let values = plan.as_slice();
        if values.len() != scenario.periods.len() {
            report.push(
                ValidationSeverity::Error,
                "plan",
                format!(
                    "has {} entries but the horizon has {} periods",
                    values.len(),
                    scenario.periods.len()
                ),
            );
        }
        for (index, &value) in values.iter().enumerate() {
            if value.is_nan() || value < 0.0 {
                report.push(
                    ValidationSeverity::Warning,
                    format!("plan[{index}]"),
                    format!("{value} will be treated as 0"),
                );
            }
        }
        if values.len() == scenario.periods.len() && values.last().is_some_and(|&v| v > 0.0) {
            report.push(
                ValidationSeverity::Warning,
                format!("plan[{}]", values.len() - 1),
                "training in the final period adds cost without adding capacity",
            );
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workforce::{Period, Plan};

    #[test]
    fn published_scenario_is_clean() {
        assert!(validate_scenario(&Scenario::published()).is_clean());
    }

    #[test]
    fn collects_every_error() {
        let mut scenario = Scenario::published();
        scenario.periods[2].demand = -5.0;
        scenario.parameters.cost_per_trainee = f64::NAN;
        scenario.parameters.attrition_rate = 1.0;
        scenario.plan = Some(Plan::new(vec![0.0; 4]));

        let report = validate_scenario(&scenario);
        assert_eq!(report.error_count(), 4);
        let contexts: Vec<&str> = report.diagnostics.iter().map(|d| d.context.as_str()).collect();
        assert!(contexts.contains(&"periods[2].demand"));
        assert!(contexts.contains(&"parameters.cost_per_trainee"));
        assert!(contexts.contains(&"parameters.attrition_rate"));
        assert!(contexts.contains(&"plan"));
    }

    #[test]
    fn warns_about_repairs_and_dominated_training() {
        let mut scenario = Scenario::published();
        scenario.periods.push(Period::new("Jan", 100.0));
        scenario.plan = Some(Plan::new(vec![-1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 2.0]));

        let report = validate_scenario(&scenario);
        assert!(!report.has_errors());
        assert_eq!(report.count(ValidationSeverity::Warning), 3);
    }

    #[test]
    fn empty_horizon_is_an_error() {
        let mut scenario = Scenario::published();
        scenario.periods.clear();
        assert!(validate_scenario(&scenario).has_errors());
    }

    #[test]
    fn zero_attrition_is_informational() {
        let mut scenario = Scenario::published();
        scenario.parameters.attrition_rate = 0.0;
        let report = validate_scenario(&scenario);
        assert!(!report.has_errors());
        assert_eq!(report.count(ValidationSeverity::Info), 1);
    }
}
