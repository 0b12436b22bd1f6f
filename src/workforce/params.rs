use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};

/// Economic and productivity constants for one planning run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// Hours one experienced worker supplies per period.
    pub hours_per_experienced: f64,
    /// Hours lost per trainee in the period they train.
    pub hours_lost_per_trainee: f64,
    pub cost_per_experienced: f64,
    pub cost_per_trainee: f64,
    /// Fraction of previously experienced workers that leave each period.
    pub attrition_rate: f64,
    pub initial_experienced: f64,
}

impl Parameters {
    /// The reference cabin-crew instance.
    pub const PUBLISHED: Parameters = Parameters {
        hours_per_experienced: 150.0,
        hours_lost_per_trainee: 100.0,
        cost_per_experienced: 3000.0,
        cost_per_trainee: 500.0,
        attrition_rate: 0.10,
        initial_experienced: 60.0,
    };

    pub fn validate(&self) -> Result<()> {
        let scalars = [
            ("hours_per_experienced", self.hours_per_experienced),
            ("hours_lost_per_trainee", self.hours_lost_per_trainee),
            ("cost_per_experienced", self.cost_per_experienced),
            ("cost_per_trainee", self.cost_per_trainee),
            ("attrition_rate", self.attrition_rate),
            ("initial_experienced", self.initial_experienced),
        ];
        for (name, value) in scalars {
            if !value.is_finite() || value < 0.0 {
                return Err(PlanError::InvalidParameters(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.attrition_rate >= 1.0 {
            return Err(PlanError::InvalidParameters(format!(
                "attrition_rate must be below 1, got {}",
                self.attrition_rate
            )));
        }
        Ok(())
    }

    /// Share of experienced workers that stay from one period to the next.
    pub fn retention(&self) -> f64 {
        1.0 - self.attrition_rate
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self::PUBLISHED
    }
}
