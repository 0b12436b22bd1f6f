use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};

/// One planning period (a month) and the work hours it requires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub label: String,
    pub demand: f64,
}

impl Period {
    pub fn new(label: impl Into<String>, demand: f64) -> Self {
        Self {
            label: label.into(),
            demand,
        }
    }
}

/// Ordered, non-empty list of periods. Fixed for the lifetime of a problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Horizon {
    periods: Vec<Period>,
}

impl Horizon {
    pub fn new(periods: Vec<Period>) -> Result<Self> {
        if periods.is_empty() {
            return Err(PlanError::InvalidHorizon(
                "horizon must contain at least one period".to_string(),
            ));
        }
        if let Some(period) = periods
            .iter()
            .find(|period| !period.demand.is_finite() || period.demand < 0.0)
        {
            return Err(PlanError::InvalidHorizon(format!(
                "demand for '{}' must be a non-negative number, got {}",
                period.label, period.demand
            )));
        }
        Ok(Self { periods })
    }

    /// Builds a horizon from parallel label/demand slices.
    pub fn from_demand<S: AsRef<str>>(labels: &[S], demand: &[f64]) -> Result<Self> {
        if labels.len() != demand.len() {
            return Err(PlanError::InvalidHorizon(format!(
                "{} labels for {} demand values",
                labels.len(),
                demand.len()
            )));
        }
        Self::new(
            labels
                .iter()
                .zip(demand)
                .map(|(label, &hours)| Period::new(label.as_ref(), hours))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Always false for a constructed horizon; kept for the `len` convention.
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn demand(&self) -> impl Iterator<Item = f64> + '_ {
        self.periods.iter().map(|period| period.demand)
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.periods.get(index).map(|period| period.label.as_str())
    }
}

impl<'de> Deserialize<'de> for Horizon {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let periods = Vec::<Period>::deserialize(deserializer)?;
        Horizon::new(periods).map_err(serde::de::Error::custom)
    }
}
