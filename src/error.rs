//! Error types shared by the dynamics engine and the optimizer.

use thiserror::Error;

use crate::optimizer::backend::SolveStatus;

pub type Result<T> = std::result::Result<T, PlanError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// Plan length does not match the horizon. Never padded or truncated.
    #[error("plan has {actual} entries but the horizon has {expected} periods")]
    InvalidPlanShape { expected: usize, actual: usize },

    #[error("invalid horizon: {0}")]
    InvalidHorizon(String),

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The solver returned a status without a usable assignment.
    #[error("solver reported {status}{}", format_detail(.detail))]
    SolverFailure {
        status: SolveStatus,
        detail: Option<String>,
    },
}

fn format_detail(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|detail| format!(": {detail}"))
        .unwrap_or_default()
}
