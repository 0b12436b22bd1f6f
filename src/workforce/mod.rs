//! Workforce dynamics: horizon, parameters and the forward-simulation engine.

pub mod engine;
pub mod horizon;
pub mod params;

pub use engine::{
    evaluate, simulate, FeasibilityVerdict, Plan, PlanResult, Trajectory, FEASIBILITY_TOLERANCE,
};
pub use horizon::{Horizon, Period};
pub use params::Parameters;
