//! Monthly workforce training planner.
//!
//! [workforce] replays a training plan and judges it against demand;
//! [optimizer] finds a minimum-cost plan with a linear model that restates
//! the same recurrence, then hands the plan back to [workforce] for replay.

pub mod cli;
pub mod data;
pub mod error;
pub mod logging;
pub mod optimizer;
pub mod parallel;
pub mod pipeline;
pub mod report;
pub mod server;
pub mod workforce;

pub use error::{PlanError, Result};
