//! Workforce optimization
//!
//! Three independent capabilities sharing the model registry: task
//! assignment, shift scheduling, and workforce-need forecasting. Each call
//! is request/response; no cross-call state is retained outside the
//! registry's trained weights.

mod assignment;
mod forecast;
mod metrics;
mod scheduling;

pub use assignment::{optimize_assignments, ASSIGNMENT_MODEL_ID};
pub use forecast::{predict_workforce_needs, FORECAST_MODEL_ID};
pub use metrics::summarize;
pub use scheduling::{optimize_schedules, SCHEDULE_MODEL_ID};
