//! Error types for gati-plan.

use thiserror::Error;

/// Planner error type.
///
/// All variants are input problems detected before planning begins.
/// Infeasible corners are not errors: planning succeeds and the affected
/// waypoints are reported through `Profile::degraded_at`.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("path contains no waypoints")]
    EmptyPath,

    #[error("waypoint {index} has non-positive desired speed {speed}")]
    NonPositiveSpeed { index: usize, speed: f64 },

    #[error("limit `{name}` is out of range: {value}")]
    InvalidLimit { name: &'static str, value: f64 },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for PlanError {
    fn from(e: toml::de::Error) -> Self {
        PlanError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;
