//! Compound Risk - compounded failure probability for layered mitigations
//!
//! Combines the effectiveness of independent mitigation methods into a
//! single per-trial effectiveness, then compounds it over repeated trials:
//! either the probability of at least one failure after `n` trials, or the
//! number of trials at which that probability crosses a threshold.

pub mod chart;
pub mod config;
pub mod input;
pub mod method;
pub mod model;
pub mod monte_carlo;
pub mod output;
pub mod scenario;

use thiserror::Error;

// Re-export main types
pub use chart::ScenarioCurve;
pub use config::{ChartConfig, ScenarioSpec};
pub use method::Method;
pub use model::{
    combine_effectiveness, cumulative_failure_probability, failure_probability_series,
    min_trials_for_threshold, trials_for_failure_threshold, FailureSeries,
};
pub use monte_carlo::{simulate_failure_rate, MonteCarloConfig, MonteCarloEstimate};
pub use output::{create_timestamped_output_dir, write_chart_report};
pub use scenario::Scenario;

#[derive(Debug, Error)]
pub enum RiskError {
    #[error("{context} must be a probability in [0, 1], got {value}")]
    Validation { context: &'static str, value: f64 },
    #[error("undefined trial count: {0}")]
    Domain(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid input: {0}")]
    Parse(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("plot error: {0}")]
    Plot(String),
}
