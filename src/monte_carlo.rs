//! Seeded Monte Carlo cross-check of the closed-form failure probability.
//!
//! Each run draws every method independently on every trial; a trial fails
//! when all methods fail, and a run fails on its first failing trial.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Bernoulli, Distribution};
use serde::Serialize;
use tracing::debug;

use crate::scenario::Scenario;
use crate::RiskError;

pub const DEFAULT_MONTE_CARLO_RUNS: usize = 10_000;

#[derive(Clone, Debug)]
pub struct MonteCarloConfig {
    pub runs: usize,
    pub trials: u32,
    pub seed: u64,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            runs: DEFAULT_MONTE_CARLO_RUNS,
            trials: 50,
            seed: 2026,
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MonteCarloEstimate {
    pub runs: usize,
    pub failures: usize,
    pub empirical: f64,
    pub analytic: f64,
}

impl MonteCarloEstimate {
    pub fn absolute_error(&self) -> f64 {
        (self.empirical - self.analytic).abs()
    }
}

pub fn simulate_failure_rate(
    scenario: &Scenario,
    config: &MonteCarloConfig,
) -> Result<MonteCarloEstimate, RiskError> {
    if config.runs == 0 {
        return Err(RiskError::InvalidConfig(
            "runs must be greater than zero".to_string(),
        ));
    }

    let draws = scenario
        .methods()
        .iter()
        .map(|method| {
            Bernoulli::new(method.failure_probability())
                .map_err(|error| RiskError::InvalidConfig(error.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut failures = 0_usize;

    for _ in 0..config.runs {
        let failed = (0..config.trials)
            .any(|_| draws.iter().all(|draw| draw.sample(&mut rng)));
        if failed {
            failures += 1;
        }
    }

    let estimate = MonteCarloEstimate {
        runs: config.runs,
        failures,
        empirical: failures as f64 / config.runs as f64,
        analytic: scenario.cumulative_failure_probability(config.trials),
    };
    debug!(
        scenario = scenario.name(),
        runs = estimate.runs,
        empirical = estimate.empirical,
        analytic = estimate.analytic,
        "monte carlo estimate"
    );
    Ok(estimate)
}
