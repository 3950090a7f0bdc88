//! Scenarios
//!
//! A named, ordered set of methods applied together on every trial.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::method::Method;
use crate::model::{self, FailureSeries};
use crate::RiskError;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Combined {
    effectiveness: f64,
    failure_probability: f64,
}

/// Named set of independent methods.
///
/// The method list is frozen at construction; the combined values are
/// computed on first query and memoized for the scenario's lifetime.
/// [`Scenario::with_method`] consumes the scenario and returns a new one
/// with an empty cache, so a memoized value can never go stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    name: String,
    methods: Vec<Method>,
    #[serde(skip)]
    combined: OnceLock<Combined>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, methods: impl IntoIterator<Item = Method>) -> Self {
        Self {
            name: name.into(),
            methods: methods.into_iter().collect(),
            combined: OnceLock::new(),
        }
    }

    /// Build a scenario from raw effectiveness values, validating each.
    pub fn from_effectiveness(name: impl Into<String>, values: &[f64]) -> Result<Self, RiskError> {
        let methods = values
            .iter()
            .map(|&value| Method::new(value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(name, methods))
    }

    /// Return a new scenario with `method` appended.
    pub fn with_method(self, method: Method) -> Self {
        let mut methods = self.methods;
        methods.push(method);
        Self::new(self.name, methods)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Methods in insertion order.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    fn combined(&self) -> Combined {
        *self.combined.get_or_init(|| {
            // effectiveness is derived from the product so the two always sum to one
            let failure_probability = model::combined_failure_probability(&self.methods);
            let combined = Combined {
                effectiveness: 1.0 - failure_probability,
                failure_probability,
            };
            debug!(
                scenario = %self.name,
                methods = self.methods.len(),
                combined_effectiveness = combined.effectiveness,
                "memoized combined effectiveness"
            );
            combined
        })
    }

    /// Probability that at least one method prevents failure on one trial.
    pub fn combined_effectiveness(&self) -> f64 {
        self.combined().effectiveness
    }

    /// Probability that every method fails on one trial.
    pub fn combined_failure_probability(&self) -> f64 {
        self.combined().failure_probability
    }

    pub fn cumulative_failure_probability(&self, trials: u32) -> f64 {
        model::cumulative_unchecked(self.combined_effectiveness(), trials)
    }

    pub fn trials_for_failure_threshold(&self, target: f64) -> Result<f64, RiskError> {
        model::trials_for_failure_threshold(self.combined_effectiveness(), target)
    }

    pub fn min_trials_for_threshold(&self, target: f64) -> Result<u64, RiskError> {
        model::min_trials_for_threshold(self.combined_effectiveness(), target)
    }

    pub fn failure_probability_series(&self, min_trials: u32, max_trials: u32) -> FailureSeries {
        FailureSeries::new(self.combined_effectiveness(), min_trials, max_trials)
    }
}

impl PartialEq for Scenario {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.methods == other.methods
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layered() -> Scenario {
        Scenario::from_effectiveness("layered", &[0.99, 0.84, 0.91]).unwrap()
    }

    #[test]
    fn layered_scenario_end_to_end() {
        let scenario = layered();
        // 1 - 0.01 * 0.16 * 0.09
        assert!((scenario.combined_effectiveness() - 0.999856).abs() < 1e-12);
        assert!((scenario.combined_failure_probability() - 0.000144).abs() < 1e-12);

        let p = scenario.cumulative_failure_probability(50);
        assert!((p - (1.0 - 0.999856_f64.powi(50))).abs() < 1e-12);
        assert!((p - 0.00717).abs() < 1e-4);
    }

    #[test]
    fn fifty_trials_at_lower_effectiveness() {
        let p = model::cumulative_failure_probability(0.99856, 50).unwrap();
        assert!((p - 0.0693).abs() < 5e-4);
    }

    #[test]
    fn combined_values_are_exact_complements() {
        let values = [0.123, 0.4567, 0.891, 0.0001, 0.77, 0.99, 0.84, 0.91, 0.3333];
        for a in values {
            for b in values {
                for c in values {
                    let scenario = Scenario::from_effectiveness("triple", &[a, b, c]).unwrap();
                    assert_eq!(
                        scenario.combined_effectiveness(),
                        1.0 - scenario.combined_failure_probability()
                    );
                }
            }
        }
    }

    #[test]
    fn concurrent_readers_see_one_memoized_value() {
        let owned = layered();
        let scenario = &owned;
        let readings: Vec<f64> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(move || scenario.combined_effectiveness()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(readings.len(), 8);
        for reading in readings {
            assert_eq!(reading.to_bits(), scenario.combined_effectiveness().to_bits());
        }
    }

    #[test]
    fn empty_scenario_has_no_protection() {
        let scenario = Scenario::new("none", []);
        assert_eq!(scenario.combined_effectiveness(), 0.0);
        assert_eq!(scenario.combined_failure_probability(), 1.0);
        assert_eq!(scenario.cumulative_failure_probability(1), 1.0);
        assert!(scenario.trials_for_failure_threshold(0.5).is_err());
    }

    #[test]
    fn insertion_order_is_preserved() {
        let scenario = layered();
        let values: Vec<f64> = scenario.methods().iter().map(Method::effectiveness).collect();
        assert_eq!(values, vec![0.99, 0.84, 0.91]);
    }

    #[test]
    fn with_method_recomputes_after_memoization() {
        let scenario = Scenario::from_effectiveness("growing", &[0.99, 0.84]).unwrap();
        assert!((scenario.combined_effectiveness() - 0.9984).abs() < 1e-12);

        let scenario = scenario.with_method(Method::new(0.91).unwrap());
        assert!((scenario.combined_effectiveness() - 0.999856).abs() < 1e-12);
        assert_eq!(scenario.methods().len(), 3);
    }

    #[test]
    fn from_effectiveness_rejects_invalid_values() {
        assert!(matches!(
            Scenario::from_effectiveness("bad", &[0.5, -0.2]),
            Err(RiskError::Validation { .. })
        ));
    }

    #[test]
    fn series_matches_point_queries() {
        let scenario = layered();
        for (n, p) in scenario.failure_probability_series(0, 20) {
            assert_eq!(p, scenario.cumulative_failure_probability(n));
        }
    }

    #[test]
    fn threshold_round_trip() {
        let scenario = layered();
        let p = scenario.cumulative_failure_probability(120);
        let n = scenario.trials_for_failure_threshold(p).unwrap();
        assert!((n - 120.0).abs() < 1e-6);
        assert_eq!(scenario.min_trials_for_threshold(p).unwrap(), 120);
    }

    #[test]
    fn deserialized_scenario_computes_lazily() {
        let scenario: Scenario =
            serde_json::from_str(r#"{"name":"json","methods":[0.99,0.84]}"#).unwrap();
        assert_eq!(scenario.name(), "json");
        assert!((scenario.combined_effectiveness() - 0.9984).abs() < 1e-12);
    }
}
