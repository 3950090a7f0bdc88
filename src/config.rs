use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use crate::scenario::Scenario;
use crate::RiskError;

/// Largest number of trial counts a single chart may span.
pub const MAX_CHART_SPAN: u32 = 1_000_000;

/// A scenario as written in a chart configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub name: String,
    #[serde(default)]
    pub effectiveness: Vec<f64>,
}

impl ScenarioSpec {
    pub fn new(name: impl Into<String>, effectiveness: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            effectiveness,
        }
    }

    pub fn to_scenario(&self) -> Result<Scenario, RiskError> {
        Scenario::from_effectiveness(self.name.clone(), &self.effectiveness)
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    #[serde_as(as = "DefaultOnNull")]
    pub scenarios: Vec<ScenarioSpec>,
    #[serde_as(as = "DefaultOnNull")]
    pub min_trials: u32,
    #[serde_as(as = "DefaultOnNull")]
    pub max_trials: u32,
    #[serde_as(as = "DefaultOnNull")]
    pub thresholds: Vec<f64>,
    #[serde_as(as = "DefaultOnNull")]
    pub percent_axis: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            scenarios: vec![
                ScenarioSpec::new("baseline", vec![0.99, 0.84]),
                ScenarioSpec::new("layered", vec![0.99, 0.84, 0.91]),
            ],
            min_trials: 0,
            max_trials: 100,
            thresholds: vec![0.05, 0.5],
            percent_axis: true,
        }
    }
}

impl ChartConfig {
    pub fn validate(&self) -> Result<(), RiskError> {
        if self.scenarios.is_empty() {
            return Err(RiskError::InvalidConfig(
                "at least one scenario is required".to_string(),
            ));
        }

        if self.min_trials > self.max_trials {
            return Err(RiskError::InvalidConfig(
                "max_trials must be greater than or equal to min_trials".to_string(),
            ));
        }

        if self.max_trials - self.min_trials >= MAX_CHART_SPAN {
            return Err(RiskError::InvalidConfig(format!(
                "trial range {}..={} exceeds {MAX_CHART_SPAN} points",
                self.min_trials, self.max_trials
            )));
        }

        for spec in &self.scenarios {
            if spec.name.trim().is_empty() {
                return Err(RiskError::InvalidConfig(
                    "scenario names must not be empty".to_string(),
                ));
            }
            if let Some(bad) = spec
                .effectiveness
                .iter()
                .find(|value| !(value.is_finite() && (0.0..=1.0).contains(*value)))
            {
                return Err(RiskError::InvalidConfig(format!(
                    "scenario {:?} has effectiveness {bad} outside [0, 1]",
                    spec.name
                )));
            }
        }

        if let Some(bad) = self
            .thresholds
            .iter()
            .find(|value| !(value.is_finite() && (0.0..1.0).contains(*value)))
        {
            return Err(RiskError::InvalidConfig(format!(
                "threshold {bad} must lie in [0, 1)"
            )));
        }

        Ok(())
    }

    pub fn scenarios(&self) -> Result<Vec<Scenario>, RiskError> {
        self.scenarios.iter().map(ScenarioSpec::to_scenario).collect()
    }
}
