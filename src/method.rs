//! Mitigation methods
//!
//! A method is one independent protection with a fixed per-trial
//! effectiveness.

use serde::{Deserialize, Serialize};

use crate::RiskError;

/// One independent mitigation method.
///
/// Immutable once constructed: the effectiveness is validated to `[0, 1]`
/// and the failure probability is derived at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Method {
    effectiveness: f64,
    failure_probability: f64,
}

impl Method {
    /// Create a method, rejecting effectiveness outside `[0, 1]`.
    pub fn new(effectiveness: f64) -> Result<Self, RiskError> {
        let effectiveness = ensure_probability("method effectiveness", effectiveness)?;
        Ok(Self {
            effectiveness,
            failure_probability: 1.0 - effectiveness,
        })
    }

    /// Probability this method alone prevents failure on one trial.
    pub fn effectiveness(&self) -> f64 {
        self.effectiveness
    }

    /// Probability this method alone lets a single trial fail.
    pub fn failure_probability(&self) -> f64 {
        self.failure_probability
    }
}

impl TryFrom<f64> for Method {
    type Error = RiskError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Method> for f64 {
    fn from(method: Method) -> Self {
        method.effectiveness
    }
}

/// Validate that `value` is a finite probability in the closed unit interval.
pub(crate) fn ensure_probability(context: &'static str, value: f64) -> Result<f64, RiskError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        return Ok(value);
    }

    Err(RiskError::Validation { context, value })
}
