//! Probability model
//!
//! Pure functions combining independent method effectiveness values and
//! compounding the combined per-trial effectiveness over repeated trials.
//!
//! For a combined effectiveness `e` and `n` independent trials the
//! cumulative failure probability is `1 - e^n`. It is evaluated as
//! `-expm1(n * ln e)` so that values of `e` close to one keep their
//! precision, and the inverse uses `ln_1p` for the same reason.

use tracing::debug;

use crate::method::{ensure_probability, Method};
use crate::RiskError;

/// Combine independent effectiveness values into one per-trial value.
///
/// Computes `1 - prod(1 - e_i)`. The empty input yields `0.0`.
pub fn combine_effectiveness(values: &[f64]) -> Result<f64, RiskError> {
    let mut combined = 0.0;
    for &value in values {
        let value = ensure_probability("method effectiveness", value)?;
        combined = fold_effectiveness(combined, value);
    }
    Ok(combined)
}

/// Product of the per-method failure probabilities. The empty product is `1.0`.
pub fn combined_failure_probability(methods: &[Method]) -> f64 {
    methods
        .iter()
        .map(Method::failure_probability)
        .product()
}

// c' = c + e (1 - c), which equals 1 - (1 - c)(1 - e) and keeps a single
// method's effectiveness exact.
fn fold_effectiveness(combined: f64, effectiveness: f64) -> f64 {
    combined + effectiveness * (1.0 - combined)
}

/// Probability of at least one failure across `trials` independent trials.
pub fn cumulative_failure_probability(
    combined_effectiveness: f64,
    trials: u32,
) -> Result<f64, RiskError> {
    let e = ensure_probability("combined effectiveness", combined_effectiveness)?;
    Ok(cumulative_unchecked(e, trials))
}

pub(crate) fn cumulative_unchecked(e: f64, trials: u32) -> f64 {
    if trials == 0 || e == 1.0 {
        return 0.0;
    }
    if e == 0.0 {
        return 1.0;
    }

    let p = -(f64::from(trials) * e.ln()).exp_m1();
    p.clamp(0.0, 1.0)
}

/// Continuous number of trials at which the cumulative failure probability
/// reaches `target`.
///
/// Solves `1 - e^n = target` for `n`. The result is not rounded. Combined
/// effectiveness of exactly `0` or `1`, and a target of exactly `1`, have
/// no finite solution and are reported as [`RiskError::Domain`].
pub fn trials_for_failure_threshold(
    combined_effectiveness: f64,
    target: f64,
) -> Result<f64, RiskError> {
    let e = ensure_probability("combined effectiveness", combined_effectiveness)?;
    let target = ensure_probability("target cumulative failure probability", target)?;

    if e == 1.0 {
        return Err(RiskError::Domain(
            "combined effectiveness of 1 never fails; no finite trial count reaches a positive threshold"
                .to_string(),
        ));
    }
    if e == 0.0 {
        return Err(RiskError::Domain(
            "combined effectiveness of 0 fails on the first trial; the inverse is undefined"
                .to_string(),
        ));
    }
    if target == 1.0 {
        return Err(RiskError::Domain(
            "a cumulative failure probability of 1 is only reached after infinitely many trials"
                .to_string(),
        ));
    }
    if target == 0.0 {
        return Ok(0.0);
    }

    Ok((-target).ln_1p() / e.ln())
}

/// Smallest whole number of trials whose cumulative failure probability is
/// at least `target`.
pub fn min_trials_for_threshold(combined_effectiveness: f64, target: f64) -> Result<u64, RiskError> {
    let continuous = trials_for_failure_threshold(combined_effectiveness, target)?;
    let mut trials = continuous.ceil() as u64;

    // The continuous solution can land a hair either side of an integer.
    let Ok(whole) = u32::try_from(trials) else {
        return Ok(trials);
    };
    if cumulative_unchecked(combined_effectiveness, whole) < target {
        trials += 1;
    } else if whole > 0 && cumulative_unchecked(combined_effectiveness, whole - 1) >= target {
        trials -= 1;
    }

    Ok(trials)
}

/// Cumulative failure probabilities for every trial count in
/// `min_trials..=max_trials`, ascending.
///
/// `min_trials > max_trials` yields an empty series.
pub fn failure_probability_series(
    combined_effectiveness: f64,
    min_trials: u32,
    max_trials: u32,
) -> Result<FailureSeries, RiskError> {
    let e = ensure_probability("combined effectiveness", combined_effectiveness)?;
    Ok(FailureSeries::new(e, min_trials, max_trials))
}

/// Finite, restartable series of `(trials, cumulative_failure_probability)`.
///
/// Every element is computed from its own trial count; cloning the series
/// restarts it from wherever the clone was taken.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureSeries {
    effectiveness: f64,
    front: u64,
    back: u64,
}

impl FailureSeries {
    pub(crate) fn new(effectiveness: f64, min_trials: u32, max_trials: u32) -> Self {
        debug!(effectiveness, min_trials, max_trials, "building failure probability series");
        let front = u64::from(min_trials);
        let back = if min_trials > max_trials {
            front
        } else {
            u64::from(max_trials) + 1
        };
        Self {
            effectiveness,
            front,
            back,
        }
    }

    /// Combined effectiveness the series is computed for.
    pub fn effectiveness(&self) -> f64 {
        self.effectiveness
    }

    fn point(&self, trials: u64) -> (u32, f64) {
        // front/back never leave the u32 range they were built from
        let trials = trials as u32;
        (trials, cumulative_unchecked(self.effectiveness, trials))
    }
}

impl Iterator for FailureSeries {
    type Item = (u32, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let point = self.point(self.front);
        self.front += 1;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = (self.back - self.front) as usize;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for FailureSeries {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.point(self.back))
    }
}

impl ExactSizeIterator for FailureSeries {}

impl std::iter::FusedIterator for FailureSeries {}
