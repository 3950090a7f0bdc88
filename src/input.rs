//! Console input parsing and percentage formatting.

use crate::method::ensure_probability;
use crate::RiskError;

/// Parse a whitespace-separated list of effectiveness values.
pub fn parse_effectiveness_list(line: &str) -> Result<Vec<f64>, RiskError> {
    line.split_whitespace()
        .map(|token| {
            let value: f64 = token
                .parse()
                .map_err(|_| RiskError::Parse(format!("not a number: {token:?}")))?;
            ensure_probability("method effectiveness", value)
        })
        .collect()
}

/// Parse a non-negative trial count.
pub fn parse_trials(line: &str) -> Result<u32, RiskError> {
    let token = line.trim();
    token
        .parse()
        .map_err(|_| RiskError::Parse(format!("not a non-negative trial count: {token:?}")))
}

/// Parse a cumulative failure threshold, accepting `0.05` or `5%`.
pub fn parse_threshold(line: &str) -> Result<f64, RiskError> {
    let token = line.trim();
    let (number, scale) = match token.strip_suffix('%') {
        Some(number) => (number.trim_end(), 100.0),
        None => (token, 1.0),
    };
    let value: f64 = number
        .parse()
        .map_err(|_| RiskError::Parse(format!("not a threshold: {token:?}")))?;
    ensure_probability("target cumulative failure probability", value / scale)
}

/// Format a probability as a percentage with two decimals, e.g. `6.93%`.
pub fn format_percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}
