//! Chart rendering for cumulative failure curves.
//!
//! Consumes scenarios only through their public query API and draws one
//! line per scenario, plus flat reference lines for each threshold.

use std::fs;
use std::path::Path;

use plotters::prelude::*;
use serde::Serialize;

use crate::input::format_percent;
use crate::scenario::Scenario;
use crate::RiskError;

/// Named sequence of `(trials, cumulative failure probability)` points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioCurve {
    pub name: String,
    pub combined_effectiveness: f64,
    pub points: Vec<(u32, f64)>,
}

impl ScenarioCurve {
    pub fn from_scenario(scenario: &Scenario, min_trials: u32, max_trials: u32) -> Self {
        Self {
            name: scenario.name().to_string(),
            combined_effectiveness: scenario.combined_effectiveness(),
            points: scenario
                .failure_probability_series(min_trials, max_trials)
                .collect(),
        }
    }

    pub fn max_probability(&self) -> f64 {
        self.points.iter().map(|&(_, p)| p).fold(0.0_f64, f64::max)
    }
}

fn plot_error(error: impl std::fmt::Display) -> RiskError {
    RiskError::Plot(error.to_string())
}

/// Render the curves to an SVG file at `path`.
pub fn plot_failure_curves(
    path: &Path,
    curves: &[ScenarioCurve],
    thresholds: &[f64],
    percent_axis: bool,
) -> Result<(), RiskError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let scale = if percent_axis { 100.0 } else { 1.0 };
    let (min_trials, max_trials) = trial_bounds(curves);
    let x_max = if max_trials > min_trials {
        max_trials
    } else {
        min_trials + 1.0
    };

    let peak = curves
        .iter()
        .map(ScenarioCurve::max_probability)
        .chain(thresholds.iter().copied())
        .fold(0.0_f64, f64::max);
    let y_max = (peak * 1.05).clamp(1e-3, 1.0) * scale;

    let root = SVGBackend::new(path, (1280, 720)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Cumulative Probability of Failure",
            ("sans-serif", 34).into_font(),
        )
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(min_trials..x_max, 0.0..y_max)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("Trials")
        .y_desc(if percent_axis {
            "Probability of failure [%]"
        } else {
            "Probability of failure"
        })
        .draw()
        .map_err(plot_error)?;

    for (idx, curve) in curves.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        chart
            .draw_series(LineSeries::new(
                curve
                    .points
                    .iter()
                    .map(|&(n, p)| (f64::from(n), p * scale)),
                color.stroke_width(2),
            ))
            .map_err(plot_error)?
            .label(format!(
                "{} (e = {:.6})",
                curve.name, curve.combined_effectiveness
            ))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 25, y)], color.stroke_width(3)));
    }

    let reference = BLACK.mix(0.45);
    for &threshold in thresholds {
        chart
            .draw_series(LineSeries::new(
                [(min_trials, threshold * scale), (x_max, threshold * scale)],
                reference.stroke_width(1),
            ))
            .map_err(plot_error)?
            .label(format!("threshold {}", format_percent(threshold)))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 25, y)], reference.stroke_width(1)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .border_style(BLACK)
        .background_style(WHITE.mix(0.7))
        .draw()
        .map_err(plot_error)?;

    root.present().map_err(plot_error)?;
    Ok(())
}

fn trial_bounds(curves: &[ScenarioCurve]) -> (f64, f64) {
    let mut trials = curves.iter().flat_map(|curve| curve.points.iter().map(|&(n, _)| n));
    let Some(first) = trials.next() else {
        return (0.0, 1.0);
    };
    let (min, max) = trials.fold((first, first), |(lo, hi), n| (lo.min(n), hi.max(n)));
    (f64::from(min), f64::from(max))
}
