use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use csv::Writer;
use serde::Serialize;
use tracing::info;

use crate::chart::{plot_failure_curves, ScenarioCurve};
use crate::config::ChartConfig;
use crate::scenario::Scenario;
use crate::RiskError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdRow {
    pub threshold: f64,
    /// Continuous solution, `None` where the inverse is undefined.
    pub trials: Option<f64>,
    pub min_whole_trials: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub effectiveness: Vec<f64>,
    pub combined_effectiveness: f64,
    pub combined_failure_probability: f64,
    pub failure_at_max_trials: f64,
    pub thresholds: Vec<ThresholdRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSummary {
    pub generated_at: String,
    pub min_trials: u32,
    pub max_trials: u32,
    pub scenarios: Vec<ScenarioSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputFiles {
    pub output_dir: PathBuf,
    pub csv_path: PathBuf,
    pub summary_path: PathBuf,
    pub plot_path: PathBuf,
}

impl OutputFiles {
    pub fn in_dir(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            csv_path: output_dir.join("failure_series.csv"),
            summary_path: output_dir.join("summary.json"),
            plot_path: output_dir.join("failure_curves.svg"),
        }
    }
}

pub fn create_timestamped_output_dir(output_root: &Path) -> Result<PathBuf, RiskError> {
    fs::create_dir_all(output_root)?;

    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let mut output_dir = output_root.join(&timestamp);
    let mut counter = 1_u32;

    while output_dir.exists() {
        output_dir = output_root.join(format!("{timestamp}-{counter:02}"));
        counter += 1;
    }

    fs::create_dir_all(&output_dir)?;
    Ok(output_dir)
}

fn fmt_f64(value: f64) -> String {
    format!("{value:.10}")
}

pub fn summarize_scenario(scenario: &Scenario, thresholds: &[f64], max_trials: u32) -> ScenarioSummary {
    let thresholds = thresholds
        .iter()
        .map(|&threshold| ThresholdRow {
            threshold,
            trials: scenario.trials_for_failure_threshold(threshold).ok(),
            min_whole_trials: scenario.min_trials_for_threshold(threshold).ok(),
        })
        .collect();

    ScenarioSummary {
        name: scenario.name().to_string(),
        effectiveness: scenario.methods().iter().map(|m| m.effectiveness()).collect(),
        combined_effectiveness: scenario.combined_effectiveness(),
        combined_failure_probability: scenario.combined_failure_probability(),
        failure_at_max_trials: scenario.cumulative_failure_probability(max_trials),
        thresholds,
    }
}

/// Long-form CSV: one row per scenario and trial count.
pub fn write_series_csv(path: &Path, curves: &[ScenarioCurve]) -> Result<(), RiskError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = Writer::from_path(path)?;
    writer.write_record(["scenario", "trials", "cumulative_failure_probability"])?;

    for curve in curves {
        for &(trials, probability) in &curve.points {
            writer.write_record([
                curve.name.clone(),
                trials.to_string(),
                fmt_f64(probability),
            ])?;
        }
    }

    writer.flush()?;
    Ok(())
}

pub fn write_summary_json(path: &Path, summary: &ChartSummary) -> Result<(), RiskError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let data = serde_json::to_string_pretty(summary)?;
    fs::write(path, data)?;
    Ok(())
}

/// Write the CSV series, JSON summary and SVG chart for `config` into
/// `output_dir`.
pub fn write_chart_report(config: &ChartConfig, output_dir: &Path) -> Result<OutputFiles, RiskError> {
    config.validate()?;
    let scenarios = config.scenarios()?;
    let files = OutputFiles::in_dir(output_dir);

    let curves: Vec<ScenarioCurve> = scenarios
        .iter()
        .map(|scenario| ScenarioCurve::from_scenario(scenario, config.min_trials, config.max_trials))
        .collect();

    let summary = ChartSummary {
        generated_at: Utc::now().to_rfc3339(),
        min_trials: config.min_trials,
        max_trials: config.max_trials,
        scenarios: scenarios
            .iter()
            .map(|scenario| summarize_scenario(scenario, &config.thresholds, config.max_trials))
            .collect(),
    };

    write_series_csv(&files.csv_path, &curves)?;
    write_summary_json(&files.summary_path, &summary)?;
    plot_failure_curves(&files.plot_path, &curves, &config.thresholds, config.percent_axis)?;

    info!(
        output_dir = %files.output_dir.display(),
        scenarios = curves.len(),
        "wrote chart report"
    );
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_thresholds_are_none() {
        let scenario = Scenario::from_effectiveness("perfect", &[1.0]).unwrap();
        let summary = summarize_scenario(&scenario, &[0.5], 10);
        assert_eq!(summary.thresholds[0].trials, None);
        assert_eq!(summary.thresholds[0].min_whole_trials, None);
        assert_eq!(summary.failure_at_max_trials, 0.0);
    }

    #[test]
    fn summary_carries_threshold_crossings() {
        let scenario = Scenario::from_effectiveness("half", &[0.5]).unwrap();
        let summary = summarize_scenario(&scenario, &[0.75], 4);
        let row = &summary.thresholds[0];
        assert!((row.trials.unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(row.min_whole_trials, Some(2));
        assert_eq!(summary.effectiveness, vec![0.5]);
    }

    #[test]
    fn output_files_live_in_one_dir() {
        let files = OutputFiles::in_dir(Path::new("out"));
        assert_eq!(files.csv_path, Path::new("out/failure_series.csv"));
        assert_eq!(files.plot_path.extension().unwrap(), "svg");
    }
}
