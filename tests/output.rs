use std::fs;

use compound_risk::output::{write_series_csv, OutputFiles};
use compound_risk::{create_timestamped_output_dir, write_chart_report, ChartConfig, ScenarioCurve, ScenarioSpec};
use compound_risk::{RiskError, Scenario};

fn small_config() -> ChartConfig {
    ChartConfig {
        scenarios: vec![
            ScenarioSpec::new("single", vec![0.9]),
            ScenarioSpec::new("pair", vec![0.9, 0.5]),
        ],
        min_trials: 0,
        max_trials: 12,
        thresholds: vec![0.5],
        percent_axis: false,
    }
}

#[test]
fn chart_report_writes_all_artefacts() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_chart_report(&small_config(), dir.path()).unwrap();

    assert_eq!(files.output_dir, dir.path());
    assert!(files.csv_path.exists());
    assert!(files.summary_path.exists());

    let svg = fs::read_to_string(&files.plot_path).unwrap();
    assert!(svg.contains("<svg"));
}

#[test]
fn series_csv_is_long_form() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_chart_report(&small_config(), dir.path()).unwrap();

    let mut reader = csv::Reader::from_path(&files.csv_path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["scenario", "trials", "cumulative_failure_probability"]
    );

    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 2 * 13);
    assert_eq!(&rows[0][0], "single");
    assert_eq!(&rows[0][1], "0");
    assert_eq!(&rows[13][0], "pair");

    let p: f64 = rows[1][2].parse().unwrap();
    assert!((p - 0.1).abs() < 1e-9);
}

#[test]
fn summary_json_reports_thresholds() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_chart_report(&small_config(), dir.path()).unwrap();

    let raw = fs::read_to_string(&files.summary_path).unwrap();
    let summary: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let scenarios = summary["scenarios"].as_array().unwrap();
    assert_eq!(scenarios.len(), 2);

    let pair = &scenarios[1];
    assert_eq!(pair["name"], "pair");
    assert!((pair["combined_effectiveness"].as_f64().unwrap() - 0.95).abs() < 1e-12);
    // 0.95^n <= 0.5 first at n = 14
    assert_eq!(pair["thresholds"][0]["min_whole_trials"], 14);
}

#[test]
fn invalid_config_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = ChartConfig {
        min_trials: 5,
        max_trials: 1,
        ..small_config()
    };

    let result = write_chart_report(&config, dir.path());
    assert!(matches!(result, Err(RiskError::InvalidConfig(_))));
    assert!(!OutputFiles::in_dir(dir.path()).csv_path.exists());
}

#[test]
fn timestamped_dirs_do_not_collide() {
    let root = tempfile::tempdir().unwrap();
    let first = create_timestamped_output_dir(root.path()).unwrap();
    let second = create_timestamped_output_dir(root.path()).unwrap();

    assert_ne!(first, second);
    assert!(first.is_dir());
    assert!(second.is_dir());
}

#[test]
fn csv_writer_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("series.csv");
    let scenario = Scenario::from_effectiveness("one", &[0.5]).unwrap();
    let curve = ScenarioCurve::from_scenario(&scenario, 1, 2);

    write_series_csv(&path, &[curve]).unwrap();
    let raw = fs::read_to_string(&path).unwrap();
    assert_eq!(raw.lines().count(), 3);
}
