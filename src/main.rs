use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use compound_risk::input::{format_percent, parse_effectiveness_list, parse_threshold, parse_trials};
use compound_risk::monte_carlo::MonteCarloConfig;
use compound_risk::output::{create_timestamped_output_dir, write_chart_report};
use compound_risk::{simulate_failure_rate, ChartConfig, Scenario};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_FILE: &str = "compound-risk.json";

#[derive(Debug, Parser)]
#[command(author, version, about = "Compounded failure probability for layered mitigation methods")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Prompt for an effectiveness list, then for trial counts until EOF
    Interactive,
    /// Probability of at least one failure after a number of trials
    Failure {
        /// Whitespace-separated method effectiveness values, e.g. "0.99 0.84"
        #[arg(long, allow_hyphen_values = true)]
        effectiveness: String,
        #[arg(long)]
        trials: u32,
    },
    /// Number of trials at which the failure probability reaches a threshold
    Trials {
        #[arg(long, allow_hyphen_values = true)]
        effectiveness: String,
        /// Target cumulative failure probability, e.g. 0.05 or 5%
        #[arg(long)]
        threshold: String,
    },
    /// Write the failure series CSV, summary JSON and SVG chart
    Chart {
        /// JSON chart configuration (defaults to ./compound-risk.json if present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output base directory; each run gets a timestamped subdirectory
        #[arg(long, default_value = "output-compound-risk")]
        output: PathBuf,
    },
    /// Seeded Monte Carlo cross-check of the closed-form probability
    Simulate {
        #[arg(long, allow_hyphen_values = true)]
        effectiveness: String,
        #[arg(long, default_value_t = 50)]
        trials: u32,
        #[arg(long, default_value_t = compound_risk::monte_carlo::DEFAULT_MONTE_CARLO_RUNS)]
        runs: usize,
        #[arg(long, default_value_t = 2026)]
        seed: u64,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("COMPOUND_RISK_LOG")
        .unwrap_or_else(|_| EnvFilter::new("compound_risk=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Interactive => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            run_interactive(stdin.lock(), stdout.lock())?;
        }
        Command::Failure {
            effectiveness,
            trials,
        } => {
            let scenario = cli_scenario(&effectiveness)?;
            let p = scenario.cumulative_failure_probability(trials);
            println!("{}", format_percent(p));
        }
        Command::Trials {
            effectiveness,
            threshold,
        } => {
            let scenario = cli_scenario(&effectiveness)?;
            let threshold = parse_threshold(&threshold)?;
            let continuous = scenario.trials_for_failure_threshold(threshold)?;
            let whole = scenario.min_trials_for_threshold(threshold)?;
            println!(
                "Combined effectiveness: {:.6} | {} reached after {continuous:.3} trials ({whole} whole trials)",
                scenario.combined_effectiveness(),
                format_percent(threshold)
            );
        }
        Command::Chart { config, output } => {
            let config = load_config(config.as_deref())?;
            let output_dir = create_timestamped_output_dir(&output)
                .with_context(|| format!("failed to create output under {}", output.display()))?;
            let files = write_chart_report(&config, &output_dir)?;

            println!("Run directory: {}", files.output_dir.display());
            println!("CSV: {}", files.csv_path.display());
            println!("Summary: {}", files.summary_path.display());
            println!("Chart: {}", files.plot_path.display());
        }
        Command::Simulate {
            effectiveness,
            trials,
            runs,
            seed,
        } => {
            let scenario = cli_scenario(&effectiveness)?;
            let estimate =
                simulate_failure_rate(&scenario, &MonteCarloConfig { runs, trials, seed })?;
            println!(
                "Analytic: {} | Empirical: {} ({} of {} runs failed)",
                format_percent(estimate.analytic),
                format_percent(estimate.empirical),
                estimate.failures,
                estimate.runs
            );
        }
    }

    Ok(())
}

fn cli_scenario(effectiveness: &str) -> anyhow::Result<Scenario> {
    let values = parse_effectiveness_list(effectiveness)?;
    Ok(Scenario::from_effectiveness("cli", &values)?)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ChartConfig> {
    if let Some(path) = path {
        return load_config_file(path);
    }

    let cwd_config = PathBuf::from(DEFAULT_CONFIG_FILE);
    if cwd_config.exists() {
        return load_config_file(&cwd_config);
    }

    Ok(ChartConfig::default())
}

fn load_config_file(path: &Path) -> anyhow::Result<ChartConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: ChartConfig = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(config)
}

/// Read an effectiveness list, then answer trial-count queries until EOF.
fn run_interactive<R: BufRead, W: Write>(mut input: R, mut out: W) -> anyhow::Result<()> {
    let scenario = loop {
        write!(out, "Effectiveness list> ")?;
        out.flush()?;
        let Some(line) = read_line(&mut input)? else {
            return Ok(());
        };
        match parse_effectiveness_list(&line)
            .and_then(|values| Scenario::from_effectiveness("interactive", &values))
        {
            Ok(scenario) => break scenario,
            Err(error) => writeln!(out, "{error}")?,
        }
    };

    loop {
        write!(out, "Number of occurrences> ")?;
        out.flush()?;
        let Some(line) = read_line(&mut input)? else {
            return Ok(());
        };
        match parse_trials(&line) {
            Ok(trials) => writeln!(
                out,
                "{}",
                format_percent(scenario.cumulative_failure_probability(trials))
            )?,
            Err(error) => writeln!(out, "{error}")?,
        }
    }
}

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}
