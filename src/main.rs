//! costlens - cloud cost analytics
//!
//! Reads a JSON-lines billing export and prints cost trends, anomalies and
//! forecasts as JSON.
//!
//! ## Usage
//!
//! ```bash
//! # Daily totals for the last 30 days
//! costlens --records export.jsonl trends
//!
//! # Anomalies for yesterday with a custom threshold and a two-week baseline
//! costlens --records export.jsonl anomalies --threshold 2.5 --lookback-days 14
//!
//! # Seven-day forecast
//! costlens --records export.jsonl forecast --horizon 7
//!
//! # Everything in one document
//! costlens --records export.jsonl report --output report.json
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use costlens_analytics::{
    AnalyticsConfig, CostAnalytics, CostError, JsonReportSink, JsonlRecordSource, ReportSink,
};
use costlens_core::{LogGuard, init_logging};
use serde::Serialize;
use tracing::{error, info};

/// Cloud cost trend, anomaly and forecast analytics
#[derive(Parser, Debug)]
#[command(name = "costlens")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Billing export in JSON lines format
    #[arg(long, global = true, default_value = "billing-export.jsonl")]
    records: PathBuf,

    /// Config file (defaults to ~/.costlens/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Treat this date as today (defaults to the current UTC date)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Enable verbose logging (increases log level)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory for log files (defaults to ~/.costlens/logs/)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Daily totals with service and project breakdowns
    Trends {
        /// Days of history to include
        #[arg(long)]
        days: Option<u32>,
    },

    /// Flag unusual per-project, per-service spend
    Anomalies {
        /// z-score a cost must exceed to be flagged
        #[arg(long)]
        threshold: Option<f64>,

        /// Days of history before the evaluated day to build baselines from
        #[arg(long)]
        lookback_days: Option<u32>,

        /// Day to evaluate (defaults to yesterday)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Predict daily totals
    Forecast {
        /// Days to predict
        #[arg(long)]
        horizon: Option<u32>,
    },

    /// Trends, anomalies and forecast in one JSON document
    Report {
        /// Write the report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            if let Some(hint) = e.guidance() {
                eprintln!("Hint: {}", hint);
            }
            return ExitCode::from(1);
        }
    };

    info!("Starting costlens");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("costlens error: {:#}", e);
            match e.downcast_ref::<CostError>() {
                Some(cost_error) => eprintln!("{}", cost_error.friendly_message()),
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::from(1)
        }
    }
}

/// Set up logging based on CLI arguments.
fn setup_logging(cli: &Cli) -> costlens_core::Result<LogGuard> {
    init_logging(cli.log_dir.clone(), cli.verbose > 0)
}

fn load_config(cli: &Cli) -> anyhow::Result<AnalyticsConfig> {
    let config = match &cli.config {
        Some(path) => AnalyticsConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AnalyticsConfig::load_default()?,
    };
    Ok(config)
}

/// Run the selected subcommand.
fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    let source = JsonlRecordSource::new(&cli.records);
    info!(records = %source.path().display(), "Reading billing export");
    let analytics = CostAnalytics::new(&source, config);
    let today = cli.today.unwrap_or_else(|| Utc::now().date_naive());

    match &cli.command {
        Command::Trends { days } => print_json(&analytics.trends(*days, today)?),
        Command::Anomalies {
            threshold,
            lookback_days,
            date,
        } => {
            let findings = match date {
                Some(date) => analytics.anomalies_on(*date, *lookback_days, *threshold)?,
                None => analytics.anomalies(*lookback_days, *threshold, today)?,
            };
            print_json(&findings)
        }
        Command::Forecast { horizon } => print_json(&analytics.forecast(*horizon, today)?),
        Command::Report { output } => {
            let report = analytics.report(today)?;
            match output {
                Some(path) => {
                    let mut sink = JsonReportSink::create(path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    sink.deliver(&report)?;
                    info!(path = %path.display(), "Report written");
                }
                None => JsonReportSink::new(std::io::stdout().lock()).deliver(&report)?,
            }
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
