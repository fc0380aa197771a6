//! Price forecast - main entry point
//!
//! This binary provides two subcommands:
//! - predict: Fetch recent candles (or read a CSV) and forecast once
//! - watch: Repeat the forecast on a fixed cadence until Ctrl+C

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use price_forecast::render::render_failure;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "price-forecast")]
#[command(about = "Short-horizon price forecast with trend, momentum and reversal heuristics", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory for the per-run JSON log files
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Forecast once and print the result
    Predict {
        /// Path to configuration file (defaults are used when omitted)
        #[arg(short, long)]
        config: Option<String>,

        /// Target price to compare the forecast against
        #[arg(short, long)]
        target: f64,

        /// Minutes ahead of now to forecast
        #[arg(short, long, conflicts_with = "at", allow_negative_numbers = true)]
        minutes: Option<i64>,

        /// Absolute target time (RFC 3339 or "YYYY-MM-DD HH:MM:SS", UTC)
        #[arg(long)]
        at: Option<String>,

        /// Read prices from a CSV file instead of Binance
        #[arg(long)]
        csv: Option<String>,

        /// Print JSON (including the price series) instead of text
        #[arg(long)]
        json: bool,
    },

    /// Forecast repeatedly on a fixed cadence
    Watch {
        /// Path to configuration file (defaults are used when omitted)
        #[arg(short, long)]
        config: Option<String>,

        /// Target price to compare the forecast against
        #[arg(short, long)]
        target: f64,

        /// Minutes ahead of each run to forecast
        #[arg(short, long, default_value = "15", allow_negative_numbers = true)]
        minutes: i64,

        /// Refresh interval in seconds (overrides config)
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

/// Default filter directives for `level`, with the HTTP stack held at warn
fn filter_directives(level: &str) -> String {
    format!(
        "{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn,h2=warn",
        level
    )
}

/// Log file name: {command}_{timestamp}.jsonl
fn log_filename(command_name: &str, now: DateTime<Local>) -> String {
    format!("{}_{}.jsonl", command_name, now.format("%Y-%m-%d_%H-%M-%S"))
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directives(level)))
}

/// Console on stderr plus one JSON-lines file per invocation under `log_dir`.
///
/// With `quiet_console` only warnings reach the terminal, so stderr stays
/// readable next to machine output; the file still gets the full level.
fn setup_logging(verbose: bool, quiet_console: bool, command_name: &str, log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let log_filename = log_filename(command_name, Local::now());
    let log_path = log_dir.join(&log_filename);

    let level = if verbose { "debug" } else { "info" };
    let console_level = if quiet_console { "warn" } else { level };

    let file_appender = tracing_appender::rolling::never(log_dir, &log_filename);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(verbose)
        .with_file(verbose)
        .with_ansi(true)
        .with_filter(env_filter(console_level));

    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(file_appender)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_current_span(false)
        .with_filter(env_filter(level));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    info!(command = command_name, log_file = %log_path.display(), "Logging initialized");

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (command_name, quiet_console) = match &cli.command {
        Commands::Predict { json, .. } => ("predict", *json),
        Commands::Watch { .. } => ("watch", false),
    };

    setup_logging(cli.verbose, quiet_console, command_name, &cli.log_dir)?;

    let result = match cli.command {
        Commands::Predict {
            config,
            target,
            minutes,
            at,
            csv,
            json,
        } => commands::predict::run(config, target, minutes, at, csv, json),

        Commands::Watch {
            config,
            target,
            minutes,
            interval,
        } => commands::watch::run(config, target, minutes, interval),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        eprintln!("{}", render_failure(&e));
        std::process::exit(1);
    }

    Ok(())
}
