//! CLI entry point for transit_tally.
//!
//! Provides subcommands for loading a bus-ridership CSV and for totalling the
//! cost of a whitespace-delimited portfolio file.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use transit_tally::{
    footprint::Footprint,
    output::{CostSummary, append_record, print_json, print_pretty, write_diagnostics},
    policy::ErrorPolicy,
    portfolio::portfolio_cost,
    rides::load_rides_with_policy,
};

#[derive(Parser)]
#[command(name = "transit_tally")]
#[command(about = "Load ridership records and total portfolio costs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a bus-ridership CSV and report its in-memory footprint
    Rides {
        /// Ridership CSV with a header row
        #[arg(value_name = "FILE")]
        source: String,

        /// What to do with rows whose rides count does not parse
        #[arg(short, long, value_enum, default_value_t = ErrorPolicy::Fatal)]
        policy: ErrorPolicy,

        /// Also log the footprint as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Optional: CSV file to write skipped rows to
        #[arg(short, long)]
        diagnostics: Option<String>,
    },
    /// Total quantity * price over a portfolio file
    Pcost {
        /// Whitespace-delimited portfolio file
        #[arg(value_name = "FILE")]
        source: String,

        /// What to do with lines that do not parse
        #[arg(short, long, value_enum, default_value_t = ErrorPolicy::Skip)]
        policy: ErrorPolicy,

        /// Optional: CSV file to append a summary row to
        #[arg(short, long)]
        report: Option<String>,

        /// Optional: CSV file to write skipped lines to
        #[arg(short, long)]
        diagnostics: Option<String>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/transit_tally.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("transit_tally.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Rides {
            source,
            policy,
            json,
            diagnostics,
        } => {
            let loaded = load_rides_with_policy(&source, policy)?;
            let footprint = Footprint::of(&loaded.records);

            info!(
                records = footprint.records,
                record_size = footprint.record_size,
                total_mib = footprint.total_mib(),
                "Memory use (Ride)"
            );
            if !loaded.skipped.is_empty() {
                warn!(skipped = loaded.skipped.len(), "Some rows were skipped");
            }

            print_pretty(&footprint);
            if json {
                print_json(&footprint)?;
            }
            if let Some(path) = diagnostics {
                write_diagnostics(&path, &loaded.skipped)?;
            }
        }
        Commands::Pcost {
            source,
            policy,
            report,
            diagnostics,
        } => {
            let cost = portfolio_cost(&source, policy)?;

            if !cost.skipped.is_empty() {
                warn!(skipped = cost.skipped.len(), "Some lines were skipped");
            }
            println!("{}", cost.total);

            if let Some(path) = report {
                append_record(&path, &CostSummary::from_report(&source, &cost))?;
            }
            if let Some(path) = diagnostics {
                write_diagnostics(&path, &cost.skipped)?;
            }
        }
    }

    Ok(())
}
