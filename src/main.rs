//! # Ingestion Main Driver
//!
//! ## Purpose
//! Command-line entry point for the ingestion engine. One subcommand per
//! entity type; each runs a full paced gather and writes the enriched
//! records to a JSON file.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration file, command line arguments, environment
//!   variables
//! - **Output**: A JSON file of enriched records plus a diagnostic summary
//!   on the log
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging and tracing
//! 3. Build the ingestion engine (client, pacer, resolver)
//! 4. Run the requested gather to completion
//! 5. Persist records and report diagnostics

use clap::{Arg, ArgMatches, Command};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use congress_ingest::{
    config::Config,
    errors::{IngestError, Result},
    ingestion::{GatherOutcome, IngestionEngine},
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("congress-ingest")
        .version("0.1.0")
        .about("Paced ingestion of bills, laws, amendments, and Congressional Record issues")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml")
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(windowed_command("bills", "Gather bills updated inside a date window"))
        .subcommand(
            windowed_command("laws", "Gather enacted laws of one congress inside a date window")
                .arg(
                    Arg::new("congress")
                        .long("congress")
                        .value_name("NUMBER")
                        .help("Congress number, e.g. 117")
                        .required(true)
                        .value_parser(clap::value_parser!(u32)),
                ),
        )
        .subcommand(windowed_command(
            "amendments",
            "Gather amendments updated inside a date window",
        ))
        .subcommand(windowed_command(
            "records",
            "Gather daily Congressional Record issues inside a date window",
        ))
        .subcommand(windowed_command(
            "bound-records",
            "Gather bound Congressional Record issues inside a date window",
        ))
        .get_matches();

    let config_path = matches.get_one::<String>("config").unwrap();
    let config = Config::from_file(config_path)?;

    init_logging(&config)?;
    info!("Configuration loaded from: {}", config_path);

    let mut engine = IngestionEngine::new(&config)?;

    match matches.subcommand() {
        Some(("bills", sub)) => {
            let (from, to) = window(sub);
            let outcome = engine.gather_bills(from, to).await?;
            finish(&engine, &outcome, sub, "bills.json")?;
        }
        Some(("laws", sub)) => {
            let congress = *sub.get_one::<u32>("congress").unwrap();
            let (from, to) = window(sub);
            let outcome = engine.gather_laws(congress, from, to).await?;
            finish(&engine, &outcome, sub, "laws.json")?;
        }
        Some(("amendments", sub)) => {
            let (from, to) = window(sub);
            let outcome = engine.gather_amendments(from, to).await?;
            finish(&engine, &outcome, sub, "amendments.json")?;
        }
        Some(("records", sub)) => {
            let (from, to) = window(sub);
            let outcome = engine.gather_record_issues(from, to).await?;
            finish(&engine, &outcome, sub, "records.json")?;
        }
        Some(("bound-records", sub)) => {
            let (from, to) = window(sub);
            let outcome = engine.gather_bound_record_issues(from, to).await?;
            finish(&engine, &outcome, sub, "bound_records.json")?;
        }
        _ => unreachable!("a subcommand is required"),
    }

    Ok(())
}

/// Build one of the date-windowed gather subcommands
fn windowed_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(
            Arg::new("from")
                .long("from")
                .value_name("YYYY-MM-DD")
                .help("Start of the date window (inclusive)")
                .required(true),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .value_name("YYYY-MM-DD")
                .help("End of the date window (inclusive)")
                .required(true),
        )
        .arg(output_arg())
}

fn output_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("FILE")
        .help("Output file for gathered records (JSON)")
}

fn window(sub: &ArgMatches) -> (&str, &str) {
    (
        sub.get_one::<String>("from").unwrap(),
        sub.get_one::<String>("to").unwrap(),
    )
}

/// Persist the gathered records and summarize the run
fn finish<T: Serialize, D: congress_ingest::ingestion::FallbackDownloader>(
    engine: &IngestionEngine<D>,
    outcome: &GatherOutcome<T>,
    sub: &ArgMatches,
    default_output: &str,
) -> Result<()> {
    let path = sub
        .get_one::<String>("output")
        .map(String::as_str)
        .unwrap_or(default_output);

    let json = serde_json::to_string_pretty(&outcome.records)?;
    std::fs::write(path, json)?;

    info!(
        records = outcome.records.len(),
        requests = engine.requests_issued(),
        output = path,
        "gather complete"
    );
    if !outcome.is_clean() {
        warn!(
            diagnostics = outcome.diagnostics.len(),
            "gather finished with tolerated failures"
        );
        for diagnostic in &outcome.diagnostics {
            warn!(?diagnostic, "tolerated failure");
        }
    }

    Ok(())
}

/// Initialize logging and tracing
fn init_logging(config: &Config) -> Result<()> {
    let log_level: tracing::Level =
        config.logging.level.parse().map_err(|_| IngestError::Config {
            message: format!("Invalid log level: {}", config.logging.level),
        })?;
    let filter = tracing_subscriber::filter::LevelFilter::from_level(log_level);

    if config.logging.json_format {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .json()
                    .with_filter(filter),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_filter(filter),
            )
            .init();
    }

    info!("Logging initialized with level: {}", config.logging.level);
    Ok(())
}
