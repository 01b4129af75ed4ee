//! SECS Log Analyzer CLI Application
//!
//! Command-line front end for the secs-log-decoder library. It loads code-table
//! overrides and analyzer settings, runs one log through the KPI engine and
//! writes the result as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use secs_log_decoder::Decoder;
use std::fs;
use std::path::PathBuf;

mod config;
mod report;

use config::AppConfig;
use report::Report;

/// SECS Log Analyzer - Derive KPIs from panel handler equipment logs
#[derive(Parser, Debug)]
#[command(name = "secs-log-cli")]
#[command(about = "Decode SECS/GEM equipment logs and compute job KPIs", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the equipment log file to analyze
    #[arg(short, long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Path to code-table override file(s) (can be repeated)
    #[arg(long, value_name = "FILE")]
    codes: Vec<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output file for the JSON report (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Include the normalized event table in the report
    #[arg(long)]
    events: bool,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("SECS Log Analyzer CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", secs_log_decoder::VERSION);

    let Some(log_path) = args.log.clone() else {
        println!("SECS Log Analyzer - No input specified");
        println!("\nQuick Start:");
        println!("  secs-log-cli --log equipment.log --pretty");
        println!("  secs-log-cli --log equipment.log --codes site_alarms.toml --output report.json");
        println!("\nUse --help for more options");
        return Ok(());
    };

    let mut app_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };
    merge_args(&mut app_config, &args);

    let mut decoder = Decoder::new();
    for path in &app_config.codes.files {
        decoder
            .add_code_table(path)
            .with_context(|| format!("Failed to load code table {:?}", path))?;
    }

    let stats = decoder.code_table_stats();
    log::debug!(
        "Code tables: {} events, {} reports, {} alarms",
        stats.num_events,
        stats.num_reports,
        stats.num_alarms
    );

    let analysis = decoder
        .analyze_file(&log_path, &app_config.analysis)
        .with_context(|| format!("Failed to analyze {:?}", log_path))?;

    let json = Report::new(&analysis, app_config.output.include_events)
        .to_json(app_config.output.pretty)?;

    match &app_config.output.output_file {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
            if !args.quiet {
                println!("{}", report::overview(&analysis.summary));
                println!("\nReport written to {:?}", path);
            }
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Command-line flags take precedence over the configuration file
fn merge_args(config: &mut AppConfig, args: &Args) {
    config.codes.files.extend(args.codes.iter().cloned());
    if args.output.is_some() {
        config.output.output_file = args.output.clone();
    }
    config.output.include_events |= args.events;
    config.output.pretty |= args.pretty;
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
