//! Outage Crawler CLI
//!
//! Local execution entry point for scheduled runs.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use outage_crawler::{error::Result, models::Config, pipeline, storage::Store};

/// Outage Crawler - power outage and demand history collector
#[derive(Parser, Debug)]
#[command(name = "outage-crawler", version, about = "Power outage history crawler")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "outages.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch all feeds and append new records
    Run {
        /// Read and populate the response cache
        #[arg(long, conflicts_with = "no_cache")]
        cache: bool,

        /// Bypass the response cache
        #[arg(long)]
        no_cache: bool,

        /// Cache directory (default from config)
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// SQLite database path (default from config)
        #[arg(long)]
        database: Option<PathBuf>,
    },

    /// Validate configuration
    Validate,

    /// Show schema version and row counts
    Info {
        /// SQLite database path (default from config)
        #[arg(long)]
        database: Option<PathBuf>,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Run failed: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn execute(cli: Cli) -> Result<()> {
    let mut config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Run {
            cache,
            no_cache,
            cache_dir,
            database,
        } => {
            if cache {
                config.cache.enabled = true;
            }
            if no_cache {
                config.cache.enabled = false;
            }
            if let Some(dir) = cache_dir {
                config.cache.dir = dir;
            }
            if let Some(path) = database {
                config.storage.database_path = path;
            }
            config.validate()?;

            let report = pipeline::run(&config)?;

            println!(
                "Added demand ({} MW, rating {}) and summary ({} customers affected).",
                report.demand.demand, report.demand.rating, report.summary.total_customers_affected
            );
            println!(
                "Events: {} added, {} skipped of {} seen.",
                report.events_added, report.events_skipped, report.events_seen
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            config.validate()?;
            log::info!("✓ Config OK");
        }

        Command::Info { database } => {
            let path = database.unwrap_or_else(|| config.storage.database_path.clone());
            let store = Store::open(&path)?;
            let stats = store.stats()?;

            println!("Database: {}", path.display());
            println!("Schema version: {}", stats.schema_version);
            println!("Demand rows: {}", stats.demand_rows);
            println!("Summary rows: {}", stats.summary_rows);
            println!("Event rows: {}", stats.event_rows);
        }
    }

    Ok(())
}
