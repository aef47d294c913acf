//! `orbitcache` command-line entry point.
//!
//! # Responsibility
//! - `refresh`: download a catalog group and upsert it into the local cache.
//! - `propagate`: propagate the cached set to `now + N minutes` and print it.
//!
//! # Invariants
//! - Results go to stdout; diagnostics and failure counts go to stderr.
//! - An empty cache ends the run with a message and a non-zero exit status.

mod render;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use log::info;
use orbitcache_core::db::open_db;
use orbitcache_core::{
    default_log_level, init_logging, AppConfig, ElementService, HttpCatalogFetcher,
    PropagationEngine, ServiceError, Sgp4Propagator, SqliteElementRepository,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "orbitcache",
    version,
    about = "Cache TLE element sets locally and propagate them with SGP4"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON config file with catalog_url, store_path, group, fetch_timeout_secs
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rotating log files (default: stderr)
    #[arg(long, global = true)]
    log_dir: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a catalog group and upsert it into the cache
    Refresh(RefreshArgs),

    /// Propagate cached element sets to a target time
    Propagate(PropagateArgs),
}

#[derive(Args)]
struct RefreshArgs {
    /// Path to the SQLite cache
    #[arg(long)]
    db: Option<PathBuf>,

    /// Catalog group, e.g. active, stations, starlink
    #[arg(long)]
    group: Option<String>,

    /// Catalog endpoint URL
    #[arg(long)]
    catalog_url: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Args)]
struct PropagateArgs {
    /// Path to the SQLite cache
    #[arg(long)]
    db: Option<PathBuf>,

    /// Maximum number of satellites to propagate (0 = all)
    #[arg(long, default_value_t = 20)]
    limit: u32,

    /// Minutes into the future to propagate to (negative looks back)
    #[arg(long = "future-min", default_value_t = 60, allow_negative_numbers = true)]
    future_min: i64,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    // stderr output stays quiet unless asked for; file logs follow build mode.
    let level = cli.log_level.as_deref().unwrap_or(match cli.log_dir {
        Some(_) => default_log_level(),
        None => "warn",
    });
    init_logging(level, cli.log_dir.as_deref()).map_err(anyhow::Error::msg)?;

    let mut config = match cli.config.as_ref() {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Refresh(args) => {
            if let Some(db) = args.db {
                config.store_path = db;
            }
            if let Some(group) = args.group {
                config.group = group;
            }
            if let Some(url) = args.catalog_url {
                config.catalog_url = url;
            }
            if let Some(secs) = args.timeout_secs {
                config.fetch_timeout = Duration::from_secs(secs);
            }
            config.validate()?;
            refresh(&config)
        }
        Commands::Propagate(args) => {
            if let Some(db) = args.db.clone() {
                config.store_path = db;
            }
            config.validate()?;
            propagate(&config, &args)
        }
    }
}

fn refresh(config: &AppConfig) -> Result<ExitCode> {
    let fetched_at = Utc::now();
    let fetcher = HttpCatalogFetcher::from_config(config)?;
    let mut conn = open_db(&config.store_path)
        .with_context(|| format!("opening {}", config.store_path.display()))?;
    let mut service = ElementService::new(SqliteElementRepository::try_new(&mut conn)?);

    let summary = service.refresh(&fetcher, &config.group, fetched_at)?;
    info!(
        "event=cli_refresh module=cli status=ok group={} upserted={}",
        config.group, summary.upserted
    );
    println!(
        "Upserted {} satellites into {} (table: latest_tles, dropped {} malformed triples)",
        summary.upserted,
        config.store_path.display(),
        summary.dropped
    );
    Ok(ExitCode::SUCCESS)
}

fn propagate(config: &AppConfig, args: &PropagateArgs) -> Result<ExitCode> {
    let mut conn = open_db(&config.store_path)
        .with_context(|| format!("opening {}", config.store_path.display()))?;
    let service = ElementService::new(SqliteElementRepository::try_new(&mut conn)?);
    let engine = PropagationEngine::new(Sgp4Propagator::new());

    let report = match service.query_ahead(&engine, args.limit, Utc::now(), args.future_min) {
        Ok(report) => report,
        Err(ServiceError::EmptyStore) => {
            eprintln!("No TLEs found in {}", config.store_path.display());
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err.into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render::header_line(&report));
        println!("{}", render::FORMAT_LEGEND);
        for result in &report.results {
            println!("{}", render::result_line(result));
        }
    }
    if report.failure_count() > 0 {
        eprintln!(
            "{} satellites failed to propagate",
            report.failure_count()
        );
    }
    Ok(ExitCode::SUCCESS)
}
