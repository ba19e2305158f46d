#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the Gotham data ingestion tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gotham_database::{db, schema};
use gotham_ingest::{
    DEFAULT_CSV_PATH, DEFAULT_LIVE_LIMIT, SAMPLE_CSV_PATH, ensure_source_csv, ingest_csv,
    ingest_live, seed_boroughs,
};
use gotham_source::sample;

#[derive(Parser)]
#[command(name = "gotham_ingest", about = "Gotham crime data ingestion tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full load: create tables, seed boroughs, and load the CSV
    /// (generating sample data if none exists)
    Ingest {
        /// Path to the crime data CSV
        #[arg(long, default_value = DEFAULT_CSV_PATH)]
        csv: PathBuf,
    },
    /// Sync recent records from the live NYPD complaint feed
    Live {
        /// Maximum number of records to fetch
        #[arg(long, default_value_t = DEFAULT_LIVE_LIMIT)]
        limit: u64,
    },
    /// Seed the borough reference table
    Seed,
    /// Regenerate the synthetic sample CSV
    Sample,
    /// Create database tables only
    Schema,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest { csv } => {
            log::info!("Starting Gotham data ingestion...");
            let (db, kind, _) = db::connect_from_env().await?;
            schema::create_tables(db.as_ref(), kind).await?;
            seed_boroughs(db.as_ref()).await?;

            let csv_path = ensure_source_csv(&csv)?;
            let report = ingest_csv(db.as_ref(), &csv_path).await?;
            log::info!(
                "Data ingestion completed: {} inserted, {} failed",
                report.inserted,
                report.failed
            );
        }
        Commands::Live { limit } => {
            let (db, kind, _) = db::connect_from_env().await?;
            schema::create_tables(db.as_ref(), kind).await?;
            let report = ingest_live(db.as_ref(), limit).await?;
            log::info!(
                "Live sync completed: {} inserted, {} failed",
                report.inserted,
                report.failed
            );
        }
        Commands::Seed => {
            let (db, kind, _) = db::connect_from_env().await?;
            schema::create_tables(db.as_ref(), kind).await?;
            seed_boroughs(db.as_ref()).await?;
        }
        Commands::Sample => {
            let events = sample::generate_sample_events();
            sample::write_sample_csv(&PathBuf::from(SAMPLE_CSV_PATH), &events)?;
        }
        Commands::Schema => {
            let (db, kind, url) = db::connect_from_env().await?;
            schema::create_tables(db.as_ref(), kind).await?;
            log::info!("Schema created for {}", db::redact_url(&url));
        }
    }

    Ok(())
}
