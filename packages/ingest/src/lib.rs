#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Batch ingestion for the Gotham crime database.
//!
//! Loads are clear-then-reload: the `crime_events` table is emptied before a
//! fresh CSV or live-feed load, with inserts committed in chunks. This runs
//! as an offline batch tool, not alongside live readers — a reader querying
//! mid-load can observe a partially loaded table.

use std::path::{Path, PathBuf};

use gotham_database::queries;
use gotham_models::{NYC_BOROUGHS, NewCrimeEvent};
use gotham_source::{SourceError, csv_import, sample, socrata};
use switchy_database::Database;

/// Default CSV location the `ingest` subcommand looks for.
pub const DEFAULT_CSV_PATH: &str = "data/nyc_crime_data.csv";

/// Where the generated fallback CSV is written.
pub const SAMPLE_CSV_PATH: &str = "data/sample_crime_data.csv";

/// How many rows are committed per transaction.
const COMMIT_CHUNK_SIZE: usize = 100;

/// Default record cap for a live feed sync.
pub const DEFAULT_LIVE_LIMIT: u64 = 5000;

/// Errors that can occur during an ingestion run.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Db(#[from] gotham_database::DbError),

    /// Transaction control failed.
    #[error("Database error: {0}")]
    Transaction(#[from] switchy_database::DatabaseError),

    /// Source data could not be read or fetched.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Outcome of one batch load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Rows successfully inserted.
    pub inserted: u64,
    /// Rows that failed to map or insert and were skipped.
    pub failed: u64,
}

/// Returns a CSV path that is guaranteed to exist.
///
/// If `csv_path` is missing, generates the synthetic sample dataset, writes
/// it to [`SAMPLE_CSV_PATH`], and returns that instead.
///
/// # Errors
///
/// Returns [`IngestError`] if the fallback CSV cannot be written.
pub fn ensure_source_csv(csv_path: &Path) -> Result<PathBuf, IngestError> {
    if csv_path.exists() {
        return Ok(csv_path.to_path_buf());
    }

    log::info!(
        "No crime data found at {}, generating sample data",
        csv_path.display()
    );
    let events = sample::generate_sample_events();
    let sample_path = PathBuf::from(SAMPLE_CSV_PATH);
    sample::write_sample_csv(&sample_path, &events)?;

    Ok(sample_path)
}

/// Inserts one row inside a savepoint so a failure cannot poison the rest
/// of the chunk transaction.
///
/// On Postgres a failed statement aborts the enclosing transaction until it
/// is rolled back; rolling back to a per-row savepoint keeps the chunk
/// usable on both engines. `SAVEPOINT` / `RELEASE` / `ROLLBACK TO` spell
/// the same in `SQLite` and Postgres.
async fn insert_in_savepoint(
    txn: &dyn Database,
    index: usize,
    event: &NewCrimeEvent,
) -> Result<bool, IngestError> {
    txn.exec_raw(&format!("SAVEPOINT row_{index}")).await?;

    match queries::insert_crime_event(txn, event).await {
        Ok(()) => {
            txn.exec_raw(&format!("RELEASE row_{index}")).await?;
            Ok(true)
        }
        Err(e) => {
            txn.exec_raw(&format!("ROLLBACK TO row_{index}")).await?;
            txn.exec_raw(&format!("RELEASE row_{index}")).await?;
            log::warn!("Failed to insert row: {e}");
            Ok(false)
        }
    }
}

/// Clears `crime_events` and inserts the given rows in committed chunks.
///
/// `Err` entries in `rows` (rows that failed to parse or map) and per-row
/// insert failures (e.g. duplicate complaint numbers) are logged, counted,
/// and skipped. A failed chunk commit aborts the load.
async fn reload_events(
    db: &dyn Database,
    rows: Vec<Result<NewCrimeEvent, SourceError>>,
) -> Result<IngestReport, IngestError> {
    log::info!("Clearing existing crime data");
    let deleted = queries::delete_all_crimes(db).await?;
    log::info!("Deleted {deleted} existing rows");

    let mut report = IngestReport::default();

    for chunk in rows.chunks(COMMIT_CHUNK_SIZE) {
        let txn = db.begin_transaction().await?;

        for (index, row) in chunk.iter().enumerate() {
            match row {
                Ok(event) => {
                    if insert_in_savepoint(txn.as_ref(), index, event).await? {
                        report.inserted += 1;
                    } else {
                        report.failed += 1;
                    }
                }
                Err(e) => {
                    log::warn!("Skipping unusable row: {e}");
                    report.failed += 1;
                }
            }
        }

        txn.commit().await?;

        if report.inserted > 0 && report.inserted % 1000 == 0 {
            log::info!("Processed {} records...", report.inserted);
        }
    }

    log::info!(
        "Load complete: {} inserted, {} failed",
        report.inserted,
        report.failed
    );

    Ok(report)
}

/// Loads crime events from a CSV file, replacing all existing rows.
///
/// # Errors
///
/// Returns [`IngestError`] if the file cannot be read or a chunk commit
/// fails; individual bad rows are counted in the report instead.
pub async fn ingest_csv(db: &dyn Database, csv_path: &Path) -> Result<IngestReport, IngestError> {
    log::info!("Starting data ingestion from {}", csv_path.display());
    let rows = csv_import::read_records(csv_path)?;
    reload_events(db, rows).await
}

/// Syncs up to `limit` records from the live NYPD complaint feed, replacing
/// all existing rows.
///
/// Feed records missing coordinates or an occurrence date are dropped
/// before loading and counted as failures.
///
/// # Errors
///
/// Returns [`IngestError`] if the fetch fails or a chunk commit fails.
pub async fn ingest_live(db: &dyn Database, limit: u64) -> Result<IngestReport, IngestError> {
    let records = socrata::fetch_nyc_records(limit).await?;
    let raw_count = records.len();

    let rows: Vec<Result<NewCrimeEvent, SourceError>> = records
        .into_iter()
        .map(|record| {
            socrata::map_socrata_record(record).ok_or_else(|| SourceError::Mapping {
                message: "missing coordinates or occurrence date".to_string(),
            })
        })
        .collect();

    let usable = rows.iter().filter(|r| r.is_ok()).count();
    log::info!("Mapped {usable}/{raw_count} feed records");

    reload_events(db, rows).await
}

/// Seeds the `boroughs` reference table from the fixed five-borough list.
///
/// Delete-then-insert, so re-running always reproduces the same rows.
///
/// # Errors
///
/// Returns [`IngestError`] if a database operation fails.
pub async fn seed_boroughs(db: &dyn Database) -> Result<(), IngestError> {
    log::info!("Initializing borough data");

    queries::clear_boroughs(db).await?;
    for info in &NYC_BOROUGHS {
        queries::insert_borough(db, info).await?;
    }

    log::info!("Borough data initialized");

    Ok(())
}

#[cfg(test)]
mod tests {
    use gotham_database::db::DatabaseKind;
    use gotham_database::schema::create_tables;
    use gotham_models::CrimeQuery;
    use gotham_source::csv_import::CsvRecord;

    use super::*;

    async fn connect_with_schema() -> Box<dyn Database> {
        let db = switchy_database_connection::init_sqlite_rusqlite(None).unwrap();
        create_tables(db.as_ref(), DatabaseKind::Sqlite)
            .await
            .unwrap();
        db
    }

    fn csv_row(complaint: &str, occurred: &str) -> Result<NewCrimeEvent, SourceError> {
        let record = CsvRecord {
            complaint_number: Some(complaint.to_string()),
            occurrence_date: Some(occurred.to_string()),
            offense_description: Some("ROBBERY".to_string()),
            law_category: Some("FELONY".to_string()),
            borough: Some("QUEENS".to_string()),
            latitude: Some("40.72".to_string()),
            longitude: Some("-73.80".to_string()),
            ..CsvRecord::default()
        };
        csv_import::map_record(0, record)
    }

    #[tokio::test]
    async fn seeding_twice_reproduces_the_same_rows() {
        let db = connect_with_schema().await;

        seed_boroughs(db.as_ref()).await.unwrap();
        let first = queries::list_boroughs(db.as_ref()).await.unwrap();

        seed_boroughs(db.as_ref()).await.unwrap();
        let second = queries::list_boroughs(db.as_ref()).await.unwrap();

        assert_eq!(first.len(), 5);
        assert_eq!(second.len(), 5);
        let names: Vec<_> = second.iter().map(|b| b.name.clone()).collect();
        assert_eq!(
            names,
            vec!["BRONX", "BROOKLYN", "MANHATTAN", "QUEENS", "STATEN ISLAND"]
        );
        assert_eq!(
            first.iter().map(|b| &b.name).collect::<Vec<_>>(),
            second.iter().map(|b| &b.name).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn reload_counts_good_and_bad_rows() {
        let db = connect_with_schema().await;

        // Pre-existing data must not survive the reload.
        queries::insert_crime_event(
            db.as_ref(),
            &csv_row("OLD0000001", "2023-01-01 00:00:00").unwrap(),
        )
        .await
        .unwrap();

        let rows = vec![
            csv_row("2024000001", "2024-03-01 10:00:00"),
            csv_row("2024000002", "2024-03-02 11:00:00"),
            Err(SourceError::Mapping {
                message: "Row 2: invalid precinct \"abc\"".to_string(),
            }),
            csv_row("2024000003", "2024-03-03 12:00:00"),
        ];

        let report = reload_events(db.as_ref(), rows).await.unwrap();
        assert_eq!(report.inserted, 3);
        assert_eq!(report.failed, 1);

        let query = CrimeQuery {
            limit: 100,
            ..CrimeQuery::default()
        };
        assert_eq!(queries::count_crimes(db.as_ref(), &query).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn duplicate_insert_does_not_poison_the_chunk() {
        let db = connect_with_schema().await;

        // The duplicate fails at insert time, inside the chunk transaction;
        // rows after it must still commit.
        let rows = vec![
            csv_row("2024000001", "2024-03-01 10:00:00"),
            csv_row("2024000001", "2024-03-02 11:00:00"),
            csv_row("2024000002", "2024-03-03 12:00:00"),
        ];

        let report = reload_events(db.as_ref(), rows).await.unwrap();
        assert_eq!(report.inserted, 2);
        assert_eq!(report.failed, 1);

        let query = CrimeQuery {
            limit: 100,
            ..CrimeQuery::default()
        };
        assert_eq!(queries::count_crimes(db.as_ref(), &query).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn timeline_stays_within_window_and_ascends() {
        let db = connect_with_schema().await;

        let rows = vec![
            csv_row("2024000001", "2024-06-01 10:00:00"),
            csv_row("2024000002", "2024-06-03 11:00:00"),
            csv_row("2024000003", "2024-06-03 12:00:00"),
            // Outside the window on either side.
            csv_row("2024000004", "2024-05-01 09:00:00"),
            csv_row("2024000005", "2024-08-15 09:00:00"),
        ];
        reload_events(db.as_ref(), rows).await.unwrap();

        let since = chrono::NaiveDate::from_ymd_opt(2024, 5, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let until = chrono::NaiveDate::from_ymd_opt(2024, 6, 14)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let days = queries::timeline(db.as_ref(), since, until).await.unwrap();

        assert_eq!(
            days,
            vec![("2024-06-01".to_string(), 1), ("2024-06-03".to_string(), 2)]
        );
        for (day, _) in &days {
            assert!(day.as_str() >= "2024-05-15");
            assert!(day.as_str() <= "2024-06-14");
        }
    }
}
