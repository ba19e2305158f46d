//! Idempotent schema creation.
//!
//! There is no migration system; tables are created with
//! `CREATE TABLE IF NOT EXISTS` and never altered. The only engine-specific
//! piece is the auto-incrementing primary key spelling, so each table's DDL
//! is built around a per-engine `id` column definition.

use switchy_database::Database;

use crate::DbError;
use crate::db::DatabaseKind;

fn id_column(kind: DatabaseKind) -> &'static str {
    match kind {
        DatabaseKind::Sqlite => "id INTEGER PRIMARY KEY AUTOINCREMENT",
        DatabaseKind::Postgres => "id BIGSERIAL PRIMARY KEY",
    }
}

/// Creates all tables and indexes if they do not already exist.
///
/// # Errors
///
/// Returns [`DbError`] if any DDL statement fails.
pub async fn create_tables(db: &dyn Database, kind: DatabaseKind) -> Result<(), DbError> {
    let id = id_column(kind);

    db.exec_raw(&format!(
        "CREATE TABLE IF NOT EXISTS crime_events (
            {id},
            complaint_number TEXT UNIQUE,
            occurrence_date TEXT,
            report_date TEXT,
            offense_description TEXT,
            law_category TEXT,
            specific_offense TEXT,
            borough TEXT,
            precinct INTEGER,
            jurisdiction TEXT,
            address TEXT,
            intersection TEXT,
            latitude DOUBLE PRECISION,
            longitude DOUBLE PRECISION,
            location_description TEXT,
            premises_type TEXT,
            status TEXT NOT NULL DEFAULT 'OPEN',
            arrest_made BOOLEAN NOT NULL DEFAULT FALSE,
            victim_age_group TEXT,
            victim_gender TEXT,
            victim_race TEXT,
            suspect_age_group TEXT,
            suspect_gender TEXT,
            suspect_race TEXT,
            case_notes TEXT,
            created_at TEXT,
            updated_at TEXT,
            data_source TEXT NOT NULL DEFAULT 'NYC_OPENDATA',
            data_quality_score DOUBLE PRECISION NOT NULL DEFAULT 1.0
        )"
    ))
    .await?;

    db.exec_raw(&format!(
        "CREATE TABLE IF NOT EXISTS boroughs (
            {id},
            name TEXT NOT NULL UNIQUE,
            population BIGINT NOT NULL DEFAULT 0,
            area_sq_miles DOUBLE PRECISION NOT NULL DEFAULT 0.0,
            total_crimes BIGINT NOT NULL DEFAULT 0,
            crime_rate_per_1000 DOUBLE PRECISION NOT NULL DEFAULT 0.0,
            north_bound DOUBLE PRECISION NOT NULL DEFAULT 0.0,
            south_bound DOUBLE PRECISION NOT NULL DEFAULT 0.0,
            east_bound DOUBLE PRECISION NOT NULL DEFAULT 0.0,
            west_bound DOUBLE PRECISION NOT NULL DEFAULT 0.0,
            created_at TEXT
        )"
    ))
    .await?;

    db.exec_raw(&format!(
        "CREATE TABLE IF NOT EXISTS crime_stats (
            {id},
            stat_date TEXT,
            period_type TEXT,
            borough TEXT,
            precinct INTEGER,
            offense_category TEXT,
            crime_count BIGINT NOT NULL DEFAULT 0,
            arrest_count BIGINT NOT NULL DEFAULT 0,
            clearance_rate DOUBLE PRECISION NOT NULL DEFAULT 0.0,
            change_from_previous DOUBLE PRECISION NOT NULL DEFAULT 0.0,
            trend_direction TEXT,
            created_at TEXT
        )"
    ))
    .await?;

    for stmt in [
        "CREATE INDEX IF NOT EXISTS idx_crime_events_occurrence_date
            ON crime_events (occurrence_date)",
        "CREATE INDEX IF NOT EXISTS idx_crime_events_borough
            ON crime_events (borough)",
        "CREATE INDEX IF NOT EXISTS idx_crime_events_offense
            ON crime_events (offense_description)",
        "CREATE INDEX IF NOT EXISTS idx_crime_events_location
            ON crime_events (latitude, longitude)",
        "CREATE INDEX IF NOT EXISTS idx_crime_stats_date
            ON crime_stats (stat_date)",
    ] {
        db.exec_raw(stmt).await?;
    }

    log::debug!("Schema ensured ({})", kind.as_str());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connect_memory() -> Box<dyn Database> {
        switchy_database_connection::init_sqlite_rusqlite(None).unwrap()
    }

    #[tokio::test]
    async fn creates_schema_idempotently() {
        let db = connect_memory();
        create_tables(db.as_ref(), DatabaseKind::Sqlite).await.unwrap();
        // A second run must be a no-op, not an error.
        create_tables(db.as_ref(), DatabaseKind::Sqlite).await.unwrap();

        let rows = db
            .query_raw_params("SELECT COUNT(*) AS total FROM crime_events", &[])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }
}
