//! Database query functions for crime event data.
//!
//! All queries use `query_raw_params()` / `exec_raw_params()` with `$N`
//! placeholders, which both supported engines accept. Timestamps are
//! compared as `YYYY-MM-DD HH:MM:SS` text, which sorts chronologically.

use std::fmt::Write as _;

use chrono::NaiveDateTime;
use gotham_models::{
    Borough, BoroughInfo, CrimeEvent, CrimeQuery, NewCrimeEvent, format_timestamp, parse_timestamp,
};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};

use crate::DbError;

/// Per-borough aggregate produced by [`borough_stats`].
#[derive(Debug, Clone, PartialEq)]
pub struct BoroughActivity {
    /// Borough name as stored.
    pub borough: String,
    /// Total crime events in this borough.
    pub total: u64,
    /// Number of distinct offense descriptions seen.
    pub unique_offenses: u64,
    /// Mean latitude over geocoded rows, if any.
    pub avg_latitude: Option<f64>,
    /// Mean longitude over geocoded rows, if any.
    pub avg_longitude: Option<f64>,
}

/// One geocoded point for the heatmap endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapPoint {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Offense description, if present.
    pub offense: Option<String>,
}

/// Builds the WHERE-clause fragments for a [`CrimeQuery`].
///
/// Returns a string of ` AND ...` predicates (empty when the query has no
/// filters) plus the parameter values, with placeholders numbered from
/// `start_idx`. Substring filters are case-insensitive; the bounding box is
/// applied only when the query carries a complete one.
#[must_use]
pub fn build_filter(query: &CrimeQuery, start_idx: usize) -> (String, Vec<DatabaseValue>) {
    let mut sql = String::new();
    let mut params: Vec<DatabaseValue> = Vec::new();
    let mut param_idx = start_idx;

    if let Some(borough) = &query.borough {
        write!(sql, " AND UPPER(borough) LIKE ${param_idx}").unwrap();
        params.push(DatabaseValue::String(format!(
            "%{}%",
            borough.to_uppercase()
        )));
        param_idx += 1;
    }

    if let Some(offense) = &query.offense {
        write!(sql, " AND UPPER(offense_description) LIKE ${param_idx}").unwrap();
        params.push(DatabaseValue::String(format!(
            "%{}%",
            offense.to_uppercase()
        )));
        param_idx += 1;
    }

    if let Some(start) = &query.start_date {
        write!(sql, " AND occurrence_date >= ${param_idx}").unwrap();
        params.push(DatabaseValue::String(format_timestamp(*start)));
        param_idx += 1;
    }

    if let Some(end) = &query.end_date {
        write!(sql, " AND occurrence_date <= ${param_idx}").unwrap();
        params.push(DatabaseValue::String(format_timestamp(*end)));
        param_idx += 1;
    }

    if let Some(bbox) = &query.bbox {
        write!(
            sql,
            " AND latitude >= ${} AND latitude <= ${} AND longitude >= ${} AND longitude <= ${}",
            param_idx,
            param_idx + 1,
            param_idx + 2,
            param_idx + 3,
        )
        .unwrap();
        params.push(DatabaseValue::Real64(bbox.lat_min));
        params.push(DatabaseValue::Real64(bbox.lat_max));
        params.push(DatabaseValue::Real64(bbox.lng_min));
        params.push(DatabaseValue::Real64(bbox.lng_max));
    }

    (sql, params)
}

const CRIME_EVENT_COLUMNS: &str = "id, complaint_number, occurrence_date, report_date,
        offense_description, law_category, specific_offense, borough, precinct,
        jurisdiction, address, intersection, latitude, longitude,
        location_description, premises_type, status, arrest_made,
        victim_age_group, victim_gender, victim_race,
        suspect_age_group, suspect_gender, suspect_race,
        case_notes, created_at, updated_at, data_source, data_quality_score";

fn timestamp_col(row: &Row, col: &str) -> Option<NaiveDateTime> {
    let raw: Option<String> = row.to_value(col).unwrap_or(None);
    raw.as_deref().and_then(parse_timestamp)
}

fn crime_event_from_row(row: &Row) -> Result<CrimeEvent, DbError> {
    let id: i64 = row.to_value("id").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse crime event id: {e}"),
    })?;

    let status: Option<String> = row.to_value("status").unwrap_or(None);
    let data_source: Option<String> = row.to_value("data_source").unwrap_or(None);

    Ok(CrimeEvent {
        id,
        complaint_number: row.to_value("complaint_number").unwrap_or(None),
        occurrence_date: timestamp_col(row, "occurrence_date"),
        report_date: timestamp_col(row, "report_date"),
        offense_description: row.to_value("offense_description").unwrap_or(None),
        law_category: row.to_value("law_category").unwrap_or(None),
        specific_offense: row.to_value("specific_offense").unwrap_or(None),
        borough: row.to_value("borough").unwrap_or(None),
        precinct: row.to_value("precinct").unwrap_or(None),
        jurisdiction: row.to_value("jurisdiction").unwrap_or(None),
        address: row.to_value("address").unwrap_or(None),
        intersection: row.to_value("intersection").unwrap_or(None),
        latitude: row.to_value("latitude").unwrap_or(None),
        longitude: row.to_value("longitude").unwrap_or(None),
        location_description: row.to_value("location_description").unwrap_or(None),
        premises_type: row.to_value("premises_type").unwrap_or(None),
        status: status.unwrap_or_else(|| "OPEN".to_string()),
        arrest_made: row.to_value("arrest_made").unwrap_or(false),
        victim_age_group: row.to_value("victim_age_group").unwrap_or(None),
        victim_gender: row.to_value("victim_gender").unwrap_or(None),
        victim_race: row.to_value("victim_race").unwrap_or(None),
        suspect_age_group: row.to_value("suspect_age_group").unwrap_or(None),
        suspect_gender: row.to_value("suspect_gender").unwrap_or(None),
        suspect_race: row.to_value("suspect_race").unwrap_or(None),
        case_notes: row.to_value("case_notes").unwrap_or(None),
        created_at: timestamp_col(row, "created_at"),
        updated_at: timestamp_col(row, "updated_at"),
        data_source: data_source.unwrap_or_else(|| "NYC_OPENDATA".to_string()),
        data_quality_score: row.to_value("data_quality_score").unwrap_or(1.0),
    })
}

fn count_from_rows(rows: &[Row], col: &str) -> u64 {
    rows.first()
        .map_or(0, |row| row.to_value::<i64>(col).unwrap_or(0))
        .try_into()
        .unwrap_or(0)
}

/// Counts crime events matching the query filters (pagination ignored).
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn count_crimes(db: &dyn Database, query: &CrimeQuery) -> Result<u64, DbError> {
    let (filter, params) = build_filter(query, 1);
    let sql = format!("SELECT COUNT(*) AS total FROM crime_events WHERE 1=1{filter}");

    let rows = db.query_raw_params(&sql, &params).await?;

    Ok(count_from_rows(&rows, "total"))
}

/// Queries a page of crime events, newest occurrence first.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_crimes(db: &dyn Database, query: &CrimeQuery) -> Result<Vec<CrimeEvent>, DbError> {
    let (filter, mut params) = build_filter(query, 1);
    let mut sql = format!("SELECT {CRIME_EVENT_COLUMNS} FROM crime_events WHERE 1=1{filter}");

    sql.push_str(" ORDER BY occurrence_date DESC");

    let mut param_idx = params.len() + 1;
    write!(sql, " LIMIT ${param_idx}").unwrap();
    params.push(DatabaseValue::Int64(
        i64::try_from(query.limit).unwrap_or(i64::MAX),
    ));
    param_idx += 1;

    write!(sql, " OFFSET ${param_idx}").unwrap();
    params.push(DatabaseValue::Int64(
        i64::try_from(query.skip).unwrap_or(i64::MAX),
    ));

    let rows = db.query_raw_params(&sql, &params).await?;

    let mut events = Vec::with_capacity(rows.len());
    for row in &rows {
        events.push(crime_event_from_row(row)?);
    }

    Ok(events)
}

/// Fetches a single crime event by ID, or `None` if it does not exist.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get_crime(db: &dyn Database, id: i64) -> Result<Option<CrimeEvent>, DbError> {
    let rows = db
        .query_raw_params(
            &format!("SELECT {CRIME_EVENT_COLUMNS} FROM crime_events WHERE id = $1"),
            &[DatabaseValue::Int64(id)],
        )
        .await?;

    rows.first().map(crime_event_from_row).transpose()
}

/// Inserts a single crime event, stamping `created_at` with the current time.
///
/// Duplicate complaint numbers violate the unique constraint and surface as
/// a [`DbError::Database`]; callers in the ingest path count and skip them.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert_crime_event(db: &dyn Database, event: &NewCrimeEvent) -> Result<(), DbError> {
    fn opt_str(value: Option<&String>) -> DatabaseValue {
        value.map_or(DatabaseValue::Null, |s| DatabaseValue::String(s.clone()))
    }

    fn opt_timestamp(value: Option<&NaiveDateTime>) -> DatabaseValue {
        value.map_or(DatabaseValue::Null, |dt| {
            DatabaseValue::String(format_timestamp(*dt))
        })
    }

    let created_at = format_timestamp(chrono::Utc::now().naive_utc());

    db.exec_raw_params(
        "INSERT INTO crime_events (
            complaint_number, occurrence_date, report_date,
            offense_description, law_category, specific_offense,
            borough, precinct, address, latitude, longitude,
            location_description, premises_type, status, arrest_made,
            victim_age_group, victim_gender, victim_race,
            suspect_age_group, suspect_gender, suspect_race,
            data_source, data_quality_score, created_at
        ) VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
            $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24
        )",
        &[
            opt_str(event.complaint_number.as_ref()),
            opt_timestamp(event.occurrence_date.as_ref()),
            opt_timestamp(event.report_date.as_ref()),
            opt_str(event.offense_description.as_ref()),
            opt_str(event.law_category.as_ref()),
            opt_str(event.specific_offense.as_ref()),
            opt_str(event.borough.as_ref()),
            event
                .precinct
                .map_or(DatabaseValue::Null, DatabaseValue::Int32),
            opt_str(event.address.as_ref()),
            event
                .latitude
                .map_or(DatabaseValue::Null, DatabaseValue::Real64),
            event
                .longitude
                .map_or(DatabaseValue::Null, DatabaseValue::Real64),
            opt_str(event.location_description.as_ref()),
            opt_str(event.premises_type.as_ref()),
            DatabaseValue::String(event.status.clone()),
            DatabaseValue::Bool(event.arrest_made),
            opt_str(event.victim_age_group.as_ref()),
            opt_str(event.victim_gender.as_ref()),
            opt_str(event.victim_race.as_ref()),
            opt_str(event.suspect_age_group.as_ref()),
            opt_str(event.suspect_gender.as_ref()),
            opt_str(event.suspect_race.as_ref()),
            DatabaseValue::String(event.data_source.clone()),
            DatabaseValue::Real64(event.data_quality_score),
            DatabaseValue::String(created_at),
        ],
    )
    .await?;

    Ok(())
}

/// Deletes every row from `crime_events`.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn delete_all_crimes(db: &dyn Database) -> Result<u64, DbError> {
    let deleted = db
        .exec_raw_params("DELETE FROM crime_events", &[])
        .await?;
    Ok(deleted)
}

/// Counts crime events whose occurrence date is at or after `since`.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn recent_crime_count(db: &dyn Database, since: NaiveDateTime) -> Result<u64, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT COUNT(*) AS total FROM crime_events WHERE occurrence_date >= $1",
            &[DatabaseValue::String(format_timestamp(since))],
        )
        .await?;

    Ok(count_from_rows(&rows, "total"))
}

async fn grouped_counts(db: &dyn Database, column: &str) -> Result<Vec<(String, u64)>, DbError> {
    let sql = format!(
        "SELECT {column} AS grp, COUNT(*) AS total FROM crime_events
         WHERE {column} IS NOT NULL AND {column} <> ''
         GROUP BY {column}
         ORDER BY total DESC"
    );

    let rows = db.query_raw_params(&sql, &[]).await?;

    let mut counts = Vec::with_capacity(rows.len());
    for row in &rows {
        let key: Option<String> = row.to_value("grp").unwrap_or(None);
        let Some(key) = key else { continue };
        let total: i64 = row.to_value("total").unwrap_or(0);
        counts.push((key, total.try_into().unwrap_or(0)));
    }

    Ok(counts)
}

/// Crime counts grouped by borough, descending. Null and empty borough
/// values are excluded.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn counts_by_borough(db: &dyn Database) -> Result<Vec<(String, u64)>, DbError> {
    grouped_counts(db, "borough").await
}

/// Crime counts grouped by law category, descending. Null and empty
/// category values are excluded.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn counts_by_category(db: &dyn Database) -> Result<Vec<(String, u64)>, DbError> {
    grouped_counts(db, "law_category").await
}

/// Per-borough totals, distinct offense counts, and mean coordinates.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn borough_stats(db: &dyn Database) -> Result<Vec<BoroughActivity>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT borough,
                    COUNT(*) AS total,
                    COUNT(DISTINCT offense_description) AS unique_offenses,
                    AVG(latitude) AS avg_latitude,
                    AVG(longitude) AS avg_longitude
             FROM crime_events
             WHERE borough IS NOT NULL AND borough <> ''
             GROUP BY borough
             ORDER BY total DESC",
            &[],
        )
        .await?;

    let mut stats = Vec::with_capacity(rows.len());
    for row in &rows {
        let borough: Option<String> = row.to_value("borough").unwrap_or(None);
        let Some(borough) = borough else { continue };
        let total: i64 = row.to_value("total").unwrap_or(0);
        let unique_offenses: i64 = row.to_value("unique_offenses").unwrap_or(0);
        stats.push(BoroughActivity {
            borough,
            total: total.try_into().unwrap_or(0),
            unique_offenses: unique_offenses.try_into().unwrap_or(0),
            avg_latitude: row.to_value("avg_latitude").unwrap_or(None),
            avg_longitude: row.to_value("avg_longitude").unwrap_or(None),
        });
    }

    Ok(stats)
}

/// Daily crime counts in `[since, until]`, ascending by day.
///
/// The day key is the `YYYY-MM-DD` prefix of the stored timestamp text;
/// grouping on it yields one row per calendar day. The upper bound keeps
/// future-dated rows (the CSV path stores whatever the export says) out of
/// a "last N days" window.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn timeline(
    db: &dyn Database,
    since: NaiveDateTime,
    until: NaiveDateTime,
) -> Result<Vec<(String, u64)>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT substr(occurrence_date, 1, 10) AS day, COUNT(*) AS total
             FROM crime_events
             WHERE occurrence_date IS NOT NULL
               AND occurrence_date >= $1
               AND occurrence_date <= $2
             GROUP BY substr(occurrence_date, 1, 10)
             ORDER BY day ASC",
            &[
                DatabaseValue::String(format_timestamp(since)),
                DatabaseValue::String(format_timestamp(until)),
            ],
        )
        .await?;

    let mut days = Vec::with_capacity(rows.len());
    for row in &rows {
        let day: Option<String> = row.to_value("day").unwrap_or(None);
        let Some(day) = day else { continue };
        let total: i64 = row.to_value("total").unwrap_or(0);
        days.push((day, total.try_into().unwrap_or(0)));
    }

    Ok(days)
}

/// All geocoded points, optionally filtered by borough substring.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn heatmap_points(
    db: &dyn Database,
    borough: Option<&str>,
) -> Result<Vec<HeatmapPoint>, DbError> {
    let mut sql = String::from(
        "SELECT latitude, longitude, offense_description
         FROM crime_events
         WHERE latitude IS NOT NULL AND longitude IS NOT NULL",
    );
    let mut params: Vec<DatabaseValue> = Vec::new();

    if let Some(borough) = borough {
        sql.push_str(" AND UPPER(borough) LIKE $1");
        params.push(DatabaseValue::String(format!(
            "%{}%",
            borough.to_uppercase()
        )));
    }

    let rows = db.query_raw_params(&sql, &params).await?;

    let mut points = Vec::with_capacity(rows.len());
    for row in &rows {
        let latitude: Option<f64> = row.to_value("latitude").unwrap_or(None);
        let longitude: Option<f64> = row.to_value("longitude").unwrap_or(None);
        let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
            continue;
        };
        points.push(HeatmapPoint {
            latitude,
            longitude,
            offense: row.to_value("offense_description").unwrap_or(None),
        });
    }

    Ok(points)
}

/// Deletes every row from `boroughs`.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn clear_boroughs(db: &dyn Database) -> Result<(), DbError> {
    db.exec_raw("DELETE FROM boroughs").await?;
    Ok(())
}

/// Inserts one borough reference row from the static table.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert_borough(db: &dyn Database, info: &BoroughInfo) -> Result<(), DbError> {
    let created_at = format_timestamp(chrono::Utc::now().naive_utc());

    db.exec_raw_params(
        "INSERT INTO boroughs (
            name, population, area_sq_miles,
            north_bound, south_bound, east_bound, west_bound,
            created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        &[
            DatabaseValue::String(info.name.to_string()),
            DatabaseValue::Int64(info.population),
            DatabaseValue::Real64(info.area_sq_miles),
            DatabaseValue::Real64(info.north_bound),
            DatabaseValue::Real64(info.south_bound),
            DatabaseValue::Real64(info.east_bound),
            DatabaseValue::Real64(info.west_bound),
            DatabaseValue::String(created_at),
        ],
    )
    .await?;

    Ok(())
}

/// Lists all borough reference rows, alphabetically.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_boroughs(db: &dyn Database) -> Result<Vec<Borough>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, name, population, area_sq_miles, total_crimes,
                    crime_rate_per_1000, north_bound, south_bound,
                    east_bound, west_bound
             FROM boroughs
             ORDER BY name ASC",
            &[],
        )
        .await?;

    let mut boroughs = Vec::with_capacity(rows.len());
    for row in &rows {
        let id: i64 = row.to_value("id").map_err(|e| DbError::Conversion {
            message: format!("Failed to parse borough id: {e}"),
        })?;
        boroughs.push(Borough {
            id,
            name: row.to_value("name").unwrap_or_default(),
            population: row.to_value("population").unwrap_or(0),
            area_sq_miles: row.to_value("area_sq_miles").unwrap_or(0.0),
            total_crimes: row.to_value("total_crimes").unwrap_or(0),
            crime_rate_per_1000: row.to_value("crime_rate_per_1000").unwrap_or(0.0),
            north_bound: row.to_value("north_bound").unwrap_or(0.0),
            south_bound: row.to_value("south_bound").unwrap_or(0.0),
            east_bound: row.to_value("east_bound").unwrap_or(0.0),
            west_bound: row.to_value("west_bound").unwrap_or(0.0),
        });
    }

    Ok(boroughs)
}

#[cfg(test)]
mod tests {
    use gotham_models::BoundingBox;

    use super::*;
    use crate::db::DatabaseKind;
    use crate::schema::create_tables;

    fn empty_query() -> CrimeQuery {
        CrimeQuery {
            limit: 100,
            ..CrimeQuery::default()
        }
    }

    fn sample_event(complaint: &str, occurred: &str) -> NewCrimeEvent {
        NewCrimeEvent {
            complaint_number: Some(complaint.to_string()),
            occurrence_date: parse_timestamp(occurred),
            report_date: None,
            offense_description: Some("GRAND LARCENY".to_string()),
            law_category: Some("FELONY".to_string()),
            specific_offense: None,
            borough: Some("BROOKLYN".to_string()),
            precinct: Some(75),
            address: None,
            latitude: Some(40.65),
            longitude: Some(-73.95),
            location_description: None,
            premises_type: Some("STREET".to_string()),
            status: "OPEN".to_string(),
            arrest_made: false,
            victim_age_group: None,
            victim_gender: None,
            victim_race: None,
            suspect_age_group: None,
            suspect_gender: None,
            suspect_race: None,
            data_source: "SAMPLE_DATA".to_string(),
            data_quality_score: 1.0,
        }
    }

    async fn connect_with_schema() -> Box<dyn Database> {
        let db = switchy_database_connection::init_sqlite_rusqlite(None).unwrap();
        create_tables(db.as_ref(), DatabaseKind::Sqlite)
            .await
            .unwrap();
        db
    }

    #[test]
    fn empty_query_builds_no_predicates() {
        let (sql, params) = build_filter(&empty_query(), 1);
        assert!(sql.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn borough_filter_is_uppercased_substring() {
        let query = CrimeQuery {
            borough: Some("brooklyn".to_string()),
            ..empty_query()
        };
        let (sql, params) = build_filter(&query, 1);
        assert_eq!(sql, " AND UPPER(borough) LIKE $1");
        assert_eq!(
            params,
            vec![DatabaseValue::String("%BROOKLYN%".to_string())]
        );
    }

    #[test]
    fn bbox_adds_four_predicates() {
        let query = CrimeQuery {
            bbox: BoundingBox::from_bounds(Some(40.5), Some(40.9), Some(-74.1), Some(-73.7)),
            ..empty_query()
        };
        let (sql, params) = build_filter(&query, 1);
        assert!(sql.contains("latitude >= $1"));
        assert!(sql.contains("longitude <= $4"));
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn placeholder_numbering_respects_start_index() {
        let query = CrimeQuery {
            borough: Some("QUEENS".to_string()),
            offense: Some("LARCENY".to_string()),
            ..empty_query()
        };
        let (sql, params) = build_filter(&query, 3);
        assert!(sql.contains("$3"));
        assert!(sql.contains("$4"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn date_filters_use_canonical_text() {
        let query = CrimeQuery {
            start_date: parse_timestamp("2024-01-01"),
            end_date: parse_timestamp("2024-06-30 23:59:59"),
            ..empty_query()
        };
        let (sql, params) = build_filter(&query, 1);
        assert!(sql.contains("occurrence_date >= $1"));
        assert!(sql.contains("occurrence_date <= $2"));
        assert_eq!(
            params,
            vec![
                DatabaseValue::String("2024-01-01 00:00:00".to_string()),
                DatabaseValue::String("2024-06-30 23:59:59".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn insert_count_and_list_roundtrip() {
        let db = connect_with_schema().await;

        insert_crime_event(
            db.as_ref(),
            &sample_event("2024000001", "2024-03-01 10:00:00"),
        )
        .await
        .unwrap();
        insert_crime_event(
            db.as_ref(),
            &sample_event("2024000002", "2024-03-02 11:00:00"),
        )
        .await
        .unwrap();

        let query = empty_query();
        assert_eq!(count_crimes(db.as_ref(), &query).await.unwrap(), 2);

        let events = list_crimes(db.as_ref(), &query).await.unwrap();
        assert_eq!(events.len(), 2);
        // Newest occurrence first.
        assert_eq!(events[0].complaint_number.as_deref(), Some("2024000002"));
    }

    #[tokio::test]
    async fn duplicate_complaint_number_is_rejected() {
        let db = connect_with_schema().await;

        insert_crime_event(
            db.as_ref(),
            &sample_event("2024000001", "2024-03-01 10:00:00"),
        )
        .await
        .unwrap();
        let duplicate = insert_crime_event(
            db.as_ref(),
            &sample_event("2024000001", "2024-03-05 09:00:00"),
        )
        .await;
        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn get_crime_returns_none_for_missing_id() {
        let db = connect_with_schema().await;
        assert!(get_crime(db.as_ref(), 9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn heatmap_skips_rows_without_coordinates() {
        let db = connect_with_schema().await;

        let mut no_geo = sample_event("2024000001", "2024-03-01 10:00:00");
        no_geo.latitude = None;
        no_geo.longitude = None;
        insert_crime_event(db.as_ref(), &no_geo).await.unwrap();
        insert_crime_event(
            db.as_ref(),
            &sample_event("2024000002", "2024-03-02 11:00:00"),
        )
        .await
        .unwrap();

        let points = heatmap_points(db.as_ref(), None).await.unwrap();
        assert_eq!(points.len(), 1);

        let filtered = heatmap_points(db.as_ref(), Some("brook")).await.unwrap();
        assert_eq!(filtered.len(), 1);
        let miss = heatmap_points(db.as_ref(), Some("QUEENS")).await.unwrap();
        assert!(miss.is_empty());
    }
}
