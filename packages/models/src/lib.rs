#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Entity and query-parameter types for the Gotham crime analytics backend.
//!
//! This crate defines the three stored record shapes (crime event, borough,
//! aggregated stat), the enumerations used across the system, and the typed
//! query-parameter struct that the database layer translates into SQL filter
//! predicates. Timestamps are stored as `YYYY-MM-DD HH:MM:SS` text so the
//! same queries run against both the embedded `SQLite` engine and Postgres.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Storage format for all timestamp columns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats a timestamp into the canonical storage representation.
#[must_use]
pub fn format_timestamp(dt: NaiveDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a timestamp from any of the representations seen in stored rows
/// and source data.
///
/// Accepts the canonical storage format, ISO 8601 with a `T` separator
/// (with or without fractional seconds), and a bare `YYYY-MM-DD` date
/// (interpreted as midnight). Returns `None` for anything else.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT) {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    None
}

/// Legal severity classification of an offense.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LawCategory {
    /// Most serious offenses (burglary, robbery, grand larceny)
    Felony,
    /// Mid-level offenses (petit larceny, criminal mischief)
    Misdemeanor,
    /// Least serious offenses (harassment, trespass)
    Violation,
}

/// Case status of a crime event.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CrimeStatus {
    /// Under active investigation
    Open,
    /// Investigation closed
    Closed,
    /// Awaiting further action
    Pending,
    /// Case resolved
    Completed,
}

/// Aggregation window for a precomputed statistics bucket.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodType {
    /// One calendar day
    Daily,
    /// One calendar week
    Weekly,
    /// One calendar month
    Monthly,
    /// One calendar year
    Yearly,
}

/// Direction of change relative to the previous period.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    /// Counts increased
    Up,
    /// Counts decreased
    Down,
    /// No meaningful change
    Stable,
}

/// One of New York City's five administrative subdivisions.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BoroughName {
    /// Manhattan
    Manhattan,
    /// Brooklyn
    Brooklyn,
    /// Queens
    Queens,
    /// The Bronx
    Bronx,
    /// Staten Island (stored with a space, matching the upstream feed)
    #[serde(rename = "STATEN ISLAND")]
    #[strum(serialize = "STATEN ISLAND")]
    StatenIsland,
}

/// Static reference data for one borough: census figures plus the bounding
/// rectangle used for map display and synthetic coordinate generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoroughInfo {
    /// Borough name.
    pub name: BoroughName,
    /// 2020 census population.
    pub population: i64,
    /// Land area in square miles.
    pub area_sq_miles: f64,
    /// Northern latitude bound.
    pub north_bound: f64,
    /// Southern latitude bound.
    pub south_bound: f64,
    /// Eastern longitude bound.
    pub east_bound: f64,
    /// Western longitude bound.
    pub west_bound: f64,
}

/// The fixed five-borough reference table. Seeding the `boroughs` table and
/// generating sample coordinates both read from this.
pub const NYC_BOROUGHS: [BoroughInfo; 5] = [
    BoroughInfo {
        name: BoroughName::Manhattan,
        population: 1_694_251,
        area_sq_miles: 22.83,
        north_bound: 40.88,
        south_bound: 40.70,
        east_bound: -73.91,
        west_bound: -74.02,
    },
    BoroughInfo {
        name: BoroughName::Brooklyn,
        population: 2_736_074,
        area_sq_miles: 69.50,
        north_bound: 40.74,
        south_bound: 40.57,
        east_bound: -73.84,
        west_bound: -74.06,
    },
    BoroughInfo {
        name: BoroughName::Queens,
        population: 2_405_464,
        area_sq_miles: 108.53,
        north_bound: 40.80,
        south_bound: 40.54,
        east_bound: -73.70,
        west_bound: -73.96,
    },
    BoroughInfo {
        name: BoroughName::Bronx,
        population: 1_472_654,
        area_sq_miles: 42.00,
        north_bound: 40.92,
        south_bound: 40.79,
        east_bound: -73.76,
        west_bound: -73.93,
    },
    BoroughInfo {
        name: BoroughName::StatenIsland,
        population: 495_747,
        area_sq_miles: 57.50,
        north_bound: 40.65,
        south_bound: 40.47,
        east_bound: -74.05,
        west_bound: -74.26,
    },
];

/// A crime incident row as stored in the `crime_events` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrimeEvent {
    /// Primary key.
    pub id: i64,
    /// External unique complaint identifier.
    pub complaint_number: Option<String>,
    /// When the incident occurred.
    pub occurrence_date: Option<NaiveDateTime>,
    /// When the incident was reported.
    pub report_date: Option<NaiveDateTime>,
    /// Offense description (e.g. "GRAND LARCENY").
    pub offense_description: Option<String>,
    /// Legal severity category (FELONY, MISDEMEANOR, VIOLATION).
    pub law_category: Option<String>,
    /// Specific offense within the description.
    pub specific_offense: Option<String>,
    /// Borough where the incident occurred.
    pub borough: Option<String>,
    /// Police precinct number.
    pub precinct: Option<i32>,
    /// Responsible jurisdiction.
    pub jurisdiction: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// Cross-street description.
    pub intersection: Option<String>,
    /// Latitude (WGS84). Present iff `longitude` is present for
    /// geo-filterable rows.
    pub latitude: Option<f64>,
    /// Longitude (WGS84).
    pub longitude: Option<f64>,
    /// Position relative to the premises (INSIDE, OUTSIDE, ...).
    pub location_description: Option<String>,
    /// Premises type (RESIDENCE, STREET, ...).
    pub premises_type: Option<String>,
    /// Case status (OPEN, CLOSED, PENDING, COMPLETED).
    pub status: String,
    /// Whether an arrest was made.
    pub arrest_made: bool,
    /// Anonymized victim age bucket.
    pub victim_age_group: Option<String>,
    /// Anonymized victim gender.
    pub victim_gender: Option<String>,
    /// Anonymized victim race bucket.
    pub victim_race: Option<String>,
    /// Anonymized suspect age bucket.
    pub suspect_age_group: Option<String>,
    /// Anonymized suspect gender.
    pub suspect_gender: Option<String>,
    /// Anonymized suspect race bucket.
    pub suspect_race: Option<String>,
    /// Free-text investigator notes.
    pub case_notes: Option<String>,
    /// Row creation timestamp.
    pub created_at: Option<NaiveDateTime>,
    /// Last update timestamp.
    pub updated_at: Option<NaiveDateTime>,
    /// Provenance tag (NYC_OPENDATA, CSV_IMPORT, SAMPLE_DATA).
    pub data_source: String,
    /// Data quality score in `0.0..=1.0`.
    pub data_quality_score: f64,
}

/// A crime event prepared for insertion (no primary key or row metadata yet).
///
/// Every ingestion path — CSV mapping, the live feed, and the sample
/// generator — produces this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCrimeEvent {
    /// External unique complaint identifier.
    pub complaint_number: Option<String>,
    /// When the incident occurred.
    pub occurrence_date: Option<NaiveDateTime>,
    /// When the incident was reported.
    pub report_date: Option<NaiveDateTime>,
    /// Offense description.
    pub offense_description: Option<String>,
    /// Legal severity category.
    pub law_category: Option<String>,
    /// Specific offense within the description.
    pub specific_offense: Option<String>,
    /// Borough where the incident occurred.
    pub borough: Option<String>,
    /// Police precinct number.
    pub precinct: Option<i32>,
    /// Street address.
    pub address: Option<String>,
    /// Latitude (WGS84).
    pub latitude: Option<f64>,
    /// Longitude (WGS84).
    pub longitude: Option<f64>,
    /// Position relative to the premises.
    pub location_description: Option<String>,
    /// Premises type.
    pub premises_type: Option<String>,
    /// Case status.
    pub status: String,
    /// Whether an arrest was made.
    pub arrest_made: bool,
    /// Anonymized victim age bucket.
    pub victim_age_group: Option<String>,
    /// Anonymized victim gender.
    pub victim_gender: Option<String>,
    /// Anonymized victim race bucket.
    pub victim_race: Option<String>,
    /// Anonymized suspect age bucket.
    pub suspect_age_group: Option<String>,
    /// Anonymized suspect gender.
    pub suspect_gender: Option<String>,
    /// Anonymized suspect race bucket.
    pub suspect_race: Option<String>,
    /// Provenance tag.
    pub data_source: String,
    /// Data quality score in `0.0..=1.0`.
    pub data_quality_score: f64,
}

/// A borough reference row as stored in the `boroughs` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Borough {
    /// Primary key.
    pub id: i64,
    /// Borough name (unique).
    pub name: String,
    /// Census population.
    pub population: i64,
    /// Land area in square miles.
    pub area_sq_miles: f64,
    /// Denormalized total crime count (recomputed periodically).
    pub total_crimes: i64,
    /// Denormalized crime rate per 1,000 residents.
    pub crime_rate_per_1000: f64,
    /// Northern latitude bound for map display.
    pub north_bound: f64,
    /// Southern latitude bound.
    pub south_bound: f64,
    /// Eastern longitude bound.
    pub east_bound: f64,
    /// Western longitude bound.
    pub west_bound: f64,
}

/// A precomputed aggregate bucket as stored in the `crime_stats` table.
///
/// No component in this repository writes these rows; an external batch job
/// owns them. The table is still created so that job has a target schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrimeStats {
    /// Primary key.
    pub id: i64,
    /// Start of the period this bucket covers.
    pub stat_date: Option<NaiveDateTime>,
    /// Aggregation window.
    pub period_type: Option<PeriodType>,
    /// Borough scope, if borough-scoped.
    pub borough: Option<String>,
    /// Precinct scope, if precinct-scoped.
    pub precinct: Option<i32>,
    /// Offense category this bucket counts.
    pub offense_category: Option<String>,
    /// Number of incidents in the bucket.
    pub crime_count: i64,
    /// Number of incidents resulting in arrest.
    pub arrest_count: i64,
    /// Fraction of incidents cleared (arrest or closure).
    pub clearance_rate: f64,
    /// Percentage change from the previous period.
    pub change_from_previous: f64,
    /// Direction of the change.
    pub trend_direction: Option<TrendDirection>,
}

/// A rectangular lat/lng region used to filter geographic results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum latitude.
    pub lat_min: f64,
    /// Maximum latitude.
    pub lat_max: f64,
    /// Minimum longitude.
    pub lng_min: f64,
    /// Maximum longitude.
    pub lng_max: f64,
}

impl BoundingBox {
    /// Builds a bounding box only when all four bounds are supplied.
    ///
    /// An incomplete box (fewer than four bounds) yields `None` and the
    /// geographic filter is skipped entirely. Presence is what matters here,
    /// not truthiness — a bound of `0.0` is a valid bound.
    #[must_use]
    pub fn from_bounds(
        lat_min: Option<f64>,
        lat_max: Option<f64>,
        lng_min: Option<f64>,
        lng_max: Option<f64>,
    ) -> Option<Self> {
        Some(Self {
            lat_min: lat_min?,
            lat_max: lat_max?,
            lng_min: lng_min?,
            lng_max: lng_max?,
        })
    }

    /// Returns whether the point lies within the box (inclusive).
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.lat_min
            && latitude <= self.lat_max
            && longitude >= self.lng_min
            && longitude <= self.lng_max
    }
}

/// Typed parameters for querying crime events.
///
/// The database layer translates this into SQL filter predicates; handlers
/// build it from HTTP query parameters. Keeping it independent of any query
/// API makes the filter logic directly testable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrimeQuery {
    /// Number of rows to skip.
    pub skip: u64,
    /// Maximum number of rows to return.
    pub limit: u64,
    /// Case-insensitive substring filter on borough.
    pub borough: Option<String>,
    /// Case-insensitive substring filter on offense description.
    pub offense: Option<String>,
    /// Inclusive lower bound on occurrence date.
    pub start_date: Option<NaiveDateTime>,
    /// Inclusive upper bound on occurrence date.
    pub end_date: Option<NaiveDateTime>,
    /// Geographic bounding box; applied only when fully specified.
    pub bbox: Option<BoundingBox>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_roundtrip() {
        let dt = parse_timestamp("2024-03-01 14:30:00").unwrap();
        assert_eq!(format_timestamp(dt), "2024-03-01 14:30:00");
    }

    #[test]
    fn parses_iso_with_t_separator() {
        let dt = parse_timestamp("2024-03-01T14:30:00.000").unwrap();
        assert_eq!(format_timestamp(dt), "2024-03-01 14:30:00");
    }

    #[test]
    fn parses_bare_date_as_midnight() {
        let dt = parse_timestamp("2024-03-01").unwrap();
        assert_eq!(format_timestamp(dt), "2024-03-01 00:00:00");
    }

    #[test]
    fn rejects_garbage_timestamp() {
        assert!(parse_timestamp("not-a-date").is_none());
    }

    #[test]
    fn borough_name_staten_island_uses_space() {
        assert_eq!(BoroughName::StatenIsland.to_string(), "STATEN ISLAND");
        assert_eq!(
            "STATEN ISLAND".parse::<BoroughName>().unwrap(),
            BoroughName::StatenIsland
        );
    }

    #[test]
    fn law_category_parses_screaming_snake() {
        assert_eq!("FELONY".parse::<LawCategory>().unwrap(), LawCategory::Felony);
        assert!("felonious".parse::<LawCategory>().is_err());
    }

    #[test]
    fn borough_table_has_five_unique_entries() {
        let mut names: Vec<String> = NYC_BOROUGHS.iter().map(|b| b.name.to_string()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn borough_bounds_are_ordered() {
        for info in &NYC_BOROUGHS {
            assert!(info.north_bound > info.south_bound, "{:?}", info.name);
            assert!(info.east_bound > info.west_bound, "{:?}", info.name);
        }
    }

    #[test]
    fn bbox_requires_all_four_bounds() {
        assert!(BoundingBox::from_bounds(Some(40.0), Some(41.0), Some(-74.0), None).is_none());
        assert!(BoundingBox::from_bounds(None, None, None, None).is_none());
        let bbox =
            BoundingBox::from_bounds(Some(40.0), Some(41.0), Some(-74.5), Some(-73.5)).unwrap();
        assert!(bbox.contains(40.5, -74.0));
        assert!(!bbox.contains(39.9, -74.0));
    }

    #[test]
    fn bbox_zero_is_a_valid_bound() {
        // A bound of 0.0 must not be treated as absent.
        let bbox = BoundingBox::from_bounds(Some(0.0), Some(1.0), Some(0.0), Some(1.0)).unwrap();
        assert!(bbox.contains(0.0, 0.5));
    }
}
