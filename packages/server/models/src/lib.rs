#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the Gotham crime server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the database row types to allow independent evolution of the API
//! contract. All JSON keys are `snake_case`.

use gotham_models::{BoundingBox, CrimeEvent};
use serde::{Deserialize, Serialize};

/// Query parameters for `GET /crimes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrimeQueryParams {
    /// Number of records to skip.
    pub skip: Option<u64>,
    /// Number of records to return (clamped to 1-1000).
    pub limit: Option<u64>,
    /// Case-insensitive substring filter on borough.
    pub borough: Option<String>,
    /// Case-insensitive substring filter on offense description.
    pub offense: Option<String>,
    /// Inclusive lower bound on occurrence date (`YYYY-MM-DD` accepted).
    pub start_date: Option<String>,
    /// Inclusive upper bound on occurrence date.
    pub end_date: Option<String>,
    /// Minimum latitude for bounding box filtering.
    pub lat_min: Option<f64>,
    /// Maximum latitude.
    pub lat_max: Option<f64>,
    /// Minimum longitude.
    pub lng_min: Option<f64>,
    /// Maximum longitude.
    pub lng_max: Option<f64>,
}

/// Query parameters for `GET /stats/timeline`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimelineQueryParams {
    /// Number of days to include (clamped to 1-365, default 30).
    pub days: Option<i64>,
}

/// Query parameters for `GET /geo/heatmap`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeatmapQueryParams {
    /// Case-insensitive substring filter on borough.
    pub borough: Option<String>,
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Total rows matching the filters.
    pub total: u64,
    /// Rows skipped before this page.
    pub skip: u64,
    /// Page size.
    pub limit: u64,
    /// Total page count: `ceil(total / limit)`.
    pub pages: u64,
}

impl Pagination {
    /// Builds pagination metadata, deriving the page count.
    ///
    /// `limit` is expected to be at least 1 (handlers clamp it before
    /// querying); a zero limit yields zero pages rather than dividing by
    /// zero.
    #[must_use]
    pub const fn new(total: u64, skip: u64, limit: u64) -> Self {
        let pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            total,
            skip,
            limit,
            pages,
        }
    }
}

/// Echo of the filters that produced a `/crimes` page.
#[derive(Debug, Clone, Serialize)]
pub struct FilterEcho {
    /// Borough substring filter, as received.
    pub borough: Option<String>,
    /// Offense substring filter, as received.
    pub offense: Option<String>,
    /// Start date, as received.
    pub start_date: Option<String>,
    /// End date, as received.
    pub end_date: Option<String>,
    /// Bounding box; `null` unless all four bounds were supplied.
    pub bounding_box: Option<BoundingBox>,
}

/// Response body for `GET /crimes`.
#[derive(Debug, Clone, Serialize)]
pub struct CrimesPage {
    /// The page of crime events, newest occurrence first.
    pub data: Vec<CrimeEvent>,
    /// Pagination metadata.
    pub pagination: Pagination,
    /// Echo of the applied filters.
    pub filters: FilterEcho,
}

/// One borough's share of the total, in the summary breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct BoroughCount {
    /// Borough name.
    pub borough: String,
    /// Number of incidents.
    pub count: u64,
}

/// One law category's share of the total, in the summary breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    /// Law category name.
    pub category: String,
    /// Number of incidents.
    pub count: u64,
}

/// Response body for `GET /stats/summary`.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    /// Total incident count.
    pub total_crimes: u64,
    /// Incidents in the last 30 days.
    pub recent_crimes_30d: u64,
    /// Per-borough counts, largest first.
    pub borough_breakdown: Vec<BoroughCount>,
    /// Per-law-category counts, largest first.
    pub offense_breakdown: Vec<CategoryCount>,
    /// When this summary was computed (ISO 8601).
    pub last_updated: String,
}

/// Average coordinate of a borough's geocoded incidents.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CenterCoordinates {
    /// Average latitude, if any geocoded rows exist.
    pub lat: Option<f64>,
    /// Average longitude.
    pub lng: Option<f64>,
}

/// Per-borough activity detail for `GET /stats/boroughs`.
#[derive(Debug, Clone, Serialize)]
pub struct BoroughDetail {
    /// Borough name.
    pub name: String,
    /// Total incidents recorded in the borough.
    pub total_crimes: u64,
    /// Number of distinct offense descriptions.
    pub unique_offenses: u64,
    /// Centroid of the borough's geocoded incidents.
    pub center_coordinates: CenterCoordinates,
}

/// Response body for `GET /stats/boroughs`.
#[derive(Debug, Clone, Serialize)]
pub struct BoroughStatsResponse {
    /// Per-borough activity, one entry per non-empty borough value.
    pub boroughs: Vec<BoroughDetail>,
}

/// One day's incident count in the timeline.
#[derive(Debug, Clone, Serialize)]
pub struct TimelinePoint {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Incidents occurring on that date.
    pub count: u64,
}

/// Response body for `GET /stats/timeline`.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineResponse {
    /// Daily counts in ascending date order.
    pub timeline: Vec<TimelinePoint>,
    /// Window size actually applied, after clamping.
    pub period_days: i64,
    /// Start of the window (ISO 8601).
    pub start_date: String,
    /// End of the window (ISO 8601).
    pub end_date: String,
}

/// One geocoded point for heatmap rendering.
#[derive(Debug, Clone, Serialize)]
pub struct ApiHeatmapPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Offense description, if recorded.
    pub offense: Option<String>,
}

/// Echo of the heatmap filter.
#[derive(Debug, Clone, Serialize)]
pub struct HeatmapFilter {
    /// Borough substring filter, as received.
    pub borough: Option<String>,
}

/// Response body for `GET /geo/heatmap`.
#[derive(Debug, Clone, Serialize)]
pub struct HeatmapResponse {
    /// All geocoded points matching the filter.
    pub heatmap_points: Vec<ApiHeatmapPoint>,
    /// Number of points returned.
    pub total_points: u64,
    /// Echo of the applied filter.
    pub filter: HeatmapFilter,
}

/// Response body for `GET /`.
#[derive(Debug, Clone, Serialize)]
pub struct RootInfo {
    /// Human-readable service banner.
    pub message: String,
    /// Service version.
    pub version: String,
    /// Always `"healthy"` when the service is responding.
    pub status: String,
    /// Current server time (ISO 8601).
    pub timestamp: String,
}

/// Database connectivity detail in the health response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthDatabase {
    /// Whether the count probe succeeded.
    pub connected: bool,
    /// Total rows in `crime_events`.
    pub crime_records: u64,
    /// Storage engine in use (`sqlite` or `postgres`).
    pub engine: String,
    /// Connection URL with credentials redacted.
    pub url: String,
}

/// API metadata in the health response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthApi {
    /// Service version.
    pub version: String,
    /// Number of routable endpoints.
    pub endpoints: u64,
}

/// Response body for `GET /health` when the database probe succeeds.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: String,
    /// Current server time (ISO 8601).
    pub timestamp: String,
    /// Database connectivity detail.
    pub database: HealthDatabase,
    /// API metadata.
    pub api: HealthApi,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_is_ceiling_of_total_over_limit() {
        let cases = [
            // (total, limit, expected pages)
            (0, 100, 0),
            (1, 100, 1),
            (99, 100, 1),
            (100, 100, 1),
            (101, 100, 2),
            (1000, 100, 10),
            (1001, 100, 11),
            (5, 1, 5),
            (7, 3, 3),
        ];
        for (total, limit, pages) in cases {
            assert_eq!(
                Pagination::new(total, 0, limit).pages,
                pages,
                "total={total} limit={limit}"
            );
        }
    }

    #[test]
    fn zero_limit_does_not_divide_by_zero() {
        assert_eq!(Pagination::new(10, 0, 0).pages, 0);
    }

    #[test]
    fn pagination_echoes_skip_and_limit() {
        let p = Pagination::new(250, 40, 20);
        assert_eq!(p.total, 250);
        assert_eq!(p.skip, 40);
        assert_eq!(p.limit, 20);
        assert_eq!(p.pages, 13);
    }
}
