//! HTTP handler functions for the Gotham crime API.

use actix_web::{HttpResponse, web};
use chrono::{Duration, Utc};
use gotham_database::queries;
use gotham_models::{BoundingBox, CrimeQuery, parse_timestamp};
use gotham_server_models::{
    ApiHeatmapPoint, BoroughCount, BoroughDetail, BoroughStatsResponse, CategoryCount,
    CenterCoordinates, CrimeQueryParams, CrimesPage, FilterEcho, HealthApi, HealthDatabase,
    HealthResponse, HeatmapFilter, HeatmapQueryParams, HeatmapResponse, Pagination, RootInfo,
    SummaryResponse, TimelinePoint, TimelineQueryParams, TimelineResponse,
};

use crate::{AppState, ENDPOINT_COUNT};

/// Page size bounds for `/crimes`.
const MIN_LIMIT: u64 = 1;
const MAX_LIMIT: u64 = 1000;
const DEFAULT_LIMIT: u64 = 100;

/// Timeline window bounds in days.
const MIN_DAYS: i64 = 1;
const MAX_DAYS: i64 = 365;
const DEFAULT_DAYS: i64 = 30;

fn now_iso() -> String {
    Utc::now()
        .naive_utc()
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}

fn internal_error(context: &str, e: &gotham_database::DbError) -> HttpResponse {
    log::error!("{context}: {e}");
    HttpResponse::InternalServerError().json(serde_json::json!({
        "error": "Internal server error"
    }))
}

/// Clamps a requested page size into `1..=1000`, defaulting to 100.
fn clamp_limit(limit: Option<u64>) -> u64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(MIN_LIMIT, MAX_LIMIT)
}

/// Clamps a requested timeline window into `1..=365` days, defaulting to 30.
fn clamp_days(days: Option<i64>) -> i64 {
    days.unwrap_or(DEFAULT_DAYS).clamp(MIN_DAYS, MAX_DAYS)
}

/// Builds the typed query from raw HTTP parameters.
///
/// Returns `Err` with a 400 response when a supplied date cannot be parsed.
fn build_crime_query(params: &CrimeQueryParams) -> Result<CrimeQuery, HttpResponse> {
    let parse_date = |field: &str, value: &Option<String>| match value {
        Some(s) => match parse_timestamp(s) {
            Some(dt) => Ok(Some(dt)),
            None => Err(HttpResponse::BadRequest().json(serde_json::json!({
                "error": format!("Invalid {field}; expected YYYY-MM-DD"),
            }))),
        },
        None => Ok(None),
    };

    Ok(CrimeQuery {
        skip: params.skip.unwrap_or(0),
        limit: clamp_limit(params.limit),
        borough: params.borough.clone(),
        offense: params.offense.clone(),
        start_date: parse_date("start_date", &params.start_date)?,
        end_date: parse_date("end_date", &params.end_date)?,
        bbox: BoundingBox::from_bounds(
            params.lat_min,
            params.lat_max,
            params.lng_min,
            params.lng_max,
        ),
    })
}

/// `GET /`
pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(RootInfo {
        message: "Gotham Crime API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "healthy".to_string(),
        timestamp: now_iso(),
    })
}

/// `GET /health`
///
/// Probes the database with a row count. A failed probe yields a 503 with
/// a degraded body instead of the healthy shape.
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    match queries::count_crimes(state.db.as_ref(), &CrimeQuery::default()).await {
        Ok(crime_records) => HttpResponse::Ok().json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: now_iso(),
            database: HealthDatabase {
                connected: true,
                crime_records,
                engine: state.kind.as_str().to_string(),
                url: state.database_url.clone(),
            },
            api: HealthApi {
                version: env!("CARGO_PKG_VERSION").to_string(),
                endpoints: ENDPOINT_COUNT,
            },
        }),
        Err(e) => {
            log::error!("Health check failed: {e}");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "degraded",
                "timestamp": now_iso(),
                "database": { "connected": false },
            }))
        }
    }
}

/// `GET /crimes`
///
/// Paginated crime listing, newest occurrence first, with substring,
/// date-range, and bounding-box filters.
pub async fn crimes(
    state: web::Data<AppState>,
    params: web::Query<CrimeQueryParams>,
) -> HttpResponse {
    let query = match build_crime_query(&params) {
        Ok(query) => query,
        Err(response) => return response,
    };

    let total = match queries::count_crimes(state.db.as_ref(), &query).await {
        Ok(total) => total,
        Err(e) => return internal_error("Error counting crimes", &e),
    };

    match queries::list_crimes(state.db.as_ref(), &query).await {
        Ok(data) => HttpResponse::Ok().json(CrimesPage {
            data,
            pagination: Pagination::new(total, query.skip, query.limit),
            filters: FilterEcho {
                borough: params.borough.clone(),
                offense: params.offense.clone(),
                start_date: params.start_date.clone(),
                end_date: params.end_date.clone(),
                bounding_box: query.bbox,
            },
        }),
        Err(e) => internal_error("Error fetching crimes", &e),
    }
}

/// `GET /crimes/{crime_id}`
///
/// A missing id is a plain 404, not an error worth logging.
pub async fn crime_by_id(state: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
    let crime_id = path.into_inner();

    match queries::get_crime(state.db.as_ref(), crime_id).await {
        Ok(Some(crime)) => HttpResponse::Ok().json(crime),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Crime with id {crime_id} not found"),
        })),
        Err(e) => internal_error("Error fetching crime", &e),
    }
}

/// `GET /stats/summary`
pub async fn stats_summary(state: web::Data<AppState>) -> HttpResponse {
    let db = state.db.as_ref();

    let total_crimes = match queries::count_crimes(db, &CrimeQuery::default()).await {
        Ok(total) => total,
        Err(e) => return internal_error("Error generating summary stats", &e),
    };

    let thirty_days_ago = Utc::now().naive_utc() - Duration::days(30);
    let recent_crimes_30d = match queries::recent_crime_count(db, thirty_days_ago).await {
        Ok(count) => count,
        Err(e) => return internal_error("Error generating summary stats", &e),
    };

    let by_borough = match queries::counts_by_borough(db).await {
        Ok(counts) => counts,
        Err(e) => return internal_error("Error generating summary stats", &e),
    };
    let by_category = match queries::counts_by_category(db).await {
        Ok(counts) => counts,
        Err(e) => return internal_error("Error generating summary stats", &e),
    };

    HttpResponse::Ok().json(SummaryResponse {
        total_crimes,
        recent_crimes_30d,
        borough_breakdown: by_borough
            .into_iter()
            .map(|(borough, count)| BoroughCount { borough, count })
            .collect(),
        offense_breakdown: by_category
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect(),
        last_updated: now_iso(),
    })
}

/// `GET /stats/boroughs`
pub async fn stats_boroughs(state: web::Data<AppState>) -> HttpResponse {
    match queries::borough_stats(state.db.as_ref()).await {
        Ok(stats) => HttpResponse::Ok().json(BoroughStatsResponse {
            boroughs: stats
                .into_iter()
                .map(|s| BoroughDetail {
                    name: s.borough,
                    total_crimes: s.total,
                    unique_offenses: s.unique_offenses,
                    center_coordinates: CenterCoordinates {
                        lat: s.avg_latitude,
                        lng: s.avg_longitude,
                    },
                })
                .collect(),
        }),
        Err(e) => internal_error("Error generating borough stats", &e),
    }
}

/// `GET /stats/timeline`
pub async fn stats_timeline(
    state: web::Data<AppState>,
    params: web::Query<TimelineQueryParams>,
) -> HttpResponse {
    let period_days = clamp_days(params.days);
    let end = Utc::now().naive_utc();
    let start = end - Duration::days(period_days);

    match queries::timeline(state.db.as_ref(), start, end).await {
        Ok(days) => HttpResponse::Ok().json(TimelineResponse {
            timeline: days
                .into_iter()
                .map(|(date, count)| TimelinePoint { date, count })
                .collect(),
            period_days,
            start_date: start.format("%Y-%m-%dT%H:%M:%S").to_string(),
            end_date: end.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }),
        Err(e) => internal_error("Error generating timeline", &e),
    }
}

/// `GET /geo/heatmap`
pub async fn geo_heatmap(
    state: web::Data<AppState>,
    params: web::Query<HeatmapQueryParams>,
) -> HttpResponse {
    match queries::heatmap_points(state.db.as_ref(), params.borough.as_deref()).await {
        Ok(points) => {
            let heatmap_points: Vec<ApiHeatmapPoint> = points
                .into_iter()
                .map(|p| ApiHeatmapPoint {
                    lat: p.latitude,
                    lng: p.longitude,
                    offense: p.offense,
                })
                .collect();
            let total_points = heatmap_points.len() as u64;

            HttpResponse::Ok().json(HeatmapResponse {
                heatmap_points,
                total_points,
                filter: HeatmapFilter {
                    borough: params.borough.clone(),
                },
            })
        }
        Err(e) => internal_error("Error generating heatmap data", &e),
    }
}
