#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the Gotham crime database.
//!
//! Serves the REST API for querying and aggregating crime events: paginated
//! listing with filters, per-borough and per-category statistics, a daily
//! timeline, and heatmap coordinates. Tables are created idempotently on
//! startup; the handle works against both the embedded `SQLite` engine and
//! Postgres depending on `DATABASE_URL`.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use gotham_database::db::{self, DatabaseKind};
use gotham_database::schema;
use switchy_database::Database;

/// Number of routable endpoints, reported by `/health`.
pub const ENDPOINT_COUNT: u64 = 8;

/// Shared application state.
pub struct AppState {
    /// Database connection.
    pub db: Arc<dyn Database>,
    /// Which storage engine the connection targets.
    pub kind: DatabaseKind,
    /// Connection URL with credentials redacted, for diagnostics.
    pub database_url: String,
}

/// Starts the Gotham crime API server.
///
/// Connects to the database named by `DATABASE_URL`, creates tables if they
/// do not exist, and starts the Actix-Web HTTP server on
/// `BIND_ADDR`:`PORT` (default `127.0.0.1:8000`). This is a regular async
/// function — the caller provides the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
///
/// # Panics
///
/// Panics if the database connection or table creation fails.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    log::info!("Connecting to database...");
    let (db_conn, kind, url) = db::connect_from_env()
        .await
        .expect("Failed to connect to database");

    log::info!("Creating tables...");
    schema::create_tables(db_conn.as_ref(), kind)
        .await
        .expect("Failed to create tables");

    let state = web::Data::new(AppState {
        db: Arc::from(db_conn),
        kind,
        database_url: db::redact_url(&url),
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .route("/", web::get().to(handlers::root))
            .route("/health", web::get().to(handlers::health))
            .route("/crimes", web::get().to(handlers::crimes))
            .route("/crimes/{crime_id}", web::get().to(handlers::crime_by_id))
            .route("/stats/summary", web::get().to(handlers::stats_summary))
            .route("/stats/boroughs", web::get().to(handlers::stats_boroughs))
            .route("/stats/timeline", web::get().to(handlers::stats_timeline))
            .route("/geo/heatmap", web::get().to(handlers::geo_heatmap))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
