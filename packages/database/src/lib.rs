#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Database connections, schema setup, and queries for the Gotham backend.
//!
//! Supports both embedded `SQLite` and `PostgreSQL` through the
//! `switchy_database` abstraction. All queries use raw SQL via
//! `query_raw_params()` with `$N` placeholders, which both backends accept.

pub mod db;
pub mod queries;
pub mod schema;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
