#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Crime event sources for the Gotham backend.
//!
//! Three ways to produce [`gotham_models::NewCrimeEvent`] rows: reading a
//! local CSV export ([`csv_import`]), fetching the live NYPD complaint feed
//! from the Socrata API ([`socrata`]), and generating synthetic records for
//! demos when no real data is available ([`sample`]).

pub mod csv_import;
pub mod parsing;
pub mod sample;
pub mod socrata;

/// Errors that can occur while reading or fetching source data.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// CSV read or parse failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A row could not be coerced into a crime event.
    #[error("Row mapping error: {message}")]
    Mapping {
        /// Description of what went wrong.
        message: String,
    },
}
