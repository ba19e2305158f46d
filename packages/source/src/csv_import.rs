//! CSV crime data import.
//!
//! Reads CSV exports whose columns match the `crime_events` field names
//! (the format the sample generator writes). Mapping is lenient: absent
//! text fields fall back to declared defaults, unparseable coordinates and
//! dates become NULL. An unparseable precinct fails the row, since a
//! non-numeric value there means the row is misaligned.

use std::path::Path;

use gotham_models::{NewCrimeEvent, parse_timestamp};
use serde::{Deserialize, Serialize};

use crate::SourceError;

/// One raw CSV row, all fields optional text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CsvRecord {
    #[serde(default)]
    pub complaint_number: Option<String>,
    #[serde(default)]
    pub occurrence_date: Option<String>,
    #[serde(default)]
    pub report_date: Option<String>,
    #[serde(default)]
    pub offense_description: Option<String>,
    #[serde(default)]
    pub law_category: Option<String>,
    #[serde(default)]
    pub specific_offense: Option<String>,
    #[serde(default)]
    pub borough: Option<String>,
    #[serde(default)]
    pub precinct: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
    #[serde(default)]
    pub location_description: Option<String>,
    #[serde(default)]
    pub premises_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub arrest_made: Option<String>,
    #[serde(default)]
    pub victim_age_group: Option<String>,
    #[serde(default)]
    pub victim_gender: Option<String>,
    #[serde(default)]
    pub victim_race: Option<String>,
    #[serde(default)]
    pub suspect_age_group: Option<String>,
    #[serde(default)]
    pub suspect_gender: Option<String>,
    #[serde(default)]
    pub suspect_race: Option<String>,
    #[serde(default)]
    pub data_source: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn parse_bool(value: Option<&String>) -> bool {
    value.is_some_and(|s| {
        matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes"
        )
    })
}

/// Maps one raw CSV row to an insertable crime event.
///
/// `index` is the zero-based row position, used to synthesize a
/// `UNK_{index}` complaint number when the column is absent.
///
/// # Errors
///
/// Returns [`SourceError::Mapping`] if the precinct column is present but
/// not numeric.
pub fn map_record(index: usize, record: CsvRecord) -> Result<NewCrimeEvent, SourceError> {
    let precinct = match non_empty(record.precinct) {
        None => None,
        Some(raw) => {
            // Precinct exports sometimes carry a float representation
            // ("75.0"), so parse through f64.
            let value = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| SourceError::Mapping {
                    message: format!("Row {index}: invalid precinct {raw:?}"),
                })?;
            #[allow(clippy::cast_possible_truncation)]
            Some(value as i32)
        }
    };

    let complaint_number = non_empty(record.complaint_number)
        .map_or_else(|| format!("UNK_{index}"), |number| number);

    Ok(NewCrimeEvent {
        complaint_number: Some(complaint_number),
        occurrence_date: record.occurrence_date.as_deref().and_then(parse_timestamp),
        report_date: record.report_date.as_deref().and_then(parse_timestamp),
        offense_description: non_empty(record.offense_description),
        law_category: non_empty(record.law_category),
        specific_offense: non_empty(record.specific_offense),
        borough: non_empty(record.borough),
        precinct,
        address: non_empty(record.address),
        latitude: record
            .latitude
            .and_then(|s| s.trim().parse::<f64>().ok()),
        longitude: record
            .longitude
            .and_then(|s| s.trim().parse::<f64>().ok()),
        location_description: non_empty(record.location_description),
        premises_type: non_empty(record.premises_type),
        status: non_empty(record.status).unwrap_or_else(|| "OPEN".to_string()),
        arrest_made: parse_bool(record.arrest_made.as_ref()),
        victim_age_group: non_empty(record.victim_age_group),
        victim_gender: non_empty(record.victim_gender),
        victim_race: non_empty(record.victim_race),
        suspect_age_group: non_empty(record.suspect_age_group),
        suspect_gender: non_empty(record.suspect_gender),
        suspect_race: non_empty(record.suspect_race),
        data_source: non_empty(record.data_source).unwrap_or_else(|| "CSV_IMPORT".to_string()),
        data_quality_score: 1.0,
    })
}

/// Reads a CSV file and maps every row.
///
/// Opening the file is fatal; individual rows that fail to parse or map are
/// returned as `Err` entries so the caller can count and skip them.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be opened.
pub fn read_records(path: &Path) -> Result<Vec<Result<NewCrimeEvent, SourceError>>, SourceError> {
    let mut reader = csv::Reader::from_path(path)?;

    let mut rows = Vec::new();
    for (index, result) in reader.deserialize::<CsvRecord>().enumerate() {
        rows.push(
            result
                .map_err(SourceError::from)
                .and_then(|record| map_record(index, record)),
        );
    }

    log::info!("Read {} rows from {}", rows.len(), path.display());

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_record() -> CsvRecord {
        CsvRecord {
            complaint_number: Some("2024000001".to_string()),
            occurrence_date: Some("2024-03-01 14:30:00".to_string()),
            report_date: Some("2024-03-03 09:00:00".to_string()),
            offense_description: Some("GRAND LARCENY".to_string()),
            law_category: Some("FELONY".to_string()),
            specific_offense: Some("Grand Larceny".to_string()),
            borough: Some("MANHATTAN".to_string()),
            precinct: Some("14".to_string()),
            latitude: Some("40.7549".to_string()),
            longitude: Some("-73.9840".to_string()),
            status: Some("OPEN".to_string()),
            arrest_made: Some("false".to_string()),
            data_source: Some("SAMPLE_DATA".to_string()),
            ..CsvRecord::default()
        }
    }

    #[test]
    fn maps_complete_row() {
        let event = map_record(0, full_record()).unwrap();
        assert_eq!(event.complaint_number.as_deref(), Some("2024000001"));
        assert_eq!(event.precinct, Some(14));
        assert_eq!(event.borough.as_deref(), Some("MANHATTAN"));
        assert!(!event.arrest_made);
        assert_eq!(event.data_source, "SAMPLE_DATA");
    }

    #[test]
    fn missing_complaint_number_gets_synthesized() {
        let record = CsvRecord {
            complaint_number: None,
            ..full_record()
        };
        let event = map_record(17, record).unwrap();
        assert_eq!(event.complaint_number.as_deref(), Some("UNK_17"));
    }

    #[test]
    fn unparseable_coordinates_become_null() {
        let record = CsvRecord {
            latitude: Some("not-a-latitude".to_string()),
            longitude: None,
            ..full_record()
        };
        let event = map_record(0, record).unwrap();
        assert!(event.latitude.is_none());
        assert!(event.longitude.is_none());
    }

    #[test]
    fn unparseable_date_becomes_null() {
        let record = CsvRecord {
            occurrence_date: Some("03/01/2024".to_string()),
            ..full_record()
        };
        let event = map_record(0, record).unwrap();
        assert!(event.occurrence_date.is_none());
    }

    #[test]
    fn float_precinct_is_truncated() {
        let record = CsvRecord {
            precinct: Some("75.0".to_string()),
            ..full_record()
        };
        let event = map_record(0, record).unwrap();
        assert_eq!(event.precinct, Some(75));
    }

    #[test]
    fn invalid_precinct_fails_the_row() {
        let record = CsvRecord {
            precinct: Some("seventy-five".to_string()),
            ..full_record()
        };
        assert!(map_record(0, record).is_err());
    }

    #[test]
    fn absent_status_and_source_get_defaults() {
        let record = CsvRecord {
            status: None,
            data_source: Some("  ".to_string()),
            ..full_record()
        };
        let event = map_record(0, record).unwrap();
        assert_eq!(event.status, "OPEN");
        assert_eq!(event.data_source, "CSV_IMPORT");
    }
}
