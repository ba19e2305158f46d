//! Live NYPD complaint feed via the Socrata SODA API.
//!
//! Dataset: NYPD Complaint Data Current (Year To Date),
//! <https://data.cityofnewyork.us/resource/5uac-w243>. Fetching paginates
//! with `$limit`/`$offset`, newest complaints first, and only requests
//! records from 2024 onward.

use std::fmt::Write as _;

use chrono::{NaiveDateTime, NaiveTime};
use gotham_models::NewCrimeEvent;
use serde::Deserialize;

use crate::parsing::{parse_lat_lng_str, parse_socrata_date};
use crate::SourceError;

const API_URL: &str = "https://data.cityofnewyork.us/resource/5uac-w243.json";

/// Oldest `cmplnt_fr_dt` the live sync will request.
const RECENCY_FLOOR: &str = "2024-01-01T00:00:00";

const PAGE_SIZE: u64 = 1000;

/// One raw record from the NYPD complaint dataset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SocrataRecord {
    #[serde(default)]
    pub cmplnt_num: Option<String>,
    #[serde(default)]
    pub cmplnt_fr_dt: Option<String>,
    #[serde(default)]
    pub cmplnt_fr_tm: Option<String>,
    #[serde(default)]
    pub rpt_dt: Option<String>,
    #[serde(default)]
    pub ofns_desc: Option<String>,
    #[serde(default)]
    pub pd_desc: Option<String>,
    #[serde(default)]
    pub law_cat_cd: Option<String>,
    #[serde(default)]
    pub boro_nm: Option<String>,
    #[serde(default)]
    pub addr_pct_cd: Option<String>,
    #[serde(default)]
    pub loc_of_occur_desc: Option<String>,
    #[serde(default)]
    pub prem_typ_desc: Option<String>,
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
}

/// Fetches up to `limit` raw records from the NYPD feed, newest first.
///
/// # Errors
///
/// Returns [`SourceError`] if an HTTP request fails or the response is not
/// the expected JSON shape.
pub async fn fetch_nyc_records(limit: u64) -> Result<Vec<SocrataRecord>, SourceError> {
    let client = reqwest::Client::new();
    let mut records: Vec<SocrataRecord> = Vec::new();
    let mut offset: u64 = 0;

    loop {
        let remaining = limit.saturating_sub(offset);
        if remaining == 0 {
            break;
        }
        let page_limit = remaining.min(PAGE_SIZE);

        let mut url = format!("{API_URL}?$limit={page_limit}&$offset={offset}");
        write!(url, "&$order=cmplnt_fr_dt DESC").unwrap();
        write!(url, "&$where=cmplnt_fr_dt >= '{RECENCY_FLOOR}'").unwrap();

        log::info!("Fetching NYC complaint data: offset={offset}, limit={page_limit}");
        let response = client.get(&url).send().await?;
        let body = response.text().await?;
        let page = parse_page(&body)?;

        let count = page.len() as u64;
        if count == 0 {
            break;
        }

        records.extend(page);
        offset += count;

        if count < page_limit {
            break;
        }
    }

    log::info!("Downloaded {} NYC complaint records total", records.len());

    Ok(records)
}

/// Decodes one response page.
///
/// # Errors
///
/// Returns [`SourceError::Json`] when the body is not a JSON array of
/// complaint records (e.g. a Socrata error object).
fn parse_page(body: &str) -> Result<Vec<SocrataRecord>, SourceError> {
    Ok(serde_json::from_str(body)?)
}

/// Maps one raw feed record to an insertable crime event.
///
/// Returns `None` when the record is missing coordinates or an occurrence
/// date; the live path drops such rows rather than storing NULLs.
#[must_use]
pub fn map_socrata_record(record: SocrataRecord) -> Option<NewCrimeEvent> {
    let (latitude, longitude) =
        parse_lat_lng_str(record.latitude.as_ref(), record.longitude.as_ref())?;

    // Combine cmplnt_fr_dt (date) + cmplnt_fr_tm ("HH:MM:SS").
    let occurrence_date = record.cmplnt_fr_dt.as_deref().and_then(|d| {
        let parsed = parse_socrata_date(d)?;
        if let Some(time_str) = &record.cmplnt_fr_tm
            && let Ok(time) = time_str.parse::<NaiveTime>()
        {
            return Some(NaiveDateTime::new(parsed.date(), time));
        }
        Some(parsed)
    })?;

    let report_date = record.rpt_dt.as_deref().and_then(parse_socrata_date);

    let precinct = record
        .addr_pct_cd
        .and_then(|s| s.trim().parse::<f64>().ok())
        .map(|p| {
            #[allow(clippy::cast_possible_truncation)]
            let p = p as i32;
            p
        });

    Some(NewCrimeEvent {
        complaint_number: record.cmplnt_num.filter(|number| !number.is_empty()),
        occurrence_date: Some(occurrence_date),
        report_date,
        offense_description: record.ofns_desc,
        law_category: record.law_cat_cd,
        specific_offense: record.pd_desc,
        borough: record.boro_nm,
        precinct,
        address: None,
        latitude: Some(latitude),
        longitude: Some(longitude),
        location_description: record.loc_of_occur_desc,
        premises_type: record.prem_typ_desc,
        status: "OPEN".to_string(),
        arrest_made: false,
        victim_age_group: None,
        victim_gender: None,
        victim_race: None,
        suspect_age_group: None,
        suspect_gender: None,
        suspect_race: None,
        data_source: "NYC_OPENDATA".to_string(),
        data_quality_score: 1.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_record() -> SocrataRecord {
        SocrataRecord {
            cmplnt_num: Some("H1234567".to_string()),
            cmplnt_fr_dt: Some("2024-05-10T00:00:00.000".to_string()),
            cmplnt_fr_tm: Some("21:15:00".to_string()),
            rpt_dt: Some("2024-05-11T00:00:00.000".to_string()),
            ofns_desc: Some("ROBBERY".to_string()),
            pd_desc: Some("ROBBERY,OPEN AREA UNCLASSIFIED".to_string()),
            law_cat_cd: Some("FELONY".to_string()),
            boro_nm: Some("BRONX".to_string()),
            addr_pct_cd: Some("44".to_string()),
            loc_of_occur_desc: Some("FRONT OF".to_string()),
            prem_typ_desc: Some("STREET".to_string()),
            latitude: Some("40.8448".to_string()),
            longitude: Some("-73.8648".to_string()),
        }
    }

    #[test]
    fn parses_a_record_page() {
        let body = r#"[{"cmplnt_num": "H1234567", "boro_nm": "BRONX"}]"#;
        let page = parse_page(body).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].cmplnt_num.as_deref(), Some("H1234567"));
    }

    #[test]
    fn error_body_surfaces_as_json_error() {
        let body = r#"{"error": true, "message": "query error"}"#;
        assert!(matches!(
            parse_page(body),
            Err(SourceError::Json(_))
        ));
    }

    #[test]
    fn maps_complete_record() {
        let event = map_socrata_record(full_record()).unwrap();
        assert_eq!(event.complaint_number.as_deref(), Some("H1234567"));
        assert_eq!(
            event.occurrence_date.unwrap().to_string(),
            "2024-05-10 21:15:00"
        );
        assert_eq!(event.precinct, Some(44));
        assert_eq!(event.data_source, "NYC_OPENDATA");
    }

    #[test]
    fn skips_record_without_coordinates() {
        let record = SocrataRecord {
            latitude: None,
            ..full_record()
        };
        assert!(map_socrata_record(record).is_none());
    }

    #[test]
    fn skips_record_without_occurrence_date() {
        let record = SocrataRecord {
            cmplnt_fr_dt: None,
            ..full_record()
        };
        assert!(map_socrata_record(record).is_none());
    }

    #[test]
    fn date_without_time_falls_back_to_midnight() {
        let record = SocrataRecord {
            cmplnt_fr_tm: None,
            ..full_record()
        };
        let event = map_socrata_record(record).unwrap();
        assert_eq!(
            event.occurrence_date.unwrap().to_string(),
            "2024-05-10 00:00:00"
        );
    }
}
