//! Synthetic crime data for demos and local development.
//!
//! Generates 1,000 plausible-looking events spread across the five boroughs,
//! with coordinates drawn inside each borough's bounding rectangle and dates
//! within the last two years. Used as a fallback when no real CSV export is
//! available.

use std::path::Path;

use chrono::{Duration, Utc};
use gotham_models::{NewCrimeEvent, NYC_BOROUGHS};
use rand::Rng;

use crate::SourceError;
use crate::csv_import::CsvRecord;

/// Number of synthetic events generated per run.
pub const SAMPLE_SIZE: usize = 1000;

/// (offense description, law category, specific offense)
const CRIME_TYPES: [(&str, &str, &str); 15] = [
    ("ASSAULT", "FELONY", "Assault 3 & Related Offenses"),
    ("BURGLARY", "FELONY", "Burglary"),
    ("ROBBERY", "FELONY", "Robbery"),
    ("GRAND LARCENY", "FELONY", "Grand Larceny"),
    ("PETIT LARCENY", "MISDEMEANOR", "Petit Larceny"),
    (
        "CRIMINAL MISCHIEF",
        "MISDEMEANOR",
        "Criminal Mischief & Related Offenses",
    ),
    ("HARASSMENT", "VIOLATION", "Harassment 2"),
    ("DRUG POSSESSION", "MISDEMEANOR", "Dangerous Drugs"),
    ("VEHICLE THEFT", "FELONY", "Grand Larceny of Motor Vehicle"),
    ("FRAUD", "FELONY", "Forgery"),
    ("DOMESTIC VIOLENCE", "FELONY", "Felony Assault"),
    ("VANDALISM", "MISDEMEANOR", "Criminal Mischief"),
    ("TRESPASSING", "VIOLATION", "Trespass"),
    ("DISORDERLY CONDUCT", "VIOLATION", "Disorderly Conduct"),
    ("WEAPONS POSSESSION", "FELONY", "Dangerous Weapons"),
];

const LOCATION_TYPES: [&str; 10] = [
    "STREET",
    "RESIDENCE - APT HOUSE",
    "COMMERCIAL BUILDING",
    "PARK/PLAYGROUND",
    "TRANSIT - NYC SUBWAY",
    "STORE UNCLASSIFIED",
    "RESTAURANT/DINER",
    "SCHOOL",
    "PARKING LOT/GARAGE",
    "HOSPITAL",
];

const LOCATION_DESCRIPTIONS: [&str; 4] = ["INSIDE", "OUTSIDE", "FRONT OF", "REAR OF"];

const STATUSES: [&str; 3] = ["COMPLETED", "OPEN", "CLOSED"];

const AGE_GROUPS: [&str; 6] = ["<18", "18-24", "25-44", "45-64", "65+", "UNKNOWN"];

const GENDERS: [&str; 3] = ["M", "F", "U"];

const RACES: [&str; 6] = ["BLACK", "WHITE", "HISPANIC", "ASIAN", "OTHER", "UNKNOWN"];

fn pick<'a>(rng: &mut impl Rng, items: &'a [&'a str]) -> &'a str {
    items[rng.random_range(0..items.len())]
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Generates [`SAMPLE_SIZE`] synthetic crime events.
#[must_use]
pub fn generate_sample_events() -> Vec<NewCrimeEvent> {
    let mut rng = rand::rng();
    let now = Utc::now().naive_utc();

    let mut events = Vec::with_capacity(SAMPLE_SIZE);
    for i in 0..SAMPLE_SIZE {
        let borough = &NYC_BOROUGHS[rng.random_range(0..NYC_BOROUGHS.len())];
        let latitude = round6(rng.random_range(borough.south_bound..borough.north_bound));
        let longitude = round6(rng.random_range(borough.west_bound..borough.east_bound));

        let (offense, law_category, specific_offense) =
            CRIME_TYPES[rng.random_range(0..CRIME_TYPES.len())];

        let days_ago = rng.random_range(1..=730);
        let occurrence_date = now - Duration::days(days_ago);
        let report_date = occurrence_date + Duration::days(rng.random_range(0..=7));

        let suspect_known = rng.random_bool(0.7);

        events.push(NewCrimeEvent {
            complaint_number: Some(format!("2024{:06}", i + 1)),
            occurrence_date: Some(occurrence_date),
            report_date: Some(report_date),
            offense_description: Some(offense.to_string()),
            law_category: Some(law_category.to_string()),
            specific_offense: Some(specific_offense.to_string()),
            borough: Some(borough.name.to_string()),
            precinct: Some(rng.random_range(1..=123)),
            address: None,
            latitude: Some(latitude),
            longitude: Some(longitude),
            location_description: Some(pick(&mut rng, &LOCATION_DESCRIPTIONS).to_string()),
            premises_type: Some(pick(&mut rng, &LOCATION_TYPES).to_string()),
            status: pick(&mut rng, &STATUSES).to_string(),
            arrest_made: rng.random_bool(0.5),
            victim_age_group: Some(pick(&mut rng, &AGE_GROUPS).to_string()),
            victim_gender: Some(pick(&mut rng, &GENDERS).to_string()),
            victim_race: Some(pick(&mut rng, &RACES).to_string()),
            suspect_age_group: suspect_known.then(|| pick(&mut rng, &AGE_GROUPS).to_string()),
            suspect_gender: suspect_known.then(|| pick(&mut rng, &GENDERS).to_string()),
            suspect_race: suspect_known.then(|| pick(&mut rng, &RACES).to_string()),
            data_source: "SAMPLE_DATA".to_string(),
            data_quality_score: 1.0,
        });
    }

    events
}

impl From<&NewCrimeEvent> for CsvRecord {
    fn from(event: &NewCrimeEvent) -> Self {
        Self {
            complaint_number: event.complaint_number.clone(),
            occurrence_date: event.occurrence_date.map(gotham_models::format_timestamp),
            report_date: event.report_date.map(gotham_models::format_timestamp),
            offense_description: event.offense_description.clone(),
            law_category: event.law_category.clone(),
            specific_offense: event.specific_offense.clone(),
            borough: event.borough.clone(),
            precinct: event.precinct.map(|p| p.to_string()),
            address: event.address.clone(),
            latitude: event.latitude.map(|v| v.to_string()),
            longitude: event.longitude.map(|v| v.to_string()),
            location_description: event.location_description.clone(),
            premises_type: event.premises_type.clone(),
            status: Some(event.status.clone()),
            arrest_made: Some(event.arrest_made.to_string()),
            victim_age_group: event.victim_age_group.clone(),
            victim_gender: event.victim_gender.clone(),
            victim_race: event.victim_race.clone(),
            suspect_age_group: event.suspect_age_group.clone(),
            suspect_gender: event.suspect_gender.clone(),
            suspect_race: event.suspect_race.clone(),
            data_source: Some(event.data_source.clone()),
        }
    }
}

/// Writes events to a CSV file the importer can read back.
///
/// # Errors
///
/// Returns [`SourceError`] if the directory cannot be created or the file
/// cannot be written.
pub fn write_sample_csv(path: &Path, events: &[NewCrimeEvent]) -> Result<(), SourceError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for event in events {
        writer.serialize(CsvRecord::from(event))?;
    }
    writer.flush()?;

    log::info!("Wrote {} sample rows to {}", events.len(), path.display());

    Ok(())
}
