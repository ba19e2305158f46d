//! Shared parsing utilities for crime data sources.

use chrono::NaiveDateTime;

/// Parses a Socrata datetime string (ISO 8601 with optional fractional
/// seconds).
#[must_use]
pub fn parse_socrata_date(s: &str) -> Option<NaiveDateTime> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive);
    }
    None
}

/// Parses lat/lng from optional string fields. Returns `None` if either is
/// missing, unparseable, or zero.
#[must_use]
pub fn parse_lat_lng_str(lat: Option<&String>, lng: Option<&String>) -> Option<(f64, f64)> {
    let latitude = lat?.trim().parse::<f64>().ok()?;
    let longitude = lng?.trim().parse::<f64>().ok()?;
    if latitude == 0.0 || longitude == 0.0 {
        return None;
    }
    Some((latitude, longitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_socrata_date_with_fractional() {
        let dt = parse_socrata_date("2024-01-15T14:30:00.000").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 14:30:00");
    }

    #[test]
    fn parses_socrata_date_without_fractional() {
        let dt = parse_socrata_date("2024-01-15T14:30:00").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 14:30:00");
    }

    #[test]
    fn rejects_invalid_date() {
        assert!(parse_socrata_date("not-a-date").is_none());
    }

    #[test]
    fn parses_lat_lng_strings() {
        let lat = "40.7831".to_string();
        let lng = "-73.9712".to_string();
        let (la, lo) = parse_lat_lng_str(Some(&lat), Some(&lng)).unwrap();
        assert!((la - 40.7831).abs() < f64::EPSILON);
        assert!((lo - -73.9712).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_zero_lat_lng() {
        let lat = "0.0".to_string();
        let lng = "-73.9712".to_string();
        assert!(parse_lat_lng_str(Some(&lat), Some(&lng)).is_none());
    }

    #[test]
    fn rejects_missing_lat_lng() {
        let lng = "-73.9712".to_string();
        assert!(parse_lat_lng_str(None, Some(&lng)).is_none());
    }
}
