use crate::error::{CropWiseError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const PLACEHOLDER_PREFIX: &str = "Coords:";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocationQuery {
    Description(String),
    Coordinates { latitude: f64, longitude: f64 },
}

impl LocationQuery {
    /// Interpret free text, treating a `lat, lon` pair as coordinates.
    pub fn parse(input: &str) -> Self {
        match coordinate_pair(input) {
            Some((latitude, longitude)) => LocationQuery::Coordinates {
                latitude,
                longitude,
            },
            None => LocationQuery::Description(input.trim().to_string()),
        }
    }
}

/// An in-range `lat, lon` pair, optionally behind the placeholder prefix
/// (matched case-insensitively).
fn coordinate_pair(input: &str) -> Option<(f64, f64)> {
    let trimmed = input.trim();
    let body = match trimmed.get(..PLACEHOLDER_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(PLACEHOLDER_PREFIX) => {
            &trimmed[PLACEHOLDER_PREFIX.len()..]
        }
        _ => trimmed,
    };

    let (lat, lon) = body.split_once(',')?;
    let latitude = lat.trim().parse::<f64>().ok()?;
    let longitude = lon.trim().parse::<f64>().ok()?;
    valid_coordinates(latitude, longitude).then_some((latitude, longitude))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

impl GeocodeResult {
    pub fn new(latitude: f64, longitude: f64, display_name: impl Into<String>) -> Result<Self> {
        if !valid_coordinates(latitude, longitude) {
            return Err(CropWiseError::Upstream(format!(
                "geocoder returned out-of-range coordinates ({}, {})",
                latitude, longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
            display_name: display_name.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseGeocodeOutput {
    #[serde(default)]
    pub location_description: String,
}

/// A device position fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: Option<f64>,
    pub acquired_at: DateTime<Utc>,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m: None,
            acquired_at: Utc::now(),
        }
    }
}

pub fn valid_coordinates(latitude: f64, longitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
}

/// Location text used when coordinates could not be turned into a place name.
pub fn coordinate_placeholder(latitude: f64, longitude: f64) -> String {
    format!("{} {:.4}, {:.4}", PLACEHOLDER_PREFIX, latitude, longitude)
}

/// True for text that `LocationQuery::parse` reads as coordinates.
pub fn is_coordinate_placeholder(location: &str) -> bool {
    coordinate_pair(location).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_detection() {
        let placeholder = coordinate_placeholder(38.58157, -121.4944);
        assert_eq!(placeholder, "Coords: 38.5816, -121.4944");
        assert!(is_coordinate_placeholder(&placeholder));
        assert!(is_coordinate_placeholder("38.58, -121.49"));
        assert!(is_coordinate_placeholder("coords: 1, 2"));
        assert!(!is_coordinate_placeholder("Sacramento, California"));
        assert!(!is_coordinate_placeholder("Route 66, Arizona"));
        assert!(!is_coordinate_placeholder("123, 456"));
    }

    #[test]
    fn placeholder_and_parse_agree() {
        for text in [
            "Coords: 38.5816, -121.4944",
            "COORDS: -33.87, 151.21",
            "38.58, -121.49",
            "123, 456",
            "Coords: 91, 0",
            "Coords: somewhere",
            "Davis, California",
        ] {
            let parsed_as_coordinates =
                matches!(LocationQuery::parse(text), LocationQuery::Coordinates { .. });
            assert_eq!(is_coordinate_placeholder(text), parsed_as_coordinates, "{}", text);
        }
        assert_eq!(
            LocationQuery::parse("coords: 1, 2"),
            LocationQuery::Coordinates {
                latitude: 1.0,
                longitude: 2.0
            }
        );
    }

    #[test]
    fn query_parse() {
        assert_eq!(
            LocationQuery::parse("Coords: 38.5816, -121.4944"),
            LocationQuery::Coordinates {
                latitude: 38.5816,
                longitude: -121.4944
            }
        );
        assert_eq!(
            LocationQuery::parse("  Jharkhand, India "),
            LocationQuery::Description("Jharkhand, India".into())
        );
        // Out of range pairs are not coordinates
        assert_eq!(
            LocationQuery::parse("120, 20"),
            LocationQuery::Description("120, 20".into())
        );
    }

    #[test]
    fn geocode_result_rejects_out_of_range() {
        assert!(GeocodeResult::new(91.0, 0.0, "nowhere").is_err());
        assert!(GeocodeResult::new(0.0, -181.0, "nowhere").is_err());
        let ok = GeocodeResult::new(-33.87, 151.21, "Sydney").unwrap();
        assert_eq!(ok.display_name, "Sydney");
    }
}
