//! Raw row → `ShelterRecord`.
//!
//! Each row is converted independently and yields a `Result`; failures are
//! collected as `Diagnostic`s by the pipeline instead of aborting the batch.

use std::fmt;

use serde::Serialize;
use shelterlens_common::{Position, RawCoordinates, RawShelter, ShelterRecord, SourceKind};
use thiserror::Error;

use crate::categories::CategoryMap;
use crate::projection::StatePlane;

/// Why a single row could not be placed on the map.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("missing {0}")]
    Missing(&'static str),

    #[error("{field} is not numeric: '{value}'")]
    NotNumeric { field: &'static str, value: String },

    #[error("coordinate is not a finite number")]
    NonFinite,

    #[error("position ({latitude}, {longitude}) is outside the WGS84 range")]
    OutOfRange { latitude: f64, longitude: f64 },

    #[error("State Plane inverse did not converge for ({x}, {y})")]
    ProjectionDiverged { x: f64, y: f64 },
}

/// A row that was dropped, kept for display next to the results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub source: SourceKind,
    pub name: String,
    pub reason: String,
}

impl Diagnostic {
    pub fn new(raw: &RawShelter, error: &ConversionError) -> Self {
        Self {
            source: raw.source,
            name: raw.name.clone(),
            reason: error.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error converting coordinates for shelter {} ({} source): {}",
            self.name, self.source, self.reason
        )
    }
}

/// Parse one textual coordinate cell.
pub fn parse_coordinate(field: &'static str, raw: Option<&str>) -> Result<f64, ConversionError> {
    let text = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or(ConversionError::Missing(field))?;
    let value: f64 = text.parse().map_err(|_| ConversionError::NotNumeric {
        field,
        value: text.to_string(),
    })?;
    if !value.is_finite() {
        return Err(ConversionError::NonFinite);
    }
    Ok(value)
}

/// Resolve raw coordinates to a valid WGS84 position.
pub fn resolve_position(
    coordinates: &RawCoordinates,
    projection: &StatePlane,
) -> Result<Position, ConversionError> {
    match coordinates {
        RawCoordinates::Projected { x, y } => {
            let x = parse_coordinate("x_coord", x.as_deref())?;
            let y = parse_coordinate("y_coord", y.as_deref())?;
            projection.to_geographic(x, y)
        }
        RawCoordinates::Geographic { latitude, longitude } => {
            let latitude = parse_coordinate("latitude", latitude.as_deref())?;
            let longitude = parse_coordinate("longitude", longitude.as_deref())?;
            let position = Position::new(latitude, longitude);
            if !position.is_valid() {
                return Err(ConversionError::OutOfRange { latitude, longitude });
            }
            Ok(position)
        }
    }
}

/// Full normalisation of one row: position, address default and category.
pub fn normalise(
    raw: &RawShelter,
    projection: &StatePlane,
    categories: &CategoryMap,
) -> Result<ShelterRecord, ConversionError> {
    let position = resolve_position(&raw.coordinates, projection)?;
    let address = raw
        .address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or(raw.source.default_address())
        .to_string();

    Ok(ShelterRecord {
        name: raw.name.clone(),
        address,
        position,
        category: categories.resolve(&raw.name, raw.category.as_deref()),
        source: raw.source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelterlens_common::Category;

    fn geographic(lat: &str, lon: &str) -> RawCoordinates {
        RawCoordinates::Geographic {
            latitude: Some(lat.to_string()),
            longitude: Some(lon.to_string()),
        }
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("latitude", Some(" 39.28 ")), Ok(39.28));
        assert_eq!(parse_coordinate("latitude", None), Err(ConversionError::Missing("latitude")));
        assert_eq!(parse_coordinate("latitude", Some("  ")), Err(ConversionError::Missing("latitude")));
        assert!(matches!(
            parse_coordinate("longitude", Some("abc")),
            Err(ConversionError::NotNumeric { field: "longitude", .. })
        ));
        assert_eq!(parse_coordinate("x_coord", Some("NaN")), Err(ConversionError::NonFinite));
    }

    #[test]
    fn test_geographic_out_of_range() {
        let sp = StatePlane::maryland();
        let err = resolve_position(&geographic("139.0", "-76.6"), &sp).unwrap_err();
        assert!(matches!(err, ConversionError::OutOfRange { .. }));
    }

    #[test]
    fn test_projected_round_trip() {
        let sp = StatePlane::maryland();
        let raw = RawCoordinates::Projected {
            x: Some("1416263.1576".to_string()),
            y: Some("588520.5664".to_string()),
        };
        let p = resolve_position(&raw, &sp).unwrap();
        assert!((p.latitude - 39.2820504).abs() < 1e-6);
        assert!((p.longitude - -76.6328439).abs() < 1e-6);
    }

    #[test]
    fn test_normalise_fills_address_and_category() {
        let raw = RawShelter {
            source: SourceKind::File,
            name: "Corner Pantry".to_string(),
            address: None,
            category: Some("Unknown".to_string()),
            coordinates: geographic("39.29", "-76.61"),
        };
        let map = CategoryMap::new().with("Corner Pantry", Category::FoodAndMeals);
        let record = normalise(&raw, &StatePlane::maryland(), &map).unwrap();
        assert_eq!(record.address, "Not Available");
        assert_eq!(record.category, Category::FoodAndMeals);
        assert_eq!(record.position, Position::new(39.29, -76.61));
    }

    #[test]
    fn test_diagnostic_message_names_the_shelter() {
        let raw = RawShelter {
            source: SourceKind::Remote,
            name: "Broken Row".to_string(),
            address: None,
            category: None,
            coordinates: RawCoordinates::Projected { x: Some("n/a".to_string()), y: Some("1".to_string()) },
        };
        let err = normalise(&raw, &StatePlane::maryland(), &CategoryMap::new()).unwrap_err();
        let diag = Diagnostic::new(&raw, &err);
        assert!(diag.to_string().contains("Broken Row"));
        assert!(diag.reason.contains("x_coord"));
    }
}
