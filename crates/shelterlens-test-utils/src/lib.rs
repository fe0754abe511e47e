//! Shared fixtures for ShelterLens tests.
//!
//! Grid coordinates below are Maryland State Plane (EPSG:2248, US survey
//! feet) for the geographic positions they are paired with.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use shelterlens_common::{RawCoordinates, RawShelter, ReferencePoint, SourceBatch, SourceKind};

/// A named place with both coordinate forms.
#[derive(Debug, Clone, Copy)]
pub struct Landmark {
    pub latitude: f64,
    pub longitude: f64,
    pub x: f64,
    pub y: f64,
    /// Geodesic miles from Paul's Place.
    pub miles: f64,
}

pub const PAULS_PLACE: Landmark = Landmark {
    latitude: 39.2820504,
    longitude: -76.6328439,
    x: 1416263.1577,
    y: 588520.5664,
    miles: 0.0,
};

/// Just south of the reference; 0.47 miles away.
pub const NEAR_SOUTH: Landmark = Landmark {
    latitude: 39.2752,
    longitude: -76.6329,
    x: 1416257.3114,
    y: 586025.3915,
    miles: 0.4726,
};

pub const DOWNTOWN_EAST: Landmark = Landmark {
    latitude: 39.29,
    longitude: -76.61,
    x: 1422717.1067,
    y: 591442.8571,
    miles: 1.3418,
};

pub const MIDTOWN: Landmark = Landmark {
    latitude: 39.30,
    longitude: -76.62,
    x: 1419871.6085,
    y: 595073.2212,
    miles: 1.4168,
};

pub const WEST_COUNTY: Landmark = Landmark {
    latitude: 39.35,
    longitude: -76.70,
    x: 1397172.2148,
    y: 613200.6315,
    miles: 5.9096,
};

/// Outside the default 10 mile radius.
pub const FAR_EAST: Landmark = Landmark {
    latitude: 39.2820504,
    longitude: -76.44,
    x: 1470850.3606,
    y: 588797.7716,
    miles: 10.3389,
};

pub fn reference() -> ReferencePoint {
    ReferencePoint::default()
}

/// Row as the remote layer delivers it: projected coordinates.
pub fn remote_row(name: &str, x: f64, y: f64) -> RawShelter {
    RawShelter {
        source: SourceKind::Remote,
        name: name.to_string(),
        address: Some(format!("{} address", name)),
        category: None,
        coordinates: RawCoordinates::Projected {
            x: Some(x.to_string()),
            y: Some(y.to_string()),
        },
    }
}

pub fn remote_at(name: &str, landmark: Landmark) -> RawShelter {
    remote_row(name, landmark.x, landmark.y)
}

/// Row as a local file delivers it: decimal degrees, no address.
pub fn file_row(name: &str, latitude: f64, longitude: f64) -> RawShelter {
    RawShelter {
        source: SourceKind::File,
        name: name.to_string(),
        address: None,
        category: None,
        coordinates: RawCoordinates::Geographic {
            latitude: Some(latitude.to_string()),
            longitude: Some(longitude.to_string()),
        },
    }
}

pub fn file_at(name: &str, landmark: Landmark) -> RawShelter {
    file_row(name, landmark.latitude, landmark.longitude)
}

pub fn remote_batch(rows: Vec<RawShelter>) -> SourceBatch {
    SourceBatch::new(SourceKind::Remote, "arcgis", rows)
}

pub fn file_batch(rows: Vec<RawShelter>) -> SourceBatch {
    SourceBatch::new(SourceKind::File, "csv", rows)
}

/// ArcGIS feature-service query response for `(name, address, x, y)` rows.
pub fn arcgis_response(features: &[(&str, Option<&str>, Value, Value)]) -> Value {
    let features: Vec<Value> = features
        .iter()
        .map(|(name, address, x, y)| {
            json!({
                "attributes": {
                    "name": name,
                    "address": address,
                    "x_coord": x,
                    "y_coord": y,
                }
            })
        })
        .collect();
    json!({
        "objectIdFieldName": "OBJECTID",
        "geometryType": "esriGeometryPoint",
        "features": features,
    })
}

/// ArcGIS error envelope, returned with HTTP 200.
pub fn arcgis_error(code: u16, message: &str) -> Value {
    json!({ "error": { "code": code, "message": message, "details": [] } })
}

/// Write a `Location,Latitude,Longitude` file into `dir`.
pub fn write_locations_csv(dir: &Path, rows: &[(&str, &str, &str)]) -> anyhow::Result<PathBuf> {
    let path = dir.join("locations.csv");
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(["Location", "Latitude", "Longitude"])?;
    for (name, lat, lon) in rows {
        writer.write_record([*name, *lat, *lon])?;
    }
    writer.flush()?;
    Ok(path)
}

/// Fresh temp directory; dropped with the guard.
pub fn temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create temp dir")
}
