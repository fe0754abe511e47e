//! ArcGIS feature-service client.
//!
//! Query endpoint of the Baltimore City `Homeless_Shelter` layer:
//! `.../FeatureServer/0/query?where=1%3D1&outFields=*&f=json`
//!
//! Each feature carries flat `attributes` with `name`, `address`, and the
//! Maryland State Plane grid coordinates `x_coord` / `y_coord` (US survey
//! feet). Attribute keys are matched case-insensitively. When a feature has
//! no grid attributes but a point `geometry`, the geometry is taken as
//! WGS84 decimal degrees.

use async_trait::async_trait;
use serde_json::{Map, Value};
use shelterlens_common::sandbox::SandboxClient;
use shelterlens_common::{RawCoordinates, RawShelter, SourceKind};
use tracing::{debug, instrument};

use super::ShelterSource;

pub struct ArcGisSource {
    client: SandboxClient,
    url: String,
}

impl ArcGisSource {
    pub fn new(client: SandboxClient, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ShelterSource for ArcGisSource {
    fn name(&self) -> &str {
        "arcgis"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> anyhow::Result<Vec<RawShelter>> {
        let resp = self.client
            .get(&self.url)?
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        let rows = parse_features(&resp)?;
        debug!(count = rows.len(), "ArcGIS query returned features");
        Ok(rows)
    }
}

/// Turn a feature-service query response into raw rows.
///
/// An `{"error": {...}}` envelope (which ArcGIS sends with HTTP 200) or a
/// body without a `features` array is an error. Features without a name
/// are skipped.
pub fn parse_features(body: &Value) -> anyhow::Result<Vec<RawShelter>> {
    if let Some(err) = body.get("error") {
        let code = err["code"].as_i64().unwrap_or_default();
        let message = err["message"].as_str().unwrap_or("unknown error");
        anyhow::bail!("ArcGIS error {}: {}", code, message);
    }

    let features = body["features"]
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("ArcGIS response has no 'features' array"))?;

    let mut rows = Vec::with_capacity(features.len());
    for feature in features {
        let empty = Map::new();
        let attributes = feature["attributes"].as_object().unwrap_or(&empty);

        let Some(name) = attribute(attributes, "name") else {
            debug!("Skipping ArcGIS feature without a name");
            continue;
        };

        let x = attribute(attributes, "x_coord");
        let y = attribute(attributes, "y_coord");
        let coordinates = if x.is_some() || y.is_some() {
            RawCoordinates::Projected { x, y }
        } else {
            RawCoordinates::Geographic {
                latitude: scalar_text(&feature["geometry"]["y"]),
                longitude: scalar_text(&feature["geometry"]["x"]),
            }
        };

        rows.push(RawShelter {
            source: SourceKind::Remote,
            name,
            address: attribute(attributes, "address"),
            category: attribute(attributes, "category"),
            coordinates,
        });
    }
    Ok(rows)
}

/// Attribute value as text, matching the key without regard to case.
fn attribute(attributes: &Map<String, Value>, key: &str) -> Option<String> {
    attributes
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .and_then(|(_, v)| scalar_text(v))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
