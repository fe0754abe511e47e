//! Local shelter list.
//!
//! Expected header: `Location,Latitude,Longitude` (extra columns ignored).
//! Rows carry no address or category; the merge step fills
//! `Not Available` / `Unknown`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use shelterlens_common::{RawCoordinates, RawShelter, SourceKind};
use tracing::{debug, instrument, warn};

use super::ShelterSource;

const NAME_COLUMN: &str = "Location";
const LATITUDE_COLUMN: &str = "Latitude";
const LONGITUDE_COLUMN: &str = "Longitude";

pub struct CsvFileSource {
    path: PathBuf,
    label: String,
}

impl CsvFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let label = path.display().to_string();
        Self { path, label }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ShelterSource for CsvFileSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn kind(&self) -> SourceKind {
        SourceKind::File
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch(&self) -> anyhow::Result<Vec<RawShelter>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))?;
        let rows = parse_locations(&content)?;
        debug!(count = rows.len(), "Loaded shelter rows from file");
        Ok(rows)
    }
}

/// Parse the file body. Missing required columns fail the whole file;
/// a malformed line only loses that line.
pub fn parse_locations(content: &str) -> anyhow::Result<Vec<RawShelter>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers().context("reading CSV header")?.clone();
    let column = |wanted: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| anyhow::anyhow!("CSV is missing the '{}' column", wanted))
    };
    let name_idx = column(NAME_COLUMN)?;
    let lat_idx = column(LATITUDE_COLUMN)?;
    let lon_idx = column(LONGITUDE_COLUMN)?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!(line = line + 2, error = %e, "Skipping unreadable CSV line");
                continue;
            }
        };
        let cell = |idx: usize| record.get(idx).filter(|v| !v.is_empty()).map(String::from);

        let Some(name) = cell(name_idx) else {
            warn!(line = line + 2, "Skipping CSV line without a location name");
            continue;
        };
        rows.push(RawShelter {
            source: SourceKind::File,
            name,
            address: None,
            category: None,
            coordinates: RawCoordinates::Geographic {
                latitude: cell(lat_idx),
                longitude: cell(lon_idx),
            },
        });
    }
    Ok(rows)
}
