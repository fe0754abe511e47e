//! One hand-entered record from the configuration file.

use async_trait::async_trait;
use shelterlens_common::{RawCoordinates, RawShelter, SampleRecordConfig, SourceKind};

use super::ShelterSource;

pub struct SampleSource {
    record: SampleRecordConfig,
}

impl SampleSource {
    pub fn from_config(record: &SampleRecordConfig) -> Self {
        Self { record: record.clone() }
    }
}

#[async_trait]
impl ShelterSource for SampleSource {
    fn name(&self) -> &str {
        "sample"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Sample
    }

    async fn fetch(&self) -> anyhow::Result<Vec<RawShelter>> {
        Ok(vec![RawShelter {
            source: SourceKind::Sample,
            name: self.record.name.clone(),
            address: self.record.address.clone(),
            category: self.record.category.clone(),
            coordinates: RawCoordinates::Geographic {
                latitude: Some(self.record.latitude.to_string()),
                longitude: Some(self.record.longitude.to_string()),
            },
        }])
    }
}
