//! Shelter source clients.

pub mod arcgis;
pub mod csv_file;
pub mod sample;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use shelterlens_common::sandbox::SandboxClient;
use shelterlens_common::{RawShelter, SourceKind, SourcesConfig};
use tracing::info;

pub use arcgis::ArcGisSource;
pub use csv_file::CsvFileSource;
pub use sample::SampleSource;

use crate::cache::FetchCache;

/// Common interface for everything that contributes shelter rows.
#[async_trait]
pub trait ShelterSource: Send + Sync {
    /// Human-readable label used in warnings and logs.
    fn name(&self) -> &str;

    fn kind(&self) -> SourceKind;

    /// Fetch every row the source currently has.
    async fn fetch(&self) -> anyhow::Result<Vec<RawShelter>>;
}

/// The configured sources, in merge order: remote, file, sample.
#[derive(Clone, Default)]
pub struct SourceSet {
    sources: Vec<Arc<dyn ShelterSource>>,
    remote: Option<Arc<FetchCache<ArcGisSource>>>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SourcesConfig) -> anyhow::Result<Self> {
        let mut set = Self::new();

        if config.arcgis_enabled {
            let client = SandboxClient::new(Duration::from_secs(config.timeout_secs))?
                .with_allowed_hosts(&config.allowed_hosts);
            let remote = ArcGisSource::new(client, config.arcgis_url.clone());
            let cached = FetchCache::new(remote, Duration::from_secs(config.cache_ttl_secs));
            set = set.with_remote(cached);
        }
        if let Some(ref path) = config.csv_path {
            set = set.with_source(CsvFileSource::new(path));
        }
        if let Some(ref sample) = config.sample {
            set = set.with_source(SampleSource::from_config(sample));
        }

        info!(
            sources = set.len(),
            remote = set.remote.is_some(),
            "Configured shelter sources"
        );
        Ok(set)
    }

    /// Register the memoised remote source. It is also pushed into the
    /// ordinary source list.
    pub fn with_remote(mut self, remote: FetchCache<ArcGisSource>) -> Self {
        let remote = Arc::new(remote);
        self.sources.push(remote.clone());
        self.remote = Some(remote);
        self
    }

    pub fn with_source(mut self, source: impl ShelterSource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    pub fn sources(&self) -> &[Arc<dyn ShelterSource>] {
        &self.sources
    }

    pub fn remote(&self) -> Option<&FetchCache<ArcGisSource>> {
        self.remote.as_deref()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
