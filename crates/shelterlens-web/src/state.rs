//! Shared application state for the web server.

use std::io::ErrorKind;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use shelterlens_common::error::ShelterError;
use shelterlens_common::LocatorConfig;
use shelterlens_ingestion::{collect_batches, SourceSet, SourceWarning};
use shelterlens_ranker::{CategoryMap, RankedShelters, RankingPipeline, RankingQuery};
use tracing::{info, warn};

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub config: LocatorConfig,
    pub pipeline: RankingPipeline,
    pub sources: SourceSet,
    pub started_at: DateTime<Utc>,
}

/// One ranking run together with the source failures behind it.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub ranked: RankedShelters,
    pub warnings: Vec<SourceWarning>,
}

impl AppState {
    pub fn new(config: LocatorConfig, pipeline: RankingPipeline, sources: SourceSet) -> Self {
        Self {
            config,
            pipeline,
            sources,
            started_at: Utc::now(),
        }
    }

    pub fn from_config(config: LocatorConfig) -> anyhow::Result<Self> {
        let categories = load_categories(&config)?;
        let pipeline = RankingPipeline::new(config.reference.to_reference_point(), categories);
        let sources = SourceSet::from_config(&config.sources)?;
        Ok(Self::new(config, pipeline, sources))
    }

    /// Fetch every source and run the pipeline.
    pub async fn rank(&self, query: &RankingQuery) -> Snapshot {
        let collected = collect_batches(self.sources.sources()).await;
        let ranked = self.pipeline.rank(collected.batches, query);

        for diagnostic in &ranked.diagnostics {
            warn!("{}", diagnostic);
        }
        info!(
            total = ranked.all.len(),
            nearby = ranked.nearby.len(),
            threshold_miles = query.threshold_miles,
            "Ranked shelters"
        );

        Snapshot {
            ranked,
            warnings: collected.warnings,
        }
    }
}

/// A missing table leaves every shelter `Unknown`; a broken one is fatal.
fn load_categories(config: &LocatorConfig) -> anyhow::Result<CategoryMap> {
    let path = &config.ranking.categories_path;
    match CategoryMap::load(path) {
        Ok(map) => {
            info!(path = %path.display(), entries = map.len(), "Category table loaded");
            Ok(map)
        }
        Err(ShelterError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "Category table not found, all shelters will be Unknown");
            Ok(CategoryMap::new())
        }
        Err(e) => Err(e).with_context(|| format!("loading category table {}", path.display())),
    }
}

pub type SharedState = Arc<AppState>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_category_table_is_empty_map() {
        let mut config = LocatorConfig::default();
        config.ranking.categories_path = "/no/such/categories.toml".into();
        config.sources.arcgis_enabled = false;
        let state = AppState::from_config(config).unwrap();
        assert!(state.pipeline.category_map().is_empty());
    }

    #[test]
    fn test_broken_category_table_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("categories.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();

        let mut config = LocatorConfig::default();
        config.ranking.categories_path = path;
        config.sources.arcgis_enabled = false;
        assert!(AppState::from_config(config).is_err());
    }
}
