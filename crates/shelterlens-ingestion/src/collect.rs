//! Run every configured source and gather their batches.

use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use shelterlens_common::{SourceBatch, SourceKind};
use tracing::{info, warn};

use crate::sources::ShelterSource;

/// A source that could not contribute this run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceWarning {
    pub source: String,
    pub kind: SourceKind,
    pub message: String,
}

impl fmt::Display for SourceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SourceKind::Remote => write!(f, "Error fetching shelter data from {}: {}", self.source, self.message),
            SourceKind::File => write!(f, "Error loading {}: {}", self.source, self.message),
            SourceKind::Sample => write!(f, "Error reading sample record {}: {}", self.source, self.message),
        }
    }
}

/// One batch per source, in source order, plus warnings for the ones that
/// failed.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub batches: Vec<SourceBatch>,
    pub warnings: Vec<SourceWarning>,
}

impl Collected {
    pub fn row_count(&self) -> usize {
        self.batches.iter().map(|b| b.rows.len()).sum()
    }
}

/// Fetch all sources concurrently. A failing source becomes an empty batch
/// and a warning; collection itself never fails.
pub async fn collect_batches(sources: &[Arc<dyn ShelterSource>]) -> Collected {
    let results = join_all(sources.iter().map(|s| s.fetch())).await;

    let mut collected = Collected::default();
    for (source, result) in sources.iter().zip(results) {
        match result {
            Ok(rows) => {
                collected.batches.push(SourceBatch::new(source.kind(), source.name(), rows));
            }
            Err(e) => {
                warn!(source = source.name(), error = %e, "Source failed; continuing without it");
                collected.warnings.push(SourceWarning {
                    source: source.name().to_string(),
                    kind: source.kind(),
                    message: format!("{:#}", e),
                });
                collected.batches.push(SourceBatch::empty(source.kind(), source.name()));
            }
        }
    }

    info!(
        sources = sources.len(),
        rows = collected.row_count(),
        warnings = collected.warnings.len(),
        "Collected shelter rows"
    );
    collected
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shelterlens_common::RawShelter;

    struct Failing;

    #[async_trait]
    impl ShelterSource for Failing {
        fn name(&self) -> &str {
            "broken.csv"
        }

        fn kind(&self) -> SourceKind {
            SourceKind::File
        }

        async fn fetch(&self) -> anyhow::Result<Vec<RawShelter>> {
            anyhow::bail!("No such file or directory")
        }
    }

    #[tokio::test]
    async fn test_failure_becomes_warning_and_empty_batch() {
        let sources: Vec<Arc<dyn ShelterSource>> = vec![Arc::new(Failing)];
        let collected = collect_batches(&sources).await;

        assert_eq!(collected.batches.len(), 1);
        assert!(collected.batches[0].rows.is_empty());
        assert_eq!(collected.warnings.len(), 1);
        assert_eq!(
            collected.warnings[0].to_string(),
            "Error loading broken.csv: No such file or directory"
        );
    }

    #[tokio::test]
    async fn test_no_sources() {
        let collected = collect_batches(&[]).await;
        assert!(collected.batches.is_empty());
        assert!(collected.warnings.is_empty());
        assert_eq!(collected.row_count(), 0);
    }
}
