//! Time-bounded memo around a source fetch.
//!
//! A successful fetch is reused until it is older than the TTL or until
//! `invalidate` is called. Failures are never stored, so the next request
//! retries the upstream. Refills are serialised: concurrent callers that
//! find the memo stale wait for one upstream fetch and share its rows.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shelterlens_common::{RawShelter, SourceKind};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::sources::ShelterSource;

#[derive(Debug, Clone)]
struct CachedFetch {
    rows: Vec<RawShelter>,
    stored: Instant,
    fetched_at: DateTime<Utc>,
}

pub struct FetchCache<S> {
    inner: S,
    ttl: Duration,
    entry: RwLock<Option<CachedFetch>>,
    refill: Mutex<()>,
}

impl<S: ShelterSource> FetchCache<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entry: RwLock::new(None),
            refill: Mutex::new(()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drop the memoised rows; the next fetch goes upstream.
    pub async fn invalidate(&self) {
        let mut entry = self.entry.write().await;
        if entry.take().is_some() {
            info!(source = self.inner.name(), "Fetch cache invalidated");
        }
    }

    /// Age of the memoised rows, if any.
    pub async fn age(&self) -> Option<Duration> {
        self.entry.read().await.as_ref().map(|e| e.stored.elapsed())
    }

    /// Wall-clock time of the memoised fetch, if any.
    pub async fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.entry.read().await.as_ref().map(|e| e.fetched_at)
    }

    async fn fresh_rows(&self) -> Option<Vec<RawShelter>> {
        let entry = self.entry.read().await;
        entry
            .as_ref()
            .filter(|e| e.stored.elapsed() < self.ttl)
            .map(|e| e.rows.clone())
    }
}

#[async_trait]
impl<S: ShelterSource> ShelterSource for FetchCache<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn kind(&self) -> SourceKind {
        self.inner.kind()
    }

    async fn fetch(&self) -> anyhow::Result<Vec<RawShelter>> {
        if let Some(rows) = self.fresh_rows().await {
            debug!(source = self.inner.name(), count = rows.len(), "Serving rows from fetch cache");
            return Ok(rows);
        }

        let _refill = self.refill.lock().await;
        if let Some(rows) = self.fresh_rows().await {
            debug!(source = self.inner.name(), count = rows.len(), "Rows refilled by a concurrent fetch");
            return Ok(rows);
        }

        let rows = self.inner.fetch().await?;
        *self.entry.write().await = Some(CachedFetch {
            rows: rows.clone(),
            stored: Instant::now(),
            fetched_at: Utc::now(),
        });
        Ok(rows)
    }
}
