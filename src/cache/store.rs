use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::source::types::{FeedItem, ProfileSnapshot};

/// The single persisted unit: the moment of the last write plus the profile
/// and feed snapshots taken then. Fully overwritten on every refresh, never
/// merged, never explicitly deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub profile: ProfileSnapshot,
    pub feed: Vec<FeedItem>,
}

/// Single-record persistence. A failed `read` uniformly means
/// corrupt-or-missing; callers react by refreshing, not by distinguishing the
/// cases.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn read(&self) -> Result<CacheRecord>;
    async fn write(&self, record: &CacheRecord) -> Result<()>;
}

/// One pretty-printed JSON file at a fixed path.
///
/// The write is a plain overwrite, not an atomic rename: a crash mid-write
/// leaves a file the next read reports as corrupt, which re-triggers a
/// refresh.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CacheStore for FileStore {
    async fn read(&self) -> Result<CacheRecord> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading cache from {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing cache at {}", self.path.display()))
    }

    async fn write(&self, record: &CacheRecord) -> Result<()> {
        let raw = serde_json::to_string_pretty(record).context("serializing cache record")?;
        tokio::fs::write(&self.path, raw)
            .await
            .with_context(|| format!("writing cache to {}", self.path.display()))
    }
}

/// In-process store; the injected substitute for tests and no-persistence
/// runs.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Option<CacheRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preloaded(record: CacheRecord) -> Self {
        Self {
            inner: Mutex::new(Some(record)),
        }
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn read(&self) -> Result<CacheRecord> {
        self.inner
            .lock()
            .expect("memory store mutex poisoned")
            .clone()
            .ok_or_else(|| anyhow!("no cache record stored"))
    }

    async fn write(&self, record: &CacheRecord) -> Result<()> {
        *self.inner.lock().expect("memory store mutex poisoned") = Some(record.clone());
        Ok(())
    }
}
