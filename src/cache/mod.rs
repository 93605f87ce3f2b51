//! Single-entry TTL cache between the widget endpoint and the upstream source.
//!
//! Only the profile is cache-backed on the read path; the feed snapshot stored
//! alongside it is whatever the last refresh saw, and the HTTP layer fetches
//! the feed live instead. A record that is expired, absent, or unparseable is
//! refreshed in place and re-read exactly once, so persistent corruption can
//! never recurse.

pub mod store;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use tokio::sync::Mutex;

use crate::source::types::{InstagramSource, ProfileSnapshot};
use store::{CacheRecord, CacheStore};

/// Item count fetched into the stored feed snapshot on refresh.
pub const REFRESH_FEED_LIMIT: usize = 3;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "widget_cache_hits_total",
            "Reads served from a fresh cache record."
        );
        describe_counter!(
            "widget_cache_stale_total",
            "Reads that found an expired record."
        );
        describe_counter!(
            "widget_cache_miss_total",
            "Reads that found no usable record (absent or corrupt)."
        );
        describe_counter!("widget_cache_refresh_total", "Cache refresh runs.");
        describe_counter!(
            "widget_source_errors_total",
            "Upstream fetch failures (profile or feed)."
        );
    });
}

/// Freshness of the stored record. There is no terminal state: a fresh record
/// expires as time passes, and every other state leads back to fresh through a
/// refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Fresh,
    Expired,
    CorruptOrMissing,
}

pub struct FeedCache {
    store: Arc<dyn CacheStore>,
    source: Arc<dyn InstagramSource>,
    username: String,
    ttl_secs: u64,
    // Serializes refreshes: concurrent stale readers each still trigger one,
    // but the store writes cannot interleave.
    refresh_gate: Mutex<()>,
}

impl FeedCache {
    pub fn new(
        store: Arc<dyn CacheStore>,
        source: Arc<dyn InstagramSource>,
        username: &str,
        ttl_secs: u64,
    ) -> Self {
        ensure_metrics_described();
        Self {
            store,
            source,
            username: username.to_string(),
            ttl_secs,
            refresh_gate: Mutex::new(()),
        }
    }

    fn is_fresh(&self, record: &CacheRecord, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(record.timestamp).num_seconds() <= self.ttl_secs as i64
    }

    /// Refetch both snapshots and overwrite the stored record.
    ///
    /// Upstream failures are substituted (fallback profile, empty feed) and a
    /// record is persisted even when every call failed: a fresh record of the
    /// attempt outranks keeping old data past its TTL. Errors are logged,
    /// never returned.
    pub async fn refresh(&self) {
        let _gate = self.refresh_gate.lock().await;
        counter!("widget_cache_refresh_total").increment(1);
        tracing::info!(source = self.source.name(), "refreshing cache");

        let mut profile = match self.source.fetch_profile().await {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!(error = ?e, "profile fetch failed");
                counter!("widget_source_errors_total").increment(1);
                None
            }
        };

        // The upstream occasionally reports a transient zero post count. One
        // extra attempt, bounded; its outcome stands either way.
        if profile.as_ref().map_or(true, |p| p.media_count == 0) {
            tracing::warn!("media_count missing or zero, refetching once");
            profile = match self.source.fetch_profile().await {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!(error = ?e, "profile refetch failed");
                    counter!("widget_source_errors_total").increment(1);
                    None
                }
            };
        }

        let profile = profile.unwrap_or_else(|| ProfileSnapshot::fallback(&self.username));

        let feed = match self.source.fetch_feed(REFRESH_FEED_LIMIT).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = ?e, "feed fetch failed");
                counter!("widget_source_errors_total").increment(1);
                Vec::new()
            }
        };

        let record = CacheRecord {
            timestamp: Utc::now(),
            profile,
            feed,
        };
        match self.store.write(&record).await {
            Ok(()) => tracing::info!(
                username = %record.profile.username,
                media_count = record.profile.media_count,
                feed_items = record.feed.len(),
                "cache updated"
            ),
            Err(e) => tracing::warn!(error = ?e, "cache write failed"),
        }
    }

    /// Resolve the profile through the cache.
    ///
    /// Fresh records are served as stored, with no upstream call. Expired,
    /// absent, or corrupt records trigger one refresh followed by exactly one
    /// re-read; a store that still cannot produce a record afterwards (the
    /// refresh write failed) degrades to the fallback snapshot.
    pub async fn profile(&self) -> ProfileSnapshot {
        match self.store.read().await {
            Ok(record) if self.is_fresh(&record, Utc::now()) => {
                counter!("widget_cache_hits_total").increment(1);
                return record.profile;
            }
            Ok(_) => {
                counter!("widget_cache_stale_total").increment(1);
                tracing::info!("cache expired, refreshing");
            }
            Err(e) => {
                counter!("widget_cache_miss_total").increment(1);
                tracing::warn!(error = ?e, "cache missing or corrupt, refreshing");
            }
        }

        self.refresh().await;

        match self.store.read().await {
            Ok(record) => record.profile,
            Err(e) => {
                tracing::warn!(error = ?e, "cache unreadable after refresh");
                ProfileSnapshot::fallback(&self.username)
            }
        }
    }

    /// Freshness of the stored record, without triggering a refresh.
    pub async fn status(&self) -> CacheStatus {
        match self.store.read().await {
            Ok(record) if self.is_fresh(&record, Utc::now()) => CacheStatus::Fresh,
            Ok(_) => CacheStatus::Expired,
            Err(_) => CacheStatus::CorruptOrMissing,
        }
    }

    /// The stored record as-is, if readable. Diagnostics only.
    pub async fn snapshot(&self) -> Option<CacheRecord> {
        self.store.read().await.ok()
    }
}
