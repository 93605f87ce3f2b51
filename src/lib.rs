// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod cache;
pub mod config;
pub mod metrics;
pub mod source;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::cache::store::{CacheRecord, CacheStore, FileStore, MemoryStore};
pub use crate::cache::{CacheStatus, FeedCache};
pub use crate::config::WidgetConfig;
pub use crate::source::types::{FeedItem, InstagramSource, ProfileSnapshot};
