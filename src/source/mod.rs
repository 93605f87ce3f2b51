// src/source/mod.rs
pub mod graph_api;
pub mod scrape;
pub mod types;

use std::sync::Arc;

use crate::config::{SourceKind, WidgetConfig};
pub use types::{FeedItem, InstagramSource, ProfileSnapshot};

/// Build the configured adapter variant.
///
/// Both variants sit behind the same trait and neither field set is a superset
/// of the other: the avatar only exists when scraping, follower/following
/// counts are absent from the Graph API.
pub fn build(cfg: &WidgetConfig, client: reqwest::Client) -> Arc<dyn InstagramSource> {
    match cfg.source {
        SourceKind::GraphApi => Arc::new(graph_api::GraphApiSource::new(
            &cfg.username,
            &cfg.access_token,
            client,
        )),
        SourceKind::WebScrape => Arc::new(scrape::WebScrapeSource::new(&cfg.username, client)),
    }
}
