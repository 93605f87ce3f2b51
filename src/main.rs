//! Instagram Feed Widget — Binary Entrypoint
//! Boots the Axum HTTP server: config, cache warmup, routes, middleware.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use instagram_feed_widget::api::{self, AppState};
use instagram_feed_widget::cache::store::FileStore;
use instagram_feed_widget::cache::FeedCache;
use instagram_feed_widget::config::WidgetConfig;
use instagram_feed_widget::{metrics, source};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("instagram_feed_widget=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = WidgetConfig::from_env();
    let prometheus = metrics::init_recorder(cfg.cache_ttl_secs);

    let client = reqwest::Client::new();
    let src = source::build(&cfg, client);
    let store = Arc::new(FileStore::new(cfg.cache_path.clone()));
    let cache = Arc::new(FeedCache::new(
        store,
        src.clone(),
        &cfg.username,
        cfg.cache_ttl_secs,
    ));

    // Warm the cache before accepting connections.
    cache.refresh().await;

    let state = AppState {
        cache,
        source: src,
    };
    let app = api::router(state).merge(metrics::router(prometheus));

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, account = %cfg.username, "serving widget endpoint");
    axum::serve(listener, app).await?;
    Ok(())
}
