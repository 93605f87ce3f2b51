//! Runtime configuration, read from the environment once at startup and
//! passed into the adapters and cache explicitly.

use std::path::PathBuf;

pub const DEFAULT_USERNAME: &str = "nartdanceschool";
pub const DEFAULT_CACHE_PATH: &str = "instagram_cache.json";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_PORT: u16 = 3019;

/// Which data source adapter to run behind the widget endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    GraphApi,
    WebScrape,
}

#[derive(Debug, Clone)]
pub struct WidgetConfig {
    pub username: String,
    /// Empty by default; the Graph adapter then fails soft and logs.
    pub access_token: String,
    pub cache_path: PathBuf,
    pub cache_ttl_secs: u64,
    pub port: u16,
    pub source: SourceKind,
}

impl WidgetConfig {
    /// Read configuration from the environment (after `dotenvy::dotenv()` in
    /// main). Malformed numeric values fall back to the defaults rather than
    /// aborting startup.
    pub fn from_env() -> Self {
        Self {
            username: env_or("INSTAGRAM_USERNAME", DEFAULT_USERNAME),
            access_token: std::env::var("INSTAGRAM_ACCESS_TOKEN").unwrap_or_default(),
            cache_path: PathBuf::from(env_or("WIDGET_CACHE_PATH", DEFAULT_CACHE_PATH)),
            cache_ttl_secs: env_parsed("WIDGET_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS),
            port: env_parsed("WIDGET_PORT", DEFAULT_PORT),
            source: match std::env::var("WIDGET_SOURCE")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str()
            {
                "scrape" => SourceKind::WebScrape,
                _ => SourceKind::GraphApi,
            },
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
