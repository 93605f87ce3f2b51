// src/source/types.rs
use anyhow::Result;

/// Profile summary shown in the widget header. Produced by an adapter, or by
/// [`ProfileSnapshot::fallback`] when acquisition fails entirely.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProfileSnapshot {
    pub username: String,
    pub media_count: u64,
    pub followers: u64,
    pub following: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl ProfileSnapshot {
    /// All-zero snapshot for the configured account.
    pub fn fallback(username: &str) -> Self {
        Self {
            username: username.to_string(),
            media_count: 0,
            followers: 0,
            following: 0,
            avatar_url: None,
        }
    }
}

/// One post, passed through to the widget unchanged. The cache layer stores and
/// forwards these without interpreting any field.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FeedItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
}

#[async_trait::async_trait]
pub trait InstagramSource: Send + Sync {
    async fn fetch_profile(&self) -> Result<ProfileSnapshot>;
    async fn fetch_feed(&self, limit: usize) -> Result<Vec<FeedItem>>;
    fn name(&self) -> &'static str;
}
