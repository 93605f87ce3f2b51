//! Unauthenticated page-scraping variant.
//!
//! Pulls counts, the avatar, and recent posts out of the JSON blob embedded in
//! the public profile page. A required field missing from the page means the
//! markup changed shape and is reported as an upstream failure, exactly like a
//! network error.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::source::types::{FeedItem, InstagramSource, ProfileSnapshot};

const PAGE_BASE_URL: &str = "https://www.instagram.com";
// The embedded JSON payload is only served to browser-like agents.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

struct PagePatterns {
    followers: Regex,
    following: Regex,
    media_count: Regex,
    avatar: Regex,
    shortcode: Regex,
    display_url: Regex,
    is_video: Regex,
}

fn patterns() -> &'static PagePatterns {
    static CELL: OnceCell<PagePatterns> = OnceCell::new();
    CELL.get_or_init(|| PagePatterns {
        followers: Regex::new(r#""edge_followed_by":\{"count":(\d+)"#).unwrap(),
        following: Regex::new(r#""edge_follow":\{"count":(\d+)"#).unwrap(),
        media_count: Regex::new(r#""edge_owner_to_timeline_media":\{"count":(\d+)"#).unwrap(),
        avatar: Regex::new(r#""profile_pic_url_hd":"([^"]+)""#).unwrap(),
        shortcode: Regex::new(r#""shortcode":"([A-Za-z0-9_-]+)""#).unwrap(),
        display_url: Regex::new(r#""display_url":"([^"]+)""#).unwrap(),
        is_video: Regex::new(r#""is_video":(true|false)"#).unwrap(),
    })
}

fn capture_count(re: &Regex, page: &str) -> Option<u64> {
    re.captures(page).and_then(|c| c[1].parse().ok())
}

/// Embedded JSON escapes URLs (`\u0026` for `&`, `\/` for `/`).
fn unescape_json_url(s: &str) -> String {
    s.replace("\\u0026", "&").replace("\\/", "/")
}

pub struct WebScrapeSource {
    username: String,
    base_url: String,
    client: reqwest::Client,
}

impl WebScrapeSource {
    pub fn new(username: &str, client: reqwest::Client) -> Self {
        Self {
            username: username.to_string(),
            base_url: PAGE_BASE_URL.to_string(),
            client,
        }
    }

    /// Point the adapter at a stand-in server. Test hook.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn fetch_page(&self) -> Result<String> {
        let url = format!("{}/{}/", self.base_url, self.username);
        let resp = match self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = ?e, source = "web-scrape", "upstream http error");
                return Err(e).context("profile page get()");
            }
        };
        resp.error_for_status()
            .context("profile page status")?
            .text()
            .await
            .context("profile page body")
    }

    fn parse_profile(&self, page: &str) -> Result<ProfileSnapshot> {
        let p = patterns();
        let media_count = capture_count(&p.media_count, page)
            .ok_or_else(|| anyhow!("post count not found in profile page"))?;
        let followers = capture_count(&p.followers, page)
            .ok_or_else(|| anyhow!("follower count not found in profile page"))?;
        let following = capture_count(&p.following, page)
            .ok_or_else(|| anyhow!("following count not found in profile page"))?;
        let avatar_url = p.avatar.captures(page).map(|c| unescape_json_url(&c[1]));

        Ok(ProfileSnapshot {
            username: self.username.clone(),
            media_count,
            followers,
            following,
            avatar_url,
        })
    }

    fn parse_feed(&self, page: &str, limit: usize) -> Vec<FeedItem> {
        let p = patterns();
        let shortcodes = p.shortcode.captures_iter(page).map(|c| c[1].to_string());
        let urls = p
            .display_url
            .captures_iter(page)
            .map(|c| unescape_json_url(&c[1]));
        let kinds = p.is_video.captures_iter(page).map(|c| &c[1] == "true");

        shortcodes
            .zip(urls)
            .zip(kinds)
            .take(limit)
            .map(|((shortcode, media_url), is_video)| FeedItem {
                permalink: Some(format!("{}/p/{}/", PAGE_BASE_URL, shortcode)),
                media_type: Some(if is_video { "VIDEO" } else { "IMAGE" }.to_string()),
                media_url: Some(media_url),
                caption: None,
                id: shortcode,
            })
            .collect()
    }
}

#[async_trait]
impl InstagramSource for WebScrapeSource {
    async fn fetch_profile(&self) -> Result<ProfileSnapshot> {
        let page = self.fetch_page().await?;
        self.parse_profile(&page)
    }

    async fn fetch_feed(&self, limit: usize) -> Result<Vec<FeedItem>> {
        let page = self.fetch_page().await?;
        Ok(self.parse_feed(&page, limit))
    }

    fn name(&self) -> &'static str {
        "web-scrape"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trimmed-down copy of the JSON the profile page embeds.
    const PAGE: &str = r#"<html><script type="text/javascript">window._sharedData =
        {"entry_data":{"ProfilePage":[{"graphql":{"user":{
        "edge_followed_by":{"count":1543},"edge_follow":{"count":87},
        "profile_pic_url_hd":"https:\/\/cdn.example\/avatar.jpg?x=1\u0026y=2",
        "edge_owner_to_timeline_media":{"count":120,"edges":[
        {"node":{"shortcode":"Abc-123","display_url":"https:\/\/cdn.example\/1.jpg","is_video":false}},
        {"node":{"shortcode":"Def_456","display_url":"https:\/\/cdn.example\/2.mp4","is_video":true}}
        ]}}}}]}};</script></html>"#;

    fn source() -> WebScrapeSource {
        WebScrapeSource::new("nartdanceschool", reqwest::Client::new())
    }

    #[test]
    fn profile_counts_and_avatar_extracted() {
        let p = source().parse_profile(PAGE).unwrap();
        assert_eq!(p.username, "nartdanceschool");
        assert_eq!(p.media_count, 120);
        assert_eq!(p.followers, 1543);
        assert_eq!(p.following, 87);
        assert_eq!(
            p.avatar_url.as_deref(),
            Some("https://cdn.example/avatar.jpg?x=1&y=2")
        );
    }

    #[test]
    fn page_missing_counts_is_an_error() {
        let err = source().parse_profile("<html>login required</html>");
        assert!(err.is_err());
    }

    #[test]
    fn feed_nodes_extracted_in_order() {
        let feed = source().parse_feed(PAGE, 3);
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].id, "Abc-123");
        assert_eq!(feed[0].media_type.as_deref(), Some("IMAGE"));
        assert_eq!(feed[0].media_url.as_deref(), Some("https://cdn.example/1.jpg"));
        assert_eq!(
            feed[0].permalink.as_deref(),
            Some("https://www.instagram.com/p/Abc-123/")
        );
        assert_eq!(feed[1].media_type.as_deref(), Some("VIDEO"));
    }

    #[test]
    fn feed_limit_is_applied() {
        let feed = source().parse_feed(PAGE, 1);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].id, "Abc-123");
    }
}
