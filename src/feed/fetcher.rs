use std::time::Duration;

use feed_rs::parser;
use regex::Regex;
use reqwest::Client;

use crate::error::Result;

/// What a fetched feed says about itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedMetadata {
    pub status_code: u16,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
}

impl FeedMetadata {
    /// Builds metadata from a response body; an unparsable body keeps only the status.
    pub fn parse(status_code: u16, body: &[u8]) -> Self {
        let Ok(feed) = parser::parse(body) else {
            return Self {
                status_code,
                ..Default::default()
            };
        };

        let description = feed
            .description
            .map(|d| d.content)
            .and_then(|html| html2text::from_read(html.as_bytes(), 80).ok())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        Self {
            status_code,
            title: feed.title.map(|t| t.content),
            description,
            thumbnail: feed.logo.or(feed.icon).map(|image| image.uri),
        }
    }
}

pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    /// Feed URLs a page advertises. A URL that already serves a feed yields itself.
    pub async fn discover_feeds(&self, url: &str) -> Result<Vec<String>> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Failed to fetch URL: HTTP {}", response.status()).into());
        }

        let final_url = response.url().to_string();
        let bytes = response.bytes().await?;

        if parser::parse(&bytes[..]).is_ok() {
            return Ok(vec![final_url]);
        }

        let html = String::from_utf8_lossy(&bytes);
        Ok(find_feed_links(&html, &final_url))
    }

    /// Fetches a feed. Non-success statuses are reported in the metadata, not as errors.
    pub async fn fetch_metadata(&self, url: &str) -> Result<FeedMetadata> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        if !response.status().is_success() {
            tracing::debug!("Feed {} answered HTTP {}", url, status);
            return Ok(FeedMetadata {
                status_code: status,
                ..Default::default()
            });
        }

        let bytes = response.bytes().await?;
        Ok(FeedMetadata::parse(status, &bytes))
    }
}

/// RSS/Atom `<link>` tags of an HTML page, resolved against `base_url`, in page order.
pub fn find_feed_links(html: &str, base_url: &str) -> Vec<String> {
    let Ok(tag_re) = Regex::new(r#"(?i)<link\b[^>]*>"#) else {
        return Vec::new();
    };
    let Ok(type_re) = Regex::new(r#"(?i)type\s*=\s*["']application/(rss|atom)\+xml["']"#) else {
        return Vec::new();
    };
    let Ok(href_re) = Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#) else {
        return Vec::new();
    };

    let mut links = Vec::new();
    for tag in tag_re.find_iter(html).map(|m| m.as_str()) {
        if !type_re.is_match(tag) {
            continue;
        }
        let Some(href) = href_re.captures(tag).and_then(|cap| cap.get(1)) else {
            continue;
        };
        let resolved = resolve_url(href.as_str(), base_url);
        if !links.contains(&resolved) {
            links.push(resolved);
        }
    }
    links
}

/// Resolve a potentially relative URL against a base URL
fn resolve_url(href: &str, base_url: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }

    if let Ok(base) = url::Url::parse(base_url) {
        if let Ok(resolved) = base.join(href) {
            return resolved.to_string();
        }
    }

    href.to_string()
}
