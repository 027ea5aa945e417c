use url::Url;

/// Hosts whose pages never expose a usable feed.
const NO_FEED_HOSTS: &[&str] = &["google.com", "linkedin.com"];

const FEED_SUFFIXES: &[&str] = &[".rss", ".atom", ".xml", "/feed", "/rss", "/atom", "/feed/"];

/// Feed URLs that can be calculated from the shape of `link` alone.
pub fn feeds_for_link(link: &str) -> Vec<String> {
    let Ok(url) = Url::parse(link.trim()) else {
        return Vec::new();
    };
    let Some(host) = url.host_str().map(normalize_host) else {
        return Vec::new();
    };

    if NO_FEED_HOSTS.iter().any(|h| host == *h || host.ends_with(&format!(".{}", h))) {
        return Vec::new();
    }

    if looks_like_feed(&url) {
        return vec![url.to_string()];
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();

    match host.as_str() {
        "youtube.com" => youtube_feeds(&url, &segments),
        "reddit.com" | "old.reddit.com" => reddit_feeds(&segments),
        "github.com" => github_feeds(&segments),
        "odysee.com" => match segments.first() {
            Some(channel) if channel.starts_with('@') => {
                vec![format!("https://odysee.com/$/rss/{}", channel)]
            }
            _ => Vec::new(),
        },
        "medium.com" => match segments.first() {
            Some(user) if user.starts_with('@') => {
                vec![format!("https://medium.com/feed/{}", user)]
            }
            _ => Vec::new(),
        },
        _ if host.ends_with(".substack.com") => vec![format!("https://{}/feed", host)],
        _ => Vec::new(),
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.to_lowercase();
    host.strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .map(String::from)
        .unwrap_or(host)
}

fn looks_like_feed(url: &Url) -> bool {
    let path = url.path().to_lowercase();
    if url.host_str().is_some_and(|h| h.starts_with("feeds.")) {
        return true;
    }
    if path.contains("/feeds/videos.xml") {
        return true;
    }
    FEED_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
}

fn youtube_feeds(url: &Url, segments: &[&str]) -> Vec<String> {
    if let Some(list) = url.query_pairs().find(|(k, _)| k == "list").map(|(_, v)| v) {
        return vec![format!(
            "https://www.youtube.com/feeds/videos.xml?playlist_id={}",
            urlencoding::encode(&list)
        )];
    }

    match segments {
        ["channel", id, ..] => vec![format!(
            "https://www.youtube.com/feeds/videos.xml?channel_id={}",
            id
        )],
        ["user", name, ..] => vec![format!(
            "https://www.youtube.com/feeds/videos.xml?user={}",
            name
        )],
        _ => Vec::new(),
    }
}

fn reddit_feeds(segments: &[&str]) -> Vec<String> {
    match segments {
        [kind @ ("r" | "user" | "u"), name, ..] => {
            let kind = if *kind == "u" { "user" } else { *kind };
            vec![format!("https://www.reddit.com/{}/{}/.rss", kind, name)]
        }
        _ => Vec::new(),
    }
}

// Paths below the owner level that are site pages, not accounts.
const GITHUB_RESERVED: &[&str] = &[
    "about", "features", "topics", "trending", "marketplace", "settings", "orgs", "sponsors",
    "explore", "login", "pricing",
];

fn github_feeds(segments: &[&str]) -> Vec<String> {
    match segments {
        [owner, ..] if GITHUB_RESERVED.contains(owner) => Vec::new(),
        [owner, repo, ..] => {
            let repo = repo.trim_end_matches(".git");
            vec![
                format!("https://github.com/{}/{}/releases.atom", owner, repo),
                format!("https://github.com/{}/{}/commits.atom", owner, repo),
            ]
        }
        [owner] => vec![format!("https://github.com/{}.atom", owner)],
        [] => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_channel_and_playlist() {
        assert_eq!(
            feeds_for_link("https://www.youtube.com/channel/UC123abc"),
            vec!["https://www.youtube.com/feeds/videos.xml?channel_id=UC123abc"]
        );
        assert_eq!(
            feeds_for_link("https://m.youtube.com/playlist?list=PL42"),
            vec!["https://www.youtube.com/feeds/videos.xml?playlist_id=PL42"]
        );
        assert!(feeds_for_link("https://www.youtube.com/watch?v=abc").is_empty());
    }

    #[test]
    fn reddit_subreddit_and_user() {
        assert_eq!(
            feeds_for_link("https://www.reddit.com/r/rust/"),
            vec!["https://www.reddit.com/r/rust/.rss"]
        );
        assert_eq!(
            feeds_for_link("https://reddit.com/u/someone"),
            vec!["https://www.reddit.com/user/someone/.rss"]
        );
    }

    #[test]
    fn github_repo_and_owner() {
        assert_eq!(
            feeds_for_link("https://github.com/rust-lang/rust"),
            vec![
                "https://github.com/rust-lang/rust/releases.atom",
                "https://github.com/rust-lang/rust/commits.atom",
            ]
        );
        assert_eq!(
            feeds_for_link("https://github.com/rust-lang"),
            vec!["https://github.com/rust-lang.atom"]
        );
        assert!(feeds_for_link("https://github.com/trending").is_empty());
    }

    #[test]
    fn channel_style_hosts() {
        assert_eq!(
            feeds_for_link("https://odysee.com/@Veritasium:f"),
            vec!["https://odysee.com/$/rss/@Veritasium:f"]
        );
        assert_eq!(
            feeds_for_link("https://medium.com/@writer"),
            vec!["https://medium.com/feed/@writer"]
        );
        assert_eq!(
            feeds_for_link("https://news.substack.com/p/some-post"),
            vec!["https://news.substack.com/feed"]
        );
    }

    #[test]
    fn feeds_pass_through() {
        assert_eq!(
            feeds_for_link("https://example.com/index.xml"),
            vec!["https://example.com/index.xml"]
        );
        assert_eq!(
            feeds_for_link("https://blog.example.com/feed"),
            vec!["https://blog.example.com/feed"]
        );
    }

    #[test]
    fn plain_pages_have_no_calculated_feed() {
        assert!(feeds_for_link("https://example.com/article").is_empty());
        assert!(feeds_for_link("https://www.google.com/search?q=rss").is_empty());
        assert!(feeds_for_link("https://www.linkedin.com/feed/").is_empty());
        assert!(feeds_for_link("not a url").is_empty());
    }
}
