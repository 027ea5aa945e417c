mod fetcher;
pub mod resolver;

pub use fetcher::{find_feed_links, FeedFetcher, FeedMetadata};
pub use resolver::feeds_for_link;
