use serde::{Deserialize, Serialize};

use super::flag;

/// One archived link, as stored in `linkdatamodel`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub link: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub source_id: Option<i64>,
    #[serde(default, deserialize_with = "flag")]
    pub permanent: bool,
    #[serde(default, deserialize_with = "flag")]
    pub bookmarked: bool,
    #[serde(default)]
    pub status_code: i64,
    #[serde(default)]
    pub manual_status_code: Option<i64>,
    #[serde(default)]
    pub contents_type: i64,
    #[serde(default)]
    pub page_rating_contents: i64,
    #[serde(default)]
    pub page_rating_visits: i64,
    #[serde(default)]
    pub page_rating_votes: i64,
    #[serde(default)]
    pub page_rating: i64,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub date_published: Option<String>,
    #[serde(default)]
    pub date_update_last: Option<String>,
    #[serde(default)]
    pub date_dead_since: Option<String>,
    #[serde(default)]
    pub date_last_modified: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
}

impl Entry {
    pub fn is_good(&self) -> bool {
        self.page_rating_votes > 0
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}
