use serde::{Deserialize, Serialize};

use super::flag;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub enabled: bool,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub subcategory_name: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub fetch_period: Option<i64>,
    #[serde(default)]
    pub age: Option<i64>,
}
