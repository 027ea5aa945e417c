mod datetime;
mod entry;
mod social;
mod source;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::db::Record;
use crate::error::Result;

pub use datetime::{normalize_datetime, parse_datetime, to_rfc3339};
pub use entry::Entry;
pub use social::SocialData;
pub use source::Source;

/// Maps a reflected row onto one of the typed models.
pub fn from_record<T: DeserializeOwned>(record: &Record) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(record.clone()))?)
}

// SQLite keeps booleans as 0/1, JSON dumps as true/false.
fn flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(s.as_str(), "1" | "true" | "True"),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entry_from_sqlite_record() {
        let record = json!({
            "id": 7,
            "link": "https://example.com",
            "title": null,
            "bookmarked": 1,
            "permanent": 0,
            "page_rating_votes": 12,
            "some_future_column": "ignored"
        });
        let entry: Entry = from_record(record.as_object().unwrap()).unwrap();
        assert_eq!(entry.id, 7);
        assert!(entry.bookmarked);
        assert!(!entry.permanent);
        assert!(entry.is_good());
        assert_eq!(entry.display_title(), "");
    }

    #[test]
    fn entry_from_json_booleans() {
        let record = json!({"id": 1, "link": "x", "bookmarked": true});
        let entry: Entry = from_record(record.as_object().unwrap()).unwrap();
        assert!(entry.bookmarked);
        assert_eq!(entry.page_rating_votes, 0);
    }
}
