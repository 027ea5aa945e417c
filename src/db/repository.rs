use rusqlite::Connection;
use serde_json::Value;

use crate::error::Result;
use crate::models::{from_record, Entry, SocialData, Source};

use super::schema::{
    COMPACTED_TAGS_TABLE, ENTRIES_TABLE, SOCIAL_DATA_TABLE, SOURCES_TABLE, USER_TAGS_TABLE,
};
use super::table::{Direction, Filter, GenericTable, Op, Predicate, Query, Record};

/// Not-null counters the archive schema has no database default for.
const ENTRY_ZERO_DEFAULTS: &[&str] = &[
    "status_code",
    "contents_type",
    "page_rating_contents",
    "page_rating_visits",
    "page_rating_votes",
    "page_rating",
];

fn fill_default(table: &GenericTable, record: &mut Record, column: &str, value: Value) {
    if table.has_column(column) && !record.contains_key(column) {
        record.insert(column.to_string(), value);
    }
}

// Entry operations

pub struct EntryTable<'c> {
    table: GenericTable<'c>,
}

impl<'c> EntryTable<'c> {
    pub fn open(conn: &'c Connection) -> Result<Self> {
        Ok(Self {
            table: GenericTable::open(conn, ENTRIES_TABLE)?,
        })
    }

    pub fn table(&self) -> &GenericTable<'c> {
        &self.table
    }

    /// Inserts an entry, filling the business defaults the schema requires.
    /// Records without a `link` are ignored and yield `None`.
    pub fn insert_json(&self, mut record: Record) -> Result<Option<i64>> {
        if !record.contains_key("link") {
            return Ok(None);
        }

        fill_default(&self.table, &mut record, "source_url", Value::from(""));
        fill_default(&self.table, &mut record, "permanent", Value::Bool(false));
        fill_default(&self.table, &mut record, "bookmarked", Value::Bool(false));
        for column in ENTRY_ZERO_DEFAULTS {
            fill_default(&self.table, &mut record, column, Value::from(0));
        }

        self.table.insert(&record).map(Some)
    }

    pub fn entries(&self, limit: Option<u64>, offset: u64) -> Result<Vec<Record>> {
        self.table
            .get_where(&Query::new().order_by("id", Direction::Asc).limit(limit).offset(offset))
    }

    /// Entries with at least one vote, most voted first.
    pub fn good_entries(&self) -> Result<Vec<Record>> {
        let query = Query::new()
            .filter(Filter::all().with(Predicate::new("page_rating_votes", Op::Gt, 0)))
            .order_by("page_rating_votes", Direction::Desc);
        self.table.get_where(&query)
    }

    pub fn get(&self, id: i64) -> Result<Option<Entry>> {
        self.table.get(id)?.as_ref().map(from_record).transpose()
    }

    /// True when an entry matches any of the given keys; false when none is given.
    pub fn exists(&self, id: Option<i64>, link: Option<&str>) -> Result<bool> {
        let mut filter = Filter::any();
        if let Some(id) = id {
            filter = filter.equals("id", id);
        }
        if let Some(link) = link {
            filter = filter.equals("link", link);
        }
        self.table.exists(&filter)
    }

    pub fn is_link(&self, link: &str) -> Result<bool> {
        self.exists(None, Some(link))
    }

    pub fn count(&self) -> Result<u64> {
        self.table.count()
    }

    pub fn truncate(&self) -> Result<usize> {
        self.table.truncate()
    }
}

// Tag operations

pub struct TagTable<'c> {
    table: GenericTable<'c>,
}

impl<'c> TagTable<'c> {
    /// Tags kept in `entrycompactedtags`.
    pub fn compacted(conn: &'c Connection) -> Result<Self> {
        Ok(Self {
            table: GenericTable::open(conn, COMPACTED_TAGS_TABLE)?,
        })
    }

    /// Tags kept in `usertags`.
    pub fn user(conn: &'c Connection) -> Result<Self> {
        Ok(Self {
            table: GenericTable::open(conn, USER_TAGS_TABLE)?,
        })
    }

    pub fn table(&self) -> &GenericTable<'c> {
        &self.table
    }

    pub fn tags(&self, entry_id: i64) -> Result<Vec<String>> {
        let query = Query::new()
            .filter(Filter::all().equals("entry_id", entry_id))
            .order_by("id", Direction::Asc);
        let tags = self
            .table
            .get_where(&query)?
            .into_iter()
            .filter_map(|row| row.get("tag").and_then(Value::as_str).map(String::from))
            .collect();
        Ok(tags)
    }

    /// Tags rendered as `#first, #second`.
    pub fn tags_string(&self, entry_id: i64) -> Result<String> {
        let tags = self.tags(entry_id)?;
        Ok(tags
            .iter()
            .map(|tag| format!("#{}", tag))
            .collect::<Vec<_>>()
            .join(", "))
    }

    pub fn insert(&self, entry_id: i64, tag: &str) -> Result<i64> {
        let mut record = Record::new();
        record.insert("entry_id".to_string(), Value::from(entry_id));
        record.insert("tag".to_string(), Value::from(tag));
        self.table.insert(&record)
    }
}

// Source operations

pub struct SourceTable<'c> {
    table: GenericTable<'c>,
}

impl<'c> SourceTable<'c> {
    pub fn open(conn: &'c Connection) -> Result<Self> {
        Ok(Self {
            table: GenericTable::open(conn, SOURCES_TABLE)?,
        })
    }

    pub fn table(&self) -> &GenericTable<'c> {
        &self.table
    }

    pub fn insert_json(&self, mut record: Record) -> Result<i64> {
        fill_default(&self.table, &mut record, "url", Value::from(""));
        self.table.insert(&record)
    }

    pub fn get(&self, id: i64) -> Result<Option<Source>> {
        self.table.get(id)?.as_ref().map(from_record).transpose()
    }

    pub fn sources(&self, limit: Option<u64>, offset: u64) -> Result<Vec<Record>> {
        self.table
            .get_where(&Query::new().order_by("id", Direction::Asc).limit(limit).offset(offset))
    }

    pub fn exists(&self, id: Option<i64>, url: Option<&str>) -> Result<bool> {
        let mut filter = Filter::any();
        if let Some(id) = id {
            filter = filter.equals("id", id);
        }
        if let Some(url) = url {
            filter = filter.equals("url", url);
        }
        self.table.exists(&filter)
    }

    pub fn is_url(&self, url: &str) -> Result<bool> {
        self.exists(None, Some(url))
    }

    pub fn count(&self) -> Result<u64> {
        self.table.count()
    }
}

// Social data operations

pub struct SocialDataTable<'c> {
    table: GenericTable<'c>,
}

impl<'c> SocialDataTable<'c> {
    pub fn open(conn: &'c Connection) -> Result<Self> {
        Ok(Self {
            table: GenericTable::open(conn, SOCIAL_DATA_TABLE)?,
        })
    }

    pub fn table(&self) -> &GenericTable<'c> {
        &self.table
    }

    pub fn get_json(&self, entry_id: i64) -> Result<Option<Record>> {
        let query = Query::new()
            .filter(Filter::all().equals("entry_id", entry_id))
            .limit(Some(1));
        Ok(self.table.get_where(&query)?.into_iter().next())
    }

    pub fn get(&self, entry_id: i64) -> Result<Option<SocialData>> {
        self.get_json(entry_id)?.as_ref().map(from_record).transpose()
    }

    pub fn insert_json(&self, record: &Record) -> Result<i64> {
        self.table.insert(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use serde_json::json;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn entry(link: &str, votes: i64) -> Record {
        json!({"link": link, "title": "Test title", "page_rating_votes": votes})
            .as_object()
            .unwrap()
            .clone()
    }

    #[test]
    fn insert_json_fills_defaults() {
        let conn = setup();
        let entries = EntryTable::open(&conn).unwrap();

        let id = entries
            .insert_json(json!({"link": "https://test.com"}).as_object().unwrap().clone())
            .unwrap()
            .unwrap();

        let stored = entries.get(id).unwrap().unwrap();
        assert_eq!(stored.link, "https://test.com");
        assert_eq!(stored.source_url.as_deref(), Some(""));
        assert!(!stored.bookmarked);
        assert_eq!(stored.page_rating_votes, 0);
    }

    #[test]
    fn insert_json_without_link_is_ignored() {
        let conn = setup();
        let entries = EntryTable::open(&conn).unwrap();
        let id = entries
            .insert_json(json!({"title": "no link"}).as_object().unwrap().clone())
            .unwrap();
        assert!(id.is_none());
        assert_eq!(entries.count().unwrap(), 0);
    }

    #[test]
    fn exists_flips_after_insert() {
        let conn = setup();
        let entries = EntryTable::open(&conn).unwrap();

        assert!(!entries.is_link("https://a.com").unwrap());
        assert!(!entries.exists(None, None).unwrap());

        let id = entries.insert_json(entry("https://a.com", 1)).unwrap().unwrap();
        assert!(entries.is_link("https://a.com").unwrap());
        assert!(entries.exists(Some(id), None).unwrap());
        assert!(entries.exists(Some(id + 100), Some("https://a.com")).unwrap());
    }

    #[test]
    fn good_entries_ordered_by_votes() {
        let conn = setup();
        let entries = EntryTable::open(&conn).unwrap();
        entries.insert_json(entry("https://low.com", 1)).unwrap();
        entries.insert_json(entry("https://none.com", 0)).unwrap();
        entries.insert_json(entry("https://high.com", 9)).unwrap();

        let links: Vec<_> = entries
            .good_entries()
            .unwrap()
            .into_iter()
            .map(|r| r["link"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(links, vec!["https://high.com", "https://low.com"]);
    }

    #[test]
    fn tags_as_list_and_string() {
        let conn = setup();
        let tags = TagTable::compacted(&conn).unwrap();
        tags.insert(1, "rust").unwrap();
        tags.insert(1, "sqlite").unwrap();
        tags.insert(2, "other").unwrap();

        assert_eq!(tags.tags(1).unwrap(), vec!["rust", "sqlite"]);
        assert_eq!(tags.tags_string(1).unwrap(), "#rust, #sqlite");
        assert_eq!(tags.tags_string(3).unwrap(), "");
    }

    #[test]
    fn source_insert_and_is_url() {
        let conn = setup();
        let sources = SourceTable::open(&conn).unwrap();
        assert!(!sources.is_url("https://test.com").unwrap());

        let id = sources
            .insert_json(json!({"url": "https://test.com", "title": "Test"}).as_object().unwrap().clone())
            .unwrap();
        assert!(sources.is_url("https://test.com").unwrap());
        assert_eq!(sources.get(id).unwrap().unwrap().title.as_deref(), Some("Test"));
        assert!(sources.get(id).unwrap().unwrap().enabled);
    }

    #[test]
    fn social_data_lookup_by_entry() {
        let conn = setup();
        let social = SocialDataTable::open(&conn).unwrap();
        social
            .insert_json(json!({"entry_id": 5, "stars": 123}).as_object().unwrap())
            .unwrap();

        assert_eq!(social.get(5).unwrap().unwrap().stars, Some(123));
        assert!(social.get(6).unwrap().is_none());
        assert!(social.get_json(5).unwrap().unwrap().contains_key("followers_count"));
    }
}
