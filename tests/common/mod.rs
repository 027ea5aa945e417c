#![allow(dead_code)]

use std::path::{Path, PathBuf};

use link_archive_tools::db::{create_database, open_database, EntryTable, Record};
use serde_json::{json, Value};

/// Entry fixture: link and vote count.
pub type Link<'a> = (&'a str, i64);

pub fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap_or_default()
}

/// Creates `name` under `dir` with the bundled schema and the given entries.
pub fn create_archive(dir: &Path, name: &str, links: &[Link]) -> PathBuf {
    let path = dir.join(name);
    let conn = create_database(&path).unwrap();
    let entries = EntryTable::open(&conn).unwrap();
    for (link, votes) in links {
        entries
            .insert_json(record(json!({
                "link": link,
                "title": format!("Title of {}", link),
                "page_rating_votes": votes,
            })))
            .unwrap()
            .unwrap();
    }
    path
}

pub fn entry_links(path: &Path) -> Vec<String> {
    let conn = open_database(path).unwrap();
    let entries = EntryTable::open(&conn).unwrap();
    let mut links: Vec<String> = entries
        .entries(None, 0)
        .unwrap()
        .into_iter()
        .filter_map(|r| r.get("link").and_then(Value::as_str).map(String::from))
        .collect();
    links.sort();
    links
}

pub fn entry_count(path: &Path) -> u64 {
    let conn = open_database(path).unwrap();
    EntryTable::open(&conn).unwrap().count().unwrap()
}
