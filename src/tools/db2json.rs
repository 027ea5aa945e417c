use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde_json::Value;

use crate::db::{open_database, EntryTable, Record, SocialDataTable, TagTable};
use crate::error::{AppError, Result};
use crate::models::{from_record, to_rfc3339, Entry};

const SOCIAL_COUNTERS: &[&str] = &[
    "thumbs_up",
    "thumbs_down",
    "view_count",
    "rating",
    "upvote_ratio",
    "upvote_diff",
    "upvote_view_ratio",
    "stars",
    "followers_count",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonExportReport {
    pub rows: usize,
    pub files: Vec<PathBuf>,
}

/// Dumps the entries of an archive into `{prefix}_{n}.json` files.
pub struct JsonExporter {
    input: PathBuf,
    output_dir: PathBuf,
    prefix: String,
    rows_max: usize,
}

impl JsonExporter {
    pub fn new(input: PathBuf, output_dir: PathBuf, prefix: String, rows_max: usize) -> Result<Self> {
        if !input.is_file() {
            return Err(AppError::FileNotFound(input));
        }
        if rows_max == 0 {
            return Err(AppError::InvalidArgument("rows-max must be positive".to_string()));
        }
        Ok(Self {
            input,
            output_dir,
            prefix,
            rows_max,
        })
    }

    pub fn file_path(&self, index: usize) -> PathBuf {
        self.output_dir.join(format!("{}_{}.json", self.prefix, index))
    }

    pub fn convert(&self) -> Result<JsonExportReport> {
        fs::create_dir_all(&self.output_dir)?;
        self.remove_stale_files()?;

        let conn = open_database(&self.input)?;
        let entries = EntryTable::open(&conn)?;
        let mut report = JsonExportReport::default();

        let mut offset = 0;
        loop {
            let page = entries.entries(Some(self.rows_max as u64), offset)?;
            if page.is_empty() {
                break;
            }

            let rows = page
                .iter()
                .map(|record| entry_json(&conn, record))
                .collect::<Result<Vec<_>>>()?;

            let path = self.file_path(report.files.len());
            fs::write(&path, serde_json::to_string_pretty(&rows)?)?;
            tracing::info!("Wrote {} rows to {}", rows.len(), path.display());

            report.rows += rows.len();
            report.files.push(path);
            offset += page.len() as u64;

            if page.len() < self.rows_max {
                break;
            }
        }

        Ok(report)
    }

    fn remove_stale_files(&self) -> Result<()> {
        let stem = format!("{}_", self.prefix);
        for dir_entry in fs::read_dir(&self.output_dir)? {
            let path = dir_entry?.path();
            if is_chunk_file(&path, &stem) {
                tracing::debug!("Removing stale {}", path.display());
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

fn is_chunk_file(path: &Path, stem: &str) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.strip_prefix(stem)
        .and_then(|rest| rest.strip_suffix(".json"))
        .is_some_and(|index| !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()))
}

/// The exported form of one entry: typed columns, social counters and user tags.
fn entry_json(conn: &Connection, record: &Record) -> Result<Value> {
    let entry: Entry = from_record(record)?;
    let mut row = match serde_json::to_value(&entry)? {
        Value::Object(map) => map,
        _ => Record::new(),
    };

    for (key, value) in row.iter_mut() {
        if !key.starts_with("date") {
            continue;
        }
        if let Some(converted) = value.as_str().and_then(to_rfc3339) {
            *value = Value::from(converted);
        }
    }

    if let Some(social) = SocialDataTable::open(conn)?.get_json(entry.id)? {
        for counter in SOCIAL_COUNTERS {
            if let Some(value) = social.get(*counter) {
                row.entry(counter.to_string()).or_insert_with(|| value.clone());
            }
        }
    }

    let tags = TagTable::user(conn)?.tags(entry.id)?;
    row.insert("tags".to_string(), Value::from(tags));

    Ok(Value::Object(row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_only_numbered_chunks() {
        assert!(is_chunk_file(Path::new("out/entries_0.json"), "entries_"));
        assert!(is_chunk_file(Path::new("entries_12.json"), "entries_"));
        assert!(!is_chunk_file(Path::new("entries_.json"), "entries_"));
        assert!(!is_chunk_file(Path::new("entries_x.json"), "entries_"));
        assert!(!is_chunk_file(Path::new("sources_0.json"), "entries_"));
        assert!(!is_chunk_file(Path::new("entries_0.json.bak"), "entries_"));
    }

    #[test]
    fn rejects_zero_rows_per_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = JsonExporter::new(
            file.path().to_path_buf(),
            PathBuf::from("out"),
            "entries".into(),
            0,
        )
        .err()
        .unwrap();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }
}
