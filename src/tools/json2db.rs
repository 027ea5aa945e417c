use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::db::{create_database, EntryTable, GenericTable, Record, SourceTable};
use crate::error::{AppError, Result};
use crate::models::normalize_datetime;

/// Every `.json` file below `dir`, sorted by path.
pub fn collect_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AppError::FileNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for dir_entry in fs::read_dir(&current)? {
            let path = dir_entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Rows carried by one JSON file.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonDocument {
    Entries(Vec<Value>),
    Sources(Vec<Value>),
}

impl JsonDocument {
    /// Accepts `{"links": [...]}`, `{"sources": [...]}` or a bare array of entries.
    pub fn parse(text: &str) -> Result<Self> {
        match serde_json::from_str(text)? {
            Value::Array(rows) => Ok(Self::Entries(rows)),
            Value::Object(mut map) => {
                if let Some(Value::Array(rows)) = map.remove("links") {
                    return Ok(Self::Entries(rows));
                }
                if let Some(Value::Array(rows)) = map.remove("sources") {
                    return Ok(Self::Sources(rows));
                }
                Err(AppError::InvalidArgument(
                    "expected a 'links' or 'sources' array".to_string(),
                ))
            }
            _ => Err(AppError::InvalidArgument(
                "expected a JSON array or object".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub input_file: Option<PathBuf>,
    pub input_dir: Option<PathBuf>,
    pub output_db: PathBuf,
    /// Keep the ids found in the files; rows without one are skipped.
    pub preserve_id: bool,
    /// Entries need at least this many votes; 0 disables the check.
    pub vote_min: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub files: usize,
    pub malformed_files: usize,
    pub entries_added: usize,
    pub entries_skipped: usize,
    pub sources_added: usize,
    pub sources_skipped: usize,
}

pub struct JsonImporter {
    options: ImportOptions,
    files: Vec<PathBuf>,
}

impl JsonImporter {
    pub fn new(options: ImportOptions) -> Result<Self> {
        let files = match (&options.input_dir, &options.input_file) {
            (Some(dir), _) => collect_json_files(dir)?,
            (None, Some(file)) => {
                if !file.is_file() {
                    return Err(AppError::FileNotFound(file.clone()));
                }
                vec![file.clone()]
            }
            (None, None) => {
                return Err(AppError::InvalidArgument(
                    "either an input file or an input directory is required".to_string(),
                ))
            }
        };

        Ok(Self { options, files })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn convert(&self) -> Result<ImportReport> {
        let conn = create_database(&self.options.output_db)?;
        let entries = EntryTable::open(&conn)?;
        let sources = SourceTable::open(&conn)?;
        let mut report = ImportReport::default();

        let total = self.files.len();
        for (index, path) in self.files.iter().enumerate() {
            tracing::info!("[{}/{}]: file:{}", index + 1, total, path.display());
            report.files += 1;

            let document = match fs::read_to_string(path)
                .map_err(AppError::from)
                .and_then(|text| JsonDocument::parse(&text))
            {
                Ok(document) => document,
                Err(e) => {
                    tracing::warn!("Could not read file {}: {}", path.display(), e);
                    report.malformed_files += 1;
                    continue;
                }
            };

            match document {
                JsonDocument::Entries(rows) => {
                    for row in rows {
                        if self.import_entry(&entries, row)? {
                            report.entries_added += 1;
                        } else {
                            report.entries_skipped += 1;
                        }
                    }
                }
                JsonDocument::Sources(rows) => {
                    for row in rows {
                        if self.import_source(&sources, row)? {
                            report.sources_added += 1;
                        } else {
                            report.sources_skipped += 1;
                        }
                    }
                }
            }
        }

        Ok(report)
    }

    fn import_entry(&self, entries: &EntryTable, row: Value) -> Result<bool> {
        let Value::Object(mut record) = row else {
            return Ok(false);
        };
        prepare_record(entries.table(), &mut record);

        let Some(link) = record.get("link").and_then(Value::as_str).map(String::from) else {
            return Ok(false);
        };
        let Some(id) = self.take_id(&mut record, &link) else {
            return Ok(false);
        };

        if entries.exists(id, Some(&link))? {
            tracing::debug!("Link:{} Skipped, already present", link);
            return Ok(false);
        }
        if !passes_vote_min(&record, self.options.vote_min) {
            tracing::debug!("Link:{} Skipped, not enough votes", link);
            return Ok(false);
        }

        let added = entries.insert_json(record)?.is_some();
        tracing::debug!("Link:{} Added", link);
        Ok(added)
    }

    fn import_source(&self, sources: &SourceTable, row: Value) -> Result<bool> {
        let Value::Object(mut record) = row else {
            return Ok(false);
        };
        prepare_record(sources.table(), &mut record);

        let Some(url) = record.get("url").and_then(Value::as_str).map(String::from) else {
            return Ok(false);
        };
        let Some(id) = self.take_id(&mut record, &url) else {
            return Ok(false);
        };

        if sources.exists(id, Some(&url))? {
            tracing::debug!("Source:{} Skipped, already present", url);
            return Ok(false);
        }

        sources.insert_json(record)?;
        tracing::debug!("Source:{} Added", url);
        Ok(true)
    }

    /// With `preserve_id` yields the row's own id, or `None` when it has none.
    /// Otherwise the id is dropped and the database assigns a new one.
    fn take_id(&self, record: &mut Record, name: &str) -> Option<Option<i64>> {
        if !self.options.preserve_id {
            record.remove("id");
            return Some(None);
        }

        match record.get("id").and_then(Value::as_i64) {
            Some(id) => Some(Some(id)),
            None => {
                tracing::warn!("Entry {} is missing ID", name);
                None
            }
        }
    }
}

/// Drops keys the table does not know and normalizes date columns.
fn prepare_record(table: &GenericTable, record: &mut Record) {
    let dropped = table.retain_known(record);
    if !dropped.is_empty() {
        tracing::debug!("Dropping unknown keys: {}", dropped.join(", "));
    }

    for (key, value) in record.iter_mut() {
        if !key.starts_with("date") {
            continue;
        }
        let Some(text) = value.as_str() else {
            continue;
        };
        match normalize_datetime(text) {
            Some(normalized) => *value = Value::from(normalized),
            None => {
                tracing::warn!("Unparsable {} '{}', stored as null", key, text);
                *value = Value::Null;
            }
        }
    }
}

fn vote_count(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn passes_vote_min(record: &Record, vote_min: i64) -> bool {
    if vote_min <= 0 {
        return true;
    }
    record
        .get("page_rating_votes")
        .and_then(vote_count)
        .is_some_and(|votes| votes != 0 && votes >= vote_min)
}
