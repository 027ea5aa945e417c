use std::path::Path;

use rusqlite::Connection;

use crate::error::{AppError, Result};

use super::schema::SCHEMA;
use super::table::{quote_ident, table_columns};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub name: String,
    pub rows: u64,
    pub columns: Vec<String>,
}

/// Opens an existing archive. Never creates a file.
pub fn open_database(path: &Path) -> Result<Connection> {
    if !path.is_file() {
        return Err(AppError::FileNotFound(path.to_path_buf()));
    }
    let conn = Connection::open(path)?;
    disable_foreign_keys(&conn)?;
    Ok(conn)
}

/// Opens or creates an archive and makes sure all known tables exist.
pub fn create_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    disable_foreign_keys(conn)?;
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Declared `REFERENCES` are not enforced: entries are deleted before their
/// tags and social rows.
fn disable_foreign_keys(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", false)?;
    Ok(())
}

/// True when both paths name the same existing file, however they are spelled.
pub fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

pub fn ensure_distinct(input: &Path, output: &Path) -> Result<()> {
    if same_file(input, output) {
        return Err(AppError::InvalidArgument(format!(
            "output {} is the input database {}",
            output.display(),
            input.display()
        )));
    }
    Ok(())
}

/// Replaces `dst` with a byte copy of `src`. Refuses when `dst` is `src`.
pub fn copy_database(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_file() {
        return Err(AppError::FileNotFound(src.to_path_buf()));
    }
    ensure_distinct(src, dst)?;
    if dst.exists() {
        std::fs::remove_file(dst)?;
    }
    std::fs::copy(src, dst)?;
    Ok(())
}

pub fn table_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(names)
}

/// Empties every table in `names`. Tables missing from this archive are skipped.
pub fn truncate_tables(conn: &Connection, names: &[&str]) -> Result<()> {
    let existing = table_names(conn)?;
    for name in names {
        if !existing.iter().any(|t| t == name) {
            tracing::warn!("Table {} does not exist, not truncated", name);
            continue;
        }
        let deleted = conn.execute(&format!("DELETE FROM {}", quote_ident(name)), [])?;
        tracing::debug!("Truncated {} ({} rows)", name, deleted);
    }
    Ok(())
}

/// Deletes rows of `child` whose `entry_id` no longer points at a row of `parent`.
pub fn delete_orphans(conn: &Connection, child: &str, parent: &str) -> Result<usize> {
    let existing = table_names(conn)?;
    if !existing.iter().any(|t| t == child) || !existing.iter().any(|t| t == parent) {
        return Ok(0);
    }

    let deleted = conn.execute(
        &format!(
            "DELETE FROM {} WHERE entry_id NOT IN (SELECT id FROM {})",
            quote_ident(child),
            quote_ident(parent)
        ),
        [],
    )?;
    Ok(deleted)
}

pub fn vacuum(conn: &Connection) -> Result<()> {
    conn.execute_batch("VACUUM")?;
    Ok(())
}

pub fn summarize(conn: &Connection) -> Result<Vec<TableSummary>> {
    let mut summaries = Vec::new();
    for name in table_names(conn)? {
        let rows: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(&name)),
            [],
            |row| row.get(0),
        )?;
        let columns = table_columns(conn, &name)?
            .into_iter()
            .map(|c| c.name)
            .collect();
        summaries.push(TableSummary {
            name,
            rows: rows as u64,
            columns,
        });
    }
    Ok(summaries)
}
