use std::io::Write;
use std::path::Path;

use rusqlite::Connection;
use serde_json::Value;

use crate::db::schema::ENTRIES_TABLE;
use crate::db::{
    open_database, summarize, Direction, GenericTable, Query, Record, SocialDataTable,
    SourceTable, TagTable,
};
use crate::error::Result;
use crate::models::{from_record, SocialData};

use super::search::SearchExpression;

const VOTES_COLUMN: &str = "page_rating_votes";

/// Extra lines printed for every search hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    pub title: bool,
    pub description: bool,
    pub status: bool,
    pub tags: bool,
    pub social: bool,
    pub date_published: bool,
    pub source: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub search: Option<String>,
    pub table: String,
    /// Defaults to `page_rating_votes`, or `id` for tables without votes.
    pub order_by: Option<String>,
    pub ascending: bool,
    pub ignore_case: bool,
    pub display: DisplayOptions,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            search: None,
            table: ENTRIES_TABLE.to_string(),
            order_by: None,
            ascending: false,
            ignore_case: false,
            display: DisplayOptions::default(),
        }
    }
}

pub struct DbAnalyzer {
    conn: Connection,
}

impl DbAnalyzer {
    pub fn new(input: &Path) -> Result<Self> {
        Ok(Self {
            conn: open_database(input)?,
        })
    }

    /// One line per table, plus its column names when `columns` is set.
    pub fn summary<W: Write>(&self, out: &mut W, columns: bool) -> Result<()> {
        for table in summarize(&self.conn)? {
            writeln!(out, "Table: {}, Row count: {}", table.name, table.rows)?;
            if columns {
                writeln!(out, "Columns in {}: {}", table.name, table.columns.join(", "))?;
            }
        }
        Ok(())
    }

    /// Prints every row matching the search and returns how many were printed.
    pub fn search<W: Write>(&self, out: &mut W, options: &SearchOptions) -> Result<usize> {
        let table = GenericTable::open(&self.conn, &options.table)?;
        let expression = SearchExpression::parse(options.search.as_deref().unwrap_or(""))?;
        let filter = expression.to_filter(&table, options.ignore_case)?;

        let direction = if options.ascending {
            Direction::Asc
        } else {
            Direction::Desc
        };
        let order_by = match &options.order_by {
            Some(column) => column.as_str(),
            None if table.has_column(VOTES_COLUMN) => VOTES_COLUMN,
            None => "id",
        };
        let query = Query::new().filter(filter).order_by(order_by, direction);

        let rows = table.get_where(&query)?;
        for row in &rows {
            self.print_row(out, row, &options.display)?;
        }
        Ok(rows.len())
    }

    fn print_row<W: Write>(&self, out: &mut W, row: &Record, display: &DisplayOptions) -> Result<()> {
        let id = row.get("id").and_then(Value::as_i64);
        let votes = row.get(VOTES_COLUMN).and_then(Value::as_i64).unwrap_or(0);
        let link = row
            .get("link")
            .or_else(|| row.get("url"))
            .and_then(Value::as_str)
            .unwrap_or_default();

        if display.description {
            writeln!(out, "---------------------")?;
        }

        let mut text = format!("[{:03}] {}", votes, link);
        if display.title {
            if let Some(title) = text_field(row, "title") {
                text.push(' ');
                text.push_str(title);
            }
        }
        if display.source {
            if let Some(source_title) = self.source_title(row)? {
                text.push_str(&format!(" [{}]", source_title));
            }
        }
        writeln!(out, "{}", text)?;

        if display.date_published {
            if let Some(date) = text_field(row, "date_published") {
                writeln!(out, "{}", date)?;
            }
        }
        if display.description {
            if let Some(description) = text_field(row, "description") {
                writeln!(out, "{}", description)?;
            }
        }

        if let Some(id) = id {
            if display.tags {
                let tags = TagTable::user(&self.conn)?.tags_string(id)?;
                if !tags.is_empty() {
                    writeln!(out, "{}", tags)?;
                }
            }
            if display.social {
                if let Some(social) = SocialDataTable::open(&self.conn)?.get_json(id)? {
                    let social: SocialData = from_record(&social)?;
                    for line in social.display_lines() {
                        writeln!(out, "{}", line)?;
                    }
                }
            }
        }

        if display.status {
            if let Some(status) = row.get("status_code").filter(|v| !v.is_null()) {
                writeln!(out, "{}", status)?;
            }
        }
        Ok(())
    }

    fn source_title(&self, row: &Record) -> Result<Option<String>> {
        let Some(source_id) = row.get("source_id").and_then(Value::as_i64) else {
            return Ok(None);
        };
        let source = SourceTable::open(&self.conn)?.get(source_id)?;
        Ok(source.and_then(|s| s.title))
    }
}

fn text_field<'r>(row: &'r Record, column: &str) -> Option<&'r str> {
    row.get(column)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_database, EntryTable};
    use serde_json::json;

    fn analyzer() -> (tempfile::TempDir, DbAnalyzer) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.db");
        {
            let conn = create_database(&path).unwrap();
            let entries = EntryTable::open(&conn).unwrap();
            let id = entries
                .insert_json(
                    json!({"link": "https://a.com", "title": "Alpha", "page_rating_votes": 5})
                        .as_object()
                        .unwrap()
                        .clone(),
                )
                .unwrap()
                .unwrap();
            entries
                .insert_json(
                    json!({"link": "https://b.com", "title": "Beta", "page_rating_votes": 12})
                        .as_object()
                        .unwrap()
                        .clone(),
                )
                .unwrap();
            TagTable::user(&conn).unwrap().insert(id, "first").unwrap();
        }
        let analyzer = DbAnalyzer::new(&path).unwrap();
        (dir, analyzer)
    }

    #[test]
    fn search_prints_votes_link_and_title() {
        let (_dir, analyzer) = analyzer();
        let mut out = Vec::new();
        let options = SearchOptions {
            display: DisplayOptions {
                title: true,
                tags: true,
                ..Default::default()
            },
            ..Default::default()
        };

        let printed = analyzer.search(&mut out, &options).unwrap();
        assert_eq!(printed, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[012] https://b.com Beta\n[005] https://a.com Alpha\n#first\n"
        );
    }

    #[test]
    fn ascending_order_and_filter() {
        let (_dir, analyzer) = analyzer();
        let mut out = Vec::new();
        let options = SearchOptions {
            search: Some("title=*a".into()),
            ascending: true,
            ..Default::default()
        };
        assert_eq!(analyzer.search(&mut out, &options).unwrap(), 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[005] https://a.com\n[012] https://b.com\n"
        );
    }

    #[test]
    fn tables_without_votes_are_ordered_by_id() {
        let (dir, analyzer) = analyzer();
        {
            let conn = open_database(&dir.path().join("archive.db")).unwrap();
            let sources = SourceTable::open(&conn).unwrap();
            for url in ["https://s1.com", "https://s2.com"] {
                sources
                    .insert_json(json!({"url": url}).as_object().unwrap().clone())
                    .unwrap();
            }
        }
        let mut out = Vec::new();
        let options = SearchOptions {
            table: "sourcedatamodel".into(),
            ..Default::default()
        };

        assert_eq!(analyzer.search(&mut out, &options).unwrap(), 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[000] https://s2.com\n[000] https://s1.com\n"
        );

        let options = SearchOptions {
            order_by: Some("page_rating_votes".into()),
            ..options
        };
        assert!(matches!(
            analyzer.search(&mut Vec::new(), &options).unwrap_err(),
            crate::error::AppError::UnknownColumn(_)
        ));
    }

    #[test]
    fn summary_lists_entry_table() {
        let (_dir, analyzer) = analyzer();
        let mut out = Vec::new();
        analyzer.summary(&mut out, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Table: linkdatamodel, Row count: 2\n"));
        assert!(text.contains("Columns in linkdatamodel: id, link,"));
    }
}
