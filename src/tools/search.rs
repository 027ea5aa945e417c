//! Small search language used by `analyze --search`.
//!
//! - `column==value` matches the value exactly,
//! - `column=pattern` matches a `*` wildcard pattern (equality without `*`),
//! - anything else is text looked up in the title, link, description and author.

use serde_json::Value;

use crate::db::{Filter, GenericTable, Op, Predicate};
use crate::error::{AppError, Result};

/// Columns bare text is matched against, when the table has them.
pub const TEXT_COLUMNS: &[&str] = &["title", "link", "description", "author"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchExpression {
    Everything,
    Equals { column: String, value: String },
    Pattern { column: String, pattern: String },
    Text(String),
}

impl SearchExpression {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Self::Everything);
        }

        if let Some((column, value)) = input.split_once("==") {
            let column = parse_column(column)?;
            return Ok(Self::Equals {
                column,
                value: value.trim().to_string(),
            });
        }

        if let Some((column, pattern)) = input.split_once('=') {
            // Free text that merely contains '=' stays free text.
            if let Ok(column) = parse_column(column) {
                return Ok(Self::Pattern {
                    column,
                    pattern: pattern.trim().to_string(),
                });
            }
        }

        Ok(Self::Text(input.to_string()))
    }

    pub fn to_filter(&self, table: &GenericTable, ignore_case: bool) -> Result<Filter> {
        match self {
            Self::Everything => Ok(Filter::all()),
            Self::Equals { column, value } => {
                require_column(table, column)?;
                Ok(Filter::all().equals(column.as_str(), literal(value)))
            }
            Self::Pattern { column, pattern } => {
                require_column(table, column)?;
                Ok(Filter::all().with(pattern_predicate(column, pattern, ignore_case)))
            }
            Self::Text(text) => {
                let columns: Vec<&str> = TEXT_COLUMNS
                    .iter()
                    .copied()
                    .filter(|c| table.has_column(c))
                    .collect();
                if columns.is_empty() {
                    return Err(AppError::Search(format!(
                        "table {} has no text columns to search",
                        table.name()
                    )));
                }

                let pattern = if text.contains('*') {
                    text.clone()
                } else {
                    format!("*{}*", text)
                };
                let filter = columns.into_iter().fold(Filter::any(), |filter, column| {
                    filter.with(pattern_predicate(column, &pattern, ignore_case))
                });
                Ok(filter)
            }
        }
    }
}

fn parse_column(raw: &str) -> Result<String> {
    let column = raw.trim();
    let valid = !column.is_empty()
        && column
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(column.to_string())
    } else {
        Err(AppError::Search(format!("invalid column name '{}'", column)))
    }
}

fn require_column(table: &GenericTable, column: &str) -> Result<()> {
    if table.has_column(column) {
        Ok(())
    } else {
        Err(AppError::UnknownColumn(column.to_string()))
    }
}

fn literal(value: &str) -> Value {
    value
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(value))
}

/// `*` wildcards become GLOB (case-sensitive) or LIKE (`ignore_case`).
fn pattern_predicate(column: &str, pattern: &str, ignore_case: bool) -> Predicate {
    if !pattern.contains('*') {
        if ignore_case {
            return Predicate::new(column, Op::Like, like_pattern(pattern));
        }
        return Predicate::new(column, Op::Eq, literal(pattern));
    }

    if ignore_case {
        Predicate::new(column, Op::Like, like_pattern(pattern))
    } else {
        Predicate::new(column, Op::Glob, glob_pattern(pattern))
    }
}

fn like_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '*' => out.push('%'),
            '%' | '_' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

fn glob_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '?' => out.push_str("[?]"),
            '[' => out.push_str("[[]"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_schema, EntryTable, Query};
    use rusqlite::Connection;
    use serde_json::json;

    #[test]
    fn parses_expression_kinds() {
        assert_eq!(SearchExpression::parse("  ").unwrap(), SearchExpression::Everything);
        assert_eq!(
            SearchExpression::parse("title=*Musk*").unwrap(),
            SearchExpression::Pattern {
                column: "title".into(),
                pattern: "*Musk*".into()
            }
        );
        assert_eq!(
            SearchExpression::parse("page_rating_votes==3").unwrap(),
            SearchExpression::Equals {
                column: "page_rating_votes".into(),
                value: "3".into()
            }
        );
        assert_eq!(
            SearchExpression::parse("Musk").unwrap(),
            SearchExpression::Text("Musk".into())
        );
        assert_eq!(
            SearchExpression::parse("a b=c").unwrap(),
            SearchExpression::Text("a b=c".into())
        );
        assert!(SearchExpression::parse("bad column==1").is_err());
    }

    #[test]
    fn like_and_glob_escaping() {
        assert_eq!(like_pattern("*50%_off*"), "%50\\%\\_off%");
        assert_eq!(glob_pattern("*what?[x]*"), "*what[?][[]x]*");
    }

    fn search(conn: &Connection, expr: &str, ignore_case: bool) -> Vec<String> {
        let table = GenericTable::open(conn, "linkdatamodel").unwrap();
        let filter = SearchExpression::parse(expr)
            .unwrap()
            .to_filter(&table, ignore_case)
            .unwrap();
        table
            .get_where(&Query::new().filter(filter).order_by("id", crate::db::Direction::Asc))
            .unwrap()
            .into_iter()
            .map(|r| r["link"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn wildcard_matching_honors_ignore_case() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let entries = EntryTable::open(&conn).unwrap();
        for (link, title) in [
            ("https://a.com", "Musk buys things"),
            ("https://b.com", "what about musk"),
            ("https://c.com", "Unrelated"),
        ] {
            entries
                .insert_json(json!({"link": link, "title": title}).as_object().unwrap().clone())
                .unwrap();
        }

        assert_eq!(search(&conn, "title=*Musk*", false), vec!["https://a.com"]);
        assert_eq!(
            search(&conn, "title=*Musk*", true),
            vec!["https://a.com", "https://b.com"]
        );
        assert_eq!(search(&conn, "musk", false), vec!["https://b.com"]);
        assert_eq!(search(&conn, "b.com", false), vec!["https://b.com"]);
        assert_eq!(search(&conn, "title==Unrelated", false), vec!["https://c.com"]);
        assert_eq!(search(&conn, "", false).len(), 3);
    }

    #[test]
    fn unknown_column_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let table = GenericTable::open(&conn, "linkdatamodel").unwrap();
        let err = SearchExpression::parse("nope=1")
            .unwrap()
            .to_filter(&table, false)
            .unwrap_err();
        assert!(matches!(err, AppError::UnknownColumn(_)));
    }
}
