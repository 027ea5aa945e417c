//! Row access for a single table whose columns are discovered at runtime.
//!
//! Rows travel as [`Record`]s, a JSON-like column → value map, so archives
//! produced by different schema revisions can be read and copied without a
//! compiled column list. Every mutating call commits on its own.

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, Row};
use serde_json::{Map, Number, Value};

use crate::error::{AppError, Result};

pub type Record = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub not_null: bool,
    pub has_default: bool,
    pub primary_key: bool,
}

/// How the predicates of a [`Filter`] are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    /// Every predicate must hold (`AND`).
    #[default]
    All,
    /// At least one predicate must hold (`OR`).
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    /// SQL `LIKE` with `\` as escape character; ASCII case-insensitive.
    Like,
    /// SQL `GLOB`; case-sensitive, `*` and `?` wildcards.
    Glob,
}

impl Op {
    fn sql(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "<>",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Like => "LIKE",
            Op::Glob => "GLOB",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub op: Op,
    pub value: Value,
}

impl Predicate {
    pub fn new(column: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    pub combinator: Combinator,
    pub predicates: Vec<Predicate>,
}

impl Filter {
    pub fn all() -> Self {
        Self {
            combinator: Combinator::All,
            predicates: Vec::new(),
        }
    }

    pub fn any() -> Self {
        Self {
            combinator: Combinator::Any,
            predicates: Vec::new(),
        }
    }

    /// Equality predicates for every key of `map`, joined by `combinator`.
    pub fn from_map(map: &Record, combinator: Combinator) -> Self {
        let predicates = map
            .iter()
            .map(|(column, value)| Predicate::new(column.clone(), Op::Eq, value.clone()))
            .collect();
        Self {
            combinator,
            predicates,
        }
    }

    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn equals(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(Predicate::new(column, Op::Eq, value))
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub filter: Option<Filter>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<u64>,
    pub offset: u64,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order_by.push(OrderBy {
            column: column.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }
}

pub struct GenericTable<'c> {
    conn: &'c Connection,
    name: String,
    columns: Vec<Column>,
}

impl<'c> GenericTable<'c> {
    /// Reflects `name` on `conn`. Fails with [`AppError::UnknownTable`] when
    /// the table does not exist.
    pub fn open(conn: &'c Connection, name: &str) -> Result<Self> {
        let columns = table_columns(conn, name)?;
        if columns.is_empty() {
            return Err(AppError::UnknownTable(name.to_string()));
        }

        Ok(Self {
            conn,
            name: name.to_string(),
            columns,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn connection(&self) -> &'c Connection {
        self.conn
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Removes keys that are not columns of this table, returning them.
    pub fn retain_known(&self, record: &mut Record) -> Vec<String> {
        let unknown: Vec<String> = record
            .keys()
            .filter(|key| !self.has_column(key))
            .cloned()
            .collect();
        for key in &unknown {
            record.remove(key);
        }
        unknown
    }

    pub fn count(&self) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(&self.name)),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    pub fn truncate(&self) -> Result<usize> {
        let deleted = self
            .conn
            .execute(&format!("DELETE FROM {}", quote_ident(&self.name)), [])?;
        Ok(deleted)
    }

    /// Inserts `data` and returns the generated row id.
    ///
    /// The caller supplies values for required columns; absent ones are
    /// reported as [`AppError::MissingColumn`] before touching the database.
    pub fn insert(&self, data: &Record) -> Result<i64> {
        for key in data.keys() {
            self.require_column(key)?;
        }

        if let Some(missing) = self.columns.iter().find(|c| {
            c.not_null
                && !c.has_default
                && !c.primary_key
                && data.get(&c.name).map_or(true, Value::is_null)
        }) {
            return Err(AppError::MissingColumn {
                table: self.name.clone(),
                column: missing.name.clone(),
            });
        }

        let sql = if data.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", quote_ident(&self.name))
        } else {
            let columns = data
                .keys()
                .map(|k| quote_ident(k))
                .collect::<Vec<_>>()
                .join(", ");
            let placeholders = (1..=data.len())
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote_ident(&self.name),
                columns,
                placeholders
            )
        };

        self.conn
            .execute(&sql, params_from_iter(data.values().map(to_sql_value)))?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update(&self, id: i64, data: &Record) -> Result<usize> {
        self.require_column("id")?;
        if data.is_empty() {
            return Ok(0);
        }
        for key in data.keys() {
            self.require_column(key)?;
        }

        let assignments = data
            .keys()
            .enumerate()
            .map(|(i, k)| format!("{} = ?{}", quote_ident(k), i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            quote_ident(&self.name),
            assignments,
            data.len() + 1
        );

        let mut params: Vec<SqlValue> = data.values().map(to_sql_value).collect();
        params.push(SqlValue::Integer(id));
        let updated = self.conn.execute(&sql, params_from_iter(params))?;
        Ok(updated)
    }

    pub fn get(&self, id: i64) -> Result<Option<Record>> {
        self.require_column("id")?;
        let sql = format!("SELECT * FROM {} WHERE id = ?1", quote_ident(&self.name));
        let rows = self.select(&sql, vec![SqlValue::Integer(id)])?;
        Ok(rows.into_iter().next())
    }

    /// Runs `query`. A missing or empty filter selects every row.
    pub fn get_where(&self, query: &Query) -> Result<Vec<Record>> {
        let mut params = Vec::new();
        let mut sql = format!("SELECT * FROM {}", quote_ident(&self.name));

        if let Some(filter) = &query.filter {
            if let Some(clause) = self.where_clause(filter, &mut params)? {
                sql.push_str(" WHERE ");
                sql.push_str(&clause);
            }
        }

        if !query.order_by.is_empty() {
            let mut terms = Vec::with_capacity(query.order_by.len());
            for order in &query.order_by {
                self.require_column(&order.column)?;
                let direction = match order.direction {
                    Direction::Asc => "ASC",
                    Direction::Desc => "DESC",
                };
                terms.push(format!("{} {}", quote_ident(&order.column), direction));
            }
            sql.push_str(" ORDER BY ");
            sql.push_str(&terms.join(", "));
        }

        match query.limit {
            Some(limit) => sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, query.offset)),
            None if query.offset > 0 => sql.push_str(&format!(" LIMIT -1 OFFSET {}", query.offset)),
            None => {}
        }

        self.select(&sql, params)
    }

    pub fn exists(&self, filter: &Filter) -> Result<bool> {
        let mut params = Vec::new();
        let Some(clause) = self.where_clause(filter, &mut params)? else {
            return Ok(false);
        };

        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {})",
            quote_ident(&self.name),
            clause
        );
        let exists: i64 = self
            .conn
            .query_row(&sql, params_from_iter(params), |row| row.get(0))?;
        Ok(exists != 0)
    }

    pub fn delete(&self, id: i64) -> Result<usize> {
        self.require_column("id")?;
        let deleted = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", quote_ident(&self.name)),
            [id],
        )?;
        Ok(deleted)
    }

    /// Deletes rows matching `filter`. An empty filter deletes nothing;
    /// use [`GenericTable::truncate`] to empty a table.
    pub fn delete_where(&self, filter: &Filter) -> Result<usize> {
        let mut params = Vec::new();
        let Some(clause) = self.where_clause(filter, &mut params)? else {
            return Ok(0);
        };

        let sql = format!("DELETE FROM {} WHERE {}", quote_ident(&self.name), clause);
        let deleted = self.conn.execute(&sql, params_from_iter(params))?;
        Ok(deleted)
    }

    fn require_column(&self, name: &str) -> Result<()> {
        if self.has_column(name) {
            Ok(())
        } else {
            Err(AppError::UnknownColumn(format!("{}.{}", self.name, name)))
        }
    }

    fn where_clause(&self, filter: &Filter, params: &mut Vec<SqlValue>) -> Result<Option<String>> {
        if filter.is_empty() {
            return Ok(None);
        }

        let mut parts = Vec::with_capacity(filter.predicates.len());
        for predicate in &filter.predicates {
            self.require_column(&predicate.column)?;
            let column = quote_ident(&predicate.column);

            let part = match (predicate.op, &predicate.value) {
                (Op::Eq, Value::Null) => format!("{column} IS NULL"),
                (Op::Ne, Value::Null) => format!("{column} IS NOT NULL"),
                (Op::Like, value) => {
                    params.push(to_sql_value(value));
                    format!("{column} LIKE ?{} ESCAPE '\\'", params.len())
                }
                (op, value) => {
                    params.push(to_sql_value(value));
                    format!("{column} {} ?{}", op.sql(), params.len())
                }
            };
            parts.push(part);
        }

        let joiner = match filter.combinator {
            Combinator::All => " AND ",
            Combinator::Any => " OR ",
        };
        Ok(Some(format!("({})", parts.join(joiner))))
    }

    fn select(&self, sql: &str, params: Vec<SqlValue>) -> Result<Vec<Record>> {
        let mut stmt = self.conn.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let rows = stmt
            .query_map(params_from_iter(params), |row| record_from_row(row, &names))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<Column>> {
    let mut stmt =
        conn.prepare(r#"SELECT name, "notnull", dflt_value, pk FROM pragma_table_info(?1)"#)?;
    let columns = stmt
        .query_map([table], |row| {
            Ok(Column {
                name: row.get(0)?,
                not_null: row.get::<_, i64>(1)? != 0,
                has_default: row.get::<_, Option<String>>(2)?.is_some(),
                primary_key: row.get::<_, i64>(3)? != 0,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(columns)
}

pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn record_from_row(row: &Row, names: &[String]) -> rusqlite::Result<Record> {
    let mut record = Record::new();
    for (i, name) in names.iter().enumerate() {
        record.insert(name.clone(), from_sql_value(row.get_ref(i)?));
    }
    Ok(record)
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                SqlValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                SqlValue::Real(f)
            } else {
                SqlValue::Text(n.to_string())
            }
        }
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn from_sql_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(t) | ValueRef::Blob(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
    }
}
