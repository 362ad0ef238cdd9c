//! INSERT statement generator.

use crate::error::{OrmError, OrmResult};
use crate::ident::check_ident;
use crate::query::{PreparedQuery, Statement, StatementKind};
use crate::value::Value;

/// Row(s) to insert.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertValues {
    /// A single row
    Row(Vec<Value>),
    /// Bulk insert, one inner list per row
    Rows(Vec<Vec<Value>>),
}

impl InsertValues {
    fn rows(&self) -> &[Vec<Value>] {
        match self {
            InsertValues::Row(row) => std::slice::from_ref(row),
            InsertValues::Rows(rows) => rows,
        }
    }
}

impl Default for InsertValues {
    fn default() -> Self {
        InsertValues::Row(Vec::new())
    }
}

/// Parameters of an INSERT statement.
#[derive(Debug, Clone, Default)]
pub struct InsertParams {
    pub table: String,
    pub columns: Vec<String>,
    pub values: InsertValues,
}

impl InsertParams {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// Append a column and its value to the single row.
    ///
    /// Has no effect on the values of a bulk insert; use [`InsertParams::rows`] there.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.push(column.into());
        if let InsertValues::Row(row) = &mut self.values {
            row.push(value.into());
        }
        self
    }

    /// Set the insert column list.
    pub fn columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set a single value row.
    pub fn row(mut self, row: Vec<Value>) -> Self {
        self.values = InsertValues::Row(row);
        self
    }

    /// Set multiple value rows (bulk insert).
    pub fn rows(mut self, rows: Vec<Vec<Value>>) -> Self {
        self.values = InsertValues::Rows(rows);
        self
    }

    /// Construct the generator.
    pub fn build(self) -> OrmResult<InsertQuery> {
        InsertQuery::new(self)
    }
}

/// INSERT generator.
///
/// ```text
/// INSERT INTO <table> (<cols>) VALUES ($1, ...), ($k, ...) RETURNING *;
/// ```
#[derive(Debug, Clone)]
pub struct InsertQuery {
    table: String,
    columns: Vec<String>,
    values: InsertValues,
}

impl InsertQuery {
    /// Check identifiers and value arity before any SQL is produced.
    ///
    /// For a bulk insert every row is checked and the error names all
    /// offending row indices.
    pub fn new(params: InsertParams) -> OrmResult<Self> {
        check_ident("table", &params.table)?;
        if params.columns.is_empty() {
            return Err(OrmError::validation(
                "INSERT requires columns and matching values.",
            ));
        }
        for column in &params.columns {
            check_ident("column", column)?;
        }

        let expected = params.columns.len();
        match &params.values {
            InsertValues::Row(row) if row.len() != expected => {
                return Err(OrmError::validation(format!(
                    "INSERT requires columns and matching values: expected {expected} values, got {}",
                    row.len()
                )));
            }
            InsertValues::Rows(rows) if rows.is_empty() => {
                return Err(OrmError::validation(
                    "INSERT requires columns and matching values: no rows given",
                ));
            }
            InsertValues::Rows(rows) => {
                let mismatched: Vec<usize> = rows
                    .iter()
                    .enumerate()
                    .filter(|(_, row)| row.len() != expected)
                    .map(|(i, _)| i)
                    .collect();
                if !mismatched.is_empty() {
                    return Err(OrmError::validation(format!(
                        "INSERT requires columns and matching values: {} row(s) mismatched {:?}, expected {expected} values per row",
                        mismatched.len(),
                        mismatched
                    )));
                }
            }
            InsertValues::Row(_) => {}
        }

        Ok(Self {
            table: params.table,
            columns: params.columns,
            values: params.values,
        })
    }

    /// Number of rows the statement inserts.
    pub fn row_count(&self) -> usize {
        self.values.rows().len()
    }
}

impl Statement for InsertQuery {
    fn kind(&self) -> StatementKind {
        StatementKind::Insert
    }

    fn generate_query(&self) -> PreparedQuery {
        let rows = self.values.rows();
        let mut params = Vec::with_capacity(rows.len() * self.columns.len());

        let groups: Vec<String> = rows
            .iter()
            .map(|row| {
                let placeholders: Vec<String> = row
                    .iter()
                    .map(|value| {
                        params.push(value.clone());
                        format!("${}", params.len())
                    })
                    .collect();
                format!("({})", placeholders.join(", "))
            })
            .collect();

        let query = format!(
            "INSERT INTO {} ({}) VALUES {} RETURNING *;",
            self.table,
            self.columns.join(", "),
            groups.join(", ")
        );

        PreparedQuery::new(query, params)
    }
}
