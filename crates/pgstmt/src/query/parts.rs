//! Plain descriptors shared by the statement generators.

use crate::condition::Op;
use crate::error::{OrmError, OrmResult};
use crate::ident::check_ident;
use crate::value::Value;

/// Aggregate function wrapped around a selected column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregate {
    Count,
    Distinct,
    Sum,
    Avg,
    Min,
    Max,
}

impl Aggregate {
    pub fn as_sql(self) -> &'static str {
        match self {
            Aggregate::Count => "COUNT",
            Aggregate::Distinct => "DISTINCT",
            Aggregate::Sum => "SUM",
            Aggregate::Avg => "AVG",
            Aggregate::Min => "MIN",
            Aggregate::Max => "MAX",
        }
    }
}

/// A selected column.
///
/// `table` defaults to the statement's primary table and `alias` to
/// `"<table>.<column>[.<AGG>...]"` when the SELECT is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Column {
    pub name: String,
    pub table: Option<String>,
    pub alias: Option<String>,
    /// Outermost first: `[Count, Distinct]` renders `COUNT(DISTINCT(t.c))`.
    pub aggregates: Vec<Aggregate>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Select the column from a specific table or join alias.
    pub fn from_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Set the output alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Wrap the column in one more aggregate (innermost so far).
    pub fn aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregates.push(aggregate);
        self
    }
}

/// Kind of a JOIN clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
            JoinKind::Full => "FULL",
        }
    }
}

/// One join predicate: `primary_table.primary_column <op> secondary_table.secondary_column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOn {
    pub primary_table: String,
    pub primary_column: String,
    pub op: Op,
    pub secondary_table: String,
    pub secondary_column: String,
}

impl JoinOn {
    pub fn new(
        primary_table: impl Into<String>,
        primary_column: impl Into<String>,
        op: Op,
        secondary_table: impl Into<String>,
        secondary_column: impl Into<String>,
    ) -> Self {
        Self {
            primary_table: primary_table.into(),
            primary_column: primary_column.into(),
            op,
            secondary_table: secondary_table.into(),
            secondary_column: secondary_column.into(),
        }
    }

    /// Equality predicate, the common case.
    pub fn eq(
        primary_table: impl Into<String>,
        primary_column: impl Into<String>,
        secondary_table: impl Into<String>,
        secondary_column: impl Into<String>,
    ) -> Self {
        Self::new(
            primary_table,
            primary_column,
            Op::Eq,
            secondary_table,
            secondary_column,
        )
    }
}

/// A joined table with its AND-combined predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub table: String,
    pub alias: Option<String>,
    pub kind: JoinKind,
    pub on: Vec<JoinOn>,
}

impl Join {
    pub fn new(kind: JoinKind, table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            alias: None,
            kind,
            on: Vec::new(),
        }
    }

    pub fn inner(table: impl Into<String>) -> Self {
        Self::new(JoinKind::Inner, table)
    }

    pub fn left(table: impl Into<String>) -> Self {
        Self::new(JoinKind::Left, table)
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn on(mut self, predicate: JoinOn) -> Self {
        self.on.push(predicate);
        self
    }

    /// Name the joined table is referenced by.
    pub fn reference_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }

    pub(crate) fn check(&self) -> OrmResult<()> {
        check_ident("join table", &self.table)?;
        if let Some(alias) = &self.alias {
            check_ident("join alias", alias)?;
        }
        if self.on.is_empty() {
            return Err(OrmError::validation(format!(
                "JOIN {} requires at least one ON predicate",
                self.table
            )));
        }
        for p in &self.on {
            if !p.op.binds_value() || p.op.wraps_placeholder() {
                return Err(OrmError::validation(format!(
                    "operator '{}' cannot compare two columns in a JOIN predicate",
                    p.op
                )));
            }
            check_ident("table", &p.primary_table)?;
            check_ident("column", &p.primary_column)?;
            check_ident("table", &p.secondary_table)?;
            check_ident("column", &p.secondary_column)?;
        }
        Ok(())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// ORDER BY entry referencing an output alias (or a raw column name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Desc,
        }
    }
}

/// SET entry of an UPDATE.
///
/// With `apply_if_null == false` a NULL value drops the assignment entirely,
/// which gives partial-update semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Value,
    pub apply_if_null: bool,
}

impl Assignment {
    /// Always assign, including NULL.
    pub fn set(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
            apply_if_null: true,
        }
    }

    /// Assign only when the value is not NULL.
    pub fn set_if_present(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
            apply_if_null: false,
        }
    }

    /// Whether the assignment survives partial-update filtering.
    pub fn is_applied(&self) -> bool {
        self.apply_if_null || !self.value.is_null()
    }
}
