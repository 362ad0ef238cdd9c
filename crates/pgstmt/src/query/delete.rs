//! DELETE statement generator.

use crate::condition::ConditionGroup;
use crate::error::OrmResult;
use crate::ident::check_ident;
use crate::query::clause::{check_group, compile_where};
use crate::query::{PreparedQuery, Statement, StatementKind};

/// Parameters of a DELETE statement.
#[derive(Debug, Clone, Default)]
pub struct DeleteParams {
    pub table: String,
    /// `None` deletes every row.
    pub conditions: Option<ConditionGroup>,
}

impl DeleteParams {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            conditions: None,
        }
    }

    pub fn conditions(mut self, conditions: impl Into<ConditionGroup>) -> Self {
        self.conditions = Some(conditions.into());
        self
    }

    pub fn build(self) -> OrmResult<DeleteQuery> {
        DeleteQuery::new(self)
    }
}

/// DELETE generator: `DELETE FROM <table> <where> RETURNING *;`
///
/// Without conditions the statement deletes every row of the table. Gating
/// that behind a non-production check is up to the caller.
#[derive(Debug, Clone)]
pub struct DeleteQuery {
    table: String,
    conditions: Option<ConditionGroup>,
}

impl DeleteQuery {
    pub fn new(params: DeleteParams) -> OrmResult<Self> {
        check_ident("table", &params.table)?;
        check_group(params.conditions.as_ref())?;
        Ok(Self {
            table: params.table,
            conditions: params.conditions,
        })
    }

    /// True when the statement has no filter at all.
    pub fn deletes_all(&self) -> bool {
        self.conditions.as_ref().is_none_or(ConditionGroup::is_empty)
    }
}

impl Statement for DeleteQuery {
    fn kind(&self) -> StatementKind {
        StatementKind::Delete
    }

    fn generate_query(&self) -> PreparedQuery {
        let where_clause = compile_where(self.conditions.as_ref(), &self.table);
        let query = format!(
            "DELETE FROM {} {} RETURNING *;",
            self.table, where_clause.sql
        );
        PreparedQuery::new(query, where_clause.params)
    }
}
