//! Parameterized statement generators.
//!
//! Each statement kind has a plain parameter bundle (`SelectParams`,
//! `InsertParams`, ...) and a generator constructed from it. Construction
//! validates the bundle; [`Statement::generate_query`] is then infallible and
//! returns the SQL text with its positional parameter list.
//!
//! ```ignore
//! use pgstmt::{Condition, SelectParams, Statement};
//!
//! let q = SelectParams::new("t_sys_users")
//!     .conditions(vec![Condition::is_null("c_deleteddate")])
//!     .limit(10)
//!     .build()?
//!     .generate_query();
//! let rows = client.query(&q.query, &q.params_ref()).await?;
//! ```

mod clause;
mod delete;
mod insert;
mod parts;
mod select;
mod update;

#[cfg(test)]
mod tests;

use std::fmt;

use serde::de::DeserializeOwned;
use tokio_postgres::types::ToSql;

use crate::client::GenericClient;
use crate::error::OrmResult;
use crate::executor;
use crate::mapping::Model;
use crate::row::Record;
use crate::value::Value;

pub use clause::{WhereClause, compile_joins, compile_where};
pub use delete::{DeleteParams, DeleteQuery};
pub use insert::{InsertParams, InsertQuery, InsertValues};
pub use parts::{
    Aggregate, Assignment, Column, Direction, Join, JoinKind, JoinOn, Order,
};
pub use select::{SelectParams, SelectQuery};
pub use update::{UpdateParams, UpdateQuery};

/// SQL text plus its positional parameters, `params[i]` binding `$(i+1)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreparedQuery {
    pub query: String,
    pub params: Vec<Value>,
}

impl PreparedQuery {
    pub fn new(query: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            query: query.into(),
            params,
        }
    }

    /// Get parameters as references compatible with tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect()
    }
}

/// Kind of a generated statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        })
    }
}

/// A validated statement that can render itself.
pub trait Statement: Sync {
    fn kind(&self) -> StatementKind;

    /// Render SQL text and parameters. Pure, and deterministic for a given generator.
    fn generate_query(&self) -> PreparedQuery;

    /// Execute and return every row as a [`Record`].
    fn fetch_records(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = OrmResult<Vec<Record>>> + Send {
        async move {
            let prepared = self.generate_query();
            executor::run_prepared(conn, self.kind(), &prepared).await
        }
    }

    /// Execute and map every row into `M` through its column mapping.
    fn fetch_as<M>(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = OrmResult<Vec<M>>> + Send
    where
        M: Model + DeserializeOwned + Send,
    {
        async move {
            let prepared = self.generate_query();
            executor::run_prepared_as::<M>(conn, self.kind(), &prepared).await
        }
    }
}
