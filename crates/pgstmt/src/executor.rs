//! Running generated statements.
//!
//! Every execution emits a `tracing` debug event on the `pgstmt.sql` target
//! before the statement is sent, with the statement kind, parameter count and
//! the (truncated) SQL text. Parameter values are never logged.

use std::time::Duration;

use deadpool_postgres::Pool;
use serde::de::DeserializeOwned;

use crate::client::GenericClient;
use crate::config::PgConfig;
use crate::error::{OrmError, OrmResult};
use crate::mapping::{Model, map_records};
use crate::pool::create_pool_with_config;
use crate::query::{PreparedQuery, Statement, StatementKind};
use crate::row::{Record, records_from_rows};

const MAX_LOGGED_SQL: usize = 200;

fn truncate_sql(sql: &str) -> &str {
    if sql.len() <= MAX_LOGGED_SQL {
        return sql;
    }
    let mut end = MAX_LOGGED_SQL;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Run a prepared query and decode every row into a [`Record`].
pub async fn run_prepared(
    conn: &impl GenericClient,
    kind: StatementKind,
    prepared: &PreparedQuery,
) -> OrmResult<Vec<Record>> {
    tracing::debug!(
        target: "pgstmt.sql",
        kind = %kind,
        param_count = prepared.params.len(),
        sql = %truncate_sql(&prepared.query),
    );

    let rows = conn
        .query(&prepared.query, &prepared.params_ref())
        .await
        .inspect_err(|e| {
            tracing::error!(target: "pgstmt.sql", kind = %kind, error = %e, "failed to run a query");
        })?;
    records_from_rows(&rows)
}

/// Run a prepared query and map every row into `M`.
pub async fn run_prepared_as<M>(
    conn: &impl GenericClient,
    kind: StatementKind,
    prepared: &PreparedQuery,
) -> OrmResult<Vec<M>>
where
    M: Model + DeserializeOwned,
{
    let records = run_prepared(conn, kind, prepared).await?;
    map_records::<M>(&records)
}

/// Pool-backed executor with an optional per-statement timeout.
///
/// ```ignore
/// let db = DbConnector::connect(&PgConfig::from_env()?)?
///     .with_timeout(Duration::from_secs(5));
/// let users: Vec<User> = db.run_as(&select).await?;
/// ```
#[derive(Clone)]
pub struct DbConnector {
    pool: Pool,
    timeout: Option<Duration>,
}

impl DbConnector {
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
            timeout: None,
        }
    }

    /// Build a pool from connection settings.
    pub fn connect(config: &PgConfig) -> OrmResult<Self> {
        let pool = create_pool_with_config(config)?;
        let timeout = config.statement_timeout();
        Ok(Self { pool, timeout })
    }

    /// Bound the time spent acquiring a connection and running one statement.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Check out a pooled connection.
    pub async fn client(&self) -> OrmResult<deadpool_postgres::Client> {
        Ok(self.pool.get().await?)
    }

    async fn with_timeout_opt<T, F>(&self, future: F) -> OrmResult<T>
    where
        F: std::future::Future<Output = OrmResult<T>>,
    {
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, future)
                .await
                .map_err(|_| OrmError::Timeout(timeout))?,
            None => future.await,
        }
    }

    /// Run already generated SQL on a pooled connection.
    pub async fn run_prepared(
        &self,
        kind: StatementKind,
        prepared: &PreparedQuery,
    ) -> OrmResult<Vec<Record>> {
        self.with_timeout_opt(async {
            let client = self.client().await?;
            run_prepared(&client, kind, prepared).await
        })
        .await
    }

    /// Generate and run a statement.
    pub async fn run(&self, statement: &impl Statement) -> OrmResult<Vec<Record>> {
        let prepared = statement.generate_query();
        self.run_prepared(statement.kind(), &prepared).await
    }

    /// Generate and run a statement, mapping rows into `M`.
    pub async fn run_as<M>(&self, statement: &impl Statement) -> OrmResult<Vec<M>>
    where
        M: Model + DeserializeOwned,
    {
        let records = self.run(statement).await?;
        map_records::<M>(&records)
    }
}

impl std::fmt::Debug for DbConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConnector")
            .field("pool", &self.pool.status())
            .field("timeout", &self.timeout)
            .finish()
    }
}
