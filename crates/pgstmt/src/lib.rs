//! # pgstmt
//!
//! Parameterized PostgreSQL statement generation with a per-model column
//! mapping registry.
//!
//! ## Features
//!
//! - **Positional parameters only**: values never appear in SQL text, they are bound as `$n`
//! - **Dense numbering**: `IS NULL` / `IS NOT NULL` consume no placeholder
//! - **Validated at construction**: arity, empty SET lists and identifiers fail before SQL exists
//! - **Column mapping**: logical field names map to physical columns, merged over a base model
//! - **Transaction-friendly**: pass a transaction anywhere a `GenericClient` is expected
//!
//! ## Statements
//!
//! ```ignore
//! use pgstmt::{Column, Condition, SelectParams, Statement, UpdateParams};
//!
//! // SELECT
//! let q = SelectParams::new("t_users")
//!     .column(Column::new("c_firstname"))
//!     .conditions(vec![Condition::is_null("c_deleteddate")])
//!     .limit(10)
//!     .offset(0)
//!     .build()?
//!     .generate_query();
//!
//! // UPDATE: WHERE binds $1.., SET continues after it
//! let q = UpdateParams::new("t_users")
//!     .set_if_present("c_email", email)
//!     .condition(Condition::eq("c_userid", id))
//!     .build()?
//!     .generate_query();
//!
//! let rows = client.query(&q.query, &q.params_ref()).await?;
//! ```
//!
//! ## Mapping rows
//!
//! ```ignore
//! let users: Vec<User> = select.fetch_as::<User>(&client).await?;
//! ```

pub mod client;
pub mod condition;
pub mod config;
pub mod error;
pub mod executor;
pub mod ident;
pub mod mapping;
pub mod pool;
pub mod query;
pub mod row;
pub mod value;

pub use client::GenericClient;
pub use condition::{Condition, ConditionGroup, Op};
pub use config::{AppEnv, PgConfig};
pub use error::{OrmError, OrmResult};
pub use executor::{DbConnector, run_prepared, run_prepared_as};
pub use ident::quote_ident;
pub use mapping::{
    ColumnMapping, Model, column_by_property, column_mappings, map_record, map_records,
    property_by_column,
};
pub use pool::{create_pool, create_pool_with_config};
pub use query::{
    Aggregate, Assignment, Column, DeleteParams, DeleteQuery, Direction, InsertParams,
    InsertQuery, InsertValues, Join, JoinKind, JoinOn, Order, PreparedQuery, SelectParams,
    SelectQuery, Statement, StatementKind, UpdateParams, UpdateQuery,
};
pub use row::{Record, RowExt, records_from_rows};
pub use value::Value;
