//! User repository on top of `pgstmt`.
//!
//! Every repository operation is split in two: a pure `*_query` function that
//! builds the statement (and can be tested without a database) and an async
//! method on [`UserRepo`] that runs it through a [`pgstmt::DbConnector`].

pub mod context;
pub mod grid;
pub mod model;
pub mod repo;

pub use context::CurrentUser;
pub use grid::{ColumnDataType, GridColumnConfig, GridConfig, GridOrder, ModelKey};
pub use model::{AUDIT_COLUMNS, Audit, User};
pub use repo::UserRepo;
