//! Generic result records.

use crate::error::{OrmError, OrmResult};
use crate::value::Value;
use std::collections::BTreeMap;
use tokio_postgres::Row;

/// A result row as an ordered `column name -> value` map.
///
/// Keys are the output names the server reports, i.e. the SELECT aliases
/// (`t_users.c_email`, `userId`, ...) or the bare column names for
/// `RETURNING *`.
pub type Record = BTreeMap<String, Value>;

/// Extension trait for Row to provide generic access
pub trait RowExt {
    /// Try to get a column value, returning OrmError::Decode on failure
    fn try_get_column<T>(&self, column: &str) -> OrmResult<T>
    where
        T: for<'a> tokio_postgres::types::FromSql<'a>;

    /// Decode every column into a [`Record`].
    fn to_record(&self) -> OrmResult<Record>;
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: &str) -> OrmResult<T>
    where
        T: for<'a> tokio_postgres::types::FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| OrmError::decode(column, e.to_string()))
    }

    fn to_record(&self) -> OrmResult<Record> {
        let mut record = Record::new();
        for (idx, column) in self.columns().iter().enumerate() {
            let value: Value = self
                .try_get(idx)
                .map_err(|e| OrmError::decode(column.name(), e.to_string()))?;
            record.insert(column.name().to_string(), value);
        }
        Ok(record)
    }
}

/// Decode a batch of rows into records.
pub fn records_from_rows(rows: &[Row]) -> OrmResult<Vec<Record>> {
    rows.iter().map(RowExt::to_record).collect()
}
