//! Paging, sorting and search settings coming from a data grid.

use pgstmt::{Direction, Model, OrmError, OrmResult, column_mappings};
use serde::{Deserialize, Serialize};

use crate::model::{Audit, User};

/// One sort key, a logical field name of the listed model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridOrder {
    pub column_name: String,
    #[serde(default)]
    pub direction: Direction,
}

/// Grid state sent by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    pub record_per_page: Option<u64>,
    pub total_page: Option<u64>,
    /// Zero-based
    pub current_page: Option<u64>,
    pub orders: Vec<GridOrder>,
    pub search_text: Option<String>,
}

/// Largest LIMIT / OFFSET PostgreSQL takes (`bigint`).
const MAX_ROWS: u64 = i64::MAX as u64;

impl GridConfig {
    /// Page size, rejected when it does not fit a `bigint`.
    pub fn limit(&self) -> OrmResult<Option<u64>> {
        match self.record_per_page {
            Some(per_page) if per_page > MAX_ROWS => Err(OrmError::validation(format!(
                "recordPerPage {per_page} is out of range"
            ))),
            other => Ok(other),
        }
    }

    /// Rows to skip, only when paging is configured.
    pub fn offset(&self) -> OrmResult<Option<u64>> {
        let Some(per_page) = self.limit()? else {
            return Ok(None);
        };
        let page = self.current_page.unwrap_or(0);
        per_page
            .checked_mul(page)
            .filter(|offset| *offset <= MAX_ROWS)
            .map(Some)
            .ok_or_else(|| {
                OrmError::validation(format!(
                    "page {page} of {per_page} rows is out of range"
                ))
            })
    }

    /// Trimmed search text, `None` when blank.
    pub fn search(&self) -> Option<&str> {
        self.search_text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Sort keys naming one of `aliases`, in request order.
    pub fn selected_orders<'a>(
        &'a self,
        aliases: &'a [&'a str],
    ) -> impl Iterator<Item = &'a GridOrder> + 'a {
        self.orders
            .iter()
            .filter(move |o| aliases.contains(&o.column_name.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnDataType {
    String,
    Number,
    Date,
    Boolean,
}

/// Model a grid column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKey {
    User,
}

/// Column descriptor sent to a grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridColumnConfig {
    pub column_name: String,
    pub column_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<ColumnDataType>,
    pub model_key: ModelKey,
    /// Which self-join alias (`t_sys_users1`, `t_sys_users2`) provides the value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_id: Option<u8>,
    pub is_primary_key: bool,
}

impl GridColumnConfig {
    /// The "Created By / Created Date / Updated By / Updated Date" columns.
    ///
    /// Column names are resolved from the user mapping; date columns belong to
    /// `model_key`, the by-columns to the user model.
    pub fn operated_by_columns(model_key: ModelKey) -> OrmResult<Vec<GridColumnConfig>> {
        let mapping = column_mappings::<User>();
        let column = |physical: &str,
                      label: &str,
                      data_type: ColumnDataType,
                      key: ModelKey,
                      alias_id: Option<u8>|
         -> OrmResult<GridColumnConfig> {
            Ok(GridColumnConfig {
                column_name: mapping.property_by_column(physical)?.to_string(),
                column_label: label.to_string(),
                data_type: Some(data_type),
                model_key: key,
                alias_id,
                is_primary_key: false,
            })
        };

        Ok(vec![
            column(
                Audit::CREATED_BY_USERNAME,
                "Created By",
                ColumnDataType::String,
                ModelKey::User,
                Some(1),
            )?,
            column(
                Audit::CREATED_DATE,
                "Created Date",
                ColumnDataType::Date,
                model_key,
                None,
            )?,
            column(
                Audit::UPDATED_BY_USERNAME,
                "Updated By",
                ColumnDataType::String,
                ModelKey::User,
                Some(2),
            )?,
            column(
                Audit::UPDATED_DATE,
                "Updated Date",
                ColumnDataType::Date,
                model_key,
                None,
            )?,
        ])
    }
}

/// Table name of the model a key refers to.
pub fn table_of(key: ModelKey) -> &'static str {
    match key {
        ModelKey::User => User::TABLE_NAME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_client_payload() {
        let grid: GridConfig = serde_json::from_str(
            r#"{"recordPerPage":20,"currentPage":2,"searchText":"  ada ",
                "orders":[{"columnName":"firstName","direction":"desc"},{"columnName":"email"}]}"#,
        )
        .unwrap();
        assert_eq!(grid.limit().unwrap(), Some(20));
        assert_eq!(grid.offset().unwrap(), Some(40));
        assert_eq!(grid.search(), Some("ada"));
        assert_eq!(grid.orders[0].direction, Direction::Desc);
        assert_eq!(grid.orders[1].direction, Direction::Asc);
    }

    #[test]
    fn no_paging_means_no_offset() {
        let grid = GridConfig {
            current_page: Some(3),
            search_text: Some("   ".into()),
            ..GridConfig::default()
        };
        assert_eq!(grid.offset().unwrap(), None);
        assert_eq!(grid.search(), None);
    }

    #[test]
    fn unselected_orders_are_dropped() {
        let grid = GridConfig {
            orders: vec![
                GridOrder {
                    column_name: "firstName".into(),
                    direction: Direction::Asc,
                },
                GridOrder {
                    column_name: "password".into(),
                    direction: Direction::Asc,
                },
                GridOrder {
                    column_name: "1; DROP TABLE t_sys_users".into(),
                    direction: Direction::Desc,
                },
            ],
            ..GridConfig::default()
        };
        let kept: Vec<_> = grid
            .selected_orders(&["userId", "firstName"])
            .map(|o| o.column_name.as_str())
            .collect();
        assert_eq!(kept, ["firstName"]);
    }

    #[test]
    fn oversized_paging_is_rejected() {
        let grid: GridConfig = serde_json::from_str(
            r#"{"recordPerPage":18446744073709551615,"currentPage":2}"#,
        )
        .unwrap();
        assert!(grid.limit().unwrap_err().is_validation());
        assert!(grid.offset().unwrap_err().is_validation());

        let grid = GridConfig {
            record_per_page: Some(1 << 40),
            current_page: Some(1 << 30),
            ..GridConfig::default()
        };
        assert!(grid.limit().is_ok());
        assert!(grid.offset().unwrap_err().is_validation());
    }

    #[test]
    fn largest_bigint_offset_is_allowed() {
        let grid = GridConfig {
            record_per_page: Some(i64::MAX as u64),
            current_page: Some(1),
            ..GridConfig::default()
        };
        assert_eq!(grid.offset().unwrap(), Some(i64::MAX as u64));
    }

    #[test]
    fn operated_by_columns_use_logical_names() {
        let cols = GridColumnConfig::operated_by_columns(ModelKey::User).unwrap();
        let names: Vec<_> = cols.iter().map(|c| c.column_name.as_str()).collect();
        assert_eq!(
            names,
            ["createdByUsername", "createdDate", "updatedByUsername", "updatedDate"]
        );
        assert_eq!(cols[0].alias_id, Some(1));
        assert_eq!(cols[2].alias_id, Some(2));
        assert_eq!(table_of(cols[1].model_key), "t_sys_users");
    }
}
