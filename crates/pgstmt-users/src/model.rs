//! Domain models and their column mappings.

use chrono::{DateTime, Utc};
use pgstmt::Model;
use serde::{Deserialize, Serialize};

/// Audit columns shared by every model.
pub const AUDIT_COLUMNS: &[(&str, &str)] = &[
    ("createdBy", Audit::CREATED_BY),
    ("createdDate", Audit::CREATED_DATE),
    ("updatedBy", Audit::UPDATED_BY),
    ("updatedDate", Audit::UPDATED_DATE),
    ("deletedBy", Audit::DELETED_BY),
    ("deletedDate", Audit::DELETED_DATE),
    ("createdByUsername", Audit::CREATED_BY_USERNAME),
    ("updatedByUsername", Audit::UPDATED_BY_USERNAME),
    ("deletedByUsername", Audit::DELETED_BY_USERNAME),
];

/// Who touched a row and when.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    pub created_by: Option<i64>,
    pub created_date: Option<DateTime<Utc>>,
    pub updated_by: Option<i64>,
    pub updated_date: Option<DateTime<Utc>>,
    pub deleted_by: Option<i64>,
    pub deleted_date: Option<DateTime<Utc>>,
    pub created_by_username: Option<String>,
    pub updated_by_username: Option<String>,
    pub deleted_by_username: Option<String>,
}

impl Audit {
    pub const CREATED_BY: &'static str = "c_createdby";
    pub const CREATED_DATE: &'static str = "c_createddate";
    pub const UPDATED_BY: &'static str = "c_updatedby";
    pub const UPDATED_DATE: &'static str = "c_updateddate";
    pub const DELETED_BY: &'static str = "c_deletedby";
    pub const DELETED_DATE: &'static str = "c_deleteddate";
    pub const CREATED_BY_USERNAME: &'static str = "c_createdbyusername";
    pub const UPDATED_BY_USERNAME: &'static str = "c_updatedbyusername";
    pub const DELETED_BY_USERNAME: &'static str = "c_deletedbyusername";
}

/// A row of `t_sys_users`.
///
/// Every field is optional because statements select only the columns a
/// caller needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    /// Password hash
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub is_root: Option<bool>,
    #[serde(flatten)]
    pub audit: Audit,
}

impl User {
    pub const USER_ID: &'static str = "c_userid";
    pub const FIRST_NAME: &'static str = "c_firstname";
    pub const LAST_NAME: &'static str = "c_lastname";
    pub const EMAIL: &'static str = "c_email";
    pub const PASSWORD: &'static str = "c_password";
    pub const IS_ROOT: &'static str = "c_isroot";
}

impl Model for User {
    const TABLE_NAME: &'static str = "t_sys_users";
    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("userId", User::USER_ID),
        ("firstName", User::FIRST_NAME),
        ("lastName", User::LAST_NAME),
        ("email", User::EMAIL),
        ("password", User::PASSWORD),
        ("isRoot", User::IS_ROOT),
    ];
    const BASE_COLUMNS: &'static [(&'static str, &'static str)] = AUDIT_COLUMNS;
}
