//! Model column-mapping registry.
//!
//! A model declares its `property -> column` pairs as constants, optionally
//! merged with a base model's pairs (audit columns and the like). The merged
//! mapping is computed once per model type and cached for the process
//! lifetime.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};

use serde::de::DeserializeOwned;

use crate::error::{OrmError, OrmResult};
use crate::row::Record;

/// A domain model stored in one table.
///
/// ```ignore
/// impl Model for User {
///     const TABLE_NAME: &'static str = "t_sys_users";
///     const COLUMNS: &'static [(&'static str, &'static str)] = &[
///         ("userId", "c_userid"),
///         ("email", "c_email"),
///     ];
///     const BASE_COLUMNS: &'static [(&'static str, &'static str)] = AUDIT_COLUMNS;
/// }
/// ```
pub trait Model: 'static {
    const TABLE_NAME: &'static str;

    /// `(property, column)` pairs declared on the model itself.
    const COLUMNS: &'static [(&'static str, &'static str)];

    /// Pairs inherited from a base model. Own pairs win on a property clash.
    const BASE_COLUMNS: &'static [(&'static str, &'static str)] = &[];
}

/// Ordered `property <-> column` table of one model.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnMapping {
    entries: Vec<(&'static str, &'static str)>,
}

impl ColumnMapping {
    /// Merge own and base declarations. Own entries come first.
    pub fn merged(
        own: &[(&'static str, &'static str)],
        base: &[(&'static str, &'static str)],
    ) -> Self {
        let mut entries: Vec<(&'static str, &'static str)> = Vec::with_capacity(own.len() + base.len());
        for &(property, column) in own.iter().chain(base) {
            if entries.iter().any(|(p, _)| *p == property) {
                continue;
            }
            entries.push((property, column));
        }
        Self { entries }
    }

    /// Reverse lookup. A column without a property is a mapping bug.
    pub fn property_by_column(&self, column: &str) -> OrmResult<&'static str> {
        self.entries
            .iter()
            .find(|(_, c)| *c == column)
            .map(|(p, _)| *p)
            .ok_or_else(|| OrmError::mapping_not_found(column))
    }

    /// Forward lookup. `None` means the property is not mapped.
    pub fn column_by_property(&self, property: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, c)| *c)
    }

    /// Resolve a caller-supplied key (property or physical column) to a column.
    pub fn resolve_column(&self, key: &str) -> Option<&'static str> {
        self.column_by_property(key).or_else(|| {
            self.entries
                .iter()
                .find(|(_, c)| *c == key)
                .map(|(_, c)| *c)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.entries.iter().copied()
    }

    pub fn properties(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(p, _)| *p)
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(_, c)| *c)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Merged mapping of `M`, computed on first use.
pub fn column_mappings<M: Model>() -> &'static ColumnMapping {
    static CACHE: OnceLock<Mutex<HashMap<TypeId, &'static ColumnMapping>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let key = TypeId::of::<M>();

    if let Some(cached) = cache
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
        .copied()
    {
        return cached;
    }

    let computed: &'static ColumnMapping =
        Box::leak(Box::new(ColumnMapping::merged(M::COLUMNS, M::BASE_COLUMNS)));

    // Another thread may have won the race; keep whichever got stored first.
    let mut map = cache.lock().unwrap_or_else(PoisonError::into_inner);
    *map.entry(key).or_insert(computed)
}

/// Reverse lookup on `M`'s mapping.
pub fn property_by_column<M: Model>(column: &str) -> OrmResult<&'static str> {
    column_mappings::<M>().property_by_column(column)
}

/// Forward lookup on `M`'s mapping.
pub fn column_by_property<M: Model>(property: &str) -> Option<&'static str> {
    column_mappings::<M>().column_by_property(property)
}

/// Build one `M` from a record.
///
/// Each property is read from the first key present among: the bare column,
/// the property name, `TABLE_NAME.column`. Keys that are absent are left out,
/// so missing fields fall back to the model's serde defaults.
pub fn map_record<M>(record: &Record) -> OrmResult<M>
where
    M: Model + DeserializeOwned,
{
    let mapping = column_mappings::<M>();
    let mut object = serde_json::Map::with_capacity(mapping.len());

    for (property, column) in mapping.iter() {
        let qualified = format!("{}.{}", M::TABLE_NAME, column);
        let found = record
            .get(column)
            .or_else(|| record.get(property))
            .or_else(|| record.get(&qualified));
        if let Some(value) = found {
            object.insert(property.to_string(), value.to_json());
        }
    }

    serde_json::from_value(serde_json::Value::Object(object))
        .map_err(|e| OrmError::decode(M::TABLE_NAME, e.to_string()))
}

/// Build one `M` per record, in order.
pub fn map_records<M>(records: &[Record]) -> OrmResult<Vec<M>>
where
    M: Model + DeserializeOwned,
{
    records.iter().map(map_record::<M>).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use serde::Deserialize;

    const BASE: &[(&str, &str)] = &[
        ("createdBy", "c_createdby"),
        ("createdDate", "c_createddate"),
        ("deletedDate", "c_deleteddate"),
    ];

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Account {
        account_id: Option<i64>,
        email: Option<String>,
        created_by: Option<i64>,
        #[serde(default)]
        deleted_date: Option<String>,
    }

    impl Model for Account {
        const TABLE_NAME: &'static str = "t_accounts";
        const COLUMNS: &'static [(&'static str, &'static str)] =
            &[("accountId", "c_accountid"), ("email", "c_email")];
        const BASE_COLUMNS: &'static [(&'static str, &'static str)] = BASE;
    }

    struct Shadowing;

    impl Model for Shadowing {
        const TABLE_NAME: &'static str = "t_shadow";
        const COLUMNS: &'static [(&'static str, &'static str)] =
            &[("createdBy", "c_owner")];
        const BASE_COLUMNS: &'static [(&'static str, &'static str)] = BASE;
    }

    #[test]
    fn every_column_round_trips() {
        let mapping = column_mappings::<Account>();
        assert_eq!(mapping.len(), 5);
        for column in mapping.columns() {
            let property = mapping.property_by_column(column).unwrap();
            assert_eq!(mapping.column_by_property(property), Some(column));
        }
    }

    #[test]
    fn own_entries_win() {
        let mapping = column_mappings::<Shadowing>();
        assert_eq!(mapping.column_by_property("createdBy"), Some("c_owner"));
        assert!(mapping.property_by_column("c_createdby").is_err());
        assert_eq!(mapping.len(), 3);
    }

    #[test]
    fn unknown_lookups() {
        let err = property_by_column::<Account>("c_nope").unwrap_err();
        assert!(matches!(err, OrmError::MappingNotFound { .. }));
        assert_eq!(column_by_property::<Account>("nope"), None);
    }

    #[test]
    fn cache_returns_same_instance() {
        let a = column_mappings::<Account>() as *const ColumnMapping;
        let b = column_mappings::<Account>() as *const ColumnMapping;
        assert_eq!(a, b);
    }

    #[test]
    fn resolve_column_accepts_both_names() {
        let mapping = column_mappings::<Account>();
        assert_eq!(mapping.resolve_column("email"), Some("c_email"));
        assert_eq!(mapping.resolve_column("c_createdby"), Some("c_createdby"));
        assert_eq!(mapping.resolve_column("missing"), None);
    }

    #[test]
    fn map_record_probes_in_order() {
        let mut record = Record::new();
        // bare column beats the property name
        record.insert("c_accountid".into(), Value::Int(1));
        record.insert("accountId".into(), Value::Int(2));
        // property name
        record.insert("email".into(), Value::Text("a@b.c".into()));
        // table-qualified alias
        record.insert("t_accounts.c_createdby".into(), Value::Int(7));

        let account: Account = map_record(&record).unwrap();
        assert_eq!(
            account,
            Account {
                account_id: Some(1),
                email: Some("a@b.c".into()),
                created_by: Some(7),
                deleted_date: None,
            }
        );
    }

    #[test]
    fn map_records_keeps_order() {
        let records: Vec<Record> = (1..=3)
            .map(|i| {
                let mut r = Record::new();
                r.insert("c_accountid".into(), Value::Int(i));
                r
            })
            .collect();
        let accounts: Vec<Account> = map_records(&records).unwrap();
        let ids: Vec<_> = accounts.iter().map(|a| a.account_id).collect();
        assert_eq!(ids, [Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn type_mismatch_is_decode_error() {
        let mut record = Record::new();
        record.insert("c_accountid".into(), Value::Text("x".into()));
        let err = map_record::<Account>(&record).unwrap_err();
        assert!(matches!(err, OrmError::Decode { .. }));
    }
}
