//! Bound parameter values.
//!
//! [`Value`] is the single value type carried by conditions, insert rows and
//! update assignments. It binds to PostgreSQL through [`ToSql`] and decodes
//! result columns through [`FromSql`], so generated statements and the rows
//! they return share one representation.

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::error::Error;
use tokio_postgres::types::{FromSql, IsNull, Kind, ToSql, Type, to_sql_checked};
use uuid::Uuid;

type BoxError = Box<dyn Error + Sync + Send>;

/// A scalar or structured statement parameter.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// SQL NULL
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    /// JSON / JSONB document
    Json(serde_json::Value),
    /// Array value, used by `= ANY($n)` and `!= ALL($n)`
    Array(Vec<Value>),
}

impl Value {
    /// Whether this value is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Convert into a JSON value for row-to-model mapping.
    ///
    /// Timestamps become RFC 3339 strings and UUIDs their hyphenated form,
    /// which is what `chrono` and `uuid` deserialize from.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Text(s) => Json::String(s.clone()),
            Value::Timestamp(ts) => Json::String(ts.to_rfc3339()),
            Value::Uuid(id) => Json::String(id.to_string()),
            Value::Json(v) => v.clone(),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(v.into())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        // Each variant is checked against the parameter type the server
        // inferred; a mismatch is an error, never a reinterpretation.
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => b.to_sql_checked(ty, out),
            // Narrow to the wire width the server asked for.
            Value::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)?.to_sql_checked(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql_checked(ty, out),
                Type::FLOAT4 => (*i as f32).to_sql_checked(ty, out),
                Type::FLOAT8 => (*i as f64).to_sql_checked(ty, out),
                _ => i.to_sql_checked(ty, out),
            },
            Value::Float(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql_checked(ty, out),
                _ => f.to_sql_checked(ty, out),
            },
            Value::Text(s) => s.to_sql_checked(ty, out),
            Value::Timestamp(ts) => match *ty {
                Type::TIMESTAMP => ts.naive_utc().to_sql_checked(ty, out),
                Type::DATE => ts.date_naive().to_sql_checked(ty, out),
                _ => ts.to_sql_checked(ty, out),
            },
            Value::Uuid(id) => id.to_sql_checked(ty, out),
            Value::Json(v) => v.to_sql_checked(ty, out),
            Value::Array(items) => match ty.kind() {
                Kind::Array(_) => items.to_sql_checked(ty, out),
                _ => Err(format!("cannot bind an array to a parameter of type '{ty}'").into()),
            },
        }
    }

    /// NULL binds to any type; other variants are checked in `to_sql`.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

impl<'a> FromSql<'a> for Value {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        let value = match *ty {
            Type::BOOL => Value::Bool(bool::from_sql(ty, raw)?),
            Type::INT2 => Value::Int(i16::from_sql(ty, raw)?.into()),
            Type::INT4 => Value::Int(i32::from_sql(ty, raw)?.into()),
            Type::INT8 => Value::Int(i64::from_sql(ty, raw)?),
            Type::OID => Value::Int(u32::from_sql(ty, raw)?.into()),
            Type::FLOAT4 => Value::Float(f32::from_sql(ty, raw)?.into()),
            Type::FLOAT8 => Value::Float(f64::from_sql(ty, raw)?),
            Type::TIMESTAMPTZ => Value::Timestamp(DateTime::<Utc>::from_sql(ty, raw)?),
            Type::TIMESTAMP => Value::Timestamp(NaiveDateTime::from_sql(ty, raw)?.and_utc()),
            Type::DATE => Value::Text(NaiveDate::from_sql(ty, raw)?.to_string()),
            Type::UUID => Value::Uuid(Uuid::from_sql(ty, raw)?),
            Type::JSON | Type::JSONB => Value::Json(serde_json::Value::from_sql(ty, raw)?),
            _ if <String as FromSql>::accepts(ty) => Value::Text(String::from_sql(ty, raw)?),
            _ => match ty.kind() {
                Kind::Array(_) => Value::Array(Vec::<Value>::from_sql(ty, raw)?),
                _ => return Err(format!("unsupported column type '{ty}'").into()),
            },
        };
        Ok(value)
    }

    fn from_sql_null(_ty: &Type) -> Result<Self, BoxError> {
        Ok(Value::Null)
    }

    fn accepts(ty: &Type) -> bool {
        match ty.kind() {
            Kind::Array(member) => <Value as FromSql>::accepts(member),
            _ => {
                matches!(
                    *ty,
                    Type::BOOL
                        | Type::INT2
                        | Type::INT4
                        | Type::INT8
                        | Type::OID
                        | Type::FLOAT4
                        | Type::FLOAT8
                        | Type::TIMESTAMPTZ
                        | Type::TIMESTAMP
                        | Type::DATE
                        | Type::UUID
                        | Type::JSON
                        | Type::JSONB
                ) || <String as FromSql>::accepts(ty)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn option_none_is_null() {
        let v: Value = Option::<String>::None.into();
        assert!(v.is_null());
        let v: Value = Some("x").into();
        assert_eq!(v, Value::Text("x".into()));
    }

    #[test]
    fn vec_becomes_array() {
        let v: Value = vec![1i32, 2, 3].into();
        assert_eq!(
            v,
            Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
    }

    #[test]
    fn int_narrows_to_int4() {
        let mut buf = BytesMut::new();
        let res = Value::Int(7).to_sql(&Type::INT4, &mut buf).unwrap();
        assert!(matches!(res, IsNull::No));
        assert_eq!(buf.len(), 4);
    }

    #[test]
    fn int_overflow_for_int2_is_an_error() {
        let mut buf = BytesMut::new();
        assert!(Value::Int(100_000).to_sql(&Type::INT2, &mut buf).is_err());
    }

    #[test]
    fn text_into_int4_is_rejected() {
        let mut buf = BytesMut::new();
        assert!(
            Value::Text("1234".into())
                .to_sql_checked(&Type::INT4, &mut buf)
                .is_err()
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn int_into_text_or_numeric_is_rejected() {
        let mut buf = BytesMut::new();
        assert!(Value::Int(5).to_sql_checked(&Type::TEXT, &mut buf).is_err());
        assert!(Value::Int(5).to_sql_checked(&Type::NUMERIC, &mut buf).is_err());
        assert!(Value::Float(1.5).to_sql_checked(&Type::INT8, &mut buf).is_err());
    }

    #[test]
    fn matching_types_still_bind() {
        let mut buf = BytesMut::new();
        assert!(Value::Text("a".into()).to_sql_checked(&Type::VARCHAR, &mut buf).is_ok());
        assert!(Value::Int(5).to_sql_checked(&Type::INT8, &mut buf).is_ok());
        assert!(Value::Bool(true).to_sql_checked(&Type::BOOL, &mut buf).is_ok());
        let ts = Utc::now();
        assert!(Value::Timestamp(ts).to_sql_checked(&Type::TIMESTAMPTZ, &mut buf).is_ok());
        assert!(Value::Timestamp(ts).to_sql_checked(&Type::TIMESTAMP, &mut buf).is_ok());
    }

    #[test]
    fn array_members_are_checked() {
        let mut buf = BytesMut::new();
        let ints = Value::from(vec![1i64, 2]);
        assert!(ints.to_sql_checked(&Type::INT4_ARRAY, &mut buf).is_ok());
        let texts = Value::from(vec!["a", "b"]);
        assert!(texts.to_sql_checked(&Type::INT4_ARRAY, &mut buf).is_err());
    }

    #[test]
    fn null_binds_as_null() {
        let mut buf = BytesMut::new();
        let res = Value::Null.to_sql(&Type::TEXT, &mut buf).unwrap();
        assert!(matches!(res, IsNull::Yes));
    }

    #[test]
    fn timestamp_to_json_is_rfc3339() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(
            Value::Timestamp(ts).to_json(),
            serde_json::json!("2024-05-01T12:00:00+00:00")
        );
    }

    #[test]
    fn decodes_int4_and_text() {
        let raw = 42i32.to_be_bytes();
        assert_eq!(Value::from_sql(&Type::INT4, &raw).unwrap(), Value::Int(42));
        assert_eq!(
            Value::from_sql(&Type::TEXT, b"hello").unwrap(),
            Value::Text("hello".into())
        );
    }

    #[test]
    fn accepts_common_types() {
        assert!(<Value as FromSql>::accepts(&Type::VARCHAR));
        assert!(<Value as FromSql>::accepts(&Type::INT4_ARRAY));
        assert!(!<Value as FromSql>::accepts(&Type::POINT));
    }
}
