//! Filter conditions for WHERE clauses.
//!
//! This module provides [`Op`] (operator), [`Condition`] (one comparison) and
//! [`ConditionGroup`] (a flat AND list, or an OR of AND lists).

use crate::value::Value;

/// Comparison operator of a [`Condition`] or join predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Gte,
    /// `<=`
    Lte,
    /// `LIKE`
    Like,
    /// `ILIKE` (case-insensitive LIKE)
    ILike,
    /// Set membership against an array parameter: `= ANY($n)`
    In,
    /// Set exclusion against an array parameter: `!= ALL($n)`
    NotIn,
    /// `IS NOT NULL`
    IsNotNull,
    /// `IS NULL`
    IsNull,
}

impl Op {
    /// SQL text of the operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Lt => "<",
            Op::Gte => ">=",
            Op::Lte => "<=",
            Op::Like => "LIKE",
            Op::ILike => "ILIKE",
            Op::In => "= ANY",
            Op::NotIn => "!= ALL",
            Op::IsNotNull => "IS NOT NULL",
            Op::IsNull => "IS NULL",
        }
    }

    /// Whether the operator consumes a positional parameter.
    ///
    /// `IS NULL` / `IS NOT NULL` never bind.
    pub fn binds_value(self) -> bool {
        !matches!(self, Op::IsNull | Op::IsNotNull)
    }

    /// Whether the placeholder is wrapped in parentheses (`= ANY($n)`).
    pub fn wraps_placeholder(self) -> bool {
        matches!(self, Op::In | Op::NotIn)
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// One filter: `<table>.<column> <op> [$n]`.
///
/// When `table` is `None` the statement's primary table qualifies the column.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub table: Option<String>,
    pub column: String,
    pub op: Op,
    pub value: Value,
}

impl Condition {
    /// Create a condition on the statement's primary table.
    pub fn new(column: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        Self {
            table: None,
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// Qualify the column with an explicit table (or join alias).
    pub fn on_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// column = value
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Eq, value)
    }

    /// column != value
    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Ne, value)
    }

    /// column > value
    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Gt, value)
    }

    /// column < value
    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Lt, value)
    }

    /// column >= value
    pub fn gte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Gte, value)
    }

    /// column <= value
    pub fn lte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Op::Lte, value)
    }

    /// column LIKE pattern
    pub fn like(column: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Self::new(column, Op::Like, pattern)
    }

    /// column ILIKE pattern
    pub fn ilike(column: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Self::new(column, Op::ILike, pattern)
    }

    /// column = ANY(values)
    pub fn in_list<T: Into<Value>>(column: impl Into<String>, values: Vec<T>) -> Self {
        Self::new(column, Op::In, values)
    }

    /// column != ALL(values)
    pub fn not_in<T: Into<Value>>(column: impl Into<String>, values: Vec<T>) -> Self {
        Self::new(column, Op::NotIn, values)
    }

    /// column IS NULL
    pub fn is_null(column: impl Into<String>) -> Self {
        Self::new(column, Op::IsNull, Value::Null)
    }

    /// column IS NOT NULL
    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::new(column, Op::IsNotNull, Value::Null)
    }
}

/// Boolean shape of a WHERE clause.
///
/// Only two levels are supported: a flat AND list, or an OR of AND lists.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionGroup {
    /// `c1 AND c2 AND ...`
    All(Vec<Condition>),
    /// `(c1 AND c2) OR (c3) OR ...`
    AnyOf(Vec<Vec<Condition>>),
}

impl ConditionGroup {
    /// Whether the group renders no predicate at all.
    pub fn is_empty(&self) -> bool {
        match self {
            ConditionGroup::All(conds) => conds.is_empty(),
            ConditionGroup::AnyOf(groups) => groups.iter().all(Vec::is_empty),
        }
    }

    /// Iterate all conditions in source order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &Condition> + '_> {
        match self {
            ConditionGroup::All(conds) => Box::new(conds.iter()),
            ConditionGroup::AnyOf(groups) => Box::new(groups.iter().flatten()),
        }
    }
}

impl From<Vec<Condition>> for ConditionGroup {
    fn from(conds: Vec<Condition>) -> Self {
        ConditionGroup::All(conds)
    }
}

impl From<Vec<Vec<Condition>>> for ConditionGroup {
    fn from(groups: Vec<Vec<Condition>>) -> Self {
        ConditionGroup::AnyOf(groups)
    }
}

impl From<Condition> for ConditionGroup {
    fn from(cond: Condition) -> Self {
        ConditionGroup::All(vec![cond])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_ops_do_not_bind() {
        assert!(!Op::IsNull.binds_value());
        assert!(!Op::IsNotNull.binds_value());
        assert!(Op::Eq.binds_value());
        assert!(Op::In.binds_value());
    }

    #[test]
    fn set_ops_wrap_placeholder() {
        assert!(Op::In.wraps_placeholder());
        assert!(Op::NotIn.wraps_placeholder());
        assert!(!Op::ILike.wraps_placeholder());
        assert_eq!(Op::NotIn.as_sql(), "!= ALL");
    }

    #[test]
    fn on_table_sets_qualifier() {
        let c = Condition::eq("c_email", "a@b.c").on_table("t_sys_users1");
        assert_eq!(c.table.as_deref(), Some("t_sys_users1"));
        assert_eq!(c.value, Value::Text("a@b.c".into()));
    }

    #[test]
    fn empty_groups() {
        assert!(ConditionGroup::All(vec![]).is_empty());
        assert!(ConditionGroup::AnyOf(vec![vec![], vec![]]).is_empty());
        assert!(!ConditionGroup::from(Condition::is_null("c_deleteddate")).is_empty());
    }

    #[test]
    fn iter_flattens_in_source_order() {
        let group = ConditionGroup::AnyOf(vec![
            vec![Condition::eq("a", 1), Condition::eq("b", 2)],
            vec![Condition::eq("c", 3)],
        ]);
        let cols: Vec<_> = group.iter().map(|c| c.column.as_str()).collect();
        assert_eq!(cols, ["a", "b", "c"]);
    }
}
