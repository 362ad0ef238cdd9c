//! WHERE / JOIN clause compiler shared by all statement kinds.
//!
//! Placeholders are numbered from the parameter list itself: a value-bearing
//! condition pushes its value and takes `$<len>`, so numbering is sequential
//! with no gaps, and a caller that keeps appending to the same list (UPDATE's
//! SET) continues exactly where WHERE stopped.

use crate::condition::{Condition, ConditionGroup};
use crate::error::OrmResult;
use crate::ident::check_ident;
use crate::query::parts::{Join, JoinOn};
use crate::value::Value;

/// Compiled WHERE clause.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    /// `"\nWHERE ..."`, or empty when there is nothing to filter on
    pub sql: String,
    /// Bound values in placeholder order
    pub params: Vec<Value>,
}

/// Compile a condition group against `primary_table`.
///
/// `None` or an empty group yields an empty clause and no parameters.
pub fn compile_where(group: Option<&ConditionGroup>, primary_table: &str) -> WhereClause {
    let mut params = Vec::new();
    let body = group
        .map(|g| render_group(g, primary_table, &mut params))
        .unwrap_or_default();

    let sql = if body.is_empty() {
        String::new()
    } else {
        format!("\nWHERE {body}")
    };
    WhereClause { sql, params }
}

/// Render the predicate body of a group, appending bound values to `params`.
pub(crate) fn render_group(
    group: &ConditionGroup,
    primary_table: &str,
    params: &mut Vec<Value>,
) -> String {
    match group {
        ConditionGroup::All(conds) => render_and(conds, primary_table, params),
        ConditionGroup::AnyOf(groups) => groups
            .iter()
            .filter(|g| !g.is_empty())
            .map(|g| format!("({})", render_and(g, primary_table, params)))
            .collect::<Vec<_>>()
            .join(" OR "),
    }
}

fn render_and(conds: &[Condition], primary_table: &str, params: &mut Vec<Value>) -> String {
    conds
        .iter()
        .map(|c| render_condition(c, primary_table, params))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn render_condition(cond: &Condition, primary_table: &str, params: &mut Vec<Value>) -> String {
    let table = cond.table.as_deref().unwrap_or(primary_table);
    let lhs = format!("{}.{} {}", table, cond.column, cond.op.as_sql());

    if !cond.op.binds_value() {
        return lhs;
    }

    params.push(cond.value.clone());
    let idx = params.len();
    if cond.op.wraps_placeholder() {
        format!("{lhs}(${idx})")
    } else {
        format!("{lhs} ${idx}")
    }
}

/// Compile JOIN descriptors, in input order.
///
/// Each join renders as `\n<KIND> JOIN <table> as <alias-or-table> ON <p1 AND p2 ...>`.
pub fn compile_joins(joins: &[Join]) -> String {
    joins
        .iter()
        .map(|join| {
            format!(
                "\n{} JOIN {} as {} ON {}",
                join.kind.as_sql(),
                join.table,
                join.reference_name(),
                join_predicates(join)
            )
        })
        .collect()
}

/// AND-combined ON predicates of one join.
pub(crate) fn join_predicates(join: &Join) -> String {
    join.on
        .iter()
        .map(render_join_on)
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn render_join_on(p: &JoinOn) -> String {
    format!(
        "{}.{} {} {}.{}",
        p.primary_table,
        p.primary_column,
        p.op.as_sql(),
        p.secondary_table,
        p.secondary_column
    )
}

/// Validate every identifier a condition group will splice into SQL.
pub(crate) fn check_group(group: Option<&ConditionGroup>) -> OrmResult<()> {
    let Some(group) = group else {
        return Ok(());
    };
    for cond in group.iter() {
        check_ident("column", &cond.column)?;
        if let Some(table) = &cond.table {
            check_ident("table", table)?;
        }
    }
    Ok(())
}
