//! UPDATE statement generator.

use crate::condition::{Condition, ConditionGroup};
use crate::error::{OrmError, OrmResult};
use crate::ident::check_ident;
use crate::query::clause::{check_group, join_predicates, render_group};
use crate::query::parts::{Assignment, Join, JoinKind};
use crate::query::{PreparedQuery, Statement, StatementKind};
use crate::value::Value;

/// Parameters of an UPDATE statement.
#[derive(Debug, Clone, Default)]
pub struct UpdateParams {
    pub table: String,
    pub assignments: Vec<Assignment>,
    /// AND-combined filter
    pub conditions: Vec<Condition>,
    /// INNER joins only, rendered as `UPDATE ... FROM`
    pub joins: Vec<Join>,
}

impl UpdateParams {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// Always assign `value`, including NULL.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.assignments.push(Assignment::set(column, value));
        self
    }

    /// Assign `value` only when it is not NULL.
    pub fn set_if_present(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.assignments.push(Assignment::set_if_present(column, value));
        self
    }

    pub fn assignment(mut self, assignment: Assignment) -> Self {
        self.assignments.push(assignment);
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Construct the generator.
    pub fn build(self) -> OrmResult<UpdateQuery> {
        UpdateQuery::new(self)
    }
}

/// UPDATE generator.
///
/// The WHERE clause is compiled first, so its values take `$1..$W` and the
/// SET values continue at `$(W+1)`, even though SET precedes WHERE in the
/// statement text:
///
/// ```text
/// UPDATE <table> SET c1 = $(W+1), ...[ FROM j AS a, ...] <where> RETURNING *;
/// params = [where values..., set values...]
/// ```
#[derive(Debug, Clone)]
pub struct UpdateQuery {
    table: String,
    assignments: Vec<Assignment>,
    conditions: ConditionGroup,
    joins: Vec<Join>,
}

impl UpdateQuery {
    /// Filter partial assignments and validate the statement shape.
    ///
    /// Fails when no assignments are given, when none survive NULL filtering,
    /// or when a join is not an INNER join.
    pub fn new(params: UpdateParams) -> OrmResult<Self> {
        check_ident("table", &params.table)?;
        if params.assignments.is_empty() {
            return Err(OrmError::validation(
                "UPDATE requires at least one column-value pair in updates.",
            ));
        }

        let assignments: Vec<Assignment> = params
            .assignments
            .into_iter()
            .filter(Assignment::is_applied)
            .collect();
        if assignments.is_empty() {
            return Err(OrmError::validation(
                "UPDATE has no assignments left after dropping NULL values",
            ));
        }
        for a in &assignments {
            check_ident("column", &a.column)?;
        }

        let conditions = ConditionGroup::All(params.conditions);
        check_group(Some(&conditions))?;

        for join in &params.joins {
            if join.kind != JoinKind::Inner {
                return Err(OrmError::validation(format!(
                    "UPDATE supports only INNER joins (got {} JOIN {})",
                    join.kind.as_sql(),
                    join.table
                )));
            }
            join.check()?;
        }

        Ok(Self {
            table: params.table,
            assignments,
            conditions,
            joins: params.joins,
        })
    }

    /// Columns that will actually be assigned.
    pub fn assigned_columns(&self) -> impl Iterator<Item = &str> {
        self.assignments.iter().map(|a| a.column.as_str())
    }

    fn from_clause(&self) -> String {
        if self.joins.is_empty() {
            return String::new();
        }
        let tables: Vec<String> = self
            .joins
            .iter()
            .map(|j| format!("{} AS {}", j.table, j.reference_name()))
            .collect();
        format!(" FROM {}", tables.join(", "))
    }
}

impl Statement for UpdateQuery {
    fn kind(&self) -> StatementKind {
        StatementKind::Update
    }

    fn generate_query(&self) -> PreparedQuery {
        let mut params = Vec::new();

        let mut predicates = Vec::new();
        let filter = render_group(&self.conditions, &self.table, &mut params);
        if !filter.is_empty() {
            predicates.push(filter);
        }
        predicates.extend(self.joins.iter().map(join_predicates));
        let where_sql = if predicates.is_empty() {
            String::new()
        } else {
            format!("\nWHERE {}", predicates.join(" AND "))
        };

        let set_list: Vec<String> = self
            .assignments
            .iter()
            .map(|a| {
                params.push(a.value.clone());
                format!("{} = ${}", a.column, params.len())
            })
            .collect();

        let query = format!(
            "UPDATE {} SET {}{} {} RETURNING *;",
            self.table,
            set_list.join(", "),
            self.from_clause(),
            where_sql
        );

        PreparedQuery::new(query, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parts::JoinOn;

    #[test]
    fn set_placeholders_follow_where() {
        let q = UpdateParams::new("t_sys_users")
            .set("c_firstname", "Ada")
            .set("c_lastname", "Lovelace")
            .condition(Condition::eq("c_userid", 7))
            .condition(Condition::eq("c_isroot", false))
            .build()
            .unwrap()
            .generate_query();
        assert_eq!(
            q.query,
            "UPDATE t_sys_users SET c_firstname = $3, c_lastname = $4 \nWHERE t_sys_users.c_userid = $1 \
             AND t_sys_users.c_isroot = $2 RETURNING *;"
        );
        assert_eq!(
            q.params,
            vec![
                Value::Int(7),
                Value::Bool(false),
                Value::Text("Ada".into()),
                Value::Text("Lovelace".into()),
            ]
        );
    }

    #[test]
    fn null_partial_assignment_is_dropped() {
        let q = UpdateParams::new("t")
            .set_if_present("c_email", Option::<String>::None)
            .set("c_updatedby", 1)
            .condition(Condition::eq("c_userid", 2))
            .build()
            .unwrap();
        assert_eq!(q.assigned_columns().collect::<Vec<_>>(), ["c_updatedby"]);
        let q = q.generate_query();
        assert_eq!(q.query, "UPDATE t SET c_updatedby = $2 \nWHERE t.c_userid = $1 RETURNING *;");
        assert_eq!(q.params, vec![Value::Int(2), Value::Int(1)]);
    }

    #[test]
    fn explicit_null_assignment_is_kept() {
        let q = UpdateParams::new("t")
            .set("c_deletedby", Value::Null)
            .build()
            .unwrap()
            .generate_query();
        assert_eq!(q.query, "UPDATE t SET c_deletedby = $1  RETURNING *;");
        assert_eq!(q.params, vec![Value::Null]);
    }

    #[test]
    fn empty_assignments_rejected() {
        assert!(UpdateParams::new("t").build().unwrap_err().is_validation());
        let err = UpdateParams::new("t")
            .set_if_present("c_email", Value::Null)
            .build()
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn inner_join_renders_update_from() {
        let q = UpdateParams::new("t_sys_users")
            .set("c_isroot", true)
            .condition(Condition::eq("c_name", "admin").on_table("r"))
            .join(
                Join::inner("t_roles")
                    .alias("r")
                    .on(JoinOn::eq("t_sys_users", "c_roleid", "r", "c_roleid")),
            )
            .build()
            .unwrap()
            .generate_query();
        assert_eq!(
            q.query,
            "UPDATE t_sys_users SET c_isroot = $2 FROM t_roles AS r \nWHERE r.c_name = $1 \
             AND t_sys_users.c_roleid = r.c_roleid RETURNING *;"
        );
        assert_eq!(q.params, vec![Value::Text("admin".into()), Value::Bool(true)]);
    }

    #[test]
    fn left_join_rejected() {
        let err = UpdateParams::new("t")
            .set("a", 1)
            .join(Join::left("u").on(JoinOn::eq("t", "id", "u", "id")))
            .build()
            .unwrap_err();
        assert!(err.is_validation());
    }
}
