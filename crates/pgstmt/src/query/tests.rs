use super::*;
use crate::condition::{Condition, ConditionGroup};
use crate::value::Value;

fn count_placeholders(sql: &str) -> Vec<usize> {
    let mut out = Vec::new();
    let bytes = sql.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end > start {
                out.push(sql[start..end].parse().unwrap());
            }
            i = end;
        } else {
            i += 1;
        }
    }
    out
}

#[test]
fn select_users_page() {
    let q = SelectParams::new("t_users")
        .column(Column::new("c_firstname").alias("t_users.c_firstname"))
        .conditions(vec![Condition::is_null("c_deleteddate")])
        .limit(10)
        .offset(0)
        .build()
        .unwrap()
        .generate_query();
    assert_eq!(
        q.query,
        "SELECT\nt_users.c_firstname as \"t_users.c_firstname\"\nFROM t_users \nWHERE t_users.c_deleteddate IS NULL\nLIMIT 10\nOFFSET 0;"
    );
    assert!(q.params.is_empty());
}

#[test]
fn delete_all() {
    let q = DeleteParams::new("t_test").build().unwrap().generate_query();
    assert_eq!(q.query, "DELETE FROM t_test  RETURNING *;");
    assert!(q.params.is_empty());
}

#[test]
fn placeholders_are_dense_and_match_params() {
    let group = ConditionGroup::AnyOf(vec![
        vec![
            Condition::ilike("c_firstname", "%ad%"),
            Condition::is_null("c_deleteddate"),
        ],
        vec![
            Condition::ilike("c_lastname", "%ad%"),
            Condition::is_not_null("c_updatedby"),
            Condition::in_list("c_userid", vec![1, 2]),
        ],
    ]);
    let q = SelectParams::new("t_sys_users")
        .conditions(group)
        .build()
        .unwrap()
        .generate_query();
    let found = count_placeholders(&q.query);
    assert_eq!(found, vec![1, 2, 3]);
    assert_eq!(q.params.len(), 3);
}

#[test]
fn where_params_preserve_condition_order() {
    let q = DeleteParams::new("t")
        .conditions(vec![
            Condition::eq("a", "first"),
            Condition::is_null("b"),
            Condition::ne("c", "second"),
            Condition::lte("d", 3),
        ])
        .build()
        .unwrap()
        .generate_query();
    assert_eq!(
        q.params,
        vec![
            Value::Text("first".into()),
            Value::Text("second".into()),
            Value::Int(3),
        ]
    );
}

#[test]
fn update_set_continues_after_where() {
    let q = UpdateParams::new("t_sys_users")
        .set("c_deletedby", 9)
        .set_if_present("c_email", Value::Null)
        .set("c_deleteddate", "2024-01-01T00:00:00Z")
        .condition(Condition::eq("c_userid", 3))
        .condition(Condition::is_null("c_deleteddate"))
        .condition(Condition::eq("c_isroot", false))
        .build()
        .unwrap()
        .generate_query();

    assert!(q.query.contains("SET c_deletedby = $3, c_deleteddate = $4 "));
    assert!(!q.query.contains("c_email"));
    assert_eq!(
        q.params,
        vec![
            Value::Int(3),
            Value::Bool(false),
            Value::Int(9),
            Value::Text("2024-01-01T00:00:00Z".into()),
        ]
    );
    assert_eq!(count_placeholders(&q.query), vec![3, 4, 1, 2]);
}

#[test]
fn partial_update_keeps_explicit_null() {
    let drop = UpdateParams::new("t")
        .set("a", 1)
        .set_if_present("b", Value::Null)
        .build()
        .unwrap()
        .generate_query();
    let keep = UpdateParams::new("t")
        .set("a", 1)
        .set("b", Value::Null)
        .build()
        .unwrap()
        .generate_query();

    assert!(!drop.query.contains("b = "));
    assert_eq!(drop.params.len(), 1);
    assert!(keep.query.contains("b = $2"));
    assert_eq!(keep.params, vec![Value::Int(1), Value::Null]);
}

#[test]
fn insert_arity() {
    assert!(
        InsertParams::new("t")
            .columns(["a", "b", "c"])
            .row(vec![Value::Int(1), Value::Int(2)])
            .build()
            .is_err()
    );

    let single = InsertParams::new("t")
        .columns(["a", "b", "c"])
        .row(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        .build()
        .unwrap()
        .generate_query();
    assert_eq!(single.query.matches('(').count(), 2);
    assert_eq!(single.params.len(), 3);

    let n = 4;
    let rows: Vec<Vec<Value>> = (0..n)
        .map(|i| vec![Value::Int(i), Value::Int(i + 10), Value::Int(i + 20)])
        .collect();
    let bulk = InsertParams::new("t")
        .columns(["a", "b", "c"])
        .rows(rows)
        .build()
        .unwrap()
        .generate_query();
    assert_eq!(bulk.params.len(), 3 * n as usize);
    assert_eq!(bulk.params[3], Value::Int(1));
    assert_eq!(
        count_placeholders(&bulk.query),
        (1..=12).collect::<Vec<_>>()
    );
}

#[test]
fn select_with_left_self_joins() {
    let q = SelectParams::new("t_sys_users")
        .column(Column::new("c_userid").alias("userId"))
        .column(
            Column::new("c_firstname")
                .from_table("t_sys_users1")
                .alias("createdByUsername"),
        )
        .join(Join::left("t_sys_users").alias("t_sys_users1").on(JoinOn::eq(
            "t_sys_users",
            "c_createdby",
            "t_sys_users1",
            "c_userid",
        )))
        .conditions(vec![Condition::is_null("c_deleteddate")])
        .order_by(Order::asc("userId"))
        .build()
        .unwrap()
        .generate_query();
    assert_eq!(
        q.query,
        "SELECT\nt_sys_users.c_userid as \"userId\", t_sys_users1.c_firstname as \"createdByUsername\"\n\
         FROM t_sys_users\nLEFT JOIN t_sys_users as t_sys_users1 ON t_sys_users.c_createdby = t_sys_users1.c_userid \n\
         WHERE t_sys_users.c_deleteddate IS NULL\nORDER BY \"userId\" ASC;"
    );
}

#[test]
fn generation_is_repeatable() {
    let q = SelectParams::new("t")
        .conditions(vec![Condition::eq("a", 1)])
        .build()
        .unwrap();
    assert_eq!(q.generate_query(), q.generate_query());
}

#[test]
fn prepared_params_ref_has_same_len() {
    let q = PreparedQuery::new("SELECT $1, $2", vec![Value::Int(1), Value::Null]);
    assert_eq!(q.params_ref().len(), 2);
}

#[test]
fn statement_kind_display() {
    assert_eq!(StatementKind::Update.to_string(), "UPDATE");
    let q = DeleteParams::new("t").build().unwrap();
    assert_eq!(q.kind(), StatementKind::Delete);
}
