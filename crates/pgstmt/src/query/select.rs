//! SELECT statement generator.

use crate::condition::ConditionGroup;
use crate::error::OrmResult;
use crate::ident::{check_ident, write_quoted};
use crate::query::clause::{check_group, compile_joins, compile_where};
use crate::query::parts::{Column, Join, Order};
use crate::query::{PreparedQuery, Statement, StatementKind};

/// Parameters of a SELECT statement.
#[derive(Debug, Clone, Default)]
pub struct SelectParams {
    pub table: String,
    /// Empty selects `*`
    pub columns: Vec<Column>,
    pub conditions: Option<ConditionGroup>,
    pub joins: Vec<Join>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub orders: Vec<Order>,
}

impl SelectParams {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn columns(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.columns.extend(columns);
        self
    }

    pub fn conditions(mut self, conditions: impl Into<ConditionGroup>) -> Self {
        self.conditions = Some(conditions.into());
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    pub fn order_by(mut self, order: Order) -> Self {
        self.orders.push(order);
        self
    }

    /// Construct the generator.
    pub fn build(self) -> OrmResult<SelectQuery> {
        SelectQuery::new(self)
    }
}

/// A selected column with its table and output alias resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Projection {
    expr: String,
    alias: String,
}

impl Projection {
    fn resolve(column: &Column, primary_table: &str) -> Self {
        let table = column.table.as_deref().unwrap_or(primary_table);

        let mut expr = String::new();
        for agg in &column.aggregates {
            expr.push_str(agg.as_sql());
            expr.push('(');
        }
        expr.push_str(table);
        expr.push('.');
        expr.push_str(&column.name);
        for _ in &column.aggregates {
            expr.push(')');
        }

        let alias = match &column.alias {
            Some(alias) => alias.clone(),
            None => {
                let mut alias = format!("{}.{}", table, column.name);
                for agg in &column.aggregates {
                    alias.push('.');
                    alias.push_str(agg.as_sql());
                }
                alias
            }
        };

        Self { expr, alias }
    }
}

/// SELECT generator.
///
/// ```text
/// SELECT
/// <cols>
/// FROM <table><joins> <where><order by><limit><offset>;
/// ```
#[derive(Debug, Clone)]
pub struct SelectQuery {
    table: String,
    projections: Vec<Projection>,
    conditions: Option<ConditionGroup>,
    joins: Vec<Join>,
    limit: Option<u64>,
    offset: Option<u64>,
    orders: Vec<Order>,
}

impl SelectQuery {
    /// Validate identifiers and resolve column tables and aliases.
    pub fn new(params: SelectParams) -> OrmResult<Self> {
        check_ident("table", &params.table)?;
        for column in &params.columns {
            check_ident("column", &column.name)?;
            if let Some(table) = &column.table {
                check_ident("table", table)?;
            }
        }
        check_group(params.conditions.as_ref())?;
        for join in &params.joins {
            join.check()?;
        }

        let projections = params
            .columns
            .iter()
            .map(|c| Projection::resolve(c, &params.table))
            .collect();

        Ok(Self {
            table: params.table,
            projections,
            conditions: params.conditions,
            joins: params.joins,
            limit: params.limit,
            offset: params.offset,
            orders: params.orders,
        })
    }

    /// Output aliases in select-list order.
    pub fn output_aliases(&self) -> impl Iterator<Item = &str> {
        self.projections.iter().map(|p| p.alias.as_str())
    }

    fn select_list(&self) -> String {
        if self.projections.is_empty() {
            return "*".to_string();
        }
        let mut out = String::new();
        for (i, p) in self.projections.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&p.expr);
            out.push_str(" as ");
            write_quoted(&mut out, &p.alias);
        }
        out
    }

    fn order_clause(&self) -> String {
        if self.orders.is_empty() {
            return String::new();
        }
        let mut out = String::from("\nORDER BY ");
        for (i, order) in self.orders.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            write_quoted(&mut out, &order.column);
            out.push(' ');
            out.push_str(order.direction.as_sql());
        }
        out
    }
}

impl Statement for SelectQuery {
    fn kind(&self) -> StatementKind {
        StatementKind::Select
    }

    fn generate_query(&self) -> PreparedQuery {
        let where_clause = compile_where(self.conditions.as_ref(), &self.table);

        let limit = self
            .limit
            .map(|n| format!("\nLIMIT {n}"))
            .unwrap_or_default();
        let offset = self
            .offset
            .map(|n| format!("\nOFFSET {n}"))
            .unwrap_or_default();

        let query = format!(
            "SELECT\n{}\nFROM {}{} {}{}{}{};",
            self.select_list(),
            self.table,
            compile_joins(&self.joins),
            where_clause.sql,
            self.order_clause(),
            limit,
            offset
        );

        PreparedQuery::new(query, where_clause.params)
    }
}
