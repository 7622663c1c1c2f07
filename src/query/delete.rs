//! DELETE statements.
//!
//! Models with a soft-delete column are deleted by stamping that column (an UPDATE);
//! the others are removed with a dialect-specific multi-table DELETE.

use super::statement::{recorded, StatementKind};
use super::update::{returning_sql, update_sql, Assignment};
use super::{execute, mysql_limit, mysql_order};
use crate::condition::context::QueryContext;
use crate::condition::field::{FieldRef, Operand};
use crate::condition::Condition;
use crate::dialect::Dialect;
use crate::error::CqlError;
use crate::executor::Executor;
use crate::model::Model;
use chrono::Utc;
use sea_query::Value;

/// Delete statement over model `M`
pub struct Delete<'a, M> {
    executor: &'a dyn Executor,
    context: QueryContext,
    error: Option<CqlError>,
    returning: Option<&'a mut Vec<M>>,
}

impl<'a, M: Model> Delete<'a, M> {
    /// At least one condition is required.
    pub fn new(executor: &'a dyn Executor, conditions: Vec<Condition<M>>) -> Self {
        let mut context = QueryContext::new::<M>(executor.dialect());

        let error = if conditions.is_empty() {
            Some(
                CqlError::EmptyConditions {
                    connector: "",
                    model: String::new(),
                }
                .with_method("Delete"),
            )
        } else {
            context.apply(&conditions).err()
        };

        Self {
            executor,
            context,
            error,
            returning: None,
        }
    }

    fn record(&mut self, result: Result<(), CqlError>) {
        if let (None, Err(err)) = (&self.error, result) {
            self.error = Some(err);
        }
    }

    /// Available for: mysql
    pub fn ascending(mut self, field: impl Into<FieldRef>) -> Self {
        let result = mysql_order(&mut self.context, &field.into(), false, "Ascending");
        self.record(result);
        self
    }

    /// Available for: mysql
    pub fn descending(mut self, field: impl Into<FieldRef>) -> Self {
        let result = mysql_order(&mut self.context, &field.into(), true, "Descending");
        self.record(result);
        self
    }

    /// Available for: mysql, after an order
    pub fn limit(mut self, limit: u64) -> Self {
        let result = mysql_limit(&mut self.context, limit);
        self.record(result);
        self
    }

    /// Push the deleted rows into `results`; preloads are not allowed.
    ///
    /// Not available for: mysql
    pub fn returning(mut self, results: &'a mut Vec<M>) -> Self {
        let preloads = self.context.selects.sql.len() > 1 || !self.context.collection_loads.is_empty();

        if self.context.dialect == Dialect::MySQL {
            self.record(Err(CqlError::unsupported(Dialect::MySQL).with_method("Returning")));
        } else if preloads {
            self.record(Err(CqlError::PreloadsInDeleteReturningNotAllowed.with_method("Returning")));
        } else {
            self.returning = Some(results);
        }
        self
    }

    /// Delete the rows, returning how many were deleted
    pub fn exec(self) -> Result<u64, CqlError> {
        if let Some(err) = self.error {
            return Err(recorded(err, "Delete"));
        }

        let returning = self.returning.is_some();
        let root = self.context.root.model;

        let (sql, values) = if root.has_soft_delete() {
            // the root table is always the model's first appearance
            let mut field = FieldRef::column::<M>(M::soft_delete_column_name());
            field.appearance = Some(0);
            let deleted_at = Assignment::new(field, Operand::Value(Value::from(Utc::now())));
            update_sql(&self.context, &[deleted_at], false, returning)
        } else {
            delete_sql(&self.context, returning)
        }
        .map_err(|e| recorded(e.with_method("Delete"), "Delete"))?;

        let kind = if root.has_soft_delete() {
            StatementKind::Update
        } else {
            StatementKind::Delete
        };

        execute(self.executor, kind, &sql, values, self.returning, &[])
    }
}

/// Hard delete of the rows selected by `context`
fn delete_sql(context: &QueryContext, returning: bool) -> Result<(String, Vec<Value>), CqlError> {
    if context.wheres.is_empty() && context.joins.is_empty() {
        return Err(CqlError::MissingWhereConditions);
    }

    let root = &context.root;
    let mut values = Vec::new();

    let mut sql = match context.dialect {
        Dialect::Postgres => {
            let mut sql = format!("DELETE FROM {}", root.name);
            if !context.joins.is_empty() {
                let tables: Vec<String> = context.joins.iter().map(|join| join.table_sql()).collect();
                sql.push_str(" USING ");
                sql.push_str(&tables.join(", "));
            }

            let mut wheres = Vec::new();
            for join in &context.joins {
                wheres.push(join.on.clone());
                values.extend(join.values.iter().cloned());
            }
            wheres.extend(context.wheres.sql.iter().cloned());
            values.extend(context.wheres.values.iter().cloned());
            sql.push_str(" WHERE ");
            sql.push_str(&wheres.join(" AND "));
            sql
        }
        Dialect::MySQL if context.joins.is_empty() => {
            let (from, from_values) = context.from_sql();
            values.extend(from_values);
            let mut sql = format!("DELETE{from}");
            sql.push_str(&context.order_sql());
            values.extend(context.order_by.values.iter().cloned());
            if let Some(limit) = context.limit {
                sql.push_str(&format!(" LIMIT {limit}"));
            }
            sql
        }
        Dialect::MySQL => {
            if context.limit.is_some() || !context.order_by.is_empty() {
                return Err(CqlError::UnsupportedByDatabase {
                    dialect: Dialect::MySQL,
                    detail: Some("order and limit are not allowed in a multi-table delete".to_string()),
                });
            }
            let (from, from_values) = context.from_sql();
            values.extend(from_values);
            format!("DELETE {}{from}", root.name)
        }
        Dialect::SQLServer => {
            let output = if returning { " OUTPUT DELETED.*" } else { "" };
            let (from, from_values) = context.from_sql();
            values.extend(from_values);
            format!("DELETE {}{output}{from}", root.name)
        }
        Dialect::SQLite if context.joins.is_empty() => {
            let (from, from_values) = context.from_sql();
            values.extend(from_values);
            format!("DELETE{from}")
        }
        Dialect::SQLite => {
            let primary_key = root.column(root.model.primary_key);
            let (from, from_values) = context.from_sql();
            values.extend(from_values);
            format!(
                "DELETE FROM {} WHERE {primary_key} IN (SELECT {primary_key}{from})",
                root.name
            )
        }
    };

    if returning {
        sql.push_str(&returning_sql(context)?);
    }

    Ok((sql, values))
}
