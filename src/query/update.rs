//! UPDATE statements.
//!
//! Updates filter rows with the same condition tree as selects. Joined models are
//! moved to a `FROM` list (their ON conditions become part of the WHERE clause), except
//! on MySQL, which updates through the joins and can write the joined tables too.

use super::statement::{recorded, StatementKind};
use super::{execute, mysql_limit, mysql_order};
use crate::condition::context::QueryContext;
use crate::condition::field::{Field, FieldRef, IntoValue, Operand, UnsafeOperand};
use crate::condition::table::Table;
use crate::condition::Condition;
use crate::dialect::Dialect;
use crate::error::CqlError;
use crate::executor::Executor;
use crate::model::Model;
use crate::value::ValueType;
use chrono::Utc;
use sea_query::Value;
use std::marker::PhantomData;

/// One `column = value` pair of an update
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub(crate) field: FieldRef,
    pub(crate) operand: Operand,
}

impl Assignment {
    pub(crate) fn new(field: FieldRef, operand: Operand) -> Self {
        Self { field, operand }
    }

    pub(crate) fn value_sql(&self, context: &QueryContext) -> Result<(String, Vec<Value>), CqlError> {
        match &self.operand {
            Operand::Value(value) => Ok(("?".to_string(), vec![value.clone()])),
            Operand::List(values) => Ok((
                format!("({})", vec!["?"; values.len()].join(", ")),
                values.clone(),
            )),
            Operand::Field(field) => context.field_sql(field),
        }
    }
}

/// Assignment to a field of model `M`
#[derive(Debug, Clone)]
pub struct Set<M> {
    assignment: Assignment,
    _model: PhantomData<fn() -> M>,
}

impl<M> Set<M> {
    fn new(field: FieldRef, operand: Operand) -> Self {
        Self {
            assignment: Assignment::new(field, operand),
            _model: PhantomData,
        }
    }
}

impl<M> From<Set<M>> for Assignment {
    fn from(set: Set<M>) -> Self {
        set.assignment
    }
}

/// Builder of the value a field is set to
pub struct FieldSet<M, A> {
    field: Field<M, A>,
}

impl<M: Model, A> Field<M, A> {
    pub fn set(&self) -> FieldSet<M, A> {
        FieldSet { field: self.clone() }
    }
}

impl<M: Model, A> FieldSet<M, A> {
    pub fn eq(self, value: impl IntoValue<A>) -> Set<M> {
        Set::new(self.field.to_ref(), Operand::Value(value.into_value_of()))
    }

    /// Set the field to the value of another field of the same type
    pub fn dynamic<M2: Model>(self, field: &Field<M2, A>) -> Set<M> {
        Set::new(self.field.to_ref(), Operand::Field(field.to_ref()))
    }

    /// Set the field to any value or field, without checking its type
    pub fn unsafe_value(self, value: impl UnsafeOperand) -> Set<M> {
        Set::new(self.field.to_ref(), value.into_unsafe_operand())
    }
}

impl<M: Model, T: ValueType> FieldSet<M, Option<T>> {
    pub fn null(self) -> Set<M> {
        Set::new(self.field.to_ref(), Operand::Value(T::null_value()))
    }
}

/// Update statement over model `M`, executed by [`Update::set`] or [`Update::set_multiple`]
pub struct Update<'a, M> {
    executor: &'a dyn Executor,
    context: QueryContext,
    error: Option<CqlError>,
    returning: Option<&'a mut Vec<M>>,
}

impl<'a, M: Model> Update<'a, M> {
    pub fn new(executor: &'a dyn Executor, conditions: Vec<Condition<M>>) -> Self {
        let mut context = QueryContext::new::<M>(executor.dialect());
        let error = context.apply(&conditions).err();

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

    /// Push the updated rows into `results`.
    ///
    /// Postgres also returns the preloaded relations; sqlite and sqlserver only return
    /// the root model. Not available for: mysql
    pub fn returning(mut self, results: &'a mut Vec<M>) -> Self {
        if self.context.dialect == Dialect::MySQL {
            self.record(Err(CqlError::unsupported(Dialect::MySQL).with_method("Returning")));
        } else {
            self.returning = Some(results);
        }
        self
    }

    /// Update fields of the root model, returning the number of updated rows
    pub fn set(self, sets: Vec<Set<M>>) -> Result<u64, CqlError> {
        let assignments = sets.into_iter().map(Assignment::from).collect();
        self.exec(assignments, "Set")
    }

    /// Update fields of the root model and of joined models.
    ///
    /// Available for: mysql
    pub fn set_multiple(self, sets: Vec<Assignment>) -> Result<u64, CqlError> {
        if self.context.dialect != Dialect::MySQL && self.error.is_none() {
            return Err(recorded(
                CqlError::unsupported(self.context.dialect).with_method("SetMultiple"),
                "SetMultiple",
            ));
        }
        self.exec(sets, "SetMultiple")
    }

    fn exec(self, assignments: Vec<Assignment>, method: &'static str) -> Result<u64, CqlError> {
        if let Some(err) = self.error {
            return Err(recorded(err, method));
        }

        let (sql, values) = update_sql(&self.context, &assignments, true, self.returning.is_some())
            .map_err(|e| recorded(e.with_method(method), method))?;

        execute(
            self.executor,
            StatementKind::Update,
            &sql,
            values,
            self.returning,
            &self.context.collection_loads,
        )
    }
}

/// Compile an update of `assignments` over the rows selected by `context`.
///
/// `stamp_updated_at` adds the updated tables' `updated_at` column (when the model has
/// one and it is not already set); `returning` asks for the updated rows back.
pub(crate) fn update_sql(
    context: &QueryContext,
    assignments: &[Assignment],
    stamp_updated_at: bool,
    returning: bool,
) -> Result<(String, Vec<Value>), CqlError> {
    if assignments.is_empty() {
        return Err(CqlError::EmptyConditions {
            connector: "",
            model: context.root.model.name.to_string(),
        });
    }
    check_repeated(assignments)?;
    if context.wheres.is_empty() && context.joins.is_empty() {
        return Err(CqlError::MissingWhereConditions);
    }

    match context.dialect {
        Dialect::MySQL => mysql_update_sql(context, assignments, stamp_updated_at),
        Dialect::Postgres | Dialect::SQLite | Dialect::SQLServer => {
            from_update_sql(context, assignments, stamp_updated_at, returning)
        }
    }
}

fn check_repeated(assignments: &[Assignment]) -> Result<(), CqlError> {
    for (index, assignment) in assignments.iter().enumerate() {
        let field = &assignment.field;
        let repeated = assignments[index + 1..]
            .iter()
            .any(|other| other.field.same_column(field) && other.field.appearance == field.appearance);
        if repeated {
            return Err(CqlError::FieldIsRepeated {
                model: field.model.name.to_string(),
                field: field.name.to_string(),
            });
        }
    }
    Ok(())
}

/// `UPDATE root SET ... [FROM joined] WHERE ...`; sets only write the root table
fn from_update_sql(
    context: &QueryContext,
    assignments: &[Assignment],
    stamp_updated_at: bool,
    returning: bool,
) -> Result<(String, Vec<Value>), CqlError> {
    let root = &context.root;
    let mut sets = Vec::with_capacity(assignments.len() + 1);
    let mut values = Vec::new();

    for assignment in assignments {
        let (value_sql, value_values) = assignment.value_sql(context)?;
        sets.push(format!("{} = {value_sql}", assignment.field.column_name()));
        values.extend(value_values);
    }

    let updated_at = root.model.updated_at;
    if stamp_updated_at
        && !updated_at.is_empty()
        && !assignments.iter().any(|a| a.field.column_name() == updated_at)
    {
        sets.push(format!("{updated_at} = ?"));
        values.push(Value::from(Utc::now()));
    }

    let mut sql = format!("UPDATE {} SET {}", root.name, sets.join(", "));

    if returning && context.dialect == Dialect::SQLServer {
        sql.push_str(" OUTPUT INSERTED.*");
    }

    if !context.joins.is_empty() {
        let tables: Vec<String> = context.joins.iter().map(|join| join.table_sql()).collect();
        sql.push_str(" FROM ");
        sql.push_str(&tables.join(", "));
    }

    let mut wheres = context.wheres.sql.clone();
    values.extend(context.wheres.values.iter().cloned());
    for join in &context.joins {
        wheres.push(join.on.clone());
        values.extend(join.values.iter().cloned());
    }
    if let Some(filter) = context.root_soft_delete_filter() {
        wheres.push(filter);
    }
    sql.push_str(" WHERE ");
    sql.push_str(&wheres.join(" AND "));

    if returning {
        sql.push_str(&returning_sql(context)?);
        values.extend(context.selects.values.iter().cloned());
    }

    Ok((sql, values))
}

/// `RETURNING` clause of an update or delete; empty for sqlserver, which uses `OUTPUT`
pub(crate) fn returning_sql(context: &QueryContext) -> Result<String, CqlError> {
    match context.dialect {
        Dialect::Postgres => Ok(format!(" RETURNING {}", context.selects.sql.join(", "))),
        Dialect::SQLite | Dialect::SQLServer if context.selects.sql.len() > 1 => {
            Err(CqlError::UnsupportedByDatabase {
                dialect: context.dialect,
                detail: Some(format!(
                    "preloads in returning are not allowed for database: {}",
                    context.dialect
                )),
            })
        }
        Dialect::SQLite => Ok(" RETURNING *".to_string()),
        Dialect::SQLServer => Ok(String::new()),
        Dialect::MySQL => Err(CqlError::unsupported(Dialect::MySQL)),
    }
}

/// `UPDATE root JOIN ... SET table.column = ... WHERE ... [ORDER BY ...] [LIMIT n]`
fn mysql_update_sql(
    context: &QueryContext,
    assignments: &[Assignment],
    stamp_updated_at: bool,
) -> Result<(String, Vec<Value>), CqlError> {
    let mut sql = format!("UPDATE {}", context.root.name);
    let mut values = Vec::new();

    for join in &context.joins {
        sql.push(' ');
        sql.push_str(&join.to_string());
        values.extend(join.values.iter().cloned());
    }

    let mut sets = Vec::with_capacity(assignments.len() + 1);
    let mut updated_tables: Vec<Table> = Vec::new();
    for assignment in assignments {
        let table = context
            .registry
            .resolve(&assignment.field.model, assignment.field.appearance)?;
        let (value_sql, value_values) = assignment.value_sql(context)?;
        sets.push(format!(
            "{} = {value_sql}",
            table.column(&assignment.field.column_name())
        ));
        values.extend(value_values);

        if !updated_tables.iter().any(|t| t.alias == table.alias) {
            updated_tables.push(table);
        }
    }

    if stamp_updated_at {
        for table in &updated_tables {
            let updated_at = table.model.updated_at;
            let already_set = assignments.iter().any(|a| {
                a.field.model.type_id == table.model.type_id && a.field.column_name() == updated_at
            });
            if !updated_at.is_empty() && !already_set {
                sets.push(format!("{} = ?", table.column(updated_at)));
                values.push(Value::from(Utc::now()));
            }
        }
    }

    sql.push_str(" SET ");
    sql.push_str(&sets.join(", "));

    let wheres = context.where_clause();
    if !wheres.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&wheres.sql.join(" AND "));
        values.extend(wheres.values);
    }

    sql.push_str(&context.order_sql());
    values.extend(context.order_by.values.iter().cloned());
    if let Some(limit) = context.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    Ok((sql, values))
}
