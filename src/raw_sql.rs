//! Raw SQL helpers.
//!
//! [`condition`] embeds a raw fragment in a condition tree. The statement helpers run
//! hand-written SQL through an [`Executor`], with the same logging, tracing and metrics
//! as compiled statements; their `sql` uses `?` placeholders, numbered for the
//! executor's dialect.

use crate::condition::field::Operand;
use crate::condition::where_condition::WhereCondition;
use crate::error::CqlError;
use crate::executor::Executor;
use crate::model::Model;
use crate::query::statement::{Statement, StatementKind};
use crate::row::Row;
use crate::value::TryGetable;
use sea_query::Value;

/// Raw condition over `M`.
///
/// `%s` is replaced by the name (or alias) of the table the condition is applied to,
/// and each `?` binds the next operand; field operands render their column instead.
/// Raw conditions never change the soft-delete scope of the statement.
///
/// # Examples
///
/// ```ignore
/// let products = Query::<Product>::new(
///     executor,
///     conditions![raw_sql::condition::<Product>("%s.int = ? OR %s.int = ?", vec![1.into_unsafe_operand(), 2.into_unsafe_operand()])],
/// )
/// .find()?;
/// ```
pub fn condition<M: Model>(sql: &str, values: Vec<Operand>) -> WhereCondition<M> {
    WhereCondition::raw(sql, values)
}

/// Execute a statement, returning the number of rows affected.
///
/// # Errors
///
/// Returns `CqlError::Database` if the SQL execution fails.
pub fn execute_statement(executor: &dyn Executor, sql: &str, values: Vec<Value>) -> Result<u64, CqlError> {
    Statement::new(executor, StatementKind::Raw, sql, values).execute(executor)
}

/// Query every row returned by a statement.
///
/// # Errors
///
/// Returns `CqlError::Database` if the query execution fails.
pub fn find_all_by_statement(executor: &dyn Executor, sql: &str, values: Vec<Value>) -> Result<Vec<Row>, CqlError> {
    Statement::new(executor, StatementKind::Raw, sql, values).query(executor)
}

/// Query the first column of the only row returned by a statement.
///
/// # Errors
///
/// Returns `CqlError` if:
/// - The query execution fails
/// - No rows are returned (`ObjectNotFound`)
/// - Multiple rows are returned (`MoreThanOneObjectFound`)
/// - The value cannot be converted to `T`
pub fn query_value<T: TryGetable>(executor: &dyn Executor, sql: &str, values: Vec<Value>) -> Result<T, CqlError> {
    let rows = find_all_by_statement(executor, sql, values)?;
    let row = match rows.as_slice() {
        [] => return Err(CqlError::ObjectNotFound),
        [row] => row,
        _ => return Err(CqlError::MoreThanOneObjectFound),
    };

    let value = row
        .value_at(0)
        .cloned()
        .ok_or_else(|| CqlError::Parse("statement returned no columns".to_string()))?;
    Ok(T::try_get(value)?)
}
