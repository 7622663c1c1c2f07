//! Value conversion utilities for `sea_query` values to may_postgres.
//!
//! Every bound value is converted into an owned `ToSql` object first; the closure then
//! receives references into that storage, which stays alive for the closure's scope.
//! Nulls keep the Rust type of their variant so that Postgres can infer the parameter
//! type.

use crate::executor::ExecError;
use chrono::{DateTime, Utc};
use may_postgres::types::ToSql;
use rust_decimal::Decimal;
use sea_query::Value;
use uuid::Uuid;

/// Convert `sea_query` values to may_postgres `ToSql` parameters and run `f` with them.
///
/// # Errors
///
/// Returns `ExecError::Other` if a value has no Postgres mapping or does not fit the
/// signed column type it is bound to.
pub fn with_converted_params<F, R>(values: &[Value], f: F) -> Result<R, ExecError>
where
    F: FnOnce(&[&dyn ToSql]) -> Result<R, ExecError>,
{
    let owned = values
        .iter()
        .map(to_sql)
        .collect::<Result<Vec<Box<dyn ToSql>>, ExecError>>()?;

    let params: Vec<&dyn ToSql> = owned.iter().map(AsRef::as_ref).collect();

    f(&params)
}

fn to_sql(value: &Value) -> Result<Box<dyn ToSql>, ExecError> {
    let param: Box<dyn ToSql> = match value {
        Value::Bool(v) => Box::new(*v),
        Value::TinyInt(v) => Box::new(v.map(i16::from)),
        Value::SmallInt(v) => Box::new(*v),
        Value::Int(v) => Box::new(*v),
        Value::BigInt(v) => Box::new(*v),
        Value::TinyUnsigned(v) => Box::new(v.map(i16::from)),
        Value::SmallUnsigned(v) => Box::new(v.map(i32::from)),
        Value::Unsigned(v) => Box::new(v.map(i64::from)),
        Value::BigUnsigned(v) => {
            let v = v
                .map(|u| {
                    i64::try_from(u).map_err(|_| {
                        ExecError::Other(format!(
                            "BigUnsigned value {u} exceeds i64::MAX ({}), cannot be safely cast to i64",
                            i64::MAX
                        ))
                    })
                })
                .transpose()?;
            Box::new(v)
        }
        Value::Float(v) => Box::new(*v),
        Value::Double(v) => Box::new(*v),
        Value::String(v) => Box::new(v.as_ref().map(|s| String::clone(s))),
        Value::Bytes(v) => Box::new(v.as_ref().map(|b| Vec::<u8>::clone(b))),
        Value::Uuid(v) => Box::new(v.as_ref().map(|u| Uuid::clone(u))),
        Value::ChronoDateTimeUtc(v) => Box::new(v.as_ref().map(|d| DateTime::<Utc>::clone(d))),
        Value::Decimal(v) => Box::new(v.as_ref().map(|d| Decimal::clone(d))),
        Value::Json(v) => Box::new(v.as_ref().map(|j| serde_json::Value::clone(j))),
        other => {
            return Err(ExecError::Other(format!(
                "Unsupported value type in query: {other:?}"
            )));
        }
    };
    Ok(param)
}
