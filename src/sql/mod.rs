//! Dialect lookup tables for SQL operators and functions.
//!
//! Both tables are immutable statics; a lookup that misses on the active dialect
//! surfaces as [`CqlError::UnsupportedByDatabase`](crate::CqlError::UnsupportedByDatabase).

pub mod function;
pub mod operator;

pub use function::{Function, FunctionForm};
pub use operator::SqlOperator;
