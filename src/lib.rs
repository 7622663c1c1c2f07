//! # cql
//!
//! Statically-typed SQL conditions and statements for Postgres, MySQL, SQLite and SQL Server.
//!
//! Models describe their table through [`Model`]; typed [`Field`] constants build where
//! conditions, joins through [`Relation`]s and preloads. Conditions are compiled by the
//! statement builders ([`Query`], [`Update`], [`Delete`], [`Insert`]) into SQL for the
//! [`Dialect`] of the [`Executor`] that runs them.
//!
//! ```ignore
//! use cql::{conditions, Query};
//!
//! let products = Query::<Product>::new(
//!     &executor,
//!     conditions![
//!         Product::INT.is().eq(1),
//!         Product::SELLER.join(conditions![Seller::NAME.is().eq("franco")]).preload(),
//!     ],
//! )
//! .descending(&Product::INT)
//! .find()?;
//! ```

#[macro_use]
mod macros;

pub mod condition;
pub mod config;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod model;
pub mod mysql;
pub mod preload;
pub mod psql;
pub mod query;
pub mod raw_sql;
pub mod row;
pub mod sql;
pub mod sqlite;
pub mod value;

#[cfg(test)]
mod test_support;

pub use condition::aggregation::{and_having, not_having, or_having, Aggregation, AggregationCondition};
pub use condition::field::{Field, FieldRef, IntoOperand, IntoValue, Operand, UnsafeOperand};
pub use condition::join::{JoinCondition, Relation};
pub use condition::preload::{Collection, Preload};
pub use condition::where_condition::{and, not, or, true_condition, WhereCondition};
pub use condition::Condition;
pub use config::DatabaseConfig;
pub use dialect::Dialect;
pub use error::{CqlError, ErrorContext};
pub use executor::{ExecError, Executor, MayPostgresExecutor};
pub use model::{Model, ModelId, UIntId};
pub use query::delete::Delete;
pub use query::group::{QueryGroup, ValueInto};
pub use query::insert::Insert;
pub use query::statement::Statement;
pub use query::update::{Assignment, Set, Update};
pub use query::Query;
pub use row::{Row, RowView};
pub use value::{TryGetable, ValueExtractionError, ValueType};
