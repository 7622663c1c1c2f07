//! Model contract for entities compiled into statements
//!
//! A [`Model`] names its table, its columns and the optional timestamp columns the
//! compiler stamps or filters on. Identity is the primary key: [`ModelId`] values are
//! nil-checkable so that an empty (not loaded) object can be told apart from a real row.

use crate::error::CqlError;
use crate::row::RowView;
use crate::value::{TryGetable, ValueExtractionError, ValueType};
use sea_query::Value;
use std::any::TypeId;
use std::fmt;
use uuid::Uuid;

/// Identifier of a model
pub trait ModelId: Clone + fmt::Debug + PartialEq + TryGetable {
    /// True for the zero value, which marks an object that was never loaded
    fn is_nil(&self) -> bool;
}

impl ModelId for Uuid {
    fn is_nil(&self) -> bool {
        Uuid::is_nil(self)
    }
}

/// Auto-incremented unsigned identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UIntId(pub u64);

impl ModelId for UIntId {
    fn is_nil(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for UIntId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ValueType for UIntId {
    fn into_value(self) -> Value {
        // ids are stored in signed BIGINT columns
        match i64::try_from(self.0) {
            Ok(id) => Value::BigInt(Some(id)),
            Err(_) => Value::BigUnsigned(Some(self.0)),
        }
    }

    fn from_value(value: Value) -> Option<Self> {
        u64::from_value(value.clone())
            .or_else(|| i64::from_value(value).and_then(|v| u64::try_from(v).ok()))
            .map(UIntId)
    }

    fn null_value() -> Value {
        Value::BigInt(None)
    }
}

impl TryGetable for UIntId {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        u64::try_get(value).map(UIntId)
    }
}

/// An entity type mapped to a relational table.
///
/// # Example
///
/// ```no_run
/// use cql::{CqlError, Model, RowView, UIntId};
/// use sea_query::Value;
///
/// struct Country {
///     id: UIntId,
///     name: String,
/// }
///
/// impl Model for Country {
///     const TABLE_NAME: &'static str = "countries";
///     const COLUMNS: &'static [&'static str] = &["id", "name"];
///     type Id = UIntId;
///
///     fn id(&self) -> &UIntId {
///         &self.id
///     }
///
///     fn from_row(row: &RowView<'_>) -> Result<Self, CqlError> {
///         Ok(Self { id: row.get("id")?, name: row.get("name")? })
///     }
///
///     fn insert_values(&self) -> Vec<(&'static str, Value)> {
///         vec![("name", self.name.clone().into())]
///     }
/// }
/// ```
pub trait Model: Sized + 'static {
    const TABLE_NAME: &'static str;
    /// Every column of the table, used by attribute preloads
    const COLUMNS: &'static [&'static str];

    type Id: ModelId;

    fn id(&self) -> &Self::Id;

    /// False for objects built from a null (not joined) row
    fn is_loaded(&self) -> bool {
        !self.id().is_nil()
    }

    fn primary_key_column() -> &'static str {
        "id"
    }

    /// Column marking a row as deleted; empty for models without soft delete
    fn soft_delete_column_name() -> &'static str {
        ""
    }

    /// Column stamped on every update; empty when the model has none
    fn updated_at_column_name() -> &'static str {
        ""
    }

    /// Column left untouched by upserts that update every column
    fn created_at_column_name() -> &'static str {
        ""
    }

    /// Build the model from a row, reading its columns through `row`.
    ///
    /// # Errors
    ///
    /// Returns `CqlError::Parse` if a column is missing or has an unexpected type.
    fn from_row(row: &RowView<'_>) -> Result<Self, CqlError>;

    /// Columns and values written by an insert, in column order
    fn insert_values(&self) -> Vec<(&'static str, Value)>;
}

/// Type-erased description of a [`Model`], carried by tables and fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelRef {
    pub type_id: TypeId,
    pub name: &'static str,
    pub table_name: &'static str,
    pub columns: &'static [&'static str],
    pub primary_key: &'static str,
    pub soft_delete: &'static str,
    pub updated_at: &'static str,
    pub created_at: &'static str,
}

impl ModelRef {
    pub fn of<M: Model>() -> Self {
        let full_name = std::any::type_name::<M>();
        Self {
            type_id: TypeId::of::<M>(),
            name: full_name.rsplit("::").next().unwrap_or(full_name),
            table_name: M::TABLE_NAME,
            columns: M::COLUMNS,
            primary_key: M::primary_key_column(),
            soft_delete: M::soft_delete_column_name(),
            updated_at: M::updated_at_column_name(),
            created_at: M::created_at_column_name(),
        }
    }

    pub fn has_soft_delete(&self) -> bool {
        !self.soft_delete.is_empty()
    }
}
