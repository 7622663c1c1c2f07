//! Result rows decoded from the driver.
//!
//! A [`Row`] keeps columns in select order. Models read it through a [`RowView`], which
//! scopes every lookup to a column prefix: the root model reads bare column names,
//! a preloaded relation reads `"<alias>__<column>"`.

use crate::error::CqlError;
use crate::model::Model;
use crate::value::TryGetable;
use sea_query::Value;

/// One result row, as ordered `(column name, value)` pairs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column; builder style, used by executors and tests
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.columns.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    /// Value at a select position
    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.columns.get(index).map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// View for hydrating the statement's root model
    pub fn view(&self) -> RowView<'_> {
        RowView {
            row: self,
            prefix: String::new(),
        }
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

/// A [`Row`] seen through a column prefix
#[derive(Debug, Clone)]
pub struct RowView<'a> {
    row: &'a Row,
    prefix: String,
}

impl<'a> RowView<'a> {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn value(&self, column: &str) -> Result<Value, CqlError> {
        let name = format!("{}{column}", self.prefix);
        self.row
            .get(&name)
            .cloned()
            .ok_or_else(|| CqlError::Parse(format!("column not found in row: {name}")))
    }

    /// Read a non-null column.
    ///
    /// # Errors
    ///
    /// Returns `CqlError::Parse` if the column is missing, null or of another type.
    pub fn get<T: TryGetable>(&self, column: &str) -> Result<T, CqlError> {
        T::try_get(self.value(column)?)
            .map_err(|e| CqlError::Parse(format!("column {}{column}: {e}", self.prefix)))
    }

    /// Read a nullable column.
    ///
    /// # Errors
    ///
    /// Returns `CqlError::Parse` if the column is missing or of another type.
    pub fn get_opt<T: TryGetable>(&self, column: &str) -> Result<Option<T>, CqlError> {
        T::try_get_opt(self.value(column)?)
            .map_err(|e| CqlError::Parse(format!("column {}{column}: {e}", self.prefix)))
    }

    /// View over the columns preloaded for `relation` below this view
    pub fn relation(&self, relation: &str) -> RowView<'a> {
        RowView {
            row: self.row,
            prefix: format!("{}{relation}__", self.prefix),
        }
    }

    /// Hydrate a preloaded relation.
    ///
    /// Returns `Ok(None)` when the relation was not preloaded (no column carries its
    /// prefix) or when the join found no row (null primary key).
    ///
    /// # Errors
    ///
    /// Returns the hydration error of `T` when the relation's columns are present.
    pub fn preloaded<T: Model>(&self, relation: &str) -> Result<Option<T>, CqlError> {
        let view = self.relation(relation);

        let primary_key = format!("{}{}", view.prefix, T::primary_key_column());
        match self.row.get(&primary_key) {
            None => Ok(None),
            Some(value) if is_null(value) => Ok(None),
            Some(_) => T::from_row(&view).map(Some),
        }
    }
}

fn is_null(value: &Value) -> bool {
    matches!(
        value,
        Value::Bool(None)
            | Value::TinyInt(None)
            | Value::SmallInt(None)
            | Value::Int(None)
            | Value::BigInt(None)
            | Value::TinyUnsigned(None)
            | Value::SmallUnsigned(None)
            | Value::Unsigned(None)
            | Value::BigUnsigned(None)
            | Value::Float(None)
            | Value::Double(None)
            | Value::String(None)
            | Value::Bytes(None)
            | Value::Uuid(None)
            | Value::Json(None)
            | Value::ChronoDateTimeUtc(None)
            | Value::Decimal(None)
    )
}
