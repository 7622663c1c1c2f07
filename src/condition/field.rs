//! Field identifiers.
//!
//! A [`Field`] names one attribute of a model and carries the attribute type, so that
//! operators, sets and aggregations only accept values of that type. Fields are
//! declared once as associated constants of the model:
//!
//! ```
//! use cql::{Field, UIntId};
//! # use cql::{CqlError, Model, RowView};
//! # use sea_query::Value;
//! # pub struct Brand { id: UIntId, name: String }
//! # impl Model for Brand {
//! #     const TABLE_NAME: &'static str = "brands";
//! #     const COLUMNS: &'static [&'static str] = &["id", "name"];
//! #     type Id = UIntId;
//! #     fn id(&self) -> &UIntId { &self.id }
//! #     fn from_row(row: &RowView<'_>) -> Result<Self, CqlError> {
//! #         Ok(Self { id: row.get("id")?, name: row.get("name")? })
//! #     }
//! #     fn insert_values(&self) -> Vec<(&'static str, Value)> { vec![] }
//! # }
//!
//! impl Brand {
//!     pub const ID: Field<Brand, UIntId> = Field::new("ID", None, None);
//!     pub const NAME: Field<Brand, String> = Field::new("Name", None, None);
//! }
//!
//! assert_eq!(Brand::NAME.column_name(), "name");
//! ```
//!
//! Numeric and text fields can be transformed with SQL functions (`plus`, `concat`, ...)
//! before being compared; the result is still a field of the same attribute type.

use crate::condition::table::Table;
use crate::dialect::Dialect;
use crate::error::CqlError;
use crate::model::{Model, ModelRef};
use crate::sql::function::{self, Function};
use crate::value::{Numeric, Text, ValueType};
use sea_query::Value;
use std::fmt;
use std::marker::PhantomData;

/// A function applied to a field's column, with the values it binds
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub function: &'static Function,
    pub values: Vec<Value>,
}

/// Field of model `M` holding attribute values of type `A`
pub struct Field<M, A> {
    name: &'static str,
    column: Option<&'static str>,
    column_prefix: Option<&'static str>,
    appearance: Option<usize>,
    functions: Vec<FunctionCall>,
    _marker: PhantomData<fn() -> (M, A)>,
}

impl<M, A> Clone for Field<M, A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            column: self.column,
            column_prefix: self.column_prefix,
            appearance: self.appearance,
            functions: self.functions.clone(),
            _marker: PhantomData,
        }
    }
}

impl<M, A> fmt::Debug for Field<M, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("column", &self.column_name())
            .field("appearance", &self.appearance)
            .finish()
    }
}

impl<M, A> Field<M, A> {
    /// `column` overrides the column derived from `name`; `column_prefix` is prepended
    /// to it (embedded structs).
    pub const fn new(
        name: &'static str,
        column: Option<&'static str>,
        column_prefix: Option<&'static str>,
    ) -> Self {
        Self {
            name,
            column,
            column_prefix,
            appearance: None,
            functions: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn column_name(&self) -> String {
        column_name(self.name, self.column, self.column_prefix)
    }

    /// Select which occurrence of the model this field refers to, when the model is
    /// joined more than once (0 is the first join)
    pub fn appearance(&self, appearance: usize) -> Self {
        let mut field = self.clone();
        field.appearance = Some(appearance);
        field
    }

    fn with_function(&self, function: &'static Function, values: Vec<Value>) -> Self {
        let mut field = self.clone();
        field.functions.push(FunctionCall { function, values });
        field
    }
}

impl<M: Model, A> Field<M, A> {
    /// Type-erased form of the field
    pub fn to_ref(&self) -> FieldRef {
        FieldRef {
            model: ModelRef::of::<M>(),
            name: self.name,
            column: self.column,
            column_prefix: self.column_prefix,
            appearance: self.appearance,
            functions: self.functions.clone(),
        }
    }
}

impl<M, A: Numeric> Field<M, A> {
    pub fn plus(&self, other: A::Operand) -> Self {
        self.with_function(&function::PLUS, vec![other.into_value()])
    }

    pub fn minus(&self, other: A::Operand) -> Self {
        self.with_function(&function::MINUS, vec![other.into_value()])
    }

    pub fn times(&self, other: A::Operand) -> Self {
        self.with_function(&function::TIMES, vec![other.into_value()])
    }

    pub fn divided(&self, other: A::Operand) -> Self {
        self.with_function(&function::DIVIDED, vec![other.into_value()])
    }

    pub fn modulo(&self, other: A::Operand) -> Self {
        self.with_function(&function::MODULO, vec![other.into_value()])
    }

    pub fn power(&self, other: A::Operand) -> Self {
        self.with_function(&function::POWER, vec![other.into_value()])
    }

    pub fn square_root(&self) -> Self {
        self.with_function(&function::SQUARE_ROOT, Vec::new())
    }

    pub fn absolute(&self) -> Self {
        self.with_function(&function::ABSOLUTE, Vec::new())
    }

    pub fn bit_and(&self, other: A::Operand) -> Self {
        self.with_function(&function::BIT_AND, vec![other.into_value()])
    }

    pub fn bit_or(&self, other: A::Operand) -> Self {
        self.with_function(&function::BIT_OR, vec![other.into_value()])
    }

    /// Not available for: sqlite
    pub fn bit_xor(&self, other: A::Operand) -> Self {
        self.with_function(&function::BIT_XOR, vec![other.into_value()])
    }

    pub fn bit_not(&self) -> Self {
        self.with_function(&function::BIT_NOT, Vec::new())
    }

    pub fn shift_left(&self, amount: A::Operand) -> Self {
        self.with_function(&function::BIT_SHIFT_LEFT, vec![amount.into_value()])
    }

    pub fn shift_right(&self, amount: A::Operand) -> Self {
        self.with_function(&function::BIT_SHIFT_RIGHT, vec![amount.into_value()])
    }
}

impl<M, A: Text> Field<M, A> {
    pub fn concat(&self, other: &str) -> Self {
        self.with_function(&function::CONCAT, vec![Value::from(other)])
    }
}

/// Field with its model and attribute types erased
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRef {
    pub model: ModelRef,
    pub name: &'static str,
    column: Option<&'static str>,
    column_prefix: Option<&'static str>,
    pub appearance: Option<usize>,
    functions: Vec<FunctionCall>,
}

impl FieldRef {
    /// Field pointing at a raw column of `M`
    pub fn column<M: Model>(column: &'static str) -> Self {
        Self {
            model: ModelRef::of::<M>(),
            name: column,
            column: Some(column),
            column_prefix: None,
            appearance: None,
            functions: Vec::new(),
        }
    }

    pub fn column_name(&self) -> String {
        column_name(self.name, self.column, self.column_prefix)
    }

    /// True for the model's soft-delete marker column
    pub fn is_soft_delete(&self) -> bool {
        self.model.has_soft_delete() && self.column_name() == self.model.soft_delete
    }

    /// Same column, ignoring appearance and functions
    pub(crate) fn same_column(&self, other: &FieldRef) -> bool {
        self.model.type_id == other.model.type_id && self.column_name() == other.column_name()
    }

    /// `<table>.<column>` with the field's functions applied.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedByDatabase` wrapped with the function name when a function
    /// is not available for `dialect`.
    pub fn column_sql(&self, dialect: Dialect, table: &Table) -> Result<(String, Vec<Value>), CqlError> {
        let mut sql = table.column(&self.column_name());
        let mut values = Vec::new();

        for call in &self.functions {
            sql = call.function.apply(dialect, &sql, call.values.len())?;
            values.extend(call.values.iter().cloned());
        }

        Ok((sql, values))
    }
}

impl<M: Model, A> From<Field<M, A>> for FieldRef {
    fn from(field: Field<M, A>) -> Self {
        field.to_ref()
    }
}

impl<M: Model, A> From<&Field<M, A>> for FieldRef {
    fn from(field: &Field<M, A>) -> Self {
        field.to_ref()
    }
}

fn column_name(name: &str, column: Option<&str>, prefix: Option<&str>) -> String {
    let column = column.map_or_else(|| to_snake_case(name), str::to_string);
    match prefix {
        Some(prefix) => format!("{prefix}{column}"),
        None => column,
    }
}

/// `IntPointer` -> `int_pointer`, `CompanyID` -> `company_id`
pub(crate) fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut snake = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let previous = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1);
            let starts_word = match previous {
                None | Some('_') => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(_) => next.is_some_and(|n| n.is_lowercase()),
            };
            if starts_word {
                snake.push('_');
            }
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }

    snake
}

/// Values accepted where an attribute of type `A` is expected: plain values of `A`, or
/// another field holding `A` (a dynamic operand)
pub trait IntoOperand<A> {
    fn into_operand(self) -> Operand;
}

impl<A: ValueType> IntoOperand<A> for A {
    fn into_operand(self) -> Operand {
        Operand::Value(self.into_value())
    }
}

impl IntoOperand<String> for &str {
    fn into_operand(self) -> Operand {
        Operand::Value(Value::from(self))
    }
}

impl IntoOperand<Option<String>> for &str {
    fn into_operand(self) -> Operand {
        Operand::Value(Value::from(self))
    }
}

impl<M: Model, A> IntoOperand<A> for Field<M, A> {
    fn into_operand(self) -> Operand {
        Operand::Field(self.to_ref())
    }
}

impl<M: Model, A> IntoOperand<A> for &Field<M, A> {
    fn into_operand(self) -> Operand {
        Operand::Field(self.to_ref())
    }
}

/// Plain values accepted where an attribute of type `A` is expected
pub trait IntoValue<A> {
    fn into_value_of(self) -> Value;
}

impl<A: ValueType> IntoValue<A> for A {
    fn into_value_of(self) -> Value {
        self.into_value()
    }
}

impl IntoValue<String> for &str {
    fn into_value_of(self) -> Value {
        Value::from(self)
    }
}

impl IntoValue<Option<String>> for &str {
    fn into_value_of(self) -> Value {
        Value::from(self)
    }
}

/// Operands of unsafe conditions and sets: any value or field, unchecked against the
/// attribute type
pub trait UnsafeOperand {
    fn into_unsafe_operand(self) -> Operand;
}

impl<T: ValueType> UnsafeOperand for T {
    fn into_unsafe_operand(self) -> Operand {
        Operand::Value(self.into_value())
    }
}

impl UnsafeOperand for &str {
    fn into_unsafe_operand(self) -> Operand {
        Operand::Value(Value::from(self))
    }
}

impl UnsafeOperand for Value {
    fn into_unsafe_operand(self) -> Operand {
        Operand::Value(self)
    }
}

impl<M: Model, A> UnsafeOperand for Field<M, A> {
    fn into_unsafe_operand(self) -> Operand {
        Operand::Field(self.to_ref())
    }
}

impl<M: Model, A> UnsafeOperand for &Field<M, A> {
    fn into_unsafe_operand(self) -> Operand {
        Operand::Field(self.to_ref())
    }
}

/// Right-hand side of an operation
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(Value),
    /// Rendered as `(?, ?, ...)`; an empty list renders `(NULL)`
    List(Vec<Value>),
    /// Another field, resolved through the statement's tables
    Field(FieldRef),
}
