//! ValueType trait for mapping attribute types to `sea_query::Value`
//!
//! Every attribute a [`Field`](crate::Field) can point at implements `ValueType`, so
//! condition values, update sets and insert rows all travel as `sea_query::Value`
//! until the executor binds them.
//!
//! ## Usage
//!
//! ```rust
//! use cql::ValueType;
//! use sea_query::Value;
//!
//! let value = 42i32.into_value();
//! assert!(matches!(value, Value::Int(Some(42))));
//!
//! let value = None::<i32>.into_value();
//! assert!(matches!(value, Value::Int(None)));
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_query::Value;
use uuid::Uuid;

/// Trait for mapping Rust types to their corresponding `sea_query::Value` variant.
pub trait ValueType: Sized {
    /// Convert this value into a `sea_query::Value`.
    fn into_value(self) -> Value;

    /// Convert a `sea_query::Value` into this type, if possible.
    ///
    /// Returns `None` if the value doesn't match the expected variant or is null.
    fn from_value(value: Value) -> Option<Self>;

    /// Return the null variant for this type.
    ///
    /// Used by `Option<T>` so that a `None` still carries its column type.
    fn null_value() -> Value;
}

macro_rules! impl_value_type {
    ($type:ty, $variant:ident) => {
        impl ValueType for $type {
            fn into_value(self) -> Value {
                Value::from(self)
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(Some(v)) => Some(<$type as Clone>::clone(&v)),
                    _ => None,
                }
            }

            fn null_value() -> Value {
                Value::$variant(None)
            }
        }
    };
}

impl_value_type!(bool, Bool);
impl_value_type!(i16, SmallInt);
impl_value_type!(i32, Int);
impl_value_type!(i64, BigInt);
impl_value_type!(u32, Unsigned);
impl_value_type!(u64, BigUnsigned);
impl_value_type!(f32, Float);
impl_value_type!(f64, Double);
impl_value_type!(String, String);
impl_value_type!(Vec<u8>, Bytes);
impl_value_type!(Uuid, Uuid);
impl_value_type!(DateTime<Utc>, ChronoDateTimeUtc);
impl_value_type!(Decimal, Decimal);
impl_value_type!(serde_json::Value, Json);

impl<T: ValueType> ValueType for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => T::null_value(),
        }
    }

    fn from_value(value: Value) -> Option<Self> {
        Some(T::from_value(value))
    }

    fn null_value() -> Value {
        T::null_value()
    }
}

/// Attribute types that accept arithmetic and bitwise field functions.
///
/// `Operand` is the type of the right-hand value of a function: the attribute type
/// itself, or the wrapped type for nullable attributes.
pub trait Numeric: ValueType {
    type Operand: ValueType;
}

macro_rules! impl_numeric {
    ($($type:ty),+) => {
        $(
            impl Numeric for $type {
                type Operand = $type;
            }
        )+
    };
}

impl_numeric!(i16, i32, i64, u32, u64, f32, f64, Decimal);

impl<T: Numeric> Numeric for Option<T> {
    type Operand = T::Operand;
}

/// Text attributes, which accept pattern matching and concatenation
pub trait Text: ValueType {}

impl Text for String {}
impl Text for Option<String> {}

/// Boolean attributes, which accept truth tests and boolean aggregates
pub trait Boolean: ValueType {}

impl Boolean for bool {}
impl Boolean for Option<bool> {}
