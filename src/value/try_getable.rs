//! TryGetable trait for error-aware value extraction
//!
//! Row hydration reads every column through [`TryGetable::try_get`], which tells a
//! null apart from a type mismatch. Integer and float reads accept narrower variants,
//! since drivers and aggregate functions do not always return the declared width.

use crate::value::ValueType;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_query::Value;
use uuid::Uuid;

/// Error type for value extraction failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueExtractionError {
    /// The value is null (None variant)
    NullValue,
    /// The value type doesn't match the expected type
    TypeMismatch { expected: String, actual: String },
    /// Value conversion failed (e.g., overflow, invalid format)
    ConversionError(String),
}

impl std::fmt::Display for ValueExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueExtractionError::NullValue => write!(f, "Value is null"),
            ValueExtractionError::TypeMismatch { expected, actual } => {
                write!(f, "Type mismatch: expected {expected}, got {actual}")
            }
            ValueExtractionError::ConversionError(msg) => write!(f, "Conversion error: {msg}"),
        }
    }
}

impl std::error::Error for ValueExtractionError {}

/// Trait for safe value extraction with error handling
///
/// ## Usage
///
/// ```rust
/// use cql::{TryGetable, ValueExtractionError};
/// use sea_query::Value;
///
/// let result: Result<i64, ValueExtractionError> = TryGetable::try_get(Value::Int(Some(42)));
/// assert_eq!(result, Ok(42));
///
/// let result: Result<i32, ValueExtractionError> = TryGetable::try_get(Value::Int(None));
/// assert!(matches!(result, Err(ValueExtractionError::NullValue)));
/// ```
pub trait TryGetable: ValueType {
    /// Extract a non-null value of this type.
    fn try_get(value: Value) -> Result<Self, ValueExtractionError>;

    /// Extract a value, mapping null to `None`.
    fn try_get_opt(value: Value) -> Result<Option<Self>, ValueExtractionError> {
        match Self::try_get(value) {
            Ok(v) => Ok(Some(v)),
            Err(ValueExtractionError::NullValue) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn mismatch(expected: &str, value: &Value) -> ValueExtractionError {
    ValueExtractionError::TypeMismatch {
        expected: expected.to_string(),
        actual: format!("{value:?}"),
    }
}

macro_rules! impl_try_getable {
    ($type:ty, $expected:expr, [$($variant:ident),+]) => {
        impl TryGetable for $type {
            fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
                match value {
                    $(
                        Value::$variant(Some(v)) => <$type>::try_from(v).map_err(|e| {
                            ValueExtractionError::ConversionError(format!("{}: {e}", $expected))
                        }),
                        Value::$variant(None) => Err(ValueExtractionError::NullValue),
                    )+
                    other => Err(mismatch($expected, &other)),
                }
            }
        }
    };
}

impl_try_getable!(i16, "SmallInt", [SmallInt, TinyInt]);
impl_try_getable!(i32, "Int", [Int, SmallInt, TinyInt]);
impl_try_getable!(i64, "BigInt", [BigInt, Int, SmallInt, Unsigned, BigUnsigned]);
impl_try_getable!(u32, "Unsigned", [Unsigned, Int, BigInt]);
impl_try_getable!(u64, "BigUnsigned", [BigUnsigned, BigInt, Int, Unsigned]);

impl TryGetable for f32 {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Float(Some(v)) => Ok(v),
            Value::Float(None) | Value::Double(None) => Err(ValueExtractionError::NullValue),
            other => Err(mismatch("Float", &other)),
        }
    }
}

impl TryGetable for f64 {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Double(Some(v)) => Ok(v),
            Value::Float(Some(v)) => Ok(f64::from(v)),
            Value::BigInt(Some(v)) => Ok(v as f64),
            Value::Int(Some(v)) => Ok(f64::from(v)),
            Value::Double(None) | Value::Float(None) | Value::BigInt(None) | Value::Int(None) => {
                Err(ValueExtractionError::NullValue)
            }
            other => Err(mismatch("Double", &other)),
        }
    }
}

macro_rules! impl_try_getable_cloned {
    ($type:ty, $variant:ident, $expected:expr) => {
        impl TryGetable for $type {
            fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
                match value {
                    Value::$variant(Some(v)) => Ok(<$type as Clone>::clone(&v)),
                    Value::$variant(None) => Err(ValueExtractionError::NullValue),
                    other => Err(mismatch($expected, &other)),
                }
            }
        }
    };
}

impl_try_getable_cloned!(bool, Bool, "Bool");
impl_try_getable_cloned!(String, String, "String");
impl_try_getable_cloned!(Vec<u8>, Bytes, "Bytes");
impl_try_getable_cloned!(Uuid, Uuid, "Uuid");
impl_try_getable_cloned!(DateTime<Utc>, ChronoDateTimeUtc, "ChronoDateTimeUtc");
impl_try_getable_cloned!(Decimal, Decimal, "Decimal");
impl_try_getable_cloned!(serde_json::Value, Json, "Json");
