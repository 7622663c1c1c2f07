//! Value type system for cql
//!
//! Traits for converting between attribute types and `sea_query::Value`.
//!
//! - **`ValueType`** - maps Rust types to their corresponding `sea_query::Value` variant
//! - **`TryGetable`** - safe value extraction with error handling
//! - **`Numeric`**, **`Text`**, **`Boolean`** - attribute kinds that unlock type-specific
//!   functions and operators

pub mod try_getable;
pub mod types;

pub use try_getable::{TryGetable, ValueExtractionError};
pub use types::{Boolean, Numeric, Text, ValueType};
