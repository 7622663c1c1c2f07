//! Checks for relations read from hydrated models.
//!
//! A relation attribute is only filled when the statement preloaded it. Model getters
//! use these helpers to tell "not preloaded" (an error) apart from "preloaded, and the
//! relation is null" (`Ok(None)`).

use crate::error::CqlError;
use crate::model::{Model, ModelId};

/// Relation that can never be null
pub fn verify_struct_loaded<T: Model>(to_verify: Option<&T>) -> Result<&T, CqlError> {
    match to_verify {
        Some(object) if object.is_loaded() => Ok(object),
        _ => Err(CqlError::RelationNotLoaded),
    }
}

/// Nullable relation whose foreign key is `id`: when `id` is null there is nothing to load
pub fn verify_pointer_loaded<'a, T: Model, I>(
    id: Option<&I>,
    to_verify: Option<&'a T>,
) -> Result<Option<&'a T>, CqlError> {
    if id.is_none() {
        return Ok(None);
    }
    verify_struct_loaded(to_verify).map(Some)
}

/// Nullable relation whose foreign key `id` is nil when the relation is null
pub fn verify_pointer_with_id_loaded<'a, T: Model, I: ModelId>(
    id: &I,
    to_verify: Option<&'a T>,
) -> Result<Option<&'a T>, CqlError> {
    if id.is_nil() {
        return Ok(None);
    }
    verify_struct_loaded(to_verify).map(Some)
}

/// Has-many relation, filled by a collection preload (possibly with no element)
pub fn verify_collection_loaded<T>(collection: Option<&Vec<T>>) -> Result<&[T], CqlError> {
    collection
        .map(Vec::as_slice)
        .ok_or(CqlError::RelationNotLoaded)
}
