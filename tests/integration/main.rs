//! End-to-end tests of the public API: conditions are compiled by the statement
//! builders and run through a recording executor.

mod common;
mod query;
mod write;
