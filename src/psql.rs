//! Postgres-only pattern matching operators.

use crate::condition::operator::{dialect_value, Operator};
use crate::sql::operator as sql;
use crate::value::Text;

/// Case-insensitive LIKE
pub fn ilike<A: Text>(pattern: &str) -> Operator<A> {
    dialect_value(&sql::PSQL_ILIKE, pattern)
}

/// SQL standard regular expression (`SIMILAR TO`)
pub fn similar_to<A: Text>(pattern: &str) -> Operator<A> {
    dialect_value(&sql::PSQL_SIMILAR_TO, pattern)
}

/// POSIX regular expression, case sensitive (`~`)
pub fn posix_match<A: Text>(pattern: &str) -> Operator<A> {
    dialect_value(&sql::PSQL_POSIX_MATCH, pattern)
}

/// POSIX regular expression, case insensitive (`~*`)
pub fn posix_i_match<A: Text>(pattern: &str) -> Operator<A> {
    dialect_value(&sql::PSQL_POSIX_IMATCH, pattern)
}
