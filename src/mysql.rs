//! MySQL-only operators and connectors.

use crate::condition::operator::{dialect_value, Operator};
use crate::condition::where_condition::{connection, WhereCondition};
use crate::model::Model;
use crate::sql::operator as sql;
use crate::value::Text;

/// Pattern matching for any attribute type: MySQL compares numbers and dates with LIKE
/// through their text form
pub fn like<A>(pattern: &str) -> Operator<A> {
    dialect_value(&sql::LIKE, pattern)
}

/// Regular expression match
pub fn regexp<A: Text>(pattern: &str) -> Operator<A> {
    dialect_value(&sql::MYSQL_REGEXP, pattern)
}

/// True when an odd number of the conditions is true
pub fn xor<M: Model>(conditions: Vec<WhereCondition<M>>) -> WhereCondition<M> {
    connection(&sql::MYSQL_XOR, conditions)
}
