//! SQLite-only operators.

use crate::condition::operator::{dialect_value, Operator};
use crate::sql::operator as sql;
use crate::value::Text;

/// Unix glob match, case sensitive: `*` any sequence, `?` one character
pub fn glob<A: Text>(pattern: &str) -> Operator<A> {
    dialect_value(&sql::SQLITE_GLOB, pattern)
}
