//! SQL operators and the dialects that accept them.

use crate::dialect::Dialect;
use std::fmt;

/// A binary SQL operator.
///
/// `only` restricts the operator to one dialect; operators without it are accepted
/// everywhere.
#[derive(Debug, PartialEq, Eq)]
pub struct SqlOperator {
    pub name: &'static str,
    pub sql: &'static str,
    pub only: Option<Dialect>,
}

impl SqlOperator {
    const fn new(name: &'static str, sql: &'static str) -> Self {
        Self {
            name,
            sql,
            only: None,
        }
    }

    const fn only(name: &'static str, sql: &'static str, dialect: Dialect) -> Self {
        Self {
            name,
            sql,
            only: Some(dialect),
        }
    }

    pub fn supports(&self, dialect: Dialect) -> bool {
        self.only.map_or(true, |only| only == dialect)
    }
}

impl fmt::Display for SqlOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql)
    }
}

pub static EQ: SqlOperator = SqlOperator::new("Eq", "=");
pub static NOT_EQ: SqlOperator = SqlOperator::new("NotEq", "<>");
pub static LT: SqlOperator = SqlOperator::new("Lt", "<");
pub static LT_OR_EQ: SqlOperator = SqlOperator::new("LtOrEq", "<=");
pub static GT: SqlOperator = SqlOperator::new("Gt", ">");
pub static GT_OR_EQ: SqlOperator = SqlOperator::new("GtOrEq", ">=");
pub static BETWEEN: SqlOperator = SqlOperator::new("Between", "BETWEEN");
pub static NOT_BETWEEN: SqlOperator = SqlOperator::new("NotBetween", "NOT BETWEEN");
pub static IS_DISTINCT: SqlOperator = SqlOperator::new("IsDistinct", "IS DISTINCT FROM");
pub static IS_NOT_DISTINCT: SqlOperator = SqlOperator::new("IsNotDistinct", "IS NOT DISTINCT FROM");
pub static LIKE: SqlOperator = SqlOperator::new("Like", "LIKE");
pub static ESCAPE: SqlOperator = SqlOperator::new("Escape", "ESCAPE");
pub static ARRAY_IN: SqlOperator = SqlOperator::new("ArrayIn", "IN");
pub static ARRAY_NOT_IN: SqlOperator = SqlOperator::new("ArrayNotIn", "NOT IN");
pub static AND: SqlOperator = SqlOperator::new("And", "AND");
pub static OR: SqlOperator = SqlOperator::new("Or", "OR");
pub static NOT: SqlOperator = SqlOperator::new("Not", "NOT");

pub static MYSQL_XOR: SqlOperator = SqlOperator::only("mysql.Xor", "XOR", Dialect::MySQL);
pub static MYSQL_REGEXP: SqlOperator = SqlOperator::only("mysql.Regexp", "REGEXP", Dialect::MySQL);
// `<=>` is reported under the portable name so errors match IsNotDistinct
pub static MYSQL_NULL_SAFE_EQUAL: SqlOperator =
    SqlOperator::only("IsNotDistinct", "<=>", Dialect::MySQL);

pub static PSQL_ILIKE: SqlOperator = SqlOperator::only("psql.ILike", "ILIKE", Dialect::Postgres);
pub static PSQL_SIMILAR_TO: SqlOperator =
    SqlOperator::only("psql.SimilarTo", "SIMILAR TO", Dialect::Postgres);
pub static PSQL_POSIX_MATCH: SqlOperator =
    SqlOperator::only("psql.POSIXMatch", "~", Dialect::Postgres);
pub static PSQL_POSIX_IMATCH: SqlOperator =
    SqlOperator::only("psql.POSIXIMatch", "~*", Dialect::Postgres);

pub static SQLITE_GLOB: SqlOperator = SqlOperator::only("sqlite.Glob", "GLOB", Dialect::SQLite);

/// `IS DISTINCT FROM`, spelled `NOT a <=> b` on MySQL
pub static IS_DISTINCT_BY_DIALECT: [(Dialect, &SqlOperator); 4] = [
    (Dialect::Postgres, &IS_DISTINCT),
    (Dialect::SQLServer, &IS_DISTINCT),
    (Dialect::SQLite, &IS_DISTINCT),
    (Dialect::MySQL, &MYSQL_NULL_SAFE_EQUAL),
];

pub static IS_NOT_DISTINCT_BY_DIALECT: [(Dialect, &SqlOperator); 4] = [
    (Dialect::Postgres, &IS_NOT_DISTINCT),
    (Dialect::SQLServer, &IS_NOT_DISTINCT),
    (Dialect::SQLite, &IS_NOT_DISTINCT),
    (Dialect::MySQL, &MYSQL_NULL_SAFE_EQUAL),
];

pub static IS_DISTINCT_MODIFIER: [(Dialect, &str); 1] = [(Dialect::MySQL, "NOT")];
