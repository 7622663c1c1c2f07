//! SQL dialects supported by the compiler.
//!
//! Conditions are compiled with `?` placeholders; the active [`Dialect`] numbers them
//! once the whole statement is assembled, and decides the dialect-specific clause
//! shapes (limit/offset, returning).

use serde::Deserialize;
use std::fmt;

/// Database engine a statement is compiled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Postgres,
    MySQL,
    SQLite,
    SQLServer,
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::Postgres
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Dialect {
    /// Name of the dialect, as used in configuration and error messages
    pub fn name(self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::MySQL => "mysql",
            Dialect::SQLite => "sqlite",
            Dialect::SQLServer => "sqlserver",
        }
    }

    /// Replace every `?` placeholder outside quoted text by the dialect's bind marker.
    ///
    /// Postgres uses `$1, $2, ...`, SQL Server `@p1, @p2, ...`; MySQL and SQLite keep `?`.
    pub fn number_placeholders(self, sql: &str) -> String {
        let marker = match self {
            Dialect::Postgres => "$",
            Dialect::SQLServer => "@p",
            Dialect::MySQL | Dialect::SQLite => return sql.to_string(),
        };

        let mut result = String::with_capacity(sql.len() + 8);
        let mut quote: Option<char> = None;
        let mut index = 0;

        for c in sql.chars() {
            match quote {
                Some(q) => {
                    if c == q {
                        quote = None;
                    }
                    result.push(c);
                }
                None => match c {
                    '\'' | '"' | '`' => {
                        quote = Some(c);
                        result.push(c);
                    }
                    '?' => {
                        index += 1;
                        result.push_str(marker);
                        result.push_str(&index.to_string());
                    }
                    _ => result.push(c),
                },
            }
        }

        result
    }

    /// Quote a select alias; MySQL uses backticks, the others double quotes
    pub fn quote_identifier(self, name: &str) -> String {
        match self {
            Dialect::MySQL => format!("`{name}`"),
            Dialect::Postgres | Dialect::SQLite | Dialect::SQLServer => format!("\"{name}\""),
        }
    }

    /// Render the LIMIT/OFFSET tail of a SELECT.
    ///
    /// `ordered` tells whether an ORDER BY clause was already rendered, which SQL Server
    /// requires before `OFFSET ... FETCH`.
    pub(crate) fn limit_offset(self, limit: Option<u64>, offset: Option<u64>, ordered: bool) -> String {
        if limit.is_none() && offset.is_none() {
            return String::new();
        }

        match self {
            Dialect::Postgres => {
                let mut tail = String::new();
                if let Some(limit) = limit {
                    tail.push_str(&format!(" LIMIT {limit}"));
                }
                if let Some(offset) = offset {
                    tail.push_str(&format!(" OFFSET {offset}"));
                }
                tail
            }
            Dialect::MySQL | Dialect::SQLite => {
                // both engines reject OFFSET without LIMIT
                let limit = match (limit, self) {
                    (Some(limit), _) => limit.to_string(),
                    (None, Dialect::MySQL) => u64::MAX.to_string(),
                    (None, _) => "-1".to_string(),
                };
                let mut tail = format!(" LIMIT {limit}");
                if let Some(offset) = offset {
                    tail.push_str(&format!(" OFFSET {offset}"));
                }
                tail
            }
            Dialect::SQLServer => {
                let mut tail = String::new();
                if !ordered {
                    tail.push_str(" ORDER BY (SELECT NULL)");
                }
                tail.push_str(&format!(" OFFSET {} ROWS", offset.unwrap_or(0)));
                if let Some(limit) = limit {
                    tail.push_str(&format!(" FETCH NEXT {limit} ROWS ONLY"));
                }
                tail
            }
        }
    }
}
