//! Compiled statements and their execution.
//!
//! Every builder ends in a [`Statement`]: the final SQL text, with placeholders numbered
//! for the executor's dialect, and the values in placeholder order. Running a statement
//! logs it, opens a tracing span and records metrics around the executor call.

use crate::error::CqlError;
use crate::executor::Executor;
use crate::row::Row;
use sea_query::Value;

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;
#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    /// Hand-written SQL
    Raw,
}

impl StatementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Select => "select",
            StatementKind::Insert => "insert",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
            StatementKind::Raw => "raw",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub sql: String,
    pub values: Vec<Value>,
}

impl Statement {
    /// `sql` uses `?` placeholders; they are numbered for `executor`'s dialect
    pub(crate) fn new(executor: &dyn Executor, kind: StatementKind, sql: &str, values: Vec<Value>) -> Self {
        Self {
            kind,
            sql: executor.dialect().number_placeholders(sql),
            values,
        }
    }

    /// Run a statement that returns no rows, returning the number of affected rows
    pub(crate) fn execute(&self, executor: &dyn Executor) -> Result<u64, CqlError> {
        self.run(executor, |sql, values| executor.execute(sql, values))
    }

    /// Run a statement that returns rows
    pub(crate) fn query(&self, executor: &dyn Executor) -> Result<Vec<Row>, CqlError> {
        self.run(executor, |sql, values| executor.query_all(sql, values))
    }

    fn run<T, F>(&self, executor: &dyn Executor, f: F) -> Result<T, CqlError>
    where
        F: FnOnce(&str, &[Value]) -> Result<T, crate::executor::ExecError>,
    {
        let kind = self.kind.as_str();

        if executor.log_statements() {
            log::debug!("{kind}: {} ({} values)", self.sql, self.values.len());
        }

        #[cfg(feature = "tracing")]
        let span = tracing_helpers::statement_span(kind, &self.sql);
        #[cfg(feature = "tracing")]
        let _guard = span.enter();

        #[cfg(feature = "metrics")]
        let start = std::time::Instant::now();

        let result = f(&self.sql, &self.values);

        match result {
            Ok(output) => {
                #[cfg(feature = "metrics")]
                METRICS.record_statement(kind, start.elapsed());
                Ok(output)
            }
            Err(err) => {
                #[cfg(feature = "metrics")]
                METRICS.record_error(kind);
                log::error!("{kind} failed: {err}");
                Err(err.into())
            }
        }
    }
}

/// Log and return the error a builder recorded before its terminal call
pub(crate) fn recorded(err: CqlError, terminal: &'static str) -> CqlError {
    log::warn!("{terminal} not executed: {err}");
    err
}
