//! Error type shared by condition compilation and statement execution.
//!
//! Builders record the first [`CqlError`] they hit and hand it back from the terminal
//! call. Errors raised deep inside the tree are wrapped with the method, operator,
//! function or field they came from; [`CqlError::root_cause`] strips that context.

use crate::dialect::Dialect;
use crate::executor::ExecError;
use crate::value::ValueExtractionError;
use std::fmt;
use std::sync::Arc;

/// Where a wrapped error was raised
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorContext {
    Method(&'static str),
    Operator(&'static str),
    Function(&'static str),
    Field { model: String, field: String },
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorContext::Method(name) => write!(f, "method: {name}"),
            ErrorContext::Operator(name) => write!(f, "operator: {name}"),
            ErrorContext::Function(name) => write!(f, "function: {name}"),
            ErrorContext::Field { model, field } => write!(f, "model: {model}, field: {field}"),
        }
    }
}

/// Errors produced while compiling or executing a statement
#[derive(Debug, Clone)]
pub enum CqlError {
    /// A NOT container (or a delete) was built without any inner condition
    EmptyConditions {
        connector: &'static str,
        model: String,
    },
    /// The field's model is not joined into the statement
    FieldModelNotConcerned { model: String },
    /// The field's model is joined more than once and no appearance was selected
    AppearanceMustBeSelected { model: String },
    /// The selected appearance is bigger than the number of joins of the model
    AppearanceOutOfRange {
        model: String,
        appearance: usize,
        occurrences: usize,
    },
    /// A collection preload carries nested joins that filter or do not preload
    OnlyPreloadsAllowed { model: String, field: String },
    /// Operator, function or clause not available on the active dialect
    UnsupportedByDatabase {
        dialect: Dialect,
        detail: Option<String>,
    },
    OrderByMustBeCalled,
    ObjectNotFound,
    MoreThanOneObjectFound,
    /// The same field is set twice in one update
    FieldIsRepeated { model: String, field: String },
    PreloadsInDeleteReturningNotAllowed,
    /// A relation was read without being preloaded
    RelationNotLoaded,
    /// Collection preload requested below the root model
    UnsupportedRelation { model: String, field: String },
    /// Update or delete that would touch every row of the table
    MissingWhereConditions,
    /// Row hydration failure
    Parse(String),
    /// Driver failure, shared so that the error stays cloneable
    Database(Arc<ExecError>),
    WithContext {
        source: Box<CqlError>,
        context: ErrorContext,
    },
}

impl CqlError {
    pub(crate) fn unsupported(dialect: Dialect) -> Self {
        CqlError::UnsupportedByDatabase {
            dialect,
            detail: None,
        }
    }

    pub(crate) fn with_context(self, context: ErrorContext) -> Self {
        CqlError::WithContext {
            source: Box::new(self),
            context,
        }
    }

    pub(crate) fn with_method(self, method: &'static str) -> Self {
        self.with_context(ErrorContext::Method(method))
    }

    pub(crate) fn with_operator(self, operator: &'static str) -> Self {
        self.with_context(ErrorContext::Operator(operator))
    }

    pub(crate) fn with_function(self, function: &'static str) -> Self {
        self.with_context(ErrorContext::Function(function))
    }

    pub(crate) fn with_field(self, model: &str, field: &str) -> Self {
        self.with_context(ErrorContext::Field {
            model: model.to_string(),
            field: field.to_string(),
        })
    }

    /// The innermost error, with every context layer removed
    pub fn root_cause(&self) -> &CqlError {
        let mut current = self;
        while let CqlError::WithContext { source, .. } = current {
            current = source;
        }
        current
    }

    /// Context layers from the innermost to the outermost
    pub fn contexts(&self) -> Vec<&ErrorContext> {
        let mut contexts = Vec::new();
        let mut current = self;
        while let CqlError::WithContext { source, context } = current {
            contexts.push(context);
            current = source;
        }
        contexts.reverse();
        contexts
    }
}

impl fmt::Display for CqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CqlError::EmptyConditions { connector, model } => {
                write!(f, "condition must have at least one inner condition")?;
                if !connector.is_empty() {
                    write!(f, "; connector: {connector}")?;
                }
                if !model.is_empty() {
                    write!(f, "; model: {model}")?;
                }
                Ok(())
            }
            CqlError::FieldModelNotConcerned { model } => write!(
                f,
                "field's model is not concerned by the query (not joined); not concerned model: {model}"
            ),
            CqlError::AppearanceMustBeSelected { model } => write!(
                f,
                "field's model appears more than once, select which one you want to use with appearance; model: {model}"
            ),
            CqlError::AppearanceOutOfRange {
                model,
                appearance,
                occurrences,
            } => write!(
                f,
                "selected appearance is bigger than field's model number of appearances; model: {model}, appearance: {appearance}, appearances: {occurrences}"
            ),
            CqlError::OnlyPreloadsAllowed { model, field } => write!(
                f,
                "only conditions that do a preload are allowed; model: {model}, field: {field}"
            ),
            CqlError::UnsupportedByDatabase { dialect, detail } => {
                write!(f, "method not supported by database")?;
                match detail {
                    Some(detail) => write!(f, "; {detail}"),
                    None => write!(f, "; database: {dialect}"),
                }
            }
            CqlError::OrderByMustBeCalled => {
                write!(f, "order by must be called before limit in an update statement")
            }
            CqlError::ObjectNotFound => {
                write!(f, "no object exists that meets the requested conditions")
            }
            CqlError::MoreThanOneObjectFound => {
                write!(f, "found more than one object that meets the requested conditions")
            }
            CqlError::FieldIsRepeated { model, field } => {
                write!(f, "field is repeated; model: {model}, field: {field}")
            }
            CqlError::PreloadsInDeleteReturningNotAllowed => {
                write!(f, "preloads in returning are not allowed for delete statements")
            }
            CqlError::RelationNotLoaded => {
                write!(f, "relation not loaded, it must be preloaded by the query")
            }
            CqlError::UnsupportedRelation { model, field } => write!(
                f,
                "collection preload is only allowed on the query's root model; model: {model}, field: {field}"
            ),
            CqlError::MissingWhereConditions => write!(
                f,
                "statement has no where conditions and would affect every row"
            ),
            CqlError::Parse(msg) => write!(f, "Parse error: {msg}"),
            CqlError::Database(err) => write!(f, "{err}"),
            CqlError::WithContext { source, context } => write!(f, "{source}; {context}"),
        }
    }
}

impl std::error::Error for CqlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CqlError::Database(err) => Some(err.as_ref()),
            CqlError::WithContext { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<ExecError> for CqlError {
    fn from(err: ExecError) -> Self {
        CqlError::Database(Arc::new(err))
    }
}

impl From<ValueExtractionError> for CqlError {
    fn from(err: ValueExtractionError) -> Self {
        CqlError::Parse(err.to_string())
    }
}
