//! Statement builders.
//!
//! Builders are created from an executor and a list of root-model conditions, compile
//! the conditions right away and record the first error hit by any chained call. Nothing
//! is executed until a terminal call (`find`, `exec`, `set`, ...), which returns the
//! recorded error instead of executing.

pub mod delete;
pub mod group;
pub mod insert;
pub mod statement;
pub mod update;
pub(crate) mod value_conversion;

use crate::condition::context::QueryContext;
use crate::condition::field::FieldRef;
use crate::condition::preload::CollectionLoad;
use crate::condition::Condition;
use crate::dialect::Dialect;
use crate::error::CqlError;
use crate::executor::Executor;
use crate::model::Model;
use crate::row::Row;
use crate::value::TryGetable;
use group::QueryGroup;
use statement::{recorded, Statement, StatementKind};
use std::marker::PhantomData;
use std::sync::Arc;

/// Select statement over model `M`.
///
/// # Example
///
/// ```no_run
/// # use cql::{conditions, CqlError, Executor, Field, Model, Query, RowView, UIntId};
/// # use sea_query::Value;
/// # struct Brand { id: UIntId, name: String }
/// # impl Model for Brand {
/// #     const TABLE_NAME: &'static str = "brands";
/// #     const COLUMNS: &'static [&'static str] = &["id", "name"];
/// #     type Id = UIntId;
/// #     fn id(&self) -> &UIntId { &self.id }
/// #     fn from_row(row: &RowView<'_>) -> Result<Self, CqlError> {
/// #         Ok(Self { id: row.get("id")?, name: row.get("name")? })
/// #     }
/// #     fn insert_values(&self) -> Vec<(&'static str, Value)> { vec![] }
/// # }
/// # impl Brand { const NAME: Field<Brand, String> = Field::new("Name", None, None); }
/// # fn run(executor: &dyn Executor) -> Result<(), CqlError> {
/// let brands = Query::<Brand>::new(executor, conditions![Brand::NAME.is().like("a%")])
///     .descending(&Brand::NAME)
///     .limit(10)
///     .find()?;
/// # Ok(())
/// # }
/// ```
pub struct Query<'a, M> {
    executor: &'a dyn Executor,
    pub(crate) context: QueryContext,
    pub(crate) error: Option<CqlError>,
    _model: PhantomData<fn() -> M>,
}

impl<'a, M: Model> Query<'a, M> {
    pub fn new(executor: &'a dyn Executor, conditions: Vec<Condition<M>>) -> Self {
        let mut context = QueryContext::new::<M>(executor.dialect());
        let error = context.apply(&conditions).err();

        Self {
            executor,
            context,
            error,
            _model: PhantomData,
        }
    }

    pub(crate) fn record(&mut self, result: Result<(), CqlError>) {
        if let (None, Err(err)) = (&self.error, result) {
            self.error = Some(err);
        }
    }

    /// Order results by `field` (of the root model or of any joined model)
    pub fn ascending(mut self, field: impl Into<FieldRef>) -> Self {
        if self.error.is_none() {
            let result = self.context.order(&field.into(), false);
            self.record(result);
        }
        self
    }

    pub fn descending(mut self, field: impl Into<FieldRef>) -> Self {
        if self.error.is_none() {
            let result = self.context.order(&field.into(), true);
            self.record(result);
        }
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.context.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.context.offset = Some(offset);
        self
    }

    /// Group the results by `fields`; the model projection is dropped and the grouped
    /// query selects explicit expressions
    pub fn group_by(mut self, fields: Vec<FieldRef>) -> QueryGroup<'a, M> {
        self.context.clean_selects();
        for field in &fields {
            if self.error.is_some() {
                break;
            }
            match self.context.field_sql(field) {
                Ok((sql, values)) => self.context.group_by.push(sql, values),
                Err(err) => self.error = Some(err.with_method("GroupBy")),
            }
        }
        QueryGroup::new(self)
    }

    /// Compiled select, without executing it
    pub fn statement(&self) -> Result<Statement, CqlError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        let (sql, values) = self.context.select_sql();
        Ok(Statement::new(self.executor, StatementKind::Select, &sql, values))
    }

    /// Every model that meets the conditions
    pub fn find(self) -> Result<Vec<M>, CqlError> {
        if let Some(err) = self.error {
            return Err(recorded(err, "Find"));
        }

        let (sql, values) = self.context.select_sql();
        let rows = Statement::new(self.executor, StatementKind::Select, &sql, values).query(self.executor)?;

        let mut models = hydrate::<M>(&rows)?;
        load_collections(self.executor, &self.context.collection_loads, &mut models)?;
        Ok(models)
    }

    /// First model ordered by primary key
    pub fn first(self) -> Result<M, CqlError> {
        self.ordered_by_primary_key(false).take()
    }

    /// Last model ordered by primary key
    pub fn last(self) -> Result<M, CqlError> {
        self.ordered_by_primary_key(true).take()
    }

    fn ordered_by_primary_key(self, descending: bool) -> Self {
        let primary_key = FieldRef::column::<M>(M::primary_key_column());
        if descending {
            self.descending(primary_key)
        } else {
            self.ascending(primary_key)
        }
    }

    /// One model that meets the conditions, in no particular order
    pub fn take(self) -> Result<M, CqlError> {
        self.limit(1)
            .find()?
            .into_iter()
            .next()
            .ok_or(CqlError::ObjectNotFound)
    }

    /// The only model that meets the conditions.
    ///
    /// # Errors
    ///
    /// `ObjectNotFound` when no model meets them, `MoreThanOneObjectFound` when several do.
    pub fn find_one(self) -> Result<M, CqlError> {
        let mut models = self.find()?;
        match models.len() {
            0 => Err(CqlError::ObjectNotFound),
            1 => Ok(models.remove(0)),
            _ => Err(CqlError::MoreThanOneObjectFound),
        }
    }

    /// Number of models that meet the conditions
    pub fn count(self) -> Result<u64, CqlError> {
        if let Some(err) = self.error {
            return Err(recorded(err, "Count"));
        }

        let (sql, values) = self.context.count_sql();
        let rows = Statement::new(self.executor, StatementKind::Select, &sql, values).query(self.executor)?;

        let count = rows
            .first()
            .and_then(|row| row.value_at(0))
            .cloned()
            .map(i64::try_get)
            .transpose()?
            .unwrap_or(0);
        u64::try_from(count).map_err(|e| CqlError::Parse(e.to_string()))
    }
}

pub(crate) fn hydrate<M: Model>(rows: &[Row]) -> Result<Vec<M>, CqlError> {
    rows.iter().map(|row| M::from_row(&row.view())).collect()
}

/// Run the collection preloads of a statement over its results
pub(crate) fn load_collections<M: Model>(
    executor: &dyn Executor,
    loads: &[Arc<dyn CollectionLoad>],
    models: &mut Vec<M>,
) -> Result<(), CqlError> {
    for load in loads {
        load.load(executor, models)?;
    }
    Ok(())
}

/// Run a write statement; with `returning`, the statement's rows are hydrated into it
/// and the number of returned rows is reported
pub(crate) fn execute<M: Model>(
    executor: &dyn Executor,
    kind: StatementKind,
    sql: &str,
    values: Vec<sea_query::Value>,
    returning: Option<&mut Vec<M>>,
    loads: &[Arc<dyn CollectionLoad>],
) -> Result<u64, CqlError> {
    let statement = Statement::new(executor, kind, sql, values);

    let Some(results) = returning else {
        return statement.execute(executor);
    };

    let rows = statement.query(executor)?;
    let mut models = hydrate::<M>(&rows)?;
    load_collections(executor, loads, &mut models)?;

    let count = models.len() as u64;
    results.extend(models);
    Ok(count)
}

/// Ordering of update and delete statements, only supported by MySQL
pub(crate) fn mysql_order(
    context: &mut QueryContext,
    field: &FieldRef,
    descending: bool,
    method: &'static str,
) -> Result<(), CqlError> {
    if context.dialect != Dialect::MySQL {
        return Err(CqlError::unsupported(context.dialect).with_method(method));
    }
    context.order(field, descending).map_err(|e| e.with_method(method))
}

/// Limit of update and delete statements, only supported by MySQL after an order
pub(crate) fn mysql_limit(context: &mut QueryContext, limit: u64) -> Result<(), CqlError> {
    if context.dialect != Dialect::MySQL {
        return Err(CqlError::unsupported(context.dialect).with_method("Limit"));
    }
    if context.order_by.is_empty() {
        return Err(CqlError::OrderByMustBeCalled.with_method("Limit"));
    }
    context.limit = Some(limit);
    Ok(())
}
