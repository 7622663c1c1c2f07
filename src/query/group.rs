//! GROUP BY queries.
//!
//! A grouped query selects explicit expressions (grouped fields and aggregations) and
//! writes them into a caller-defined result type through setter functions, reading the
//! row by select position.

use super::statement::{recorded, Statement, StatementKind};
use super::Query;
use crate::condition::aggregation::{AggregationCondition, Selectable, Selection};
use crate::error::CqlError;
use crate::model::Model;
use crate::row::Row;
use crate::value::TryGetable;
use sea_query::Value;
use std::fmt;

/// Query over model `M` grouped by one or more fields
pub struct QueryGroup<'a, M> {
    query: Query<'a, M>,
}

impl<'a, M: Model> QueryGroup<'a, M> {
    pub(crate) fn new(query: Query<'a, M>) -> Self {
        Self { query }
    }

    /// Filter the groups; every condition is joined with AND
    pub fn having(mut self, conditions: Vec<AggregationCondition>) -> Self {
        for condition in &conditions {
            if self.query.error.is_some() {
                break;
            }
            match condition.to_sql(&self.query.context) {
                Ok((sql, values)) => self.query.context.having.push(sql, values),
                Err(err) => self.query.error = Some(err.with_method("Having")),
            }
        }
        self
    }

    /// Run the query, building one `R` per group.
    ///
    /// # Example
    ///
    /// ```ignore
    /// #[derive(Default)]
    /// struct Total { code: i32, count: i64 }
    ///
    /// let totals = Query::<Sale>::new(executor, vec![])
    ///     .group_by(vec![Sale::CODE.to_ref()])
    ///     .select(vec![
    ///         ValueInto::new(&Sale::CODE, |total: &mut Total, code| total.code = code),
    ///         ValueInto::new(Aggregation::count_all(), |total: &mut Total, count| total.count = count),
    ///     ])?;
    /// ```
    pub fn select<R: Default>(mut self, selections: Vec<ValueInto<R>>) -> Result<Vec<R>, CqlError> {
        if let Some(err) = self.query.error {
            return Err(recorded(err, "Select"));
        }

        let context = &mut self.query.context;
        context.clean_selects();
        for selection in &selections {
            let (sql, values) = selection
                .selection
                .to_sql(context)
                .map_err(|e| e.with_method("Select"))?;
            context.selects.push(sql, values);
        }

        let (sql, values) = context.select_sql();
        let executor = self.query.executor;
        let rows = Statement::new(executor, StatementKind::Select, &sql, values).query(executor)?;

        rows.iter().map(|row| read_row(row, &selections)).collect()
    }
}

fn read_row<R: Default>(row: &Row, selections: &[ValueInto<R>]) -> Result<R, CqlError> {
    let mut result = R::default();
    for (index, selection) in selections.iter().enumerate() {
        let value = row
            .value_at(index)
            .cloned()
            .ok_or_else(|| CqlError::Parse(format!("missing selected value at position {index}")))?;
        (selection.setter)(&mut result, value)?;
    }
    Ok(result)
}

type Setter<R> = Box<dyn Fn(&mut R, Value) -> Result<(), CqlError>>;

/// A selected expression and where its value is written in the result
pub struct ValueInto<R> {
    selection: Selection,
    setter: Setter<R>,
}

impl<R: 'static> ValueInto<R> {
    pub fn new<A: TryGetable + 'static>(selectable: impl Selectable<A>, setter: fn(&mut R, A)) -> Self {
        Self {
            selection: selectable.selection(),
            setter: Box::new(move |result, value| {
                setter(result, A::try_get(value)?);
                Ok(())
            }),
        }
    }

    /// Like [`ValueInto::new`], for expressions that may be null (aggregations over
    /// empty or all-null groups)
    pub fn nullable<A: TryGetable + 'static>(
        selectable: impl Selectable<A>,
        setter: fn(&mut R, Option<A>),
    ) -> Self {
        Self {
            selection: selectable.selection(),
            setter: Box::new(move |result, value| {
                setter(result, A::try_get_opt(value)?);
                Ok(())
            }),
        }
    }
}

impl<R> fmt::Debug for ValueInto<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueInto")
            .field("selection", &self.selection)
            .finish()
    }
}
