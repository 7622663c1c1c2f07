//! Aggregations and HAVING conditions.
//!
//! An [`Aggregation`] is an aggregate function over a field (or `COUNT(*)`), typed by the
//! type of its result. Aggregations are selected by grouped queries and compared by
//! [`AggregationCondition`]s, which compose like where conditions.

use crate::condition::context::QueryContext;
use crate::condition::field::{Field, FieldRef};
use crate::error::CqlError;
use crate::model::Model;
use crate::sql::function::{self, Function};
use crate::sql::operator::{self as sql, SqlOperator};
use crate::value::{Boolean, Numeric, ValueType};
use sea_query::Value;
use std::marker::PhantomData;

#[doc(hidden)]
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationExpr {
    field: Option<FieldRef>,
    function: &'static Function,
}

impl AggregationExpr {
    pub(crate) fn to_sql(&self, context: &QueryContext) -> Result<(String, Vec<Value>), CqlError> {
        match &self.field {
            None => Ok(("COUNT(*)".to_string(), Vec::new())),
            Some(field) => {
                let (column, values) = context.field_sql(field)?;
                let sql = self.function.apply(context.dialect, &column, 0)?;
                Ok((sql, values))
            }
        }
    }
}

/// Aggregate function whose result is of type `A`
#[derive(Debug)]
pub struct Aggregation<A> {
    pub(crate) expression: AggregationExpr,
    _result: PhantomData<fn() -> A>,
}

impl<A> Clone for Aggregation<A> {
    fn clone(&self) -> Self {
        Self::new(self.expression.clone())
    }
}

impl<A> Aggregation<A> {
    fn new(expression: AggregationExpr) -> Self {
        Self {
            expression,
            _result: PhantomData,
        }
    }

    fn compare(&self, operator: &'static SqlOperator, operand: impl IntoHavingOperand<A>) -> AggregationCondition {
        AggregationCondition {
            node: AggregationNode::Compare {
                aggregation: self.expression.clone(),
                operator,
                operand: operand.into_having_operand(),
            },
        }
    }

    pub fn eq(&self, operand: impl IntoHavingOperand<A>) -> AggregationCondition {
        self.compare(&sql::EQ, operand)
    }

    pub fn not_eq(&self, operand: impl IntoHavingOperand<A>) -> AggregationCondition {
        self.compare(&sql::NOT_EQ, operand)
    }

    pub fn lt(&self, operand: impl IntoHavingOperand<A>) -> AggregationCondition {
        self.compare(&sql::LT, operand)
    }

    pub fn lt_or_eq(&self, operand: impl IntoHavingOperand<A>) -> AggregationCondition {
        self.compare(&sql::LT_OR_EQ, operand)
    }

    pub fn gt(&self, operand: impl IntoHavingOperand<A>) -> AggregationCondition {
        self.compare(&sql::GT, operand)
    }

    pub fn gt_or_eq(&self, operand: impl IntoHavingOperand<A>) -> AggregationCondition {
        self.compare(&sql::GT_OR_EQ, operand)
    }
}

impl Aggregation<i64> {
    /// `COUNT(*)`
    pub fn count_all() -> Self {
        Self::new(AggregationExpr {
            field: None,
            function: &function::COUNT,
        })
    }
}

impl<M: Model, A> Field<M, A> {
    pub fn aggregate(&self) -> FieldAggregation<A> {
        FieldAggregation {
            field: self.to_ref(),
            _attribute: PhantomData,
        }
    }
}

/// Aggregations available on a field holding `A`
#[derive(Debug, Clone)]
pub struct FieldAggregation<A> {
    field: FieldRef,
    _attribute: PhantomData<fn() -> A>,
}

impl<A> FieldAggregation<A> {
    fn with<R>(&self, function: &'static Function) -> Aggregation<R> {
        Aggregation::new(AggregationExpr {
            field: Some(self.field.clone()),
            function,
        })
    }

    /// Number of non-null values
    pub fn count(&self) -> Aggregation<i64> {
        self.with(&function::COUNT)
    }

    pub fn min(&self) -> Aggregation<A> {
        self.with(&function::MIN)
    }

    pub fn max(&self) -> Aggregation<A> {
        self.with(&function::MAX)
    }
}

impl<A: Numeric> FieldAggregation<A> {
    pub fn sum(&self) -> Aggregation<f64> {
        self.with(&function::SUM)
    }

    pub fn average(&self) -> Aggregation<f64> {
        self.with(&function::AVERAGE)
    }

    /// Bitwise and of all values; postgres and mysql only
    pub fn and(&self) -> Aggregation<A> {
        self.with(&function::BIT_AND_AGGREGATION)
    }

    /// Bitwise or of all values; postgres and mysql only
    pub fn or(&self) -> Aggregation<A> {
        self.with(&function::BIT_OR_AGGREGATION)
    }
}

impl<A: Boolean> FieldAggregation<A> {
    /// True if every value is true; not available on sqlserver
    pub fn all(&self) -> Aggregation<bool> {
        self.with(&function::ALL)
    }

    pub fn any(&self) -> Aggregation<bool> {
        self.with(&function::ANY)
    }

    pub fn none(&self) -> Aggregation<bool> {
        self.with(&function::NONE)
    }
}

#[doc(hidden)]
#[derive(Debug, Clone, PartialEq)]
pub enum HavingOperand {
    Value(Value),
    Aggregation(AggregationExpr),
}

/// Right-hand side of an aggregation comparison: a value of the result type or another
/// aggregation with the same result type
pub trait IntoHavingOperand<A> {
    #[doc(hidden)]
    fn into_having_operand(self) -> HavingOperand;
}

impl<A: ValueType> IntoHavingOperand<A> for A {
    fn into_having_operand(self) -> HavingOperand {
        HavingOperand::Value(self.into_value())
    }
}

impl<A> IntoHavingOperand<A> for Aggregation<A> {
    fn into_having_operand(self) -> HavingOperand {
        HavingOperand::Aggregation(self.expression)
    }
}

impl<A> IntoHavingOperand<A> for &Aggregation<A> {
    fn into_having_operand(self) -> HavingOperand {
        HavingOperand::Aggregation(self.expression.clone())
    }
}

#[derive(Debug, Clone)]
enum AggregationNode {
    Compare {
        aggregation: AggregationExpr,
        operator: &'static SqlOperator,
        operand: HavingOperand,
    },
    Connection {
        connector: &'static SqlOperator,
        conditions: Vec<AggregationNode>,
    },
    Not {
        conditions: Vec<AggregationNode>,
    },
}

impl AggregationNode {
    fn to_sql(&self, context: &QueryContext) -> Result<(String, Vec<Value>), CqlError> {
        match self {
            AggregationNode::Compare {
                aggregation,
                operator,
                operand,
            } => {
                let (mut sql, mut values) = aggregation.to_sql(context)?;
                match operand {
                    HavingOperand::Value(value) => {
                        sql.push_str(&format!(" {operator} ?"));
                        values.push(value.clone());
                    }
                    HavingOperand::Aggregation(other) => {
                        let (other_sql, other_values) =
                            other.to_sql(context).map_err(|e| e.with_operator(operator.name))?;
                        sql.push_str(&format!(" {operator} {other_sql}"));
                        values.extend(other_values);
                    }
                }
                Ok((sql, values))
            }
            AggregationNode::Connection {
                connector,
                conditions,
            } => {
                let (parts, values) = render_all(context, conditions)?;
                let sql = match parts.len() {
                    0 => String::new(),
                    1 => parts.concat(),
                    _ => format!("({})", parts.join(&format!(" {connector} "))),
                };
                Ok((sql, values))
            }
            AggregationNode::Not { conditions } => {
                let (parts, values) = render_all(context, conditions)?;
                if parts.is_empty() {
                    return Err(CqlError::EmptyConditions {
                        connector: sql::NOT.name,
                        model: String::new(),
                    });
                }
                Ok((format!("NOT ({})", parts.join(" AND ")), values))
            }
        }
    }
}

fn render_all(
    context: &QueryContext,
    conditions: &[AggregationNode],
) -> Result<(Vec<String>, Vec<Value>), CqlError> {
    let mut parts = Vec::with_capacity(conditions.len());
    let mut values = Vec::new();
    for condition in conditions {
        let (sql, condition_values) = condition.to_sql(context)?;
        if !sql.is_empty() {
            parts.push(sql);
            values.extend(condition_values);
        }
    }
    Ok((parts, values))
}

/// Condition over aggregations, usable in HAVING
#[derive(Debug, Clone)]
pub struct AggregationCondition {
    node: AggregationNode,
}

impl AggregationCondition {
    pub(crate) fn to_sql(&self, context: &QueryContext) -> Result<(String, Vec<Value>), CqlError> {
        self.node.to_sql(context)
    }
}

fn nodes(conditions: Vec<AggregationCondition>) -> Vec<AggregationNode> {
    conditions.into_iter().map(|condition| condition.node).collect()
}

pub fn and_having(conditions: Vec<AggregationCondition>) -> AggregationCondition {
    AggregationCondition {
        node: AggregationNode::Connection {
            connector: &sql::AND,
            conditions: nodes(conditions),
        },
    }
}

pub fn or_having(conditions: Vec<AggregationCondition>) -> AggregationCondition {
    AggregationCondition {
        node: AggregationNode::Connection {
            connector: &sql::OR,
            conditions: nodes(conditions),
        },
    }
}

/// Fails with `EmptyConditions` when `conditions` is empty
pub fn not_having(conditions: Vec<AggregationCondition>) -> AggregationCondition {
    AggregationCondition {
        node: AggregationNode::Not {
            conditions: nodes(conditions),
        },
    }
}

/// Expression that can be selected by a grouped query, with result type `A`
pub trait Selectable<A> {
    #[doc(hidden)]
    fn selection(self) -> Selection;
}

#[doc(hidden)]
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Field(FieldRef),
    Aggregation(AggregationExpr),
}

impl Selection {
    pub(crate) fn to_sql(&self, context: &QueryContext) -> Result<(String, Vec<Value>), CqlError> {
        match self {
            Selection::Field(field) => context.field_sql(field),
            Selection::Aggregation(aggregation) => aggregation.to_sql(context),
        }
    }
}

impl<M: Model, A> Selectable<A> for Field<M, A> {
    fn selection(self) -> Selection {
        Selection::Field(self.to_ref())
    }
}

impl<M: Model, A> Selectable<A> for &Field<M, A> {
    fn selection(self) -> Selection {
        Selection::Field(self.to_ref())
    }
}

impl<A> Selectable<A> for Aggregation<A> {
    fn selection(self) -> Selection {
        Selection::Aggregation(self.expression)
    }
}
