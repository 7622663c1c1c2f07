//! Operators applied to a field inside a where condition.
//!
//! Value operators render `column OP ? [OP2 ? ...]`: BETWEEN is `BETWEEN ?` followed by
//! `AND ?`, LIKE may be followed by `ESCAPE ?`. Predicate operators render
//! `column PREDICATE` and bind nothing. Any operand may be another field, rendered as
//! its column instead of a placeholder.

use crate::condition::context::QueryContext;
use crate::condition::field::{IntoOperand, IntoValue, Operand};
use crate::dialect::Dialect;
use crate::error::CqlError;
use crate::sql::operator::{self as sql, SqlOperator};
use sea_query::Value;
use std::marker::PhantomData;

/// The SQL operator of one operation, fixed or chosen by dialect
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OperatorSql {
    Fixed(&'static SqlOperator),
    ByDialect(&'static [(Dialect, &'static SqlOperator)]),
}

impl OperatorSql {
    fn resolve(self, dialect: Dialect) -> Result<&'static SqlOperator, CqlError> {
        let operator = match self {
            OperatorSql::Fixed(operator) => operator,
            OperatorSql::ByDialect(operators) => {
                let found = operators.iter().find(|(candidate, _)| *candidate == dialect);
                match found {
                    Some((_, operator)) => operator,
                    None => {
                        let name = operators.first().map_or("", |(_, operator)| operator.name);
                        return Err(CqlError::unsupported(dialect).with_operator(name));
                    }
                }
            }
        };

        if operator.supports(dialect) {
            Ok(operator)
        } else {
            Err(CqlError::unsupported(dialect).with_operator(operator.name))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub operator: OperatorSql,
    pub operand: Operand,
}

/// Type-erased operator tree node
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorNode {
    Value {
        operations: Vec<Operation>,
        /// Keyword placed before the whole expression on some dialects
        modifier: &'static [(Dialect, &'static str)],
    },
    Predicate(&'static str),
}

impl OperatorNode {
    /// Render the operator applied to `column`, whose own values come first.
    pub(crate) fn to_sql(
        &self,
        context: &QueryContext,
        column: String,
        column_values: Vec<Value>,
    ) -> Result<(String, Vec<Value>), CqlError> {
        let mut sql = column;
        let mut values = column_values;

        match self {
            OperatorNode::Predicate(predicate) => {
                sql.push(' ');
                sql.push_str(predicate);
            }
            OperatorNode::Value {
                operations,
                modifier,
            } => {
                for operation in operations {
                    let operator = operation.operator.resolve(context.dialect)?;

                    match &operation.operand {
                        Operand::Value(value) => {
                            sql.push_str(&format!(" {operator} ?"));
                            values.push(value.clone());
                        }
                        Operand::List(list) if list.is_empty() => {
                            sql.push_str(&format!(" {operator} (NULL)"));
                        }
                        Operand::List(list) => {
                            let placeholders = vec!["?"; list.len()].join(", ");
                            sql.push_str(&format!(" {operator} ({placeholders})"));
                            values.extend(list.iter().cloned());
                        }
                        Operand::Field(field) => {
                            let (field_sql, field_values) = context
                                .field_sql(field)
                                .map_err(|e| e.with_operator(operator.name))?;
                            sql.push_str(&format!(" {operator} {field_sql}"));
                            values.extend(field_values);
                        }
                    }
                }

                let modifier = modifier
                    .iter()
                    .find(|(dialect, _)| *dialect == context.dialect);
                if let Some((_, modifier)) = modifier {
                    sql = format!("{modifier} {sql}");
                }
            }
        }

        Ok((sql, values))
    }
}

/// Operator usable on attributes of type `A`
#[derive(Debug, Clone, PartialEq)]
pub struct Operator<A> {
    pub(crate) node: OperatorNode,
    _marker: PhantomData<fn() -> A>,
}

impl<A> Operator<A> {
    pub(crate) fn from_node(node: OperatorNode) -> Self {
        Self {
            node,
            _marker: PhantomData,
        }
    }

    pub(crate) fn value(operator: &'static SqlOperator, operand: Operand) -> Self {
        Self::from_node(OperatorNode::Value {
            operations: vec![Operation {
                operator: OperatorSql::Fixed(operator),
                operand,
            }],
            modifier: &[],
        })
    }

    pub(crate) fn predicate(predicate: &'static str) -> Self {
        Self::from_node(OperatorNode::Predicate(predicate))
    }

    fn and_then(mut self, operator: &'static SqlOperator, operand: Operand) -> Self {
        if let OperatorNode::Value { operations, .. } = &mut self.node {
            operations.push(Operation {
                operator: OperatorSql::Fixed(operator),
                operand,
            });
        }
        self
    }

    /// Character used to escape `%` and `_` in a LIKE pattern
    pub fn escape(self, escape: char) -> Self {
        self.and_then(&sql::ESCAPE, Operand::Value(Value::from(escape.to_string())))
    }
}

// Comparison Operators
// ref:
// - MySQL: https://dev.mysql.com/doc/refman/8.0/en/comparison-operators.html
// - PostgreSQL: https://www.postgresql.org/docs/current/functions-comparison.html
// - SQLServer: https://learn.microsoft.com/en-us/sql/t-sql/language-elements/comparison-operators-transact-sql
// - SQLite: https://www.sqlite.org/lang_expr.html

/// EqualTo; null values are never equal, use `null` instead
pub fn eq<A>(value: impl IntoOperand<A>) -> Operator<A> {
    Operator::value(&sql::EQ, value.into_operand())
}

pub fn not_eq<A>(value: impl IntoOperand<A>) -> Operator<A> {
    Operator::value(&sql::NOT_EQ, value.into_operand())
}

pub fn lt<A>(value: impl IntoOperand<A>) -> Operator<A> {
    Operator::value(&sql::LT, value.into_operand())
}

pub fn lt_or_eq<A>(value: impl IntoOperand<A>) -> Operator<A> {
    Operator::value(&sql::LT_OR_EQ, value.into_operand())
}

pub fn gt<A>(value: impl IntoOperand<A>) -> Operator<A> {
    Operator::value(&sql::GT, value.into_operand())
}

pub fn gt_or_eq<A>(value: impl IntoOperand<A>) -> Operator<A> {
    Operator::value(&sql::GT_OR_EQ, value.into_operand())
}

/// Equivalent to `v1 <= value <= v2`
pub fn between<A>(v1: impl IntoOperand<A>, v2: impl IntoOperand<A>) -> Operator<A> {
    Operator::value(&sql::BETWEEN, v1.into_operand()).and_then(&sql::AND, v2.into_operand())
}

/// Equivalent to `NOT (v1 <= value <= v2)`
pub fn not_between<A>(v1: impl IntoOperand<A>, v2: impl IntoOperand<A>) -> Operator<A> {
    Operator::value(&sql::NOT_BETWEEN, v1.into_operand()).and_then(&sql::AND, v2.into_operand())
}

pub fn null<A>() -> Operator<A> {
    Operator::predicate("IS NULL")
}

pub fn not_null<A>() -> Operator<A> {
    Operator::predicate("IS NOT NULL")
}

/// Not equal, treating null as a comparable value
pub fn distinct<A>(value: impl IntoOperand<A>) -> Operator<A> {
    Operator::from_node(OperatorNode::Value {
        operations: vec![Operation {
            operator: OperatorSql::ByDialect(&sql::IS_DISTINCT_BY_DIALECT),
            operand: value.into_operand(),
        }],
        modifier: &sql::IS_DISTINCT_MODIFIER,
    })
}

/// Equal, treating null as a comparable value
pub fn not_distinct<A>(value: impl IntoOperand<A>) -> Operator<A> {
    Operator::from_node(OperatorNode::Value {
        operations: vec![Operation {
            operator: OperatorSql::ByDialect(&sql::IS_NOT_DISTINCT_BY_DIALECT),
            operand: value.into_operand(),
        }],
        modifier: &[],
    })
}

pub fn in_values<A, V: IntoValue<A>>(values: impl IntoIterator<Item = V>) -> Operator<A> {
    let values = values.into_iter().map(IntoValue::into_value_of).collect();
    Operator::value(&sql::ARRAY_IN, Operand::List(values))
}

pub fn not_in<A, V: IntoValue<A>>(values: impl IntoIterator<Item = V>) -> Operator<A> {
    let values = values.into_iter().map(IntoValue::into_value_of).collect();
    Operator::value(&sql::ARRAY_NOT_IN, Operand::List(values))
}

// Pattern Matching

/// `_` matches any single character, `%` any sequence of characters.
///
/// Case sensitivity depends on the database.
pub fn like<A>(pattern: &str) -> Operator<A> {
    Operator::value(&sql::LIKE, Operand::Value(Value::from(pattern)))
}

pub(crate) fn dialect_value<A>(operator: &'static SqlOperator, pattern: &str) -> Operator<A> {
    Operator::value(operator, Operand::Value(Value::from(pattern)))
}
