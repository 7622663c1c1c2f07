//! Where conditions: field comparisons, connectors and raw SQL.
//!
//! A [`WhereCondition`] always renders against one table occurrence, the one of the
//! model it is typed on. Inside a join that is the joined table, at the root it is the
//! statement's root table.

use crate::condition::context::QueryContext;
use crate::condition::field::{FieldRef, Operand};
use crate::condition::operator::OperatorNode;
use crate::condition::table::Table;
use crate::error::CqlError;
use crate::model::{Model, ModelRef};
use crate::sql::operator::{self as sql, SqlOperator};
use sea_query::Value;
use std::fmt;
use std::marker::PhantomData;

#[derive(Debug, Clone)]
pub(crate) enum WhereNode {
    Field {
        field: FieldRef,
        operator: OperatorNode,
    },
    /// Children joined by a connector
    Connection {
        connector: &'static SqlOperator,
        conditions: Vec<WhereNode>,
    },
    /// `NOT (<children joined by AND>)`
    Not { conditions: Vec<WhereNode> },
    /// Correlated sub-query over a collection relation
    Exists {
        relation: &'static str,
        t1_column: &'static str,
        t2_column: &'static str,
        t2: ModelRef,
        conditions: Vec<WhereNode>,
    },
    /// Raw SQL; `%s` stands for the table the condition applies to
    Unsafe { sql: String, values: Vec<Operand> },
    Invalid(CqlError),
}

impl WhereNode {
    pub(crate) fn to_sql(
        &self,
        context: &QueryContext,
        table: &Table,
    ) -> Result<(String, Vec<Value>), CqlError> {
        match self {
            WhereNode::Field { field, operator } => {
                let (column, values) = field
                    .column_sql(context.dialect, table)
                    .map_err(|e| e.with_field(field.model.name, field.name))?;

                operator
                    .to_sql(context, column, values)
                    .map_err(|e| e.with_field(field.model.name, field.name))
            }
            WhereNode::Connection {
                connector,
                conditions,
            } => {
                if !connector.supports(context.dialect) {
                    return Err(CqlError::unsupported(context.dialect).with_operator(connector.name));
                }

                let (parts, values) = render_all(context, table, conditions)?;
                let sql = match parts.len() {
                    0 => String::new(),
                    1 => parts.concat(),
                    _ => format!("({})", parts.join(&format!(" {connector} "))),
                };
                Ok((sql, values))
            }
            WhereNode::Not { conditions } => {
                let (parts, values) = render_all(context, table, conditions)?;
                if parts.is_empty() {
                    return Err(CqlError::EmptyConditions {
                        connector: sql::NOT.name,
                        model: table.model.name.to_string(),
                    });
                }
                Ok((format!("NOT ({})", parts.join(" AND ")), values))
            }
            WhereNode::Exists {
                relation,
                t1_column,
                t2_column,
                t2,
                conditions,
            } => {
                // the sub-query table is not registered: fields inside it only see t2
                let t2_table = table.deliver(*t2, relation);
                let (parts, values) = render_all(context, &t2_table, conditions)?;

                let mut sql = format!(
                    "EXISTS (SELECT(1) FROM {} {} WHERE {} = {}",
                    t2_table.name,
                    t2_table.alias,
                    t2_table.column(t2_column),
                    table.column(t1_column),
                );
                for part in &parts {
                    sql.push_str(" AND ");
                    sql.push_str(part);
                }
                if t2.has_soft_delete() && !conditions.iter().any(WhereNode::affects_deleted_at) {
                    sql.push_str(&format!(" AND {} IS NULL", t2_table.column(t2.soft_delete)));
                }
                sql.push(')');

                Ok((sql, values))
            }
            WhereNode::Unsafe { sql, values: operands } => {
                let mut sql = sql.replace("%s", table.sql_name());
                if sql.to_uppercase().contains(" OR ") {
                    sql = format!("({sql})");
                }

                let mut values = Vec::with_capacity(operands.len());
                let mut rendered = String::with_capacity(sql.len());
                let mut operands = operands.iter();

                // field operands replace their placeholder by the column
                for c in sql.chars() {
                    if c != '?' {
                        rendered.push(c);
                        continue;
                    }
                    match operands.next() {
                        Some(Operand::Field(field)) => {
                            let (field_sql, field_values) = context.field_sql(field)?;
                            rendered.push_str(&field_sql);
                            values.extend(field_values);
                        }
                        Some(Operand::Value(value)) => {
                            rendered.push('?');
                            values.push(value.clone());
                        }
                        Some(Operand::List(list)) if list.is_empty() => rendered.push_str("(NULL)"),
                        Some(Operand::List(list)) => {
                            rendered.push_str(&format!("({})", vec!["?"; list.len()].join(", ")));
                            values.extend(list.iter().cloned());
                        }
                        None => rendered.push('?'),
                    }
                }

                Ok((rendered, values))
            }
            WhereNode::Invalid(err) => Err(err.clone()),
        }
    }

    /// True if the condition names the soft-delete column of its table, which disables
    /// the automatic deleted-row filter
    pub(crate) fn affects_deleted_at(&self) -> bool {
        match self {
            WhereNode::Field { field, .. } => field.is_soft_delete(),
            WhereNode::Connection { conditions, .. } | WhereNode::Not { conditions } => {
                conditions.iter().any(WhereNode::affects_deleted_at)
            }
            WhereNode::Exists { .. } | WhereNode::Unsafe { .. } | WhereNode::Invalid(_) => false,
        }
    }
}

/// Render each condition, skipping the ones that render nothing
fn render_all(
    context: &QueryContext,
    table: &Table,
    conditions: &[WhereNode],
) -> Result<(Vec<String>, Vec<Value>), CqlError> {
    let mut parts = Vec::with_capacity(conditions.len());
    let mut values = Vec::new();

    for condition in conditions {
        let (sql, condition_values) = condition.to_sql(context, table)?;
        if !sql.is_empty() {
            parts.push(sql);
            values.extend(condition_values);
        }
    }

    Ok((parts, values))
}

/// Condition over the attributes of model `M`
pub struct WhereCondition<M> {
    pub(crate) node: WhereNode,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for WhereCondition<M> {
    fn clone(&self) -> Self {
        Self::from_node(self.node.clone())
    }
}

impl<M> fmt::Debug for WhereCondition<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WhereCondition").field(&self.node).finish()
    }
}

impl<M> WhereCondition<M> {
    pub(crate) fn from_node(node: WhereNode) -> Self {
        Self {
            node,
            _model: PhantomData,
        }
    }

    pub(crate) fn nodes(conditions: Vec<WhereCondition<M>>) -> Vec<WhereNode> {
        conditions.into_iter().map(|condition| condition.node).collect()
    }
}

impl<M: Model> WhereCondition<M> {
    /// Raw SQL condition. `%s` is replaced by the table name (or alias) of `M`; each `?`
    /// binds the next value, or renders the column when the value is a field.
    ///
    /// The text is not checked: it must be valid SQL for the active database.
    pub fn raw(sql: &str, values: Vec<Operand>) -> Self {
        Self::from_node(WhereNode::Unsafe {
            sql: sql.to_string(),
            values,
        })
    }
}

/// Connect conditions with AND; an empty list renders nothing
pub fn and<M: Model>(conditions: Vec<WhereCondition<M>>) -> WhereCondition<M> {
    connection(&sql::AND, conditions)
}

/// Connect conditions with OR; an empty list renders nothing
pub fn or<M: Model>(conditions: Vec<WhereCondition<M>>) -> WhereCondition<M> {
    connection(&sql::OR, conditions)
}

/// Negate conditions, connected with AND.
///
/// Without any condition the result fails to compile with `EmptyConditions`.
pub fn not<M: Model>(conditions: Vec<WhereCondition<M>>) -> WhereCondition<M> {
    if conditions.is_empty() {
        return WhereCondition::from_node(WhereNode::Invalid(CqlError::EmptyConditions {
            connector: sql::NOT.name,
            model: ModelRef::of::<M>().name.to_string(),
        }));
    }

    WhereCondition::from_node(WhereNode::Not {
        conditions: WhereCondition::nodes(conditions),
    })
}

/// Condition that always holds
pub fn true_condition<M: Model>() -> WhereCondition<M> {
    WhereCondition::from_node(WhereNode::Unsafe {
        sql: "1 = 1".to_string(),
        values: Vec::new(),
    })
}

pub(crate) fn connection<M>(
    connector: &'static SqlOperator,
    conditions: Vec<WhereCondition<M>>,
) -> WhereCondition<M> {
    WhereCondition::from_node(WhereNode::Connection {
        connector,
        conditions: WhereCondition::nodes(conditions),
    })
}
