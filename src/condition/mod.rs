//! Condition tree.
//!
//! Every statement is described by a list of [`Condition`]s over its root model. A
//! condition is a where filter, a join (which carries conditions of the joined model),
//! an attribute preload or a collection preload. Applying a condition to a
//! [`QueryContext`] renders it into the context's clauses; errors are returned, never
//! panicked, and invalid conditions built by constructors only fail once applied.

pub mod aggregation;
pub mod context;
pub mod field;
pub mod field_is;
pub mod join;
pub mod operator;
pub mod preload;
pub mod table;
pub mod where_condition;

use crate::error::CqlError;
use context::QueryContext;
use join::{JoinCondition, JoinNode};
use preload::CollectionLoad;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use table::Table;
use where_condition::{WhereCondition, WhereNode};

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Where(WhereNode),
    Join(JoinNode),
    /// Columns of the table the node applies to
    Preload(Vec<String>),
    CollectionPreload(Arc<dyn CollectionLoad>),
    Invalid(CqlError),
}

impl Node {
    /// Render the node into `context`, applied to `table`, the root table.
    pub(crate) fn apply(&self, context: &mut QueryContext, table: &Table) -> Result<(), CqlError> {
        match self {
            Node::Where(condition) => {
                let (sql, values) = condition.to_sql(context, table)?;
                if !sql.is_empty() {
                    context.wheres.push(sql, values);
                }
                if condition.affects_deleted_at() {
                    context.unscoped = true;
                }
                Ok(())
            }
            Node::Join(join) => join.apply(context, table),
            Node::Preload(columns) => {
                context.preload_columns(table, columns.as_slice());
                Ok(())
            }
            Node::CollectionPreload(collection) => {
                if !table.is_initial() {
                    return Err(CqlError::UnsupportedRelation {
                        model: table.model.name.to_string(),
                        field: collection.relation().to_string(),
                    });
                }
                context.collection_loads.push(Arc::clone(collection));
                Ok(())
            }
            Node::Invalid(err) => Err(err.clone()),
        }
    }

    pub(crate) fn is_collection_preload(&self) -> bool {
        matches!(self, Node::CollectionPreload(_))
    }
}

/// Any condition over model `M`; build lists of them with [`conditions!`](crate::conditions)
pub struct Condition<M> {
    pub(crate) node: Node,
    _model: PhantomData<fn() -> M>,
}

impl<M> Condition<M> {
    pub(crate) fn from_node(node: Node) -> Self {
        Self {
            node,
            _model: PhantomData,
        }
    }
}

impl<M> Clone for Condition<M> {
    fn clone(&self) -> Self {
        Self::from_node(self.node.clone())
    }
}

impl<M> fmt::Debug for Condition<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Condition").field(&self.node).finish()
    }
}

impl<M> From<WhereCondition<M>> for Condition<M> {
    fn from(condition: WhereCondition<M>) -> Self {
        Self::from_node(Node::Where(condition.node))
    }
}

impl<M> From<JoinCondition<M>> for Condition<M> {
    fn from(condition: JoinCondition<M>) -> Self {
        Self::from_node(Node::Join(condition.node))
    }
}
