//! Attribute preloads and has-many collections.
//!
//! Collections never join: filters over them render as correlated `EXISTS` sub-queries,
//! and loading them runs one extra select over the related model once the parents are
//! known.

use crate::condition::field::{FieldRef, Operand};
use crate::condition::join::JoinCondition;
use crate::condition::operator::Operator;
use crate::condition::where_condition::{WhereCondition, WhereNode};
use crate::condition::{Condition, Node};
use crate::error::CqlError;
use crate::executor::Executor;
use crate::model::{Model, ModelRef};
use crate::query::Query;
use crate::sql::operator as sql;
use sea_query::Value;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Projection of a model's columns into the results
pub struct Preload;

impl Preload {
    /// Every column of `M`
    pub fn all<M: Model>() -> Condition<M> {
        Condition::from_node(Node::Preload(
            M::COLUMNS.iter().map(|column| column.to_string()).collect(),
        ))
    }

    /// Only the columns of `fields`
    pub fn fields<M: Model>(fields: Vec<FieldRef>) -> Condition<M> {
        Condition::from_node(Node::Preload(
            fields.iter().map(FieldRef::column_name).collect(),
        ))
    }
}

/// Loads the children of a collection relation into already fetched parents
pub(crate) trait CollectionLoad: fmt::Debug + Send + Sync {
    fn relation(&self) -> &'static str;

    /// `parents` is the `Vec` of parent models returned by the statement
    fn load(&self, executor: &dyn Executor, parents: &mut dyn Any) -> Result<(), CqlError>;
}

/// Has-many relation from `T1` to `T2`.
///
/// `t1_column` of the parent is compared with `t2_column` of the children; the key
/// functions read those columns from loaded objects and `attach` stores the children
/// into their parent.
pub struct Collection<T1, T2> {
    name: &'static str,
    t1_column: &'static str,
    t2_column: &'static str,
    parent_key: fn(&T1) -> Value,
    child_key: fn(&T2) -> Value,
    attach: fn(&mut T1, Vec<T2>),
}

impl<T1, T2> Clone for Collection<T1, T2> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T1, T2> Copy for Collection<T1, T2> {}

impl<T1, T2> fmt::Debug for Collection<T1, T2> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("t1_column", &self.t1_column)
            .field("t2_column", &self.t2_column)
            .finish()
    }
}

impl<T1, T2> Collection<T1, T2> {
    pub const fn new(
        name: &'static str,
        t1_column: &'static str,
        t2_column: &'static str,
        parent_key: fn(&T1) -> Value,
        child_key: fn(&T2) -> Value,
        attach: fn(&mut T1, Vec<T2>),
    ) -> Self {
        Self {
            name,
            t1_column,
            t2_column,
            parent_key,
            child_key,
            attach,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T1: Model, T2: Model> Collection<T1, T2> {
    fn exists(&self, conditions: Vec<WhereNode>) -> WhereNode {
        WhereNode::Exists {
            relation: self.name,
            t1_column: self.t1_column,
            t2_column: self.t2_column,
            t2: ModelRef::of::<T2>(),
            conditions,
        }
    }

    /// At least one related object meets the conditions
    pub fn any(&self, conditions: Vec<WhereCondition<T2>>) -> WhereCondition<T1> {
        WhereCondition::from_node(self.exists(WhereCondition::nodes(conditions)))
    }

    /// No related object meets the conditions
    pub fn none(&self, conditions: Vec<WhereCondition<T2>>) -> WhereCondition<T1> {
        WhereCondition::from_node(WhereNode::Not {
            conditions: vec![self.exists(WhereCondition::nodes(conditions))],
        })
    }

    /// Every related object meets the conditions (true when there is none)
    pub fn all(&self, conditions: Vec<WhereCondition<T2>>) -> WhereCondition<T1> {
        let failing = WhereNode::Not {
            conditions: WhereCondition::nodes(conditions),
        };
        WhereCondition::from_node(WhereNode::Not {
            conditions: vec![self.exists(vec![failing])],
        })
    }

}

impl<T1: Model, T2: Model + Clone> Collection<T1, T2> {
    /// Load the related objects into each result.
    ///
    /// `nested` may only preload relations of `T2`; a nested join that filters or
    /// does not preload fails with `OnlyPreloadsAllowed`.
    pub fn preload(&self, nested: Vec<JoinCondition<T2>>) -> Condition<T1> {
        if nested.iter().any(|join| !join.makes_preload() || join.makes_filter()) {
            return Condition::from_node(Node::Invalid(CqlError::OnlyPreloadsAllowed {
                model: ModelRef::of::<T1>().name.to_string(),
                field: self.name.to_string(),
            }));
        }

        Condition::from_node(Node::CollectionPreload(Arc::new(CollectionPreload {
            collection: *self,
            nested,
        })))
    }
}

struct CollectionPreload<T1, T2> {
    collection: Collection<T1, T2>,
    nested: Vec<JoinCondition<T2>>,
}

impl<T1, T2> fmt::Debug for CollectionPreload<T1, T2> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionPreload")
            .field("collection", &self.collection)
            .field("nested", &self.nested)
            .finish()
    }
}

impl<T1: Model, T2: Model + Clone> CollectionLoad for CollectionPreload<T1, T2> {
    fn relation(&self) -> &'static str {
        self.collection.name
    }

    fn load(&self, executor: &dyn Executor, parents: &mut dyn Any) -> Result<(), CqlError> {
        let Some(parents) = parents.downcast_mut::<Vec<T1>>() else {
            return Err(CqlError::UnsupportedRelation {
                model: ModelRef::of::<T1>().name.to_string(),
                field: self.collection.name.to_string(),
            });
        };
        if parents.is_empty() {
            return Ok(());
        }

        let mut seen = HashSet::new();
        let keys: Vec<Value> = parents
            .iter()
            .map(self.collection.parent_key)
            .filter(|key| seen.insert(key.clone()))
            .collect();

        let in_parents: Operator<()> = Operator::value(&sql::ARRAY_IN, Operand::List(keys));
        let mut conditions: Vec<Condition<T2>> = self
            .nested
            .iter()
            .cloned()
            .map(Condition::from)
            .collect();
        conditions.push(Condition::from(WhereCondition::<T2>::from_node(WhereNode::Field {
            field: FieldRef::column::<T2>(self.collection.t2_column),
            operator: in_parents.node,
        })));

        let children = Query::new(executor, conditions).find()?;
        log::debug!(
            "loaded {} {} for {} parents",
            children.len(),
            self.collection.name,
            parents.len()
        );

        let mut groups: HashMap<Value, Vec<T2>> = HashMap::new();
        for child in children {
            groups.entry((self.collection.child_key)(&child)).or_default().push(child);
        }

        // parents sharing a key each receive their own copy of the children
        for parent in parents.iter_mut() {
            let children = groups
                .get(&(self.collection.parent_key)(parent))
                .cloned()
                .unwrap_or_default();
            (self.collection.attach)(parent, children);
        }

        Ok(())
    }
}
