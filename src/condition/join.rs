//! Join conditions over single-valued relations.
//!
//! A join registers the related table under an alias derived from the relation name and
//! renders `<kind> <table> <alias> ON <alias>.<t2 column> = <parent>.<t1 column>`, followed
//! by the join's own where conditions and the soft-delete filter of the joined table.
//! Joins that only preload are LEFT JOINs, joins that filter are INNER JOINs.

use crate::condition::context::{Join, JoinKind, QueryContext};
use crate::condition::table::Table;
use crate::condition::where_condition::WhereNode;
use crate::condition::{Condition, Node};
use crate::error::CqlError;
use crate::model::{Model, ModelRef};
use std::fmt;
use std::marker::PhantomData;

#[derive(Debug, Clone)]
pub(crate) struct JoinNode {
    pub relation: &'static str,
    pub t1_column: &'static str,
    pub t2_column: &'static str,
    pub t2: ModelRef,
    pub t2_preload: bool,
    pub conditions: Vec<Node>,
}

impl JoinNode {
    /// The join, or one nested below it, asks for related objects to be loaded
    pub(crate) fn makes_preload(&self) -> bool {
        self.t2_preload
            || self.conditions.iter().any(|node| match node {
                Node::Join(join) => join.makes_preload(),
                Node::Preload(_) => true,
                _ => false,
            })
    }

    /// The join, or one nested below it, filters rows
    pub(crate) fn makes_filter(&self) -> bool {
        self.conditions.iter().any(|node| match node {
            Node::Where(_) => true,
            Node::Join(join) => join.makes_filter(),
            _ => false,
        })
    }

    fn wheres(&self) -> impl Iterator<Item = &WhereNode> {
        self.conditions.iter().filter_map(|node| match node {
            Node::Where(condition) => Some(condition),
            _ => None,
        })
    }

    pub(crate) fn apply(&self, context: &mut QueryContext, t1: &Table) -> Result<(), CqlError> {
        let t2 = t1.deliver(self.t2, self.relation);
        // registered first: the join's conditions may refer to it
        context.registry.add(t2.clone());

        let mut on = format!("{} = {}", t2.column(self.t2_column), t1.column(self.t1_column));
        let mut values = Vec::new();

        for condition in self.wheres() {
            let (sql, condition_values) = condition.to_sql(context, &t2)?;
            if !sql.is_empty() {
                on.push_str(" AND ");
                on.push_str(&sql);
                values.extend(condition_values);
            }
        }

        if t2.model.has_soft_delete() && !self.wheres().any(WhereNode::affects_deleted_at) {
            on.push_str(&format!(" AND {} IS NULL", t2.column(t2.model.soft_delete)));
        }

        let makes_preload = self.makes_preload();
        let kind = if makes_preload && !self.makes_filter() {
            JoinKind::Left
        } else {
            JoinKind::Inner
        };

        context.add_join(Join {
            kind,
            table: t2.clone(),
            on,
            values,
        });

        if makes_preload && !t1.is_initial() {
            context.preload_columns(t1, t1.model.columns);
        }
        if self.t2_preload {
            context.preload_columns(&t2, t2.model.columns);
        }

        for node in &self.conditions {
            match node {
                Node::Where(_) => {}
                Node::Preload(columns) => context.preload_columns(&t2, columns.as_slice()),
                Node::Join(join) => join.apply(context, &t2)?,
                Node::CollectionPreload(collection) => {
                    return Err(CqlError::UnsupportedRelation {
                        model: t2.model.name.to_string(),
                        field: collection.relation().to_string(),
                    })
                }
                Node::Invalid(err) => return Err(err.clone()),
            }
        }

        Ok(())
    }
}

/// Join from model `T1` to a related model
pub struct JoinCondition<T1> {
    pub(crate) node: JoinNode,
    _model: PhantomData<fn() -> T1>,
}

impl<T1> Clone for JoinCondition<T1> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            _model: PhantomData,
        }
    }
}

impl<T1> fmt::Debug for JoinCondition<T1> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("JoinCondition").field(&self.node).finish()
    }
}

impl<T1> JoinCondition<T1> {
    /// Also load the related object into the results
    pub fn preload(mut self) -> Self {
        self.node.t2_preload = true;
        self
    }

    pub(crate) fn makes_preload(&self) -> bool {
        self.node.makes_preload()
    }

    pub(crate) fn makes_filter(&self) -> bool {
        self.node.makes_filter()
    }
}

/// Single-valued relation from `T1` to `T2` (belongs-to or has-one).
///
/// `t1_column` and `t2_column` are the columns compared by the join: for a belongs-to
/// relation the foreign key of `T1` and the primary key of `T2`, for has-one the reverse.
#[derive(Debug)]
pub struct Relation<T1, T2> {
    name: &'static str,
    t1_column: &'static str,
    t2_column: &'static str,
    _models: PhantomData<fn() -> (T1, T2)>,
}

impl<T1, T2> Clone for Relation<T1, T2> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T1, T2> Copy for Relation<T1, T2> {}

impl<T1, T2> Relation<T1, T2> {
    pub const fn new(name: &'static str, t1_column: &'static str, t2_column: &'static str) -> Self {
        Self {
            name,
            t1_column,
            t2_column,
            _models: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T1: Model, T2: Model> Relation<T1, T2> {
    /// Join the related model, filtered by `conditions` (which may hold nested joins and
    /// preloads of `T2`)
    pub fn join(&self, conditions: Vec<Condition<T2>>) -> JoinCondition<T1> {
        JoinCondition {
            node: JoinNode {
                relation: self.name,
                t1_column: self.t1_column,
                t2_column: self.t2_column,
                t2: ModelRef::of::<T2>(),
                t2_preload: false,
                conditions: conditions.into_iter().map(|condition| condition.node).collect(),
            },
            _model: PhantomData,
        }
    }

    /// Join the related model only to load it
    pub fn preload(&self) -> JoinCondition<T1> {
        self.join(Vec::new()).preload()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions;
    use crate::dialect::Dialect;
    use crate::test_support::models::{Brand, Company, Employee, Phone, Sale, Seller};

    fn compile<M: Model>(dialect: Dialect, conditions: Vec<Condition<M>>) -> Result<String, CqlError> {
        let mut context = QueryContext::new::<M>(dialect);
        context.apply(&conditions)?;
        Ok(context.select_sql().0)
    }

    #[test]
    fn test_filtering_join_is_inner() {
        let sql = compile(
            Dialect::Postgres,
            conditions![Seller::COMPANY.join(conditions![Company::NAME.is().eq("acme")])],
        )
        .unwrap();

        assert_eq!(
            sql,
            "SELECT sellers.* FROM sellers INNER JOIN companies company ON company.id = sellers.company_id AND company.name = ? AND company.deleted_at IS NULL WHERE sellers.deleted_at IS NULL"
        );
    }

    #[test]
    fn test_preload_only_join_is_left() {
        let sql = compile(Dialect::Postgres, conditions![Seller::COMPANY.preload()]).unwrap();

        assert_eq!(
            sql,
            "SELECT sellers.*, company.id AS \"company__id\", company.created_at AS \"company__created_at\", company.updated_at AS \"company__updated_at\", company.deleted_at AS \"company__deleted_at\", company.name AS \"company__name\" FROM sellers LEFT JOIN companies company ON company.id = sellers.company_id AND company.deleted_at IS NULL WHERE sellers.deleted_at IS NULL"
        );
    }

    #[test]
    fn test_filter_and_preload_is_inner() {
        let sql = compile(
            Dialect::SQLite,
            conditions![Seller::COMPANY
                .join(conditions![Company::NAME.is().eq("acme")])
                .preload()],
        )
        .unwrap();
        assert!(sql.contains("INNER JOIN companies company"));
        assert!(sql.contains("company.name AS \"company__name\""));
    }

    #[test]
    fn test_deep_preload_loads_intermediate_tables() {
        let sql = compile(
            Dialect::Postgres,
            conditions![Sale::SELLER.join(conditions![Seller::COMPANY.preload()])],
        )
        .unwrap();

        assert!(sql.contains("LEFT JOIN sellers seller ON seller.id = sales.seller_id"));
        assert!(sql.contains("LEFT JOIN companies seller__company ON seller__company.id = seller.company_id"));
        assert!(sql.contains("seller.name AS \"seller__name\""));
        assert!(sql.contains("seller__company.name AS \"seller__company__name\""));
    }

    #[test]
    fn test_three_levels_preload_loads_every_intermediate_table() {
        let sql = compile(
            Dialect::Postgres,
            conditions![Employee::BOSS.join(conditions![Employee::BOSS.join(conditions![
                Employee::BOSS.preload()
            ])])],
        )
        .unwrap();

        assert!(sql.contains("LEFT JOIN employees boss ON boss.id = employees.boss_id"));
        assert!(sql.contains("LEFT JOIN employees boss__boss ON boss__boss.id = boss.boss_id"));
        assert!(sql.contains("LEFT JOIN employees boss__boss__boss ON boss__boss__boss.id = boss__boss.boss_id"));
        assert!(!sql.contains("INNER JOIN"));
        assert!(sql.contains("boss.name AS \"boss__name\""));
        assert!(sql.contains("boss__boss.name AS \"boss__boss__name\""));
        assert!(sql.contains("boss__boss__boss.name AS \"boss__boss__boss__name\""));
    }

    #[test]
    fn test_deleted_at_condition_removes_join_filter() {
        let sql = compile(
            Dialect::Postgres,
            conditions![Seller::COMPANY.join(conditions![Company::DELETED_AT.is().not_null()])],
        )
        .unwrap();
        assert!(sql.contains("ON company.id = sellers.company_id AND company.deleted_at IS NOT NULL WHERE"));
        assert!(sql.ends_with("WHERE sellers.deleted_at IS NULL"));
    }

    #[test]
    fn test_models_without_soft_delete_have_no_join_filter() {
        let sql = compile(
            Dialect::MySQL,
            conditions![Phone::BRAND.join(conditions![Brand::NAME.is().eq("x")])],
        )
        .unwrap();
        assert_eq!(
            sql,
            "SELECT phones.* FROM phones INNER JOIN brands brand ON brand.id = phones.brand_id AND brand.name = ?"
        );
    }

    #[test]
    fn test_self_join_needs_appearance() {
        // root conditions render against the root table, whatever the joins
        let sql = compile(
            Dialect::Postgres,
            conditions![Employee::BOSS.join(vec![]), Employee::NAME.is().eq("john")],
        )
        .unwrap();
        assert!(sql.contains("WHERE employees.name = ?"));

        let err = compile(
            Dialect::Postgres,
            conditions![Employee::BOSS.join(conditions![Employee::NAME.is().eq(Employee::NAME)])],
        )
        .unwrap_err();
        assert!(matches!(err.root_cause(), CqlError::AppearanceMustBeSelected { .. }));

        let sql = compile(
            Dialect::Postgres,
            conditions![Employee::BOSS.join(conditions![Employee::NAME
                .is()
                .eq(Employee::NAME.appearance(0))])],
        )
        .unwrap();
        assert!(sql.contains("boss.name = employees.name"));
    }

    #[test]
    fn test_repeated_model_aliases() {
        let sql = compile(
            Dialect::Postgres,
            conditions![Sale::PRODUCT.join(vec![]), Sale::SELLER.join(vec![])],
        )
        .unwrap();
        assert!(sql.contains("INNER JOIN products product ON product.id = sales.product_id AND product.deleted_at IS NULL"));
        assert!(sql.contains("INNER JOIN sellers seller ON seller.id = sales.seller_id AND seller.deleted_at IS NULL"));
    }
}
