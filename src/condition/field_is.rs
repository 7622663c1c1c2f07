//! `Field::is()` and `Field::is_unsafe()`: where conditions built from a field.

use crate::condition::field::{Field, FieldRef, IntoOperand, IntoValue, UnsafeOperand};
use crate::condition::operator::{self, Operator, OperatorNode};
use crate::condition::where_condition::{WhereCondition, WhereNode};
use crate::model::Model;
use crate::sql::operator as sql;
use crate::value::{Boolean, Text};

impl<M: Model, A> Field<M, A> {
    /// Start a where condition on this field
    pub fn is(&self) -> FieldIs<M, A> {
        FieldIs { field: self.clone() }
    }

    /// Start a where condition whose operand is not checked against the field type
    pub fn is_unsafe(&self) -> UnsafeFieldIs<M> {
        UnsafeFieldIs {
            field: self.to_ref(),
            _model: std::marker::PhantomData,
        }
    }
}

/// Typed condition builder of a field
#[derive(Debug, Clone)]
pub struct FieldIs<M, A> {
    field: Field<M, A>,
}

impl<M: Model, A> FieldIs<M, A> {
    /// Condition applying any operator of the field's type
    pub fn custom(self, operator: Operator<A>) -> WhereCondition<M> {
        field_condition(self.field.to_ref(), operator.node)
    }

    pub fn eq(self, value: impl IntoOperand<A>) -> WhereCondition<M> {
        self.custom(operator::eq(value))
    }

    pub fn not_eq(self, value: impl IntoOperand<A>) -> WhereCondition<M> {
        self.custom(operator::not_eq(value))
    }

    pub fn lt(self, value: impl IntoOperand<A>) -> WhereCondition<M> {
        self.custom(operator::lt(value))
    }

    pub fn lt_or_eq(self, value: impl IntoOperand<A>) -> WhereCondition<M> {
        self.custom(operator::lt_or_eq(value))
    }

    pub fn gt(self, value: impl IntoOperand<A>) -> WhereCondition<M> {
        self.custom(operator::gt(value))
    }

    pub fn gt_or_eq(self, value: impl IntoOperand<A>) -> WhereCondition<M> {
        self.custom(operator::gt_or_eq(value))
    }

    pub fn between(self, v1: impl IntoOperand<A>, v2: impl IntoOperand<A>) -> WhereCondition<M> {
        self.custom(operator::between(v1, v2))
    }

    pub fn not_between(self, v1: impl IntoOperand<A>, v2: impl IntoOperand<A>) -> WhereCondition<M> {
        self.custom(operator::not_between(v1, v2))
    }

    pub fn distinct(self, value: impl IntoOperand<A>) -> WhereCondition<M> {
        self.custom(operator::distinct(value))
    }

    pub fn not_distinct(self, value: impl IntoOperand<A>) -> WhereCondition<M> {
        self.custom(operator::not_distinct(value))
    }

    pub fn null(self) -> WhereCondition<M> {
        self.custom(operator::null())
    }

    pub fn not_null(self) -> WhereCondition<M> {
        self.custom(operator::not_null())
    }

    pub fn in_values<V: IntoValue<A>>(self, values: impl IntoIterator<Item = V>) -> WhereCondition<M> {
        self.custom(operator::in_values(values))
    }

    pub fn not_in<V: IntoValue<A>>(self, values: impl IntoIterator<Item = V>) -> WhereCondition<M> {
        self.custom(operator::not_in(values))
    }
}

impl<M: Model, A: Text> FieldIs<M, A> {
    pub fn like(self, pattern: &str) -> WhereCondition<M> {
        self.custom(operator::like(pattern))
    }
}

// Boolean predicates. Not every database has IS TRUE, so they are expressed with
// (not) distinct comparisons, which keep the null semantics of IS.
impl<M: Model, A: Boolean> FieldIs<M, A> {
    pub fn is_true(self) -> WhereCondition<M> {
        field_condition(self.field.to_ref(), operator::eq::<bool>(true).node)
    }

    /// False or null
    pub fn not_true(self) -> WhereCondition<M> {
        field_condition(self.field.to_ref(), operator::distinct::<bool>(true).node)
    }

    pub fn is_false(self) -> WhereCondition<M> {
        field_condition(self.field.to_ref(), operator::eq::<bool>(false).node)
    }

    /// True or null
    pub fn not_false(self) -> WhereCondition<M> {
        field_condition(self.field.to_ref(), operator::distinct::<bool>(false).node)
    }

    /// Null
    pub fn unknown(self) -> WhereCondition<M> {
        self.null()
    }

    pub fn not_unknown(self) -> WhereCondition<M> {
        self.not_null()
    }
}

/// Condition builder accepting operands of any type
#[derive(Debug, Clone)]
pub struct UnsafeFieldIs<M> {
    field: FieldRef,
    _model: std::marker::PhantomData<fn() -> M>,
}

impl<M: Model> UnsafeFieldIs<M> {
    fn operation(self, operator: &'static sql::SqlOperator, value: impl UnsafeOperand) -> WhereCondition<M> {
        let operator: Operator<()> = Operator::value(operator, value.into_unsafe_operand());
        field_condition(self.field, operator.node)
    }

    pub fn eq(self, value: impl UnsafeOperand) -> WhereCondition<M> {
        self.operation(&sql::EQ, value)
    }

    pub fn not_eq(self, value: impl UnsafeOperand) -> WhereCondition<M> {
        self.operation(&sql::NOT_EQ, value)
    }

    pub fn lt(self, value: impl UnsafeOperand) -> WhereCondition<M> {
        self.operation(&sql::LT, value)
    }

    pub fn lt_or_eq(self, value: impl UnsafeOperand) -> WhereCondition<M> {
        self.operation(&sql::LT_OR_EQ, value)
    }

    pub fn gt(self, value: impl UnsafeOperand) -> WhereCondition<M> {
        self.operation(&sql::GT, value)
    }

    pub fn gt_or_eq(self, value: impl UnsafeOperand) -> WhereCondition<M> {
        self.operation(&sql::GT_OR_EQ, value)
    }
}

fn field_condition<M>(field: FieldRef, operator: OperatorNode) -> WhereCondition<M> {
    WhereCondition::from_node(WhereNode::Field { field, operator })
}
