//! Per-statement compilation state.
//!
//! A [`QueryContext`] is created for one statement, seeded with the root model's table,
//! and filled in as the condition tree applies itself: joins, where fragments, preload
//! projections and ordering. Builders read the accumulated clauses back to assemble the
//! final SQL. SQL fragments use `?` placeholders; every clause keeps its own value list
//! so values can be emitted in the order the clauses are rendered.

use crate::condition::field::FieldRef;
use crate::condition::preload::CollectionLoad;
use crate::condition::table::{Table, TableRegistry};
use crate::condition::Condition;
use crate::dialect::Dialect;
use crate::error::CqlError;
use crate::model::{Model, ModelRef};
use sea_query::Value;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKind::Inner => f.write_str("INNER JOIN"),
            JoinKind::Left => f.write_str("LEFT JOIN"),
        }
    }
}

/// A joined table and its ON condition
#[derive(Debug, Clone)]
pub struct Join {
    pub kind: JoinKind,
    pub table: Table,
    pub on: String,
    pub values: Vec<Value>,
}

impl Join {
    /// `<table name> <alias>`
    pub fn table_sql(&self) -> String {
        format!("{} {}", self.table.name, self.table.alias)
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ON {}", self.kind, self.table_sql(), self.on)
    }
}

/// A SQL fragment and the values bound by its placeholders
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Clause {
    pub sql: Vec<String>,
    pub values: Vec<Value>,
}

impl Clause {
    pub fn push(&mut self, sql: String, values: Vec<Value>) {
        self.sql.push(sql);
        self.values.extend(values);
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    pub fn clear(&mut self) {
        self.sql.clear();
        self.values.clear();
    }
}

pub struct QueryContext {
    pub(crate) dialect: Dialect,
    pub(crate) registry: TableRegistry,
    pub(crate) root: Table,
    pub(crate) selects: Clause,
    pub(crate) joins: Vec<Join>,
    pub(crate) wheres: Clause,
    /// A condition names the root soft-delete column: deleted rows are not filtered out
    pub(crate) unscoped: bool,
    pub(crate) group_by: Clause,
    pub(crate) having: Clause,
    pub(crate) order_by: Clause,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) collection_loads: Vec<Arc<dyn CollectionLoad>>,
}

impl fmt::Debug for QueryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryContext")
            .field("dialect", &self.dialect)
            .field("root", &self.root.name)
            .field("joins", &self.joins.len())
            .field("wheres", &self.wheres.sql)
            .finish()
    }
}

impl QueryContext {
    pub fn new<M: Model>(dialect: Dialect) -> Self {
        let root = Table::initial(ModelRef::of::<M>());

        let mut registry = TableRegistry::default();
        registry.add(root.clone());

        let mut selects = Clause::default();
        selects.push(format!("{}.*", root.name), Vec::new());

        Self {
            dialect,
            registry,
            root,
            selects,
            joins: Vec::new(),
            wheres: Clause::default(),
            unscoped: false,
            group_by: Clause::default(),
            having: Clause::default(),
            order_by: Clause::default(),
            limit: None,
            offset: None,
            collection_loads: Vec::new(),
        }
    }

    /// Apply root-level conditions, stopping at the first error
    pub fn apply<M: Model>(&mut self, conditions: &[Condition<M>]) -> Result<(), CqlError> {
        let root = self.root.clone();
        for condition in conditions {
            condition.node.apply(self, &root)?;
        }
        Ok(())
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Column SQL of a field, resolved through the registry by model and appearance
    pub fn field_sql(&self, field: &FieldRef) -> Result<(String, Vec<Value>), CqlError> {
        let table = self.registry.resolve(&field.model, field.appearance)?;
        field.column_sql(self.dialect, &table)
    }

    pub(crate) fn add_select(&mut self, sql: String, values: Vec<Value>) {
        if !self.selects.sql.contains(&sql) {
            self.selects.push(sql, values);
        }
    }

    /// Select alias under which a preloaded column is read back
    pub(crate) fn select_alias(&self, table: &Table, column: &str) -> String {
        self.dialect
            .quote_identifier(&format!("{}__{column}", table.alias))
    }

    /// Project `columns` of `table` as `alias.col AS "alias__col"`
    pub(crate) fn preload_columns<S: AsRef<str>>(&mut self, table: &Table, columns: &[S]) {
        for column in columns {
            let column = column.as_ref();
            let sql = format!("{} AS {}", table.column(column), self.select_alias(table, column));
            self.add_select(sql, Vec::new());
        }
    }

    pub(crate) fn clean_selects(&mut self) {
        self.selects.clear();
    }

    /// Order by a field.
    ///
    /// Postgres only orders by projected columns, so the field is added to the
    /// projection and the order refers to its alias.
    pub(crate) fn order(&mut self, field: &FieldRef, descending: bool) -> Result<(), CqlError> {
        let table = self.registry.resolve(&field.model, field.appearance)?;
        let (sql, values) = field.column_sql(self.dialect, &table)?;
        let direction = if descending { " DESC" } else { "" };

        match self.dialect {
            Dialect::Postgres => {
                let alias = self.select_alias(&table, &field.column_name());
                self.add_select(format!("{sql} AS {alias}"), values);
                self.order_by.push(format!("{alias}{direction}"), Vec::new());
            }
            Dialect::MySQL | Dialect::SQLite | Dialect::SQLServer => {
                self.order_by.push(format!("{sql}{direction}"), values);
            }
        }

        Ok(())
    }

    pub(crate) fn add_join(&mut self, join: Join) {
        self.joins.push(join);
    }

    /// Where fragments plus the root soft-delete filter, joined with AND
    pub(crate) fn where_clause(&self) -> Clause {
        let mut clause = self.wheres.clone();
        if let Some(filter) = self.root_soft_delete_filter() {
            clause.push(filter, Vec::new());
        }
        clause
    }

    pub(crate) fn root_soft_delete_filter(&self) -> Option<String> {
        (self.root.model.has_soft_delete() && !self.unscoped)
            .then(|| format!("{} IS NULL", self.root.column(self.root.model.soft_delete)))
    }

    /// `FROM <root> <joins> [WHERE ...]`
    pub(crate) fn from_sql(&self) -> (String, Vec<Value>) {
        let mut sql = format!(" FROM {}", self.root.name);
        let mut values = Vec::new();

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.to_string());
            values.extend(join.values.iter().cloned());
        }

        let wheres = self.where_clause();
        if !wheres.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&wheres.sql.join(" AND "));
            values.extend(wheres.values);
        }

        (sql, values)
    }

    pub(crate) fn select_sql(&self) -> (String, Vec<Value>) {
        let mut sql = format!("SELECT {}", self.selects.sql.join(", "));
        let mut values = self.selects.values.clone();

        let (from, from_values) = self.from_sql();
        sql.push_str(&from);
        values.extend(from_values);

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.sql.join(", "));
            values.extend(self.group_by.values.iter().cloned());
        }

        if !self.having.is_empty() {
            sql.push_str(" HAVING ");
            sql.push_str(&self.having.sql.join(" AND "));
            values.extend(self.having.values.iter().cloned());
        }

        sql.push_str(&self.order_sql());
        values.extend(self.order_by.values.iter().cloned());

        sql.push_str(
            &self
                .dialect
                .limit_offset(self.limit, self.offset, !self.order_by.is_empty()),
        );

        (sql, values)
    }

    pub(crate) fn order_sql(&self) -> String {
        if self.order_by.is_empty() {
            String::new()
        } else {
            format!(" ORDER BY {}", self.order_by.sql.join(", "))
        }
    }

    /// `SELECT COUNT(*)` over the same joins and filters, without projection or ordering
    pub(crate) fn count_sql(&self) -> (String, Vec<Value>) {
        let (from, values) = self.from_sql();
        (format!("SELECT COUNT(*){from}"), values)
    }
}
