//! Table occurrences and the per-statement registry that resolves fields to them.
//!
//! Every join of a model adds one [`Table`] to the [`TableRegistry`], in the order the
//! joins are applied. A field whose model occurs more than once must name the occurrence
//! it refers to (its appearance); resolution is positional.

use crate::error::CqlError;
use crate::model::ModelRef;
use std::any::TypeId;
use std::collections::HashMap;

/// One occurrence of a model's table inside a statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: &'static str,
    pub alias: String,
    pub initial: bool,
    pub model: ModelRef,
}

impl Table {
    /// The statement's root table, aliased by its own name
    pub fn initial(model: ModelRef) -> Self {
        Self {
            name: model.table_name,
            alias: model.table_name.to_string(),
            initial: true,
            model,
        }
    }

    pub fn is_initial(&self) -> bool {
        self.initial
    }

    /// Name used to reference the table inside the statement: the alias if any
    pub fn sql_name(&self) -> &str {
        if self.alias.is_empty() {
            self.name
        } else {
            &self.alias
        }
    }

    /// `<sql name>.<column>`
    pub fn column(&self, column: &str) -> String {
        format!("{}.{column}", self.sql_name())
    }

    /// Table reached from this one through `relation`.
    ///
    /// The alias is the relation name for joins from the root table and
    /// `<parent alias>__<relation>` below it, so repeated and self joins never collide.
    pub fn deliver(&self, model: ModelRef, relation: &str) -> Table {
        let alias = if self.initial {
            relation.to_string()
        } else {
            format!("{}__{relation}", self.alias)
        };

        Table {
            name: model.table_name,
            alias,
            initial: false,
            model,
        }
    }
}

/// Tables of every model concerned by a statement, in join order
#[derive(Debug, Clone, Default)]
pub struct TableRegistry {
    tables: HashMap<TypeId, Vec<Table>>,
}

impl TableRegistry {
    pub fn add(&mut self, table: Table) {
        self.tables.entry(table.model.type_id).or_default().push(table);
    }

    pub fn tables(&self, model: &ModelRef) -> &[Table] {
        self.tables
            .get(&model.type_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Resolve the table a field of `model` refers to.
    ///
    /// # Errors
    ///
    /// - `FieldModelNotConcerned` if the model is not part of the statement
    /// - `AppearanceMustBeSelected` if the model occurs more than once and no appearance is given
    /// - `AppearanceOutOfRange` if the appearance is not smaller than the number of occurrences
    pub fn resolve(&self, model: &ModelRef, appearance: Option<usize>) -> Result<Table, CqlError> {
        let tables = self.tables(model);

        match tables {
            [] => Err(CqlError::FieldModelNotConcerned {
                model: model.name.to_string(),
            }),
            [table] => Ok(table.clone()),
            _ => {
                let appearance = appearance.ok_or_else(|| CqlError::AppearanceMustBeSelected {
                    model: model.name.to_string(),
                })?;

                tables
                    .get(appearance)
                    .cloned()
                    .ok_or_else(|| CqlError::AppearanceOutOfRange {
                        model: model.name.to_string(),
                        appearance,
                        occurrences: tables.len(),
                    })
            }
        }
    }
}
