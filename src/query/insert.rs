//! INSERT statements and upserts.
//!
//! Models are written with the columns their [`Model::insert_values`] return; missing
//! `created_at`/`updated_at` columns are stamped with the current time. Large slices
//! can be split in batches, one statement per batch.

use super::statement::{recorded, Statement, StatementKind};
use super::update::{Assignment, Set};
use crate::condition::context::QueryContext;
use crate::condition::field::FieldRef;
use crate::condition::where_condition::WhereCondition;
use crate::condition::Condition;
use crate::dialect::Dialect;
use crate::error::CqlError;
use crate::executor::Executor;
use crate::model::Model;
use chrono::Utc;
use sea_query::Value;

#[derive(Debug, Clone)]
enum ConflictTarget {
    Columns(Vec<FieldRef>),
    Constraint(String),
}

#[derive(Debug, Clone)]
enum ConflictAction {
    DoNothing,
    /// Every inserted column except the primary key, `created_at` and the target
    UpdateAll,
    Update(Vec<FieldRef>),
    Set(Vec<Assignment>),
}

#[derive(Debug, Clone)]
struct OnConflict {
    target: ConflictTarget,
    action: ConflictAction,
}

/// Insert of a slice of models
pub struct Insert<'a, M> {
    executor: &'a dyn Executor,
    models: &'a [M],
    on_conflict: Option<OnConflict>,
    filter: Vec<Condition<M>>,
    error: Option<CqlError>,
}

impl<'a, M: Model> Insert<'a, M> {
    pub fn new(executor: &'a dyn Executor, models: &'a [M]) -> Self {
        Self {
            executor,
            models,
            on_conflict: None,
            filter: Vec::new(),
            error: None,
        }
    }

    /// Upsert on a conflict over `fields` (ignored by mysql, which uses the table's
    /// unique keys)
    pub fn on_conflict(mut self, fields: Vec<FieldRef>) -> InsertOnConflict<'a, M> {
        if self.executor.dialect() == Dialect::SQLServer {
            self.error = Some(CqlError::unsupported(Dialect::SQLServer).with_method("OnConflict"));
        }
        InsertOnConflict {
            insert: self,
            target: ConflictTarget::Columns(fields),
        }
    }

    /// Upsert on a conflict over a named constraint.
    ///
    /// Available for: postgres
    pub fn on_conflict_on_constraint(mut self, constraint: &str) -> InsertOnConflict<'a, M> {
        let dialect = self.executor.dialect();
        if dialect != Dialect::Postgres {
            self.error = Some(CqlError::unsupported(dialect).with_method("OnConflictOnConstraint"));
        }
        InsertOnConflict {
            insert: self,
            target: ConflictTarget::Constraint(constraint.to_string()),
        }
    }

    /// Insert every model in a single statement, returning the number of affected rows
    pub fn exec(self) -> Result<u64, CqlError> {
        self.exec_in_batches(0)
    }

    /// Insert with the executor's configured batch size
    pub fn exec_in_batches_default(self) -> Result<u64, CqlError> {
        let size = self.executor.insert_batch_size();
        self.exec_in_batches(size)
    }

    /// Insert `size` models per statement; 0 inserts all of them at once.
    ///
    /// Batches are separate statements: run them in a transaction to make the insert
    /// atomic.
    pub fn exec_in_batches(self, size: usize) -> Result<u64, CqlError> {
        if let Some(err) = self.error {
            return Err(recorded(err, "Insert"));
        }
        if self.models.is_empty() {
            return Ok(0);
        }

        let size = if size == 0 { self.models.len() } else { size };
        let mut affected = 0;

        for batch in self.models.chunks(size) {
            let (sql, values) = self
                .insert_sql(batch)
                .map_err(|e| recorded(e.with_method("Insert"), "Insert"))?;
            affected += Statement::new(self.executor, StatementKind::Insert, &sql, values).execute(self.executor)?;
        }

        log::debug!("inserted {affected} rows into {}", M::TABLE_NAME);
        Ok(affected)
    }

    fn insert_sql(&self, batch: &[M]) -> Result<(String, Vec<Value>), CqlError> {
        let now = Utc::now();
        let mut columns: Vec<&'static str> = Vec::new();
        let mut rows = Vec::with_capacity(batch.len());
        let mut values = Vec::new();

        for model in batch {
            let mut row = model.insert_values();
            for timestamp in [M::created_at_column_name(), M::updated_at_column_name()] {
                if !timestamp.is_empty() && !row.iter().any(|(column, _)| *column == timestamp) {
                    row.push((timestamp, Value::from(now)));
                }
            }

            if columns.is_empty() {
                columns = row.iter().map(|(column, _)| *column).collect();
            }
            rows.push(format!("({})", vec!["?"; row.len()].join(", ")));
            values.extend(row.into_iter().map(|(_, value)| value));
        }

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            M::TABLE_NAME,
            columns.join(", "),
            rows.join(", ")
        );

        if let Some(on_conflict) = &self.on_conflict {
            let (conflict_sql, conflict_values) = self.conflict_sql(on_conflict, &columns)?;
            sql.push_str(&conflict_sql);
            values.extend(conflict_values);
        }

        Ok((sql, values))
    }

    fn conflict_sql(&self, on_conflict: &OnConflict, columns: &[&str]) -> Result<(String, Vec<Value>), CqlError> {
        let dialect = self.executor.dialect();
        let mut context = QueryContext::new::<M>(dialect);
        context.apply(&self.filter)?;

        let updated_columns = |fields: Option<&[FieldRef]>| -> Vec<String> {
            match fields {
                Some(fields) => fields.iter().map(FieldRef::column_name).collect(),
                None => {
                    let target: Vec<String> = match &on_conflict.target {
                        ConflictTarget::Columns(fields) => fields.iter().map(FieldRef::column_name).collect(),
                        ConflictTarget::Constraint(_) => Vec::new(),
                    };
                    columns
                        .iter()
                        .filter(|column| {
                            **column != M::primary_key_column()
                                && **column != M::created_at_column_name()
                                && !target.iter().any(|t| t.as_str() == **column)
                        })
                        .map(|column| column.to_string())
                        .collect()
                }
            }
        };

        let mut values = Vec::new();

        if dialect == Dialect::MySQL {
            let updates: Vec<String> = match &on_conflict.action {
                ConflictAction::DoNothing => {
                    let primary_key = M::primary_key_column();
                    vec![format!("{primary_key} = {primary_key}")]
                }
                ConflictAction::UpdateAll => excluded(updated_columns(None), dialect),
                ConflictAction::Update(fields) => excluded(updated_columns(Some(fields.as_slice())), dialect),
                ConflictAction::Set(sets) => {
                    if !context.wheres.is_empty() {
                        return Err(CqlError::unsupported(dialect).with_method("Where"));
                    }
                    set_sql(&context, sets, &mut values)?
                }
            };
            return Ok((format!(" ON DUPLICATE KEY UPDATE {}", updates.join(", ")), values));
        }

        let mut sql = match &on_conflict.target {
            ConflictTarget::Columns(fields) if fields.is_empty() => " ON CONFLICT".to_string(),
            ConflictTarget::Columns(fields) => {
                let columns: Vec<String> = fields.iter().map(FieldRef::column_name).collect();
                format!(" ON CONFLICT ({})", columns.join(", "))
            }
            ConflictTarget::Constraint(name) => format!(" ON CONFLICT ON CONSTRAINT {name}"),
        };

        let updates = match &on_conflict.action {
            ConflictAction::DoNothing => Vec::new(),
            ConflictAction::UpdateAll => excluded(updated_columns(None), dialect),
            ConflictAction::Update(fields) => excluded(updated_columns(Some(fields.as_slice())), dialect),
            ConflictAction::Set(sets) => set_sql(&context, sets, &mut values)?,
        };

        if !updates.is_empty() && matches!(&on_conflict.target, ConflictTarget::Columns(fields) if fields.is_empty()) {
            return Err(CqlError::UnsupportedByDatabase {
                dialect,
                detail: Some("a conflict target is required to update on conflict".to_string()),
            });
        }

        if updates.is_empty() {
            sql.push_str(" DO NOTHING");
        } else {
            sql.push_str(" DO UPDATE SET ");
            sql.push_str(&updates.join(", "));
            if !context.wheres.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&context.wheres.sql.join(" AND "));
                values.extend(context.wheres.values.iter().cloned());
            }
        }

        Ok((sql, values))
    }
}

/// `column = <inserted value of column>`
fn excluded(columns: Vec<String>, dialect: Dialect) -> Vec<String> {
    columns
        .into_iter()
        .map(|column| match dialect {
            Dialect::MySQL => format!("{column} = VALUES({column})"),
            Dialect::Postgres | Dialect::SQLite | Dialect::SQLServer => format!("{column} = EXCLUDED.{column}"),
        })
        .collect()
}

fn set_sql(context: &QueryContext, sets: &[Assignment], values: &mut Vec<Value>) -> Result<Vec<String>, CqlError> {
    sets.iter()
        .map(|set| {
            let (value_sql, value_values) = set.value_sql(context)?;
            values.extend(value_values);
            Ok(format!("{} = {value_sql}", set.field.column_name()))
        })
        .collect()
}

/// Action taken on an insert conflict
pub struct InsertOnConflict<'a, M> {
    insert: Insert<'a, M>,
    target: ConflictTarget,
}

impl<'a, M: Model> InsertOnConflict<'a, M> {
    fn action(mut self, action: ConflictAction) -> Insert<'a, M> {
        self.insert.on_conflict = Some(OnConflict {
            target: self.target,
            action,
        });
        self.insert
    }

    /// Keep the existing rows; they do not count as affected
    pub fn do_nothing(self) -> Insert<'a, M> {
        self.action(ConflictAction::DoNothing)
    }

    /// Overwrite every inserted column, except the primary key, `created_at` and the
    /// conflict columns
    pub fn update_all(self) -> Insert<'a, M> {
        self.action(ConflictAction::UpdateAll)
    }

    /// Overwrite `fields` with their inserted values
    pub fn update(self, fields: Vec<FieldRef>) -> Insert<'a, M> {
        self.action(ConflictAction::Update(fields))
    }

    /// Set fields of the existing row to explicit values
    pub fn set(self, sets: Vec<Set<M>>) -> InsertOnConflictSet<'a, M> {
        let sets = sets.into_iter().map(Assignment::from).collect();
        InsertOnConflictSet {
            insert: self.action(ConflictAction::Set(sets)),
        }
    }
}

/// Upsert that sets explicit values, optionally only for rows meeting a filter
pub struct InsertOnConflictSet<'a, M> {
    insert: Insert<'a, M>,
}

impl<'a, M: Model> InsertOnConflictSet<'a, M> {
    /// Only update the existing rows that meet `conditions`.
    ///
    /// Not available for: mysql
    pub fn filter(mut self, conditions: Vec<WhereCondition<M>>) -> Insert<'a, M> {
        self.insert.filter = conditions.into_iter().map(Condition::from).collect();
        self.insert
    }

    pub fn exec(self) -> Result<u64, CqlError> {
        self.insert.exec()
    }
}
