//! Inserts, upserts, updates and deletes

use crate::common::{City, Company, Country, RecordingExecutor, Seller};
use cql::{conditions, raw_sql, CqlError, Delete, Dialect, Insert, Row, UIntId, Update};
use sea_query::Value;
use uuid::Uuid;

fn company(name: &str) -> Company {
    Company {
        id: Uuid::new_v4(),
        name: name.to_string(),
        sellers: None,
    }
}

#[test]
fn test_insert_stamps_timestamps() {
    let executor = RecordingExecutor::new(Dialect::Postgres).affecting(2);
    let companies = vec![company("acme"), company("globex")];

    let inserted = Insert::new(&executor, &companies).exec().unwrap();

    assert_eq!(inserted, 2);
    assert_eq!(
        executor.sql(),
        vec!["INSERT INTO companies (id, name, created_at, updated_at) VALUES ($1, $2, $3, $4), ($5, $6, $7, $8)"]
    );
    let values = executor.values(0);
    assert_eq!(values[1], Value::from("acme"));
    assert!(matches!(values[2], Value::ChronoDateTimeUtc(Some(_))));
}

#[test]
fn test_insert_in_batches() {
    let executor = RecordingExecutor::new(Dialect::MySQL).affecting(2);
    let companies: Vec<Company> = ["a", "b", "c", "d", "e"].into_iter().map(company).collect();

    let inserted = Insert::new(&executor, &companies).exec_in_batches(2).unwrap();

    assert_eq!(executor.sql().len(), 3);
    assert_eq!(inserted, 6);
}

#[test]
fn test_upsert() {
    let countries = vec![Country {
        name: "France".to_string(),
        capital_id: UIntId(2),
        ..Country::default()
    }];

    let executor = RecordingExecutor::new(Dialect::Postgres);
    Insert::new(&executor, &countries)
        .on_conflict(vec![Country::NAME.to_ref()])
        .update_all()
        .exec()
        .unwrap();
    assert_eq!(
        executor.sql()[0],
        "INSERT INTO countries (name, capital_id) VALUES ($1, $2) ON CONFLICT (name) DO UPDATE SET capital_id = EXCLUDED.capital_id"
    );

    let executor = RecordingExecutor::new(Dialect::MySQL);
    Insert::new(&executor, &countries)
        .on_conflict(vec![Country::NAME.to_ref()])
        .do_nothing()
        .exec()
        .unwrap();
    assert_eq!(
        executor.sql()[0],
        "INSERT INTO countries (name, capital_id) VALUES (?, ?) ON DUPLICATE KEY UPDATE id = id"
    );

    let executor = RecordingExecutor::new(Dialect::SQLServer);
    let err = Insert::new(&executor, &countries)
        .on_conflict(vec![Country::NAME.to_ref()])
        .do_nothing()
        .exec()
        .unwrap_err();
    assert!(matches!(err.root_cause(), CqlError::UnsupportedByDatabase { dialect: Dialect::SQLServer, .. }));
    assert!(executor.sql().is_empty());
}

#[test]
fn test_update_through_join() {
    let executor = RecordingExecutor::new(Dialect::Postgres).affecting(3);

    let updated = Update::<Seller>::new(
        &executor,
        conditions![Seller::COMPANY.join(conditions![Company::NAME.is().eq("acme")])],
    )
    .set(vec![Seller::NAME.set().eq("ana")])
    .unwrap();

    assert_eq!(updated, 3);
    assert_eq!(
        executor.sql()[0],
        "UPDATE sellers SET name = $1, updated_at = $2 FROM companies company WHERE company.id = sellers.company_id AND company.name = $3 AND company.deleted_at IS NULL AND sellers.deleted_at IS NULL"
    );
    let values = executor.values(0);
    assert_eq!(values[0], Value::from("ana"));
    assert_eq!(values[2], Value::from("acme"));
}

#[test]
fn test_mysql_update_with_order_and_limit() {
    let executor = RecordingExecutor::new(Dialect::MySQL);

    Update::<Seller>::new(&executor, conditions![Seller::NAME.is().eq("ana")])
        .ascending(&Seller::NAME)
        .limit(1)
        .set(vec![Seller::NAME.set().eq("anna")])
        .unwrap();

    assert_eq!(
        executor.sql()[0],
        "UPDATE sellers SET sellers.name = ?, sellers.updated_at = ? WHERE sellers.name = ? AND sellers.deleted_at IS NULL ORDER BY sellers.name LIMIT 1"
    );
}

#[test]
fn test_update_returning() {
    let id = UIntId(4);
    let executor = RecordingExecutor::new(Dialect::Postgres).returning(vec![Row::new()
        .with("id", 4i64)
        .with("name", "Lyon")
        .with("population", 500_000i32)]);

    let mut cities = Vec::new();
    let updated = Update::<City>::new(&executor, conditions![City::NAME.is().eq("Lyon")])
        .returning(&mut cities)
        .set(vec![City::POPULATION.set().eq(500_000)])
        .unwrap();

    assert_eq!(updated, 1);
    assert_eq!(cities[0].id, id);
    assert_eq!(
        executor.sql()[0],
        "UPDATE cities SET population = $1 WHERE cities.name = $2 RETURNING cities.*"
    );
}

#[test]
fn test_update_requires_conditions() {
    let executor = RecordingExecutor::new(Dialect::SQLite);
    let err = Update::<City>::new(&executor, vec![])
        .set(vec![City::POPULATION.set().eq(0)])
        .unwrap_err();

    assert!(matches!(err.root_cause(), CqlError::MissingWhereConditions));
    assert!(executor.sql().is_empty());
}

#[test]
fn test_delete() {
    let executor = RecordingExecutor::new(Dialect::MySQL).affecting(1);
    let deleted = Delete::<Seller>::new(&executor, conditions![Seller::NAME.is().eq("ana")])
        .exec()
        .unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(
        executor.sql()[0],
        "UPDATE sellers SET sellers.deleted_at = ? WHERE sellers.name = ? AND sellers.deleted_at IS NULL"
    );

    let executor = RecordingExecutor::new(Dialect::SQLServer);
    Delete::<Country>::new(&executor, conditions![Country::CAPITAL.join(conditions![City::NAME.is().eq("Paris")])])
        .exec()
        .unwrap();
    assert_eq!(
        executor.sql()[0],
        "DELETE countries FROM countries INNER JOIN cities capital ON capital.id = countries.capital_id AND capital.name = @p1"
    );
}

#[test]
fn test_raw_statement() {
    let executor = RecordingExecutor::new(Dialect::Postgres).affecting(7);
    let affected = raw_sql::execute_statement(
        &executor,
        "UPDATE cities SET population = population + ? WHERE id = ?",
        vec![Value::from(1i32), Value::from(4i64)],
    )
    .unwrap();

    assert_eq!(affected, 7);
    assert_eq!(
        executor.sql()[0],
        "UPDATE cities SET population = population + $1 WHERE id = $2"
    );
}
