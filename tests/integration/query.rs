//! Selects: conditions, joins, preloads and aggregations

use crate::common::{sale_row, City, Company, Country, Product, RecordingExecutor, Sale, Seller};
use cql::{conditions, or, psql, Aggregation, CqlError, Dialect, Query, Row, UIntId, ValueInto};
use sea_query::Value;
use uuid::Uuid;

#[test]
fn test_where_conditions_by_dialect() {
    let conditions = || {
        conditions![
            Product::INT.is().between(1, 10),
            or(vec![Product::STRING.is().like("a%"), Product::BOOL.is().is_false()]),
        ]
    };

    let postgres = RecordingExecutor::new(Dialect::Postgres);
    let statement = Query::<Product>::new(&postgres, conditions()).statement().unwrap();
    assert_eq!(
        statement.sql,
        "SELECT products.* FROM products WHERE products.int BETWEEN $1 AND $2 AND (products.string LIKE $3 OR products.bool = $4) AND products.deleted_at IS NULL"
    );
    assert_eq!(
        statement.values,
        vec![
            Value::from(1i32),
            Value::from(10i32),
            Value::from("a%"),
            Value::from(false)
        ]
    );

    let sqlserver = RecordingExecutor::new(Dialect::SQLServer);
    let statement = Query::<Product>::new(&sqlserver, conditions()).statement().unwrap();
    assert!(statement.sql.contains("products.int BETWEEN @p1 AND @p2"));
}

#[test]
fn test_dialect_operator_on_other_database() {
    let executor = RecordingExecutor::new(Dialect::MySQL);
    let err = Query::<Product>::new(
        &executor,
        conditions![Product::STRING.is().custom(psql::ilike("a%"))],
    )
    .find()
    .unwrap_err();

    assert!(matches!(err.root_cause(), CqlError::UnsupportedByDatabase { dialect: Dialect::MySQL, .. }));
    assert!(executor.sql().is_empty());
}

#[test]
fn test_nested_joins() {
    let executor = RecordingExecutor::new(Dialect::Postgres);
    Query::<Sale>::new(
        &executor,
        conditions![Sale::SELLER.join(conditions![Seller::COMPANY.join(conditions![
            Company::NAME.is().eq("acme")
        ])])],
    )
    .find()
    .unwrap();

    assert_eq!(
        executor.sql(),
        vec!["SELECT sales.* FROM sales INNER JOIN sellers seller ON seller.id = sales.seller_id AND seller.deleted_at IS NULL INNER JOIN companies seller__company ON seller__company.id = seller.company_id AND seller__company.name = $1 AND seller__company.deleted_at IS NULL WHERE sales.deleted_at IS NULL"]
    );
}

#[test]
fn test_preloaded_relation_is_hydrated() {
    let product = Product {
        id: Uuid::new_v4(),
        int: 3,
        float: 1.5,
        bool: true,
        string: "chair".to_string(),
    };
    let sale_id = Uuid::new_v4();
    let executor = RecordingExecutor::new(Dialect::Postgres).returning(vec![sale_row(sale_id, 7, &product)]);

    let sale = Query::<Sale>::new(&executor, conditions![Sale::PRODUCT.preload(), Sale::CODE.is().eq(7)])
        .find_one()
        .unwrap();

    assert_eq!(sale.id, sale_id);
    assert_eq!(sale.product.as_ref(), Some(&product));
    assert_eq!(sale.seller, None);
    assert!(cql::preload::verify_struct_loaded(sale.product.as_ref()).is_ok());
    assert!(cql::preload::verify_pointer_loaded(sale.seller_id.as_ref(), sale.seller.as_ref())
        .unwrap()
        .is_none());
}

#[test]
fn test_preload_without_soft_delete() {
    let executor = RecordingExecutor::new(Dialect::Postgres).returning(vec![Row::new()
        .with("id", 1i64)
        .with("name", "France")
        .with("capital_id", 2i64)
        .with("capital__id", 2i64)
        .with("capital__name", "Paris")
        .with("capital__population", 2_100_000i32)]);

    let countries = Query::<Country>::new(
        &executor,
        conditions![Country::CAPITAL.join(conditions![City::POPULATION.is().gt(1_000_000)]).preload()],
    )
    .find()
    .unwrap();

    assert_eq!(
        executor.sql()[0],
        "SELECT countries.*, capital.id AS \"capital__id\", capital.name AS \"capital__name\", capital.population AS \"capital__population\" FROM countries INNER JOIN cities capital ON capital.id = countries.capital_id AND capital.population > $1"
    );
    assert_eq!(
        countries[0].capital,
        Some(City {
            id: UIntId(2),
            name: "Paris".to_string(),
            population: 2_100_000,
        })
    );
}

#[test]
fn test_collection_preload() {
    let acme = Uuid::new_v4();
    let globex = Uuid::new_v4();
    let executor = RecordingExecutor::new(Dialect::SQLite)
        .returning(vec![
            Row::new().with("id", acme).with("name", "acme"),
            Row::new().with("id", globex).with("name", "globex"),
        ])
        .returning(vec![
            Row::new()
                .with("id", Uuid::new_v4())
                .with("name", "ana")
                .with("company_id", globex),
            Row::new()
                .with("id", Uuid::new_v4())
                .with("name", "bob")
                .with("company_id", globex),
        ]);

    let companies = Query::<Company>::new(&executor, conditions![Company::SELLERS.preload(vec![])])
        .ascending(&Company::NAME)
        .find()
        .unwrap();

    assert_eq!(executor.sql().len(), 2);
    assert_eq!(
        executor.sql()[1],
        "SELECT sellers.* FROM sellers WHERE sellers.company_id IN (?, ?) AND sellers.deleted_at IS NULL"
    );
    assert_eq!(executor.values(1), vec![Value::from(acme), Value::from(globex)]);

    let acme_sellers = cql::preload::verify_collection_loaded(companies[0].sellers.as_ref()).unwrap();
    assert!(acme_sellers.is_empty());
    let globex_sellers = cql::preload::verify_collection_loaded(companies[1].sellers.as_ref()).unwrap();
    let names: Vec<&str> = globex_sellers.iter().map(|seller| seller.name.as_str()).collect();
    assert_eq!(names, vec!["ana", "bob"]);
}

#[test]
fn test_collection_preload_rejects_filters() {
    let executor = RecordingExecutor::new(Dialect::Postgres);
    let err = Query::<Company>::new(
        &executor,
        conditions![Company::SELLERS.preload(vec![Seller::COMPANY.join(conditions![Company::NAME.is().eq("x")])])],
    )
    .find()
    .unwrap_err();

    assert!(matches!(err.root_cause(), CqlError::OnlyPreloadsAllowed { .. }));
}

#[test]
fn test_collection_filters() {
    let executor = RecordingExecutor::new(Dialect::Postgres);
    let statement = Query::<Company>::new(
        &executor,
        conditions![Company::SELLERS.none(vec![Seller::NAME.is().eq("ana")])],
    )
    .statement()
    .unwrap();

    assert_eq!(
        statement.sql,
        "SELECT companies.* FROM companies WHERE NOT (EXISTS (SELECT(1) FROM sellers sellers WHERE sellers.company_id = companies.id AND sellers.name = $1 AND sellers.deleted_at IS NULL)) AND companies.deleted_at IS NULL"
    );
}

#[test]
fn test_find_one_cardinality() {
    let executor = RecordingExecutor::new(Dialect::MySQL);
    let err = Query::<Country>::new(&executor, conditions![Country::NAME.is().eq("Atlantis")])
        .find_one()
        .unwrap_err();
    assert!(matches!(err, CqlError::ObjectNotFound));

    let row = || Row::new().with("id", 1i64).with("name", "x").with("capital_id", 0i64);
    let executor = RecordingExecutor::new(Dialect::MySQL).returning(vec![row(), row()]);
    let err = Query::<Country>::new(&executor, vec![]).find_one().unwrap_err();
    assert!(matches!(err, CqlError::MoreThanOneObjectFound));
}

#[test]
fn test_count_and_pagination() {
    let executor = RecordingExecutor::new(Dialect::Postgres).returning(vec![Row::new().with("count", 12i64)]);
    let count = Query::<Product>::new(&executor, conditions![Product::BOOL.is().is_true()])
        .count()
        .unwrap();
    assert_eq!(count, 12);
    assert_eq!(
        executor.sql()[0],
        "SELECT COUNT(*) FROM products WHERE products.bool = $1 AND products.deleted_at IS NULL"
    );

    let executor = RecordingExecutor::new(Dialect::Postgres);
    Query::<Product>::new(&executor, vec![])
        .descending(&Product::INT)
        .limit(10)
        .offset(20)
        .find()
        .unwrap();
    assert_eq!(
        executor.sql()[0],
        "SELECT products.* FROM products WHERE products.deleted_at IS NULL ORDER BY products.int DESC LIMIT 10 OFFSET 20"
    );
}

#[derive(Debug, Default, PartialEq)]
struct ProductTotals {
    bool: bool,
    count: i64,
}

#[test]
fn test_group_by_having() {
    let executor = RecordingExecutor::new(Dialect::SQLite).returning(vec![
        Row::new().with("bool", true).with("count", 4i64),
        Row::new().with("bool", false).with("count", 2i64),
    ]);

    let totals = Query::<Product>::new(&executor, vec![])
        .group_by(vec![Product::BOOL.to_ref()])
        .having(vec![Aggregation::count_all().gt(1i64)])
        .select(vec![
            ValueInto::new(&Product::BOOL, |totals: &mut ProductTotals, bool| totals.bool = bool),
            ValueInto::new(Aggregation::count_all(), |totals: &mut ProductTotals, count| {
                totals.count = count
            }),
        ])
        .unwrap();

    assert_eq!(
        totals,
        vec![
            ProductTotals { bool: true, count: 4 },
            ProductTotals { bool: false, count: 2 },
        ]
    );
    assert_eq!(
        executor.sql()[0],
        "SELECT products.bool, COUNT(*) FROM products WHERE products.deleted_at IS NULL GROUP BY products.bool HAVING COUNT(*) > ?"
    );
}
