//! Executor double and models shared by the integration tests.
//!
//! Relations between the models:
//! - Sale belongs to Product and (optionally) to Seller
//! - Seller belongs (optionally) to Company; Company has many Sellers
//! - Country has one capital City

use cql::{Collection, CqlError, Dialect, ExecError, Executor, Field, Model, Relation, Row, RowView, UIntId, ValueType};
use sea_query::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use uuid::Uuid;

/// Records every statement; queries answer with the queued result sets in order
pub struct RecordingExecutor {
    dialect: Dialect,
    statements: RefCell<Vec<(String, Vec<Value>)>>,
    results: RefCell<VecDeque<Vec<Row>>>,
    affected: u64,
}

impl RecordingExecutor {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            statements: RefCell::new(Vec::new()),
            results: RefCell::new(VecDeque::new()),
            affected: 0,
        }
    }

    pub fn returning(self, rows: Vec<Row>) -> Self {
        self.results.borrow_mut().push_back(rows);
        self
    }

    pub fn affecting(mut self, affected: u64) -> Self {
        self.affected = affected;
        self
    }

    pub fn sql(&self) -> Vec<String> {
        self.statements.borrow().iter().map(|(sql, _)| sql.clone()).collect()
    }

    pub fn values(&self, index: usize) -> Vec<Value> {
        self.statements.borrow()[index].1.clone()
    }
}

impl Executor for RecordingExecutor {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn log_statements(&self) -> bool {
        false
    }

    fn execute(&self, sql: &str, values: &[Value]) -> Result<u64, ExecError> {
        self.statements.borrow_mut().push((sql.to_string(), values.to_vec()));
        Ok(self.affected)
    }

    fn query_all(&self, sql: &str, values: &[Value]) -> Result<Vec<Row>, ExecError> {
        self.statements.borrow_mut().push((sql.to_string(), values.to_vec()));
        Ok(self.results.borrow_mut().pop_front().unwrap_or_default())
    }
}

macro_rules! timestamps {
    () => {
        fn soft_delete_column_name() -> &'static str {
            "deleted_at"
        }

        fn updated_at_column_name() -> &'static str {
            "updated_at"
        }

        fn created_at_column_name() -> &'static str {
            "created_at"
        }
    };
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub sellers: Option<Vec<Seller>>,
}

impl Company {
    pub const NAME: Field<Company, String> = Field::new("Name", None, None);
    pub const SELLERS: Collection<Company, Seller> =
        Collection::new("sellers", "id", "company_id", company_key, seller_company_key, attach_sellers);
}

fn company_key(company: &Company) -> Value {
    company.id.into_value()
}

fn seller_company_key(seller: &Seller) -> Value {
    seller.company_id.into_value()
}

fn attach_sellers(company: &mut Company, sellers: Vec<Seller>) {
    company.sellers = Some(sellers);
}

impl Model for Company {
    const TABLE_NAME: &'static str = "companies";
    const COLUMNS: &'static [&'static str] = &["id", "created_at", "updated_at", "deleted_at", "name"];
    type Id = Uuid;

    fn id(&self) -> &Uuid {
        &self.id
    }

    timestamps!();

    fn from_row(row: &RowView<'_>) -> Result<Self, CqlError> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            sellers: None,
        })
    }

    fn insert_values(&self) -> Vec<(&'static str, Value)> {
        vec![("id", self.id.into_value()), ("name", self.name.clone().into_value())]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Seller {
    pub id: Uuid,
    pub name: String,
    pub company_id: Option<Uuid>,
    pub company: Option<Company>,
}

impl Seller {
    pub const NAME: Field<Seller, String> = Field::new("Name", None, None);
    pub const COMPANY: Relation<Seller, Company> = Relation::new("company", "company_id", "id");
}

impl Model for Seller {
    const TABLE_NAME: &'static str = "sellers";
    const COLUMNS: &'static [&'static str] = &["id", "created_at", "updated_at", "deleted_at", "name", "company_id"];
    type Id = Uuid;

    fn id(&self) -> &Uuid {
        &self.id
    }

    timestamps!();

    fn from_row(row: &RowView<'_>) -> Result<Self, CqlError> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            company_id: row.get_opt("company_id")?,
            company: row.preloaded("company")?,
        })
    }

    fn insert_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into_value()),
            ("name", self.name.clone().into_value()),
            ("company_id", self.company_id.into_value()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub int: i32,
    pub float: f64,
    pub bool: bool,
    pub string: String,
}

impl Product {
    pub const INT: Field<Product, i32> = Field::new("Int", None, None);
    pub const FLOAT: Field<Product, f64> = Field::new("Float", None, None);
    pub const BOOL: Field<Product, bool> = Field::new("Bool", None, None);
    pub const STRING: Field<Product, String> = Field::new("String", None, None);
}

impl Model for Product {
    const TABLE_NAME: &'static str = "products";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "created_at",
        "updated_at",
        "deleted_at",
        "int",
        "float",
        "bool",
        "string",
    ];
    type Id = Uuid;

    fn id(&self) -> &Uuid {
        &self.id
    }

    timestamps!();

    fn from_row(row: &RowView<'_>) -> Result<Self, CqlError> {
        Ok(Self {
            id: row.get("id")?,
            int: row.get("int")?,
            float: row.get("float")?,
            bool: row.get("bool")?,
            string: row.get("string")?,
        })
    }

    fn insert_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into_value()),
            ("int", self.int.into_value()),
            ("float", self.float.into_value()),
            ("bool", self.bool.into_value()),
            ("string", self.string.clone().into_value()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sale {
    pub id: Uuid,
    pub code: i32,
    pub product_id: Uuid,
    pub product: Option<Product>,
    pub seller_id: Option<Uuid>,
    pub seller: Option<Seller>,
}

impl Sale {
    pub const CODE: Field<Sale, i32> = Field::new("Code", None, None);
    pub const PRODUCT: Relation<Sale, Product> = Relation::new("product", "product_id", "id");
    pub const SELLER: Relation<Sale, Seller> = Relation::new("seller", "seller_id", "id");
}

impl Model for Sale {
    const TABLE_NAME: &'static str = "sales";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "created_at",
        "updated_at",
        "deleted_at",
        "code",
        "product_id",
        "seller_id",
    ];
    type Id = Uuid;

    fn id(&self) -> &Uuid {
        &self.id
    }

    timestamps!();

    fn from_row(row: &RowView<'_>) -> Result<Self, CqlError> {
        Ok(Self {
            id: row.get("id")?,
            code: row.get("code")?,
            product_id: row.get("product_id")?,
            product: row.preloaded("product")?,
            seller_id: row.get_opt("seller_id")?,
            seller: row.preloaded("seller")?,
        })
    }

    fn insert_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into_value()),
            ("code", self.code.into_value()),
            ("product_id", self.product_id.into_value()),
            ("seller_id", self.seller_id.into_value()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct City {
    pub id: UIntId,
    pub name: String,
    pub population: i32,
}

impl City {
    pub const NAME: Field<City, String> = Field::new("Name", None, None);
    pub const POPULATION: Field<City, i32> = Field::new("Population", None, None);
}

impl Model for City {
    const TABLE_NAME: &'static str = "cities";
    const COLUMNS: &'static [&'static str] = &["id", "name", "population"];
    type Id = UIntId;

    fn id(&self) -> &UIntId {
        &self.id
    }

    fn from_row(row: &RowView<'_>) -> Result<Self, CqlError> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            population: row.get("population")?,
        })
    }

    fn insert_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", self.name.clone().into_value()),
            ("population", self.population.into_value()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Country {
    pub id: UIntId,
    pub name: String,
    pub capital_id: UIntId,
    pub capital: Option<City>,
}

impl Country {
    pub const NAME: Field<Country, String> = Field::new("Name", None, None);
    pub const CAPITAL: Relation<Country, City> = Relation::new("capital", "capital_id", "id");
}

impl Model for Country {
    const TABLE_NAME: &'static str = "countries";
    const COLUMNS: &'static [&'static str] = &["id", "name", "capital_id"];
    type Id = UIntId;

    fn id(&self) -> &UIntId {
        &self.id
    }

    fn from_row(row: &RowView<'_>) -> Result<Self, CqlError> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            capital_id: row.get("capital_id")?,
            capital: row.preloaded("capital")?,
        })
    }

    fn insert_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", self.name.clone().into_value()),
            ("capital_id", self.capital_id.into_value()),
        ]
    }
}

/// Row of a sale with its product preloaded
pub fn sale_row(id: Uuid, code: i32, product: &Product) -> Row {
    Row::new()
        .with("id", id)
        .with("code", code)
        .with("product_id", product.id)
        .with("seller_id", Value::Uuid(None))
        .with("product__id", product.id)
        .with("product__int", product.int)
        .with("product__float", product.float)
        .with("product__bool", product.bool)
        .with("product__string", product.string.as_str())
}
