//! In-memory executor and model set shared by the unit tests.

use crate::dialect::Dialect;
use crate::executor::{ExecError, Executor};
use crate::row::Row;
use sea_query::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Executor that records every statement and answers queries with canned rows.
///
/// Each `query_all` call consumes the next result set pushed with `with_rows` (an
/// empty set once they run out); `execute` reports the configured affected count.
#[derive(Clone)]
pub(crate) struct MockExecutor {
    dialect: Dialect,
    statements: Arc<Mutex<Vec<(String, Vec<Value>)>>>,
    results: Arc<Mutex<VecDeque<Vec<Row>>>>,
    affected: u64,
    failure: Arc<Mutex<Option<ExecError>>>,
}

impl MockExecutor {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            statements: Arc::new(Mutex::new(Vec::new())),
            results: Arc::new(Mutex::new(VecDeque::new())),
            affected: 0,
            failure: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_rows(self, rows: Vec<Row>) -> Self {
        self.results.lock().unwrap().push_back(rows);
        self
    }

    pub fn with_affected(mut self, affected: u64) -> Self {
        self.affected = affected;
        self
    }

    /// The next statement fails with `err`
    pub fn failing(self, err: ExecError) -> Self {
        *self.failure.lock().unwrap() = Some(err);
        self
    }

    pub fn statements(&self) -> Vec<(String, Vec<Value>)> {
        self.statements.lock().unwrap().clone()
    }

    fn record(&self, sql: &str, values: &[Value]) -> Result<(), ExecError> {
        self.statements
            .lock()
            .unwrap()
            .push((sql.to_string(), values.to_vec()));
        match self.failure.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Executor for MockExecutor {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn insert_batch_size(&self) -> usize {
        2
    }

    fn execute(&self, sql: &str, values: &[Value]) -> Result<u64, ExecError> {
        self.record(sql, values)?;
        Ok(self.affected)
    }

    fn query_all(&self, sql: &str, values: &[Value]) -> Result<Vec<Row>, ExecError> {
        self.record(sql, values)?;
        Ok(self.results.lock().unwrap().pop_front().unwrap_or_default())
    }
}

pub(crate) mod models {
    use crate::condition::field::Field;
    use crate::condition::join::Relation;
    use crate::condition::preload::Collection;
    use crate::error::CqlError;
    use crate::model::{Model, UIntId};
    use crate::row::RowView;
    use crate::value::ValueType;
    use chrono::{DateTime, Utc};
    use sea_query::Value;
    use uuid::Uuid;

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

    fn company_key(company: &Company) -> Value {
        company.id.into_value()
    }

    fn seller_company_key(seller: &Seller) -> Value {
        seller.company_id.into_value()
    }

    fn attach_sellers(company: &mut Company, sellers: Vec<Seller>) {
        company.sellers = Some(sellers);
    }

    impl Company {
        pub const NAME: Field<Company, String> = Field::new("Name", None, None);
        pub const DELETED_AT: Field<Company, Option<DateTime<Utc>>> = Field::new("DeletedAt", None, None);
        pub const SELLERS: Collection<Company, Seller> =
            Collection::new("sellers", "id", "company_id", company_key, seller_company_key, attach_sellers);
    }

    impl Model for Company {
        const TABLE_NAME: &'static str = "companies";
        const COLUMNS: &'static [&'static str] = &[
            "id",
            "created_at",
            "updated_at",
            "deleted_at",
            "name",
        ];
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
        pub const COMPANY_ID: Field<Seller, Option<Uuid>> = Field::new("CompanyID", None, None);
        pub const COMPANY: Relation<Seller, Company> = Relation::new("company", "company_id", "id");
    }

    impl Model for Seller {
        const TABLE_NAME: &'static str = "sellers";
        const COLUMNS: &'static [&'static str] = &[
            "id",
            "created_at",
            "updated_at",
            "deleted_at",
            "name",
            "company_id",
        ];
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
        pub int_pointer: Option<i32>,
        pub string: String,
        pub float: f64,
        pub bool: bool,
        pub embedded_int: i32,
        pub gorm_embedded_int: i32,
    }

    impl Product {
        pub const INT: Field<Product, i32> = Field::new("Int", None, None);
        pub const INT_POINTER: Field<Product, Option<i32>> = Field::new("IntPointer", None, None);
        pub const STRING: Field<Product, String> = Field::new("String", Some("string_something_else"), None);
        pub const FLOAT: Field<Product, f64> = Field::new("Float", None, None);
        pub const BOOL: Field<Product, bool> = Field::new("Bool", None, None);
        pub const EMBEDDED_INT: Field<Product, i32> = Field::new("EmbeddedInt", None, None);
        pub const GORM_EMBEDDED_INT: Field<Product, i32> = Field::new("Int", None, Some("gorm_embedded_"));
        pub const DELETED_AT: Field<Product, Option<DateTime<Utc>>> = Field::new("DeletedAt", None, None);
    }

    impl Model for Product {
        const TABLE_NAME: &'static str = "products";
        const COLUMNS: &'static [&'static str] = &[
            "id",
            "created_at",
            "updated_at",
            "deleted_at",
            "int",
            "int_pointer",
            "string_something_else",
            "float",
            "bool",
            "embedded_int",
            "gorm_embedded_int",
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
                int_pointer: row.get_opt("int_pointer")?,
                string: row.get("string_something_else")?,
                float: row.get("float")?,
                bool: row.get("bool")?,
                embedded_int: row.get("embedded_int")?,
                gorm_embedded_int: row.get("gorm_embedded_int")?,
            })
        }

        fn insert_values(&self) -> Vec<(&'static str, Value)> {
            vec![
                ("id", self.id.into_value()),
                ("int", self.int.into_value()),
                ("int_pointer", self.int_pointer.into_value()),
                ("string_something_else", self.string.clone().into_value()),
                ("float", self.float.into_value()),
                ("bool", self.bool.into_value()),
                ("embedded_int", self.embedded_int.into_value()),
                ("gorm_embedded_int", self.gorm_embedded_int.into_value()),
            ]
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Sale {
        pub id: Uuid,
        pub code: i32,
        pub description: String,
        pub product_id: Uuid,
        pub product: Option<Product>,
        pub seller_id: Option<Uuid>,
        pub seller: Option<Seller>,
    }

    impl Sale {
        pub const CODE: Field<Sale, i32> = Field::new("Code", None, None);
        pub const DESCRIPTION: Field<Sale, String> = Field::new("Description", None, None);
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
            "description",
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
                description: row.get("description")?,
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
                ("description", self.description.clone().into_value()),
                ("product_id", self.product_id.into_value()),
                ("seller_id", self.seller_id.into_value()),
            ]
        }
    }

    /// Model without timestamps nor soft delete
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Brand {
        pub id: UIntId,
        pub name: String,
    }

    impl Brand {
        pub const NAME: Field<Brand, String> = Field::new("Name", None, None);
    }

    impl Model for Brand {
        const TABLE_NAME: &'static str = "brands";
        const COLUMNS: &'static [&'static str] = &["id", "name"];
        type Id = UIntId;

        fn id(&self) -> &UIntId {
            &self.id
        }

        fn from_row(row: &RowView<'_>) -> Result<Self, CqlError> {
            Ok(Self {
                id: row.get("id")?,
                name: row.get("name")?,
            })
        }

        fn insert_values(&self) -> Vec<(&'static str, Value)> {
            let mut values = Vec::with_capacity(2);
            if self.is_loaded() {
                values.push(("id", self.id.into_value()));
            }
            values.push(("name", self.name.clone().into_value()));
            values
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Phone {
        pub id: UIntId,
        pub name: String,
        pub brand_id: UIntId,
        pub brand: Option<Brand>,
    }

    impl Phone {
        pub const NAME: Field<Phone, String> = Field::new("Name", None, None);
        pub const BRAND: Relation<Phone, Brand> = Relation::new("brand", "brand_id", "id");
    }

    impl Model for Phone {
        const TABLE_NAME: &'static str = "phones";
        const COLUMNS: &'static [&'static str] = &["id", "name", "brand_id"];
        type Id = UIntId;

        fn id(&self) -> &UIntId {
            &self.id
        }

        fn from_row(row: &RowView<'_>) -> Result<Self, CqlError> {
            Ok(Self {
                id: row.get("id")?,
                name: row.get("name")?,
                brand_id: row.get("brand_id")?,
                brand: row.preloaded("brand")?,
            })
        }

        fn insert_values(&self) -> Vec<(&'static str, Value)> {
            vec![
                ("name", self.name.clone().into_value()),
                ("brand_id", self.brand_id.into_value()),
            ]
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Employee {
        pub id: Uuid,
        pub name: String,
        pub boss_id: Option<Uuid>,
        pub boss: Option<Box<Employee>>,
    }

    impl Employee {
        pub const NAME: Field<Employee, String> = Field::new("Name", None, None);
        pub const BOSS: Relation<Employee, Employee> = Relation::new("boss", "boss_id", "id");
    }

    impl Model for Employee {
        const TABLE_NAME: &'static str = "employees";
        const COLUMNS: &'static [&'static str] = &[
            "id",
            "created_at",
            "updated_at",
            "deleted_at",
            "name",
            "boss_id",
        ];
        type Id = Uuid;

        fn id(&self) -> &Uuid {
            &self.id
        }

        timestamps!();

        fn from_row(row: &RowView<'_>) -> Result<Self, CqlError> {
            Ok(Self {
                id: row.get("id")?,
                name: row.get("name")?,
                boss_id: row.get_opt("boss_id")?,
                boss: row.preloaded("boss")?.map(Box::new),
            })
        }

        fn insert_values(&self) -> Vec<(&'static str, Value)> {
            vec![
                ("id", self.id.into_value()),
                ("name", self.name.clone().into_value()),
                ("boss_id", self.boss_id.into_value()),
            ]
        }
    }
}
