//! Stock ledger repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable catalog CRUD and sale-recording APIs over canonical
//!   `products`/`sales` storage.
//! - Keep SQL details inside the ledger persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Product::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - `record_sale` runs its availability check, stock decrement and sale
//!   append inside one IMMEDIATE transaction, so `quantity >= 0` holds even
//!   with concurrent sellers on separate connections.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::product::{Product, ProductId, ProductValidationError};
use crate::model::sale::{LedgerTotals, Sale, SaleId, SaleReceipt, SaleSummary};
use log::{info, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const PRODUCT_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    category,
    price,
    quantity
FROM products";

const SALE_SELECT_SQL: &str = "SELECT
    uuid,
    product_name,
    quantity_sold,
    total_price,
    sale_date
FROM sales";

/// Tables and columns a connection must carry before the repository accepts
/// it. Guards against callers skipping `open_db` migration bootstrap.
const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    (
        "products",
        &["uuid", "name", "category", "price", "quantity"],
    ),
    (
        "sales",
        &[
            "uuid",
            "product_name",
            "quantity_sold",
            "total_price",
            "sale_date",
        ],
    ),
];

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger error taxonomy: validation, semantic rejections and DB transport.
#[derive(Debug)]
pub enum LedgerError {
    Validation(ProductValidationError),
    Db(DbError),
    /// Update/remove addressed a product id that does not exist.
    NotFound(ProductId),
    /// `record_sale` referenced a product name with no match.
    UnknownProduct(String),
    /// Requested quantity exceeds stock on hand; nothing was mutated.
    InsufficientStock { requested: u32, available: u32 },
    /// `record_sale` was asked for zero units.
    InvalidQuantity,
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "product not found: {id}"),
            Self::UnknownProduct(name) => write!(f, "unknown product: {name}"),
            Self::InsufficientStock {
                requested,
                available,
            } => write!(
                f,
                "insufficient stock: requested {requested}, available {available}"
            ),
            Self::InvalidQuantity => write!(f, "sale quantity must be at least 1"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted ledger data: {message}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through open_db"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "connection is missing required table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(
                    f,
                    "connection is missing required column `{table}.{column}`"
                )
            }
        }
    }
}

impl Error for LedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProductValidationError> for LedgerError {
    fn from(value: ProductValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for LedgerError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing the product catalog.
#[derive(Debug, Clone, Default)]
pub struct ProductListQuery {
    /// Optional exact-match category filter.
    pub category: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for catalog and sale-log operations.
pub trait LedgerRepository {
    /// Persists a new product. Duplicate names are permitted.
    fn add_product(&self, product: &Product) -> LedgerResult<ProductId>;
    /// Overwrites all mutable fields of an existing product.
    fn update_product(&self, product: &Product) -> LedgerResult<()>;
    /// Hard-deletes a product. Historical sales are untouched.
    fn remove_product(&self, id: ProductId) -> LedgerResult<()>;
    fn get_product(&self, id: ProductId) -> LedgerResult<Option<Product>>;
    /// Lists products in insertion order.
    fn list_products(&self, query: &ProductListQuery) -> LedgerResult<Vec<Product>>;
    /// Atomically decrements stock and appends a sale log entry.
    fn record_sale(&self, product_name: &str, quantity_sold: u32) -> LedgerResult<SaleReceipt>;
    /// Lists raw sale records in creation order.
    fn list_sales(&self) -> LedgerResult<Vec<Sale>>;
    /// Aggregates quantity and revenue per product name.
    fn summarize_sales(&self) -> LedgerResult<Vec<SaleSummary>>;
    /// Products with stock at or below `threshold`, inclusive.
    fn low_stock(&self, threshold: u32) -> LedgerResult<Vec<Product>>;
    /// Catalog-wide product count and summed sale revenue.
    fn totals(&self) -> LedgerResult<LedgerTotals>;
}

/// SQLite-backed ledger repository.
pub struct SqliteLedgerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLedgerRepository<'conn> {
    /// Wraps a connection after verifying its schema is usable.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `PRAGMA user_version` does not match
    ///   the latest migration known to this binary.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the ledger
    ///   tables are absent or incomplete.
    pub fn try_new(conn: &'conn Connection) -> LedgerResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(LedgerError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        for (table, columns) in REQUIRED_SCHEMA {
            ensure_table_shape(conn, table, columns)?;
        }

        Ok(Self { conn })
    }
}

impl LedgerRepository for SqliteLedgerRepository<'_> {
    fn add_product(&self, product: &Product) -> LedgerResult<ProductId> {
        product.validate()?;

        self.conn.execute(
            "INSERT INTO products (uuid, name, category, price, quantity)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                product.uuid.to_string(),
                product.name.as_str(),
                product.category.as_str(),
                product.price,
                product.quantity,
            ],
        )?;

        Ok(product.uuid)
    }

    fn update_product(&self, product: &Product) -> LedgerResult<()> {
        product.validate()?;

        let changed = self.conn.execute(
            "UPDATE products
             SET
                name = ?1,
                category = ?2,
                price = ?3,
                quantity = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?5;",
            params![
                product.name.as_str(),
                product.category.as_str(),
                product.price,
                product.quantity,
                product.uuid.to_string(),
            ],
        )?;

        // Zero affected rows is surfaced, never silently swallowed.
        if changed == 0 {
            return Err(LedgerError::NotFound(product.uuid));
        }

        Ok(())
    }

    fn remove_product(&self, id: ProductId) -> LedgerResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM products WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(LedgerError::NotFound(id));
        }

        Ok(())
    }

    fn get_product(&self, id: ProductId) -> LedgerResult<Option<Product>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PRODUCT_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_product_row(row)?));
        }

        Ok(None)
    }

    fn list_products(&self, query: &ProductListQuery) -> LedgerResult<Vec<Product>> {
        let mut sql = format!("{PRODUCT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(category) = &query.category {
            sql.push_str(" AND category = ?");
            bind_values.push(Value::Text(category.clone()));
        }

        sql.push_str(" ORDER BY rowid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut products = Vec::new();

        while let Some(row) = rows.next()? {
            products.push(parse_product_row(row)?);
        }

        Ok(products)
    }

    fn record_sale(&self, product_name: &str, quantity_sold: u32) -> LedgerResult<SaleReceipt> {
        if quantity_sold == 0 {
            return Err(LedgerError::InvalidQuantity);
        }

        // IMMEDIATE takes the write lock up front, so the availability check
        // below cannot go stale under a concurrent seller. Early returns drop
        // the transaction and roll back.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let product = {
            let mut stmt = tx.prepare(&format!(
                "{PRODUCT_SELECT_SQL} WHERE name = ?1 ORDER BY rowid ASC LIMIT 1;"
            ))?;
            let mut rows = stmt.query([product_name])?;
            match rows.next()? {
                Some(row) => parse_product_row(row)?,
                None => {
                    warn!(
                        "event=record_sale module=repo status=rejected reason=unknown_product"
                    );
                    return Err(LedgerError::UnknownProduct(product_name.to_string()));
                }
            }
        };

        if !product.can_fulfill(quantity_sold) {
            warn!(
                "event=record_sale module=repo status=rejected reason=insufficient_stock product_id={} requested={} available={}",
                product.uuid, quantity_sold, product.quantity
            );
            return Err(LedgerError::InsufficientStock {
                requested: quantity_sold,
                available: product.quantity,
            });
        }

        let total_price = f64::from(quantity_sold) * product.price;
        let remaining = product.quantity - quantity_sold;
        let sale_id: SaleId = Uuid::new_v4();

        tx.execute(
            "UPDATE products
             SET quantity = ?1, updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![remaining, product.uuid.to_string()],
        )?;

        tx.execute(
            "INSERT INTO sales (uuid, product_name, quantity_sold, total_price, sale_date)
             VALUES (?1, ?2, ?3, ?4, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'));",
            params![
                sale_id.to_string(),
                product.name.as_str(),
                quantity_sold,
                total_price,
            ],
        )?;

        let sale_date: String = tx.query_row(
            "SELECT sale_date FROM sales WHERE uuid = ?1;",
            [sale_id.to_string()],
            |row| row.get(0),
        )?;

        tx.commit()?;

        info!(
            "event=record_sale module=repo status=ok product_id={} quantity={} remaining={}",
            product.uuid, quantity_sold, remaining
        );

        Ok(SaleReceipt {
            sale: Sale {
                uuid: sale_id,
                product_name: product.name,
                quantity_sold,
                total_price,
                sale_date,
            },
            total_price,
        })
    }

    fn list_sales(&self) -> LedgerResult<Vec<Sale>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SALE_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut sales = Vec::new();

        while let Some(row) = rows.next()? {
            sales.push(parse_sale_row(row)?);
        }

        Ok(sales)
    }

    fn summarize_sales(&self) -> LedgerResult<Vec<SaleSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                product_name,
                SUM(quantity_sold) AS total_quantity,
                SUM(total_price) AS total_sales
             FROM sales
             GROUP BY product_name
             ORDER BY product_name ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut summaries = Vec::new();

        while let Some(row) = rows.next()? {
            let total_quantity: i64 = row.get("total_quantity")?;
            summaries.push(SaleSummary {
                product_name: row.get("product_name")?,
                total_quantity: u64::try_from(total_quantity).map_err(|_| {
                    LedgerError::InvalidData(format!(
                        "negative aggregate quantity `{total_quantity}` in sales"
                    ))
                })?,
                total_sales: row.get("total_sales")?,
            });
        }

        Ok(summaries)
    }

    fn low_stock(&self, threshold: u32) -> LedgerResult<Vec<Product>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PRODUCT_SELECT_SQL} WHERE quantity <= ?1 ORDER BY rowid ASC;"
        ))?;
        let mut rows = stmt.query([threshold])?;
        let mut products = Vec::new();

        while let Some(row) = rows.next()? {
            products.push(parse_product_row(row)?);
        }

        Ok(products)
    }

    fn totals(&self) -> LedgerResult<LedgerTotals> {
        let product_count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM products;", [], |row| row.get(0))?;
        let total_revenue: f64 = self.conn.query_row(
            "SELECT COALESCE(SUM(total_price), 0.0) FROM sales;",
            [],
            |row| row.get(0),
        )?;

        Ok(LedgerTotals {
            product_count: u64::try_from(product_count).map_err(|_| {
                LedgerError::InvalidData(format!(
                    "negative product count `{product_count}`"
                ))
            })?,
            total_revenue,
        })
    }
}

fn parse_product_row(row: &Row<'_>) -> LedgerResult<Product> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        LedgerError::InvalidData(format!("invalid uuid value `{uuid_text}` in products.uuid"))
    })?;

    let raw_quantity: i64 = row.get("quantity")?;
    let quantity = u32::try_from(raw_quantity).map_err(|_| {
        LedgerError::InvalidData(format!(
            "invalid quantity value `{raw_quantity}` in products.quantity"
        ))
    })?;

    let product = Product {
        uuid,
        name: row.get("name")?,
        category: row.get("category")?,
        price: row.get("price")?,
        quantity,
    };
    product.validate()?;
    Ok(product)
}

fn parse_sale_row(row: &Row<'_>) -> LedgerResult<Sale> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        LedgerError::InvalidData(format!("invalid uuid value `{uuid_text}` in sales.uuid"))
    })?;

    let raw_quantity: i64 = row.get("quantity_sold")?;
    let quantity_sold = u32::try_from(raw_quantity).map_err(|_| {
        LedgerError::InvalidData(format!(
            "invalid quantity value `{raw_quantity}` in sales.quantity_sold"
        ))
    })?;

    Ok(Sale {
        uuid,
        product_name: row.get("product_name")?,
        quantity_sold,
        total_price: row.get("total_price")?,
        sale_date: row.get("sale_date")?,
    })
}

fn ensure_table_shape(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> LedgerResult<()> {
    let table_exists: bool = conn.query_row(
        "SELECT EXISTS (
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
         );",
        [table],
        |row| row.get(0),
    )?;
    if !table_exists {
        return Err(LedgerError::MissingRequiredTable(table));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut present = Vec::new();
    while let Some(row) = rows.next()? {
        present.push(row.get::<_, String>("name")?);
    }

    for column in columns {
        if !present.iter().any(|name| name == column) {
            return Err(LedgerError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}
