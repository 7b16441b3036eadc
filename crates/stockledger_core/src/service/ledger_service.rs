//! Stock ledger use-case service.
//!
//! # Responsibility
//! - Provide the entry points a presentation layer calls with validated
//!   primitive inputs.
//! - Delegate persistence and invariant enforcement to the repository.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::product::{Product, ProductId};
use crate::model::sale::{LedgerTotals, Sale, SaleReceipt, SaleSummary};
use crate::repo::ledger_repo::{LedgerRepository, LedgerResult, ProductListQuery};

/// Stock alert boundary used when the caller does not supply one.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

/// Use-case facade over a ledger repository.
pub struct StockLedger<R: LedgerRepository> {
    repo: R,
}

impl<R: LedgerRepository> StockLedger<R> {
    /// Creates a ledger using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds a catalog product and returns it with its assigned id.
    ///
    /// # Contract
    /// - `price >= 0`, non-empty name/category (enforced downstream).
    /// - Duplicate names are permitted; callers disambiguate by id.
    pub fn add_product(
        &self,
        name: impl Into<String>,
        category: impl Into<String>,
        price: f64,
        quantity: u32,
    ) -> LedgerResult<Product> {
        let product = Product::new(name, category, price, quantity);
        self.repo.add_product(&product)?;
        Ok(product)
    }

    /// Overwrites all mutable fields of an existing product.
    ///
    /// A missing id is an explicit `NotFound` error, never a silent no-op.
    pub fn update_product(
        &self,
        id: ProductId,
        name: impl Into<String>,
        category: impl Into<String>,
        price: f64,
        quantity: u32,
    ) -> LedgerResult<Product> {
        let product = Product::with_id(id, name, category, price, quantity);
        self.repo.update_product(&product)?;
        Ok(product)
    }

    /// Removes a product by id. Historical sales are untouched.
    pub fn remove_product(&self, id: ProductId) -> LedgerResult<()> {
        self.repo.remove_product(id)
    }

    /// Gets one product by id.
    pub fn get_product(&self, id: ProductId) -> LedgerResult<Option<Product>> {
        self.repo.get_product(id)
    }

    /// Records a sale: decrements stock and appends a sale log entry as one
    /// unit of work. Returns the receipt with the computed total.
    pub fn record_sale(
        &self,
        product_name: &str,
        quantity_sold: u32,
    ) -> LedgerResult<SaleReceipt> {
        self.repo.record_sale(product_name, quantity_sold)
    }

    /// Current catalog in insertion order.
    pub fn query_stock(&self) -> LedgerResult<Vec<Product>> {
        self.repo.list_products(&ProductListQuery::default())
    }

    /// Catalog filtered/paged for display purposes.
    pub fn query_stock_with(&self, query: &ProductListQuery) -> LedgerResult<Vec<Product>> {
        self.repo.list_products(query)
    }

    /// Raw sale records in creation order.
    pub fn query_sales(&self) -> LedgerResult<Vec<Sale>> {
        self.repo.list_sales()
    }

    /// Per-product aggregation of quantity sold and revenue.
    pub fn sales_summary(&self) -> LedgerResult<Vec<SaleSummary>> {
        self.repo.summarize_sales()
    }

    /// Products at or below `threshold` units, inclusive boundary.
    pub fn low_stock(&self, threshold: u32) -> LedgerResult<Vec<Product>> {
        self.repo.low_stock(threshold)
    }

    /// [`low_stock`](Self::low_stock) with [`DEFAULT_LOW_STOCK_THRESHOLD`].
    pub fn low_stock_default(&self) -> LedgerResult<Vec<Product>> {
        self.repo.low_stock(DEFAULT_LOW_STOCK_THRESHOLD)
    }

    /// Product count and summed sale revenue.
    pub fn totals(&self) -> LedgerResult<LedgerTotals> {
        self.repo.totals()
    }
}
