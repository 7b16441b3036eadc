//! Sale log records and derived read models.
//!
//! # Invariants
//! - A `Sale` is created only by recording a sale and never mutated after.
//! - `product_name` is a snapshot taken at sale time, not a live reference,
//!   so sale history survives product deletion.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a recorded sale.
pub type SaleId = Uuid;

/// One append-only entry in the sale log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    /// Stable global ID assigned when the sale is recorded.
    pub uuid: SaleId,
    /// Product name as it read at sale time.
    pub product_name: String,
    /// Units sold. Always at least 1.
    pub quantity_sold: u32,
    /// `quantity_sold` times the unit price at sale time.
    pub total_price: f64,
    /// ISO-8601 UTC timestamp assigned when the sale is recorded.
    pub sale_date: String,
}

/// Receipt returned by a successful sale: the created log entry plus its
/// computed total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleReceipt {
    pub sale: Sale,
    pub total_price: f64,
}

/// Per-product aggregation over the sale log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleSummary {
    pub product_name: String,
    /// Sum of `quantity_sold` across this product's sales.
    pub total_quantity: u64,
    /// Sum of `total_price` across this product's sales.
    pub total_sales: f64,
}

/// Catalog-wide rollup for dashboard-style consumers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LedgerTotals {
    /// Number of products currently in the catalog.
    pub product_count: u64,
    /// Revenue summed over the entire sale log.
    pub total_revenue: f64,
}
