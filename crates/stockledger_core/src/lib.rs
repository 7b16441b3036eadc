//! Core domain logic for the stock ledger.
//! This crate is the single source of truth for business invariants:
//! product stock never goes negative, and every stock decrement commits
//! together with its sale log entry.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::product::{Product, ProductId, ProductValidationError};
pub use model::sale::{LedgerTotals, Sale, SaleId, SaleReceipt, SaleSummary};
pub use repo::ledger_repo::{
    LedgerError, LedgerRepository, LedgerResult, ProductListQuery, SqliteLedgerRepository,
};
pub use service::ledger_service::{StockLedger, DEFAULT_LOW_STOCK_THRESHOLD};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
