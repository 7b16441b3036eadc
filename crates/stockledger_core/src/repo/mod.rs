//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for the stock ledger.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Product::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `UnknownProduct`,
//!   `InsufficientStock`) in addition to DB transport errors.
//! - Stock decrement and sale append commit together or not at all.

pub mod ledger_repo;
