//! Domain model for the stock ledger.
//!
//! # Responsibility
//! - Define the canonical records owned by the ledger: products and sales.
//! - Keep validation rules next to the data they protect.
//!
//! # Invariants
//! - Every domain object is identified by a stable id assigned on creation.
//! - Sale records are immutable once created.

pub mod product;
pub mod sale;
