//! Product domain model.
//!
//! # Responsibility
//! - Define the catalog record the ledger decrements stock against.
//! - Provide field validation shared by all write paths.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another product.
//! - `quantity` (stock on hand) is never negative; the repository enforces
//!   this, the type (`u32`) and the schema CHECK back it up.
//! - `price` is finite and non-negative.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a catalog product.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ProductId = Uuid;

/// Catalog entry with current stock on hand.
///
/// Product names are not required to be unique; callers that need to
/// disambiguate duplicates address products by `uuid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Stable global ID used for update/remove addressing.
    pub uuid: ProductId,
    /// Display name. Free-form, duplicates permitted.
    pub name: String,
    /// Free-form category label.
    pub category: String,
    /// Unit price. Finite, non-negative.
    pub price: f64,
    /// Quantity on hand. Mutated only by explicit update or sale recording.
    pub quantity: u32,
}

/// Validation failure for product fields.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductValidationError {
    EmptyName,
    EmptyCategory,
    NegativePrice(f64),
    NonFinitePrice,
}

impl Display for ProductValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "product name must not be empty"),
            Self::EmptyCategory => write!(f, "product category must not be empty"),
            Self::NegativePrice(price) => {
                write!(f, "product price must be non-negative, got {price}")
            }
            Self::NonFinitePrice => write!(f, "product price must be a finite number"),
        }
    }
}

impl Error for ProductValidationError {}

impl Product {
    /// Creates a new product with a generated stable ID.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        price: f64,
        quantity: u32,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), name, category, price, quantity)
    }

    /// Creates a product with a caller-provided stable ID.
    ///
    /// Used by read paths reconstructing persisted rows and by tests that
    /// need deterministic identities.
    pub fn with_id(
        uuid: ProductId,
        name: impl Into<String>,
        category: impl Into<String>,
        price: f64,
        quantity: u32,
    ) -> Self {
        Self {
            uuid,
            name: name.into(),
            category: category.into(),
            price,
            quantity,
        }
    }

    /// Checks field-level rules common to create and update paths.
    ///
    /// # Errors
    /// - `EmptyName` / `EmptyCategory` when the trimmed text is empty.
    /// - `NonFinitePrice` for NaN or infinite prices.
    /// - `NegativePrice` for prices below zero.
    pub fn validate(&self) -> Result<(), ProductValidationError> {
        if self.name.trim().is_empty() {
            return Err(ProductValidationError::EmptyName);
        }
        if self.category.trim().is_empty() {
            return Err(ProductValidationError::EmptyCategory);
        }
        if !self.price.is_finite() {
            return Err(ProductValidationError::NonFinitePrice);
        }
        if self.price < 0.0 {
            return Err(ProductValidationError::NegativePrice(self.price));
        }
        Ok(())
    }

    /// Returns whether `requested` units can be sold from current stock.
    pub fn can_fulfill(&self, requested: u32) -> bool {
        requested <= self.quantity
    }
}

#[cfg(test)]
mod tests {
    use super::{Product, ProductValidationError};

    #[test]
    fn new_product_passes_validation() {
        let product = Product::new("Pen", "Stationery", 10.0, 100);
        assert!(product.validate().is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        let product = Product::new("   ", "Stationery", 10.0, 100);
        assert_eq!(
            product.validate(),
            Err(ProductValidationError::EmptyName)
        );
    }

    #[test]
    fn blank_category_is_rejected() {
        let product = Product::new("Pen", "", 10.0, 100);
        assert_eq!(
            product.validate(),
            Err(ProductValidationError::EmptyCategory)
        );
    }

    #[test]
    fn negative_price_is_rejected() {
        let product = Product::new("Pen", "Stationery", -0.5, 100);
        assert_eq!(
            product.validate(),
            Err(ProductValidationError::NegativePrice(-0.5))
        );
    }

    #[test]
    fn non_finite_price_is_rejected() {
        let product = Product::new("Pen", "Stationery", f64::NAN, 100);
        assert_eq!(
            product.validate(),
            Err(ProductValidationError::NonFinitePrice)
        );
    }

    #[test]
    fn can_fulfill_is_inclusive_of_exact_stock() {
        let product = Product::new("Pen", "Stationery", 10.0, 5);
        assert!(product.can_fulfill(5));
        assert!(!product.can_fulfill(6));
    }
}
