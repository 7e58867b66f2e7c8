//! Unified error types for the checkout engine.
//!
//! Every failure a caller can observe is a distinct variant carrying structured
//! context, so callers branch on the variant instead of parsing messages.

use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

/// Why a checkout request was rejected before touching storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum InvalidRequestReason {
    /// The request contained no items
    EmptyItems,
    /// A line asked for zero or a negative number of units
    NonPositiveQuantity {
        /// Product referenced by the offending line
        product_id: i64,
        /// Requested quantity
        quantity: i64,
    },
    /// The same product appeared on more than one line
    DuplicateProduct {
        /// Repeated product
        product_id: i64,
    },
    /// A subtotal or the order total does not fit in an `i64`
    AmountOverflow {
        /// Product whose line overflowed
        product_id: i64,
    },
}

impl std::fmt::Display for InvalidRequestReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyItems => write!(f, "checkout items cannot be empty"),
            Self::NonPositiveQuantity {
                product_id,
                quantity,
            } => write!(
                f,
                "quantity must be greater than 0 (product {product_id}, got {quantity})"
            ),
            Self::DuplicateProduct { product_id } => {
                write!(f, "product {product_id} appears more than once")
            }
            Self::AmountOverflow { product_id } => {
                write!(f, "amount overflow while pricing product {product_id}")
            }
        }
    }
}

/// Every error the engine can report.
#[derive(Debug, Error)]
pub enum Error {
    /// The checkout request was rejected before any storage access
    #[error("Invalid checkout request: {reason}")]
    InvalidRequest {
        /// What was wrong with the request
        reason: InvalidRequestReason,
    },

    /// A referenced product does not exist
    #[error("Product not found: {product_id}")]
    ProductNotFound {
        /// Missing product
        product_id: i64,
    },

    /// A referenced category does not exist
    #[error("Category not found: {category_id}")]
    CategoryNotFound {
        /// Missing category
        category_id: i64,
    },

    /// The catalog snapshot showed too little stock (advisory, before any write)
    #[error(
        "Insufficient stock for product {product_id} (available: {available}, requested: {requested})"
    )]
    InsufficientStock {
        /// Product that is short
        product_id: i64,
        /// Stock seen in the snapshot
        available: i64,
        /// Quantity asked for
        requested: i64,
    },

    /// Stock ran out between pricing and commit; the order was rolled back
    #[error(
        "Stock changed concurrently: {applied} of {expected} stock decrements could be applied"
    )]
    ConcurrentStockConflict {
        /// Number of lines that needed a decrement
        expected: u64,
        /// Number of decrements the guarded update applied
        applied: u64,
    },

    /// Product fields failed validation
    #[error("Invalid product: {message}")]
    InvalidProduct {
        /// Description of the problem
        message: String,
    },

    /// Category fields failed validation
    #[error("Invalid category: {message}")]
    InvalidCategory {
        /// Description of the problem
        message: String,
    },

    /// Any database failure; writes in flight are rolled back
    #[error("Storage failure: {0}")]
    Storage(#[from] DbErr),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },
}

impl Error {
    pub(crate) const fn invalid(reason: InvalidRequestReason) -> Self {
        Self::InvalidRequest { reason }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
