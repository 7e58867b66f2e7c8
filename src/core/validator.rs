//! Structural validation of checkout requests.
//!
//! Runs before any storage access. A [`ValidatedCheckout`] can only be obtained from
//! [`validate`], so downstream steps can rely on a non-empty item list, positive
//! quantities and unique product ids.

use crate::errors::{Error, InvalidRequestReason, Result};
use serde::Deserialize;
use std::collections::HashSet;

/// One requested product/quantity pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CheckoutItem {
    /// Product to purchase
    pub product_id: i64,
    /// Units requested
    pub quantity: i64,
}

/// Incoming checkout request, in the order the caller listed the items.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutRequest {
    /// Requested lines
    pub items: Vec<CheckoutItem>,
}

impl CheckoutRequest {
    /// Builds a request from `(product_id, quantity)` pairs.
    #[must_use]
    pub fn from_pairs(pairs: &[(i64, i64)]) -> Self {
        Self {
            items: pairs
                .iter()
                .map(|&(product_id, quantity)| CheckoutItem {
                    product_id,
                    quantity,
                })
                .collect(),
        }
    }
}

/// A request that passed [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCheckout {
    items: Vec<CheckoutItem>,
}

impl ValidatedCheckout {
    /// Validated items in request order.
    #[must_use]
    pub fn items(&self) -> &[CheckoutItem] {
        &self.items
    }
}

/// Rejects empty requests, non-positive quantities and repeated products.
///
/// The first offending line, in request order, determines the reported reason.
pub fn validate(request: CheckoutRequest) -> Result<ValidatedCheckout> {
    if request.items.is_empty() {
        return Err(Error::invalid(InvalidRequestReason::EmptyItems));
    }

    let mut seen = HashSet::with_capacity(request.items.len());
    for item in &request.items {
        if item.quantity <= 0 {
            return Err(Error::invalid(InvalidRequestReason::NonPositiveQuantity {
                product_id: item.product_id,
                quantity: item.quantity,
            }));
        }
        if !seen.insert(item.product_id) {
            return Err(Error::invalid(InvalidRequestReason::DuplicateProduct {
                product_id: item.product_id,
            }));
        }
    }

    Ok(ValidatedCheckout {
        items: request.items,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn reason(result: Result<ValidatedCheckout>) -> InvalidRequestReason {
        match result {
            Err(Error::InvalidRequest { reason }) => reason,
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_accepts_unique_positive_items() {
        let validated = validate(CheckoutRequest::from_pairs(&[(1, 2), (2, 1)])).unwrap();
        assert_eq!(validated.items().len(), 2);
        assert_eq!(validated.items()[0].product_id, 1);
        assert_eq!(validated.items()[1].quantity, 1);
    }

    #[test]
    fn test_validate_rejects_empty() {
        let result = validate(CheckoutRequest { items: vec![] });
        assert_eq!(reason(result), InvalidRequestReason::EmptyItems);
    }

    #[test]
    fn test_validate_rejects_non_positive_quantity() {
        let result = validate(CheckoutRequest::from_pairs(&[(1, 1), (2, 0)]));
        assert_eq!(
            reason(result),
            InvalidRequestReason::NonPositiveQuantity {
                product_id: 2,
                quantity: 0
            }
        );

        let result = validate(CheckoutRequest::from_pairs(&[(3, -4)]));
        assert_eq!(
            reason(result),
            InvalidRequestReason::NonPositiveQuantity {
                product_id: 3,
                quantity: -4
            }
        );
    }

    #[test]
    fn test_validate_rejects_duplicate_product() {
        let result = validate(CheckoutRequest::from_pairs(&[(1, 1), (2, 1), (1, 3)]));
        assert_eq!(
            reason(result),
            InvalidRequestReason::DuplicateProduct { product_id: 1 }
        );
    }

    #[test]
    fn test_checkout_request_deserializes() {
        let request: CheckoutRequest = toml::from_str(
            r"
            [[items]]
            product_id = 4
            quantity = 2
        ",
        )
        .unwrap();
        assert_eq!(request, CheckoutRequest::from_pairs(&[(4, 2)]));
    }
}
