//! Pricing of validated checkouts against live catalog snapshots.
//!
//! The stock comparison done here is advisory: it produces a precise
//! [`Error::InsufficientStock`] early, but the committer re-checks stock at write
//! time and is the only place that guarantees it never goes negative.

use crate::{
    core::{catalog, validator::ValidatedCheckout},
    errors::{Error, InvalidRequestReason, Result},
};
use sea_orm::ConnectionTrait;
use tracing::debug;

/// A request line with its price resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    /// Product identity
    pub product_id: i64,
    /// Product name captured for the order line
    pub product_name: String,
    /// Unit price used for the subtotal
    pub unit_price: i64,
    /// Units purchased
    pub quantity: i64,
    /// `unit_price * quantity`
    pub subtotal: i64,
}

/// Fully priced checkout, ready to commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCheckout {
    /// Lines in request order
    pub lines: Vec<PricedLine>,
    /// Sum of line subtotals
    pub total: i64,
}

/// Looks up each line's snapshot and computes subtotals and the order total.
///
/// # Errors
/// - [`Error::ProductNotFound`] if a product does not exist
/// - [`Error::InsufficientStock`] if a snapshot shows less stock than requested
/// - [`Error::InvalidRequest`] with `AmountOverflow` if an amount exceeds `i64`
pub async fn price_checkout<C: ConnectionTrait>(
    db: &C,
    checkout: &ValidatedCheckout,
) -> Result<PricedCheckout> {
    let mut lines = Vec::with_capacity(checkout.items().len());
    let mut total: i64 = 0;

    for item in checkout.items() {
        let snapshot = catalog::lookup_snapshot(db, item.product_id)
            .await?
            .ok_or(Error::ProductNotFound {
                product_id: item.product_id,
            })?;

        if snapshot.stock < item.quantity {
            return Err(Error::InsufficientStock {
                product_id: item.product_id,
                available: snapshot.stock,
                requested: item.quantity,
            });
        }

        let overflow = || {
            Error::invalid(InvalidRequestReason::AmountOverflow {
                product_id: item.product_id,
            })
        };
        let subtotal = snapshot
            .unit_price
            .checked_mul(item.quantity)
            .ok_or_else(overflow)?;
        total = total.checked_add(subtotal).ok_or_else(overflow)?;

        debug!(product_id = item.product_id, subtotal, "Priced checkout line");
        lines.push(PricedLine {
            product_id: item.product_id,
            product_name: snapshot.name,
            unit_price: snapshot.unit_price,
            quantity: item.quantity,
            subtotal,
        });
    }

    Ok(PricedCheckout { lines, total })
}
