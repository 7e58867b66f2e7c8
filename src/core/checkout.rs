//! Checkout orchestration and order history.
//!
//! [`checkout`] runs validation, pricing and the atomic commit in sequence and returns
//! the committed order. It never retries; a [`Error::ConcurrentStockConflict`] is handed
//! back to the caller to resubmit if it wants to.

use crate::{
    core::{committer, pricing, validator},
    entities::{Order, OrderLine, order, order_line},
    errors::{Error, Result},
};
use sea_orm::{LoaderTrait, QueryOrder, prelude::*};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// A committed order together with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedOrder {
    /// Order header with assigned id and timestamp
    #[serde(flatten)]
    pub order: order::Model,
    /// Lines ordered by id, which is also request order
    pub lines: Vec<order_line::Model>,
}

/// Converts a checkout request into a committed order.
///
/// # Errors
/// - [`Error::InvalidRequest`] for an empty request, a non-positive quantity or a repeated product
/// - [`Error::ProductNotFound`] if any product does not exist
/// - [`Error::InsufficientStock`] if the catalog already shows too little stock
/// - [`Error::ConcurrentStockConflict`] if stock ran out between pricing and commit
/// - [`Error::Storage`] for database failures
///
/// Only the last two can happen after a write has started, and both roll back fully.
#[instrument(skip(db, request), fields(items = request.items.len()))]
pub async fn checkout(
    db: &DatabaseConnection,
    request: validator::CheckoutRequest,
) -> Result<PlacedOrder> {
    let validated = validator::validate(request)?;
    let priced = pricing::price_checkout(db, &validated).await?;

    match committer::commit_order(db, priced).await {
        Ok(placed) => {
            info!(
                order_id = placed.order.id,
                total = placed.order.total_amount,
                "Checkout committed"
            );
            Ok(placed)
        }
        Err(e @ Error::ConcurrentStockConflict { .. }) => {
            warn!("Checkout lost a stock race: {}", e);
            Err(e)
        }
        Err(e) => Err(e),
    }
}

/// Lists every order, newest first, each with its lines in id order.
pub async fn list_orders(db: &DatabaseConnection) -> Result<Vec<PlacedOrder>> {
    let orders = Order::find()
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await?;
    let lines = orders.load_many(OrderLine, db).await?;

    Ok(orders
        .into_iter()
        .zip(lines)
        .map(|(order, mut lines)| {
            lines.sort_by_key(|line| line.id);
            PlacedOrder { order, lines }
        })
        .collect())
}

/// Retrieves one order with its lines, or `None` if it does not exist.
pub async fn get_order(db: &DatabaseConnection, order_id: i64) -> Result<Option<PlacedOrder>> {
    let Some(order) = Order::find_by_id(order_id).one(db).await? else {
        return Ok(None);
    };
    let lines = OrderLine::find()
        .filter(order_line::Column::OrderId.eq(order.id))
        .order_by_asc(order_line::Column::Id)
        .all(db)
        .await?;
    Ok(Some(PlacedOrder { order, lines }))
}
