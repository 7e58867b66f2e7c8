//! Atomic order commit.
//!
//! Writes the order header, its lines and the stock decrements inside one database
//! transaction. Stock is guarded optimistically: nothing is locked up front, and the
//! decrement is a single conditional `UPDATE` that only touches rows whose stock still
//! covers the requested quantity. If fewer rows change than there are lines, another
//! checkout consumed the stock in the meantime and the whole transaction is rolled back.
//!
//! A `DatabaseTransaction` that is dropped without `commit` rolls back, so early returns
//! and cancelled futures leave no partial order behind.

use crate::{
    core::{checkout::PlacedOrder, pricing::PricedCheckout},
    entities::{OrderLine, Product, order, order_line, product},
    errors::{Error, InvalidRequestReason, Result},
};
use sea_orm::{
    Condition, DatabaseTransaction, QueryOrder, Set, TransactionTrait,
    prelude::*,
    sea_query::{CaseStatement, Expr},
};
use tracing::{debug, instrument, warn};

/// Persists a priced checkout as an order and decrements stock, all or nothing.
///
/// # Errors
/// - [`Error::ConcurrentStockConflict`] if any product no longer has enough stock
/// - [`Error::Storage`] for any database failure; nothing is persisted in either case
#[instrument(skip(db, priced), fields(lines = priced.lines.len(), total = priced.total))]
pub async fn commit_order<C: TransactionTrait>(db: &C, priced: PricedCheckout) -> Result<PlacedOrder> {
    if priced.lines.is_empty() {
        return Err(Error::invalid(InvalidRequestReason::EmptyItems));
    }

    let txn = db.begin().await?;
    match write_order(&txn, &priced).await {
        Ok(placed) => {
            txn.commit().await?;
            Ok(placed)
        }
        Err(e) => {
            if let Err(rollback) = txn.rollback().await {
                warn!("Rollback after failed commit also failed: {}", rollback);
            }
            Err(e)
        }
    }
}

/// Writes the header, the lines and the guarded stock decrement on an open transaction.
///
/// Nothing becomes visible until the caller commits `txn`.
async fn write_order(txn: &DatabaseTransaction, priced: &PricedCheckout) -> Result<PlacedOrder> {
    let order = order::ActiveModel {
        total_amount: Set(priced.total),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(txn)
    .await?;
    debug!(order_id = order.id, "Inserted order header");

    OrderLine::insert_many(priced.lines.iter().map(|line| order_line::ActiveModel {
        order_id: Set(order.id),
        product_id: Set(line.product_id),
        product_name: Set(line.product_name.clone()),
        quantity: Set(line.quantity),
        subtotal: Set(line.subtotal),
        ..Default::default()
    }))
    .exec(txn)
    .await?;

    // Ids are assigned in insertion order, so this matches the request order
    let lines = OrderLine::find()
        .filter(order_line::Column::OrderId.eq(order.id))
        .order_by_asc(order_line::Column::Id)
        .all(txn)
        .await?;

    let expected = u64::try_from(priced.lines.len()).unwrap_or(u64::MAX);
    let applied = decrement_stock(txn, priced).await?;
    if applied != expected {
        warn!(
            order_id = order.id,
            expected, applied, "Stock consumed concurrently, rolling back order"
        );
        return Err(Error::ConcurrentStockConflict { expected, applied });
    }

    Ok(PlacedOrder { order, lines })
}

/// Applies every `(product, quantity)` decrement in one statement:
///
/// `UPDATE products SET stock = stock - CASE id WHEN .. END
///  WHERE (id = ? AND stock >= ?) OR ..`
///
/// Returns how many products were actually decremented.
async fn decrement_stock<C: ConnectionTrait>(db: &C, priced: &PricedCheckout) -> Result<u64> {
    let mut amount = CaseStatement::new();
    let mut guard = Condition::any();
    for line in &priced.lines {
        amount = amount.case(product::Column::Id.eq(line.product_id), line.quantity);
        guard = guard.add(
            Condition::all()
                .add(product::Column::Id.eq(line.product_id))
                .add(product::Column::Stock.gte(line.quantity)),
        );
    }

    let result = Product::update_many()
        .col_expr(
            product::Column::Stock,
            Expr::col(product::Column::Stock).sub(amount.finally(0)),
        )
        .filter(guard)
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{
        pricing::price_checkout,
        validator::{CheckoutRequest, validate},
    };
    use crate::entities::Order;
    use crate::test_utils::*;
    use sea_orm::PaginatorTrait;

    async fn priced_for(db: &DatabaseConnection, pairs: &[(i64, i64)]) -> Result<PricedCheckout> {
        let checkout = validate(CheckoutRequest::from_pairs(pairs))?;
        price_checkout(db, &checkout).await
    }

    #[tokio::test]
    async fn test_commit_order_persists_everything() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_product(&db, "A", 100, 5).await?;
        let b = create_test_product(&db, "B", 50, 2).await?;

        let priced = priced_for(&db, &[(b.id, 2), (a.id, 2)]).await?;
        let placed = commit_order(&db, priced).await?;

        assert_eq!(placed.order.total_amount, 300);
        assert_eq!(placed.lines.len(), 2);
        // Lines come back in request order with their assigned ids
        assert_eq!(placed.lines[0].product_id, b.id);
        assert_eq!(placed.lines[1].product_id, a.id);
        assert!(placed.lines[0].id < placed.lines[1].id);
        assert!(placed.lines.iter().all(|l| l.order_id == placed.order.id));

        assert_eq!(stock_of(&db, a.id).await?, 3);
        assert_eq!(stock_of(&db, b.id).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_order_conflict_rolls_back() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_product(&db, "A", 100, 5).await?;
        let b = create_test_product(&db, "B", 50, 2).await?;

        // Price while stock is available, then lose B's stock before committing
        let priced = priced_for(&db, &[(a.id, 2), (b.id, 2)]).await?;
        set_stock(&db, b.id, 1).await?;

        let result = commit_order(&db, priced).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ConcurrentStockConflict {
                expected: 2,
                applied: 1
            }
        ));

        // A's decrement, the header and the lines were all rolled back
        assert_eq!(stock_of(&db, a.id).await?, 5);
        assert_eq!(stock_of(&db, b.id).await?, 1);
        assert_eq!(Order::find().count(&db).await?, 0);
        assert_eq!(OrderLine::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_order_product_deleted_after_pricing() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_product(&db, "A", 100, 5).await?;

        let priced = priced_for(&db, &[(a.id, 1)]).await?;
        crate::core::product::delete_product(&db, a.id).await?;

        // The line insert or the guarded decrement must fail; either way nothing persists
        let result = commit_order(&db, priced).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ConcurrentStockConflict { .. } | Error::Storage(_)
        ));
        assert_eq!(Order::find().count(&db).await?, 0);
        assert_eq!(OrderLine::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_dropped_transaction_leaves_no_trace() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_product(&db, "A", 100, 5).await?;
        let b = create_test_product(&db, "B", 50, 2).await?;
        let priced = priced_for(&db, &[(a.id, 2), (b.id, 1)]).await?;

        // Everything is written, then the caller goes away before commit
        let txn = db.begin().await?;
        let placed = write_order(&txn, &priced).await?;
        assert_eq!(placed.lines.len(), 2);
        drop(txn);

        assert_eq!(Order::find().count(&db).await?, 0);
        assert_eq!(OrderLine::find().count(&db).await?, 0);
        assert_eq!(stock_of(&db, a.id).await?, 5);
        assert_eq!(stock_of(&db, b.id).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_cancelled_commit_leaves_no_trace() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_product(&db, "A", 100, 5).await?;
        let priced = priced_for(&db, &[(a.id, 3)]).await?;

        let mut pending = Box::pin(commit_order(&db, priced));
        std::future::poll_fn(|cx| {
            let _ = pending.as_mut().poll(cx);
            std::task::Poll::Ready(())
        })
        .await;
        drop(pending);

        assert_eq!(Order::find().count(&db).await?, 0);
        assert_eq!(OrderLine::find().count(&db).await?, 0);
        assert_eq!(stock_of(&db, a.id).await?, 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_order_rejects_empty() -> Result<()> {
        let db = setup_test_db().await?;
        let result = commit_order(
            &db,
            PricedCheckout {
                lines: vec![],
                total: 0,
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidRequest { .. }));
        assert_eq!(Order::find().count(&db).await?, 0);
        Ok(())
    }
}
