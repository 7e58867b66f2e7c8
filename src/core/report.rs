//! Sales report generation.
//!
//! Aggregates committed orders whose `created_at` falls in a half-open UTC window
//! `[start, end)`: total revenue, order count, and the best-selling product by summed
//! line quantity. Ties on quantity go to the lowest product id.

use crate::{
    entities::{Order, OrderLine, order, order_line, product},
    errors::Result,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::{
    JoinType, QueryOrder, QuerySelect, RelationTrait,
    prelude::*,
    sea_query::{Alias, Expr},
};
use serde::Serialize;
use tracing::{debug, instrument};

const QUANTITY_SOLD: &str = "quantity_sold";

/// Half-open reporting window in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    /// Inclusive lower bound
    pub start: DateTime<Utc>,
    /// Exclusive upper bound
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    /// Window between two instants. A window with `start >= end` is empty.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window from midnight of `start_date` up to, but excluding, midnight of `end_date`.
    #[must_use]
    pub fn from_dates(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self::new(midnight(start_date), midnight(end_date))
    }

    /// The whole calendar day `date`.
    #[must_use]
    pub fn for_day(date: NaiveDate) -> Self {
        Self::from_dates(date, date.succ_opt().unwrap_or(NaiveDate::MAX))
    }

    /// `[midnight today, midnight tomorrow)` in UTC.
    #[must_use]
    pub fn today() -> Self {
        Self::for_day(Utc::now().date_naive())
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Product with the largest summed quantity in a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BestSeller {
    /// Product identity
    pub product_id: i64,
    /// Current catalog name
    pub name: String,
    /// Units sold across all in-window orders
    pub quantity_sold: i64,
}

/// Aggregated sales figures for a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesReport {
    /// Sum of order totals
    pub total_revenue: i64,
    /// Number of orders
    pub order_count: i64,
    /// `None` when the window holds no orders
    pub best_seller: Option<BestSeller>,
}

/// Generates the sales report for `window`.
#[instrument(skip(db))]
pub async fn sales_report<C: ConnectionTrait>(db: &C, window: &ReportWindow) -> Result<SalesReport> {
    let (total_revenue, order_count) = Order::find()
        .select_only()
        .column_as(Expr::col(order::Column::TotalAmount).sum(), "total_revenue")
        .column_as(Expr::col(order::Column::Id).count(), "order_count")
        .filter(order::Column::CreatedAt.gte(window.start))
        .filter(order::Column::CreatedAt.lt(window.end))
        .into_tuple::<(Option<i64>, i64)>()
        .one(db)
        .await?
        .unwrap_or((None, 0));

    let best_seller = find_best_seller(db, window).await?;
    debug!(order_count, "Sales report generated");

    Ok(SalesReport {
        total_revenue: total_revenue.unwrap_or(0),
        order_count,
        best_seller,
    })
}

/// Convenience wrapper for [`ReportWindow::today`].
pub async fn todays_report<C: ConnectionTrait>(db: &C) -> Result<SalesReport> {
    sales_report(db, &ReportWindow::today()).await
}

async fn find_best_seller<C: ConnectionTrait>(
    db: &C,
    window: &ReportWindow,
) -> Result<Option<BestSeller>> {
    let row = OrderLine::find()
        .select_only()
        .column(order_line::Column::ProductId)
        .column(product::Column::Name)
        .column_as(
            Expr::col((OrderLine, order_line::Column::Quantity)).sum(),
            QUANTITY_SOLD,
        )
        .join(JoinType::InnerJoin, order_line::Relation::Order.def())
        .join(JoinType::InnerJoin, order_line::Relation::Product.def())
        .filter(order::Column::CreatedAt.gte(window.start))
        .filter(order::Column::CreatedAt.lt(window.end))
        .group_by(order_line::Column::ProductId)
        .group_by(product::Column::Name)
        .order_by_desc(Expr::col(Alias::new(QUANTITY_SOLD)))
        .order_by_asc(order_line::Column::ProductId)
        .into_tuple::<(i64, String, i64)>()
        .one(db)
        .await?;

    Ok(row.map(|(product_id, name, quantity_sold)| BestSeller {
        product_id,
        name,
        quantity_sold,
    }))
}
