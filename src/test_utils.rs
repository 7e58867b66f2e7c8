//! Shared test utilities for the checkout engine.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{category, product},
    entities::{self, Product, order, order_line},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    sea_query::Expr,
};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test category with an empty description.
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::category::Model> {
    category::create_category(db, name.to_string(), String::new()).await
}

/// Creates an uncategorised test product.
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    price: i64,
    stock: i64,
) -> Result<entities::product::Model> {
    product::create_product(
        db,
        product::ProductInput {
            name: name.to_string(),
            description: String::new(),
            price,
            stock,
            category_id: None,
        },
    )
    .await
}

/// Overwrites a product's stock, standing in for a competing checkout.
pub async fn set_stock(db: &DatabaseConnection, product_id: i64, stock: i64) -> Result<()> {
    Product::update_many()
        .col_expr(entities::product::Column::Stock, Expr::value(stock))
        .filter(entities::product::Column::Id.eq(product_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Reads a product's current stock, `-1` if the product is gone.
pub async fn stock_of(db: &DatabaseConnection, product_id: i64) -> Result<i64> {
    Ok(Product::find_by_id(product_id)
        .one(db)
        .await?
        .map_or(-1, |p| p.stock))
}

/// Inserts a single-line order with an explicit timestamp, bypassing checkout.
/// Used to place orders at both edges of a report window.
pub async fn insert_order_at(
    db: &DatabaseConnection,
    created_at: DateTime<Utc>,
    product_id: i64,
    quantity: i64,
    total_amount: i64,
) -> Result<entities::order::Model> {
    let order = order::ActiveModel {
        total_amount: Set(total_amount),
        created_at: Set(created_at),
        ..Default::default()
    }
    .insert(db)
    .await?;

    order_line::ActiveModel {
        order_id: Set(order.id),
        product_id: Set(product_id),
        product_name: Set(format!("product-{product_id}")),
        quantity: Set(quantity),
        subtotal: Set(total_amount),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(order)
}
