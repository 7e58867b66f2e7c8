//! Product business logic - Handles catalog maintenance for products.
//!
//! This module provides functions for creating, retrieving, replacing, and deleting
//! products. These are plain administrative paths: checkout never goes through them and
//! only the order committer touches `stock` after a product is created.

use crate::{
    core::category,
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Full set of editable product fields, used for both create and replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    /// Product name, trimmed before storage
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Unit price in minor currency units
    pub price: i64,
    /// Units available for sale
    pub stock: i64,
    /// Optional owning category
    pub category_id: Option<i64>,
}

/// Validates the input fields and checks that the referenced category exists.
///
/// # Errors
/// Returns an error if:
/// - The product name is empty or whitespace-only
/// - The price or stock is negative
/// - The category does not exist
async fn validate_input<C: ConnectionTrait>(db: &C, input: &ProductInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(Error::InvalidProduct {
            message: "Product name cannot be empty".to_string(),
        });
    }

    if input.price < 0 {
        return Err(Error::InvalidProduct {
            message: format!("Price cannot be negative (got {})", input.price),
        });
    }

    if input.stock < 0 {
        return Err(Error::InvalidProduct {
            message: format!("Stock cannot be negative (got {})", input.stock),
        });
    }

    if let Some(category_id) = input.category_id {
        category::get_category_by_id(db, category_id)
            .await?
            .ok_or(Error::CategoryNotFound { category_id })?;
    }

    Ok(())
}

/// Retrieves all products ordered by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .order_by_asc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific product by its unique ID.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_id<C: ConnectionTrait>(
    db: &C,
    product_id: i64,
) -> Result<Option<product::Model>> {
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new product after validating its fields.
pub async fn create_product<C: ConnectionTrait>(db: &C, input: ProductInput) -> Result<product::Model> {
    validate_input(db, &input).await?;

    let now = chrono::Utc::now().naive_utc();

    let product = product::ActiveModel {
        name: Set(input.name.trim().to_string()),
        description: Set(input.description),
        price: Set(input.price),
        stock: Set(input.stock),
        category_id: Set(input.category_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}

/// Replaces every editable field of an existing product and refreshes `updated_at`.
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    input: ProductInput,
) -> Result<product::Model> {
    validate_input(db, &input).await?;

    let mut product: product::ActiveModel = get_product_by_id(db, product_id)
        .await?
        .ok_or(Error::ProductNotFound { product_id })?
        .into();

    product.name = Set(input.name.trim().to_string());
    product.description = Set(input.description);
    product.price = Set(input.price);
    product.stock = Set(input.stock);
    product.category_id = Set(input.category_id);
    product.updated_at = Set(chrono::Utc::now().naive_utc());

    product.update(db).await.map_err(Into::into)
}

/// Deletes a product. Products that appear on committed orders are protected by the
/// order line foreign key and fail with a storage error.
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<()> {
    let result = Product::delete_by_id(product_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::ProductNotFound { product_id });
    }
    Ok(())
}
