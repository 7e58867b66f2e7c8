//! Catalog snapshot reads used by checkout.
//!
//! A snapshot is the price, name and stock of a product as currently committed.
//! Nothing here caches; every call reads through to storage.

use crate::{
    entities::{Product, product},
    errors::Result,
};
use sea_orm::{ConnectionTrait, EntityTrait};
use serde::Serialize;

/// Point-in-time view of the product fields checkout depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSnapshot {
    /// Product identity
    pub product_id: i64,
    /// Current catalog name
    pub name: String,
    /// Current unit price in minor currency units
    pub unit_price: i64,
    /// Current stock
    pub stock: i64,
}

impl From<product::Model> for ProductSnapshot {
    fn from(model: product::Model) -> Self {
        Self {
            product_id: model.id,
            name: model.name,
            unit_price: model.price,
            stock: model.stock,
        }
    }
}

/// Reads the current snapshot of a product, or `None` if it does not exist.
///
/// Works against a plain connection or an open transaction.
pub async fn lookup_snapshot<C: ConnectionTrait>(
    db: &C,
    product_id: i64,
) -> Result<Option<ProductSnapshot>> {
    Ok(Product::find_by_id(product_id)
        .one(db)
        .await?
        .map(ProductSnapshot::from))
}
