//! Catalog seed loading from catalog.toml
//!
//! An optional TOML file lists categories and products used to populate an empty
//! catalog on first run. Products refer to their category by name.

use crate::core::{category, product};
use crate::entities::Product;
use crate::errors::{Error, Result};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, TransactionTrait};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, instrument};

const DEFAULT_CATALOG_PATH: &str = "catalog.toml";

/// Configuration structure representing the entire catalog.toml file
#[derive(Debug, Deserialize, Default)]
pub struct CatalogConfig {
    /// Categories to create
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
    /// Products to create
    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

/// Configuration for a single category
#[derive(Debug, Deserialize, Clone)]
pub struct CategoryConfig {
    /// Category name, also used as the reference key from products
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: String,
}

/// Configuration for a single product
#[derive(Debug, Deserialize, Clone)]
pub struct ProductConfig {
    /// Product name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: String,
    /// Unit price in minor currency units
    pub price: i64,
    /// Initial stock
    pub stock: i64,
    /// Name of a category declared in the same file
    #[serde(default)]
    pub category: Option<String>,
}

/// Parses a catalog configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<CatalogConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse catalog config: {e}"),
    })
}

/// Loads a catalog configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load catalog configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read catalog config {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads the catalog configuration named by `CATALOG_CONFIG` (default `./catalog.toml`).
///
/// Returns `Ok(None)` when the file does not exist; seeding is optional.
pub fn load_default_config() -> Result<Option<CatalogConfig>> {
    let path = std::env::var("CATALOG_CONFIG").unwrap_or_else(|_| DEFAULT_CATALOG_PATH.to_string());
    if !Path::new(&path).exists() {
        debug!("No catalog config at {}, skipping seed", path);
        return Ok(None);
    }
    load_config(path).map(Some)
}

/// Seeds categories and products into an empty catalog.
///
/// Does nothing if any product already exists. Returns the number of products created.
/// The whole seed runs in one transaction, so a bad entry leaves the catalog empty.
#[instrument(skip(db, config))]
pub async fn seed_catalog(db: &DatabaseConnection, config: &CatalogConfig) -> Result<usize> {
    if Product::find().count(db).await? > 0 {
        info!("Catalog already populated, skipping seed.");
        return Ok(0);
    }

    let txn = db.begin().await?;

    let mut category_ids = HashMap::new();
    for entry in &config.categories {
        let created =
            category::create_category(&txn, entry.name.clone(), entry.description.clone())
                .await?;
        category_ids.insert(entry.name.as_str(), created.id);
    }

    for entry in &config.products {
        let category_id = match &entry.category {
            Some(name) => Some(*category_ids.get(name.as_str()).ok_or_else(|| Error::Config {
                message: format!(
                    "Product '{}' references undeclared category '{name}'",
                    entry.name
                ),
            })?),
            None => None,
        };

        product::create_product(
            &txn,
            product::ProductInput {
                name: entry.name.clone(),
                description: entry.description.clone(),
                price: entry.price,
                stock: entry.stock,
                category_id,
            },
        )
        .await?;
    }

    txn.commit().await?;
    info!(
        categories = config.categories.len(),
        products = config.products.len(),
        "Catalog seeded."
    );
    Ok(config.products.len())
}
