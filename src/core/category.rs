//! Category business logic - plain create/read/update/delete.

use crate::{
    entities::{Category, category},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidCategory {
            message: "Category name cannot be empty".to_string(),
        });
    }
    Ok(())
}

/// Lists every category ordered by id.
pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>> {
    Category::find()
        .order_by_asc(category::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a category by id.
pub async fn get_category_by_id<C: ConnectionTrait>(
    db: &C,
    category_id: i64,
) -> Result<Option<category::Model>> {
    Category::find_by_id(category_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a category after trimming and validating its name.
///
/// Accepts an open transaction so catalog seeding can create categories atomically.
pub async fn create_category<C: ConnectionTrait>(
    db: &C,
    name: String,
    description: String,
) -> Result<category::Model> {
    validate_name(&name)?;

    category::ActiveModel {
        name: Set(name.trim().to_string()),
        description: Set(description),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Replaces the name and description of an existing category.
pub async fn update_category(
    db: &DatabaseConnection,
    category_id: i64,
    name: String,
    description: String,
) -> Result<category::Model> {
    validate_name(&name)?;

    let mut category: category::ActiveModel = get_category_by_id(db, category_id)
        .await?
        .ok_or(Error::CategoryNotFound { category_id })?
        .into();

    category.name = Set(name.trim().to_string());
    category.description = Set(description);
    category.update(db).await.map_err(Into::into)
}

/// Deletes a category. Fails with a storage error while products still reference it.
pub async fn delete_category(db: &DatabaseConnection, category_id: i64) -> Result<()> {
    let result = Category::delete_by_id(category_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::CategoryNotFound { category_id });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_category_crud() -> Result<()> {
        let db = setup_test_db().await?;

        let created = create_category(&db, "  Drinks ".to_string(), String::new()).await?;
        assert_eq!(created.name, "Drinks");

        let updated =
            update_category(&db, created.id, "Beverages".to_string(), "cold".to_string()).await?;
        assert_eq!(updated.name, "Beverages");
        assert_eq!(updated.description, "cold");

        assert_eq!(list_categories(&db).await?.len(), 1);

        delete_category(&db, created.id).await?;
        assert!(get_category_by_id(&db, created.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_category_not_found() -> Result<()> {
        let db = setup_test_db().await?;

        let result = update_category(&db, 42, "x".to_string(), String::new()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::CategoryNotFound { category_id: 42 }
        ));

        let result = delete_category(&db, 42).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::CategoryNotFound { category_id: 42 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_category_empty_name() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_category(&db, "   ".to_string(), String::new()).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidCategory { .. }));
        Ok(())
    }
}
