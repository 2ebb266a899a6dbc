//! Subcategory business logic.
//!
//! Subcategories sit under one category; their type is the category's type.

use crate::{
    core::validation::require_name,
    entities::{Cashflow, Category, Subcategory, cashflow, category, subcategory},
    errors::{Error, Result},
};
use sea_orm::{DatabaseTransaction, PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::{info, instrument, warn};

const ENTITY: &str = "Subcategory";

/// A subcategory with its category's name and type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubcategoryView {
    /// Subcategory ID
    pub id: i64,
    /// Subcategory name
    pub name: String,
    /// ID of the owning category
    pub category_id: i64,
    /// Name of the owning category
    pub category_name: String,
    /// ID of the owning category's type
    pub type_id: i64,
}

/// Retrieves all subcategories, ordered by category name and then by name.
pub async fn get_all_subcategories<C>(db: &C) -> Result<Vec<SubcategoryView>>
where
    C: ConnectionTrait,
{
    let rows = Subcategory::find()
        .find_also_related(Category)
        .order_by_asc(category::Column::Name)
        .order_by_asc(subcategory::Column::Name)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(subcategory, category)| {
            category.map(|category| SubcategoryView {
                id: subcategory.id,
                name: subcategory.name,
                category_id: category.id,
                category_name: category.name,
                type_id: category.type_id,
            })
        })
        .collect())
}

/// Finds a subcategory by its unique ID.
pub async fn get_subcategory_by_id(
    db: &DatabaseConnection,
    subcategory_id: i64,
) -> Result<Option<subcategory::Model>> {
    Subcategory::find_by_id(subcategory_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a subcategory under the given category.
///
/// # Errors
/// Returns `Validation` for an empty name, `NotFound` for an unknown category
/// and `Conflict` if the category already has a subcategory with this name.
#[instrument(skip(db))]
pub async fn create_subcategory(
    db: &DatabaseConnection,
    name: &str,
    category_id: i64,
) -> Result<subcategory::Model> {
    let name = require_name(name)?;

    let txn = db.begin().await?;
    ensure_category_exists(&txn, category_id).await?;
    ensure_unique_name(&txn, category_id, &name, None).await?;

    let created = subcategory::ActiveModel {
        category_id: Set(category_id),
        name: Set(name),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(
        "Created subcategory '{}' (ID: {}) under category {}",
        created.name, created.id, created.category_id
    );
    Ok(created)
}

/// Renames a subcategory and moves it under `category_id`.
///
/// # Errors
/// Returns `DependencyExists` when the category changes while entries use
/// the subcategory, plus the errors of [`create_subcategory`].
#[instrument(skip(db))]
pub async fn update_subcategory(
    db: &DatabaseConnection,
    subcategory_id: i64,
    new_name: &str,
    category_id: i64,
) -> Result<subcategory::Model> {
    apply_update(db, subcategory_id, new_name, Some(category_id)).await
}

/// Renames a subcategory, keeping its category.
#[instrument(skip(db))]
pub async fn rename_subcategory(
    db: &DatabaseConnection,
    subcategory_id: i64,
    new_name: &str,
) -> Result<subcategory::Model> {
    apply_update(db, subcategory_id, new_name, None).await
}

/// Deletes a subcategory no entry references.
#[instrument(skip(db))]
pub async fn delete_subcategory(db: &DatabaseConnection, subcategory_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let existing = find_existing(&txn, subcategory_id).await?;

    let entries = count_entries(&txn, subcategory_id).await?;
    if entries > 0 {
        warn!(
            "Refusing to delete subcategory {}: {} entries reference it",
            subcategory_id, entries
        );
        return Err(Error::DependencyExists {
            message: "Cannot delete a subcategory while cash-flow entries reference it"
                .to_string(),
        });
    }

    existing.delete(&txn).await?;
    txn.commit().await?;

    info!("Deleted subcategory {}", subcategory_id);
    Ok(())
}

async fn apply_update(
    db: &DatabaseConnection,
    subcategory_id: i64,
    new_name: &str,
    category_id: Option<i64>,
) -> Result<subcategory::Model> {
    let name = require_name(new_name)?;

    let txn = db.begin().await?;
    let existing = find_existing(&txn, subcategory_id).await?;
    let category_id = category_id.unwrap_or(existing.category_id);

    if category_id != existing.category_id {
        ensure_category_exists(&txn, category_id).await?;

        let entries = count_entries(&txn, subcategory_id).await?;
        if entries > 0 {
            warn!(
                "Refusing to move subcategory {} to category {}: {} entries",
                subcategory_id, category_id, entries
            );
            return Err(Error::DependencyExists {
                message:
                    "Cannot change the category of a subcategory while cash-flow entries reference it"
                        .to_string(),
            });
        }
    }

    ensure_unique_name(&txn, category_id, &name, Some(subcategory_id)).await?;

    let mut subcategory: subcategory::ActiveModel = existing.into();
    subcategory.name = Set(name);
    subcategory.category_id = Set(category_id);
    let updated = subcategory.update(&txn).await?;
    txn.commit().await?;

    info!(
        "Updated subcategory {} to '{}' under category {}",
        updated.id, updated.name, updated.category_id
    );
    Ok(updated)
}

async fn find_existing(
    txn: &DatabaseTransaction,
    subcategory_id: i64,
) -> Result<subcategory::Model> {
    Subcategory::find_by_id(subcategory_id)
        .one(txn)
        .await?
        .ok_or(Error::NotFound {
            entity: ENTITY,
            id: subcategory_id,
        })
}

async fn count_entries(txn: &DatabaseTransaction, subcategory_id: i64) -> Result<u64> {
    Cashflow::find()
        .filter(cashflow::Column::SubcategoryId.eq(subcategory_id))
        .count(txn)
        .await
        .map_err(Into::into)
}

async fn ensure_category_exists(txn: &DatabaseTransaction, category_id: i64) -> Result<()> {
    Category::find_by_id(category_id)
        .one(txn)
        .await?
        .map(|_| ())
        .ok_or(Error::NotFound {
            entity: "Category",
            id: category_id,
        })
}

async fn ensure_unique_name(
    txn: &DatabaseTransaction,
    category_id: i64,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<()> {
    let mut query = Subcategory::find()
        .filter(subcategory::Column::CategoryId.eq(category_id))
        .filter(subcategory::Column::Name.eq(name));
    if let Some(id) = exclude_id {
        query = query.filter(subcategory::Column::Id.ne(id));
    }
    if query.count(txn).await? > 0 {
        return Err(Error::Conflict {
            entity: ENTITY,
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::category::create_category;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_and_list_subcategories() -> Result<()> {
        let (db, hierarchy) = setup_with_hierarchy().await?;
        create_subcategory(&db, "Proxy", hierarchy.category.id).await?;

        let subcategories = get_all_subcategories(&db).await?;
        let names: Vec<_> = subcategories.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Proxy", "VPS"]);
        assert!(subcategories.iter().all(|s| {
            s.category_id == hierarchy.category.id && s.type_id == hierarchy.flow_type.id
        }));

        let duplicate = create_subcategory(&db, "VPS", hierarchy.category.id).await;
        assert!(matches!(
            duplicate.unwrap_err(),
            Error::Conflict { entity: "Subcategory", .. }
        ));

        let orphan = create_subcategory(&db, "Orphan", 999).await;
        assert!(matches!(
            orphan.unwrap_err(),
            Error::NotFound { entity: "Category", id: 999 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_reparent_subcategory() -> Result<()> {
        let (db, hierarchy) = setup_with_hierarchy().await?;
        let marketing = create_category(&db, "Marketing", hierarchy.flow_type.id).await?;

        let moved =
            update_subcategory(&db, hierarchy.subcategory.id, "VPS", marketing.id).await?;
        assert_eq!(moved.category_id, marketing.id);

        // Once an entry uses it, only renames are allowed
        let back = update_subcategory(&db, moved.id, "VPS", hierarchy.category.id).await?;
        let hierarchy = TestHierarchy {
            subcategory: back,
            ..hierarchy
        };
        create_test_entry(&db, &hierarchy, "2024-02-02", "5").await?;

        let blocked =
            update_subcategory(&db, hierarchy.subcategory.id, "VPS", marketing.id).await;
        assert!(matches!(blocked.unwrap_err(), Error::DependencyExists { .. }));

        let renamed = rename_subcategory(&db, hierarchy.subcategory.id, "Servers").await?;
        assert_eq!(renamed.name, "Servers");
        assert_eq!(renamed.category_id, hierarchy.category.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_subcategory_guarded_by_entries() -> Result<()> {
        let (db, hierarchy) = setup_with_hierarchy().await?;
        create_test_entry(&db, &hierarchy, "2024-02-02", "5").await?;

        let result = delete_subcategory(&db, hierarchy.subcategory.id).await;
        assert!(matches!(result.unwrap_err(), Error::DependencyExists { .. }));

        let spare = create_subcategory(&db, "Spare", hierarchy.category.id).await?;
        delete_subcategory(&db, spare.id).await?;
        assert!(get_subcategory_by_id(&db, spare.id).await?.is_none());

        Ok(())
    }
}
