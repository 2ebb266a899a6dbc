//! Category business logic.
//!
//! Categories belong to exactly one type and are named uniquely within it.
//! Moving a category to another type is refused while entries use it, since
//! those entries would otherwise point at a category of the wrong type.

use crate::{
    core::validation::require_name,
    entities::{Cashflow, Category, FlowType, Subcategory, cashflow, category, flow_type, subcategory},
    errors::{Error, Result},
};
use sea_orm::{DatabaseTransaction, PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::{info, instrument, warn};

const ENTITY: &str = "Category";

/// A category together with the name of its type, as shown in lists and
/// select boxes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryView {
    /// Category ID
    pub id: i64,
    /// Category name
    pub name: String,
    /// ID of the owning type
    pub type_id: i64,
    /// Name of the owning type
    pub type_name: String,
}

/// Retrieves all categories with their type names, ordered by type name and
/// then by category name.
pub async fn get_all_categories<C>(db: &C) -> Result<Vec<CategoryView>>
where
    C: ConnectionTrait,
{
    let rows = Category::find()
        .find_also_related(FlowType)
        .order_by_asc(flow_type::Column::Name)
        .order_by_asc(category::Column::Name)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(category, flow_type)| {
            flow_type.map(|flow_type| CategoryView {
                id: category.id,
                name: category.name,
                type_id: flow_type.id,
                type_name: flow_type.name,
            })
        })
        .collect())
}

/// Finds a category by its unique ID.
pub async fn get_category_by_id(
    db: &DatabaseConnection,
    category_id: i64,
) -> Result<Option<category::Model>> {
    Category::find_by_id(category_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a category under the given type.
///
/// # Errors
/// Returns an error if:
/// - The name is empty (`Validation`)
/// - The type does not exist (`NotFound`)
/// - The type already has a category with this name (`Conflict`)
#[instrument(skip(db))]
pub async fn create_category(
    db: &DatabaseConnection,
    name: &str,
    type_id: i64,
) -> Result<category::Model> {
    let name = require_name(name)?;

    let txn = db.begin().await?;
    ensure_type_exists(&txn, type_id).await?;
    ensure_unique_name(&txn, type_id, &name, None).await?;

    let created = category::ActiveModel {
        type_id: Set(type_id),
        name: Set(name),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(
        "Created category '{}' (ID: {}) under type {}",
        created.name, created.id, created.type_id
    );
    Ok(created)
}

/// Renames a category and moves it under `type_id`.
///
/// # Errors
/// Besides the [`create_category`] errors, returns `NotFound` for an unknown
/// category and `DependencyExists` when the type changes while entries use
/// the category.
#[instrument(skip(db))]
pub async fn update_category(
    db: &DatabaseConnection,
    category_id: i64,
    new_name: &str,
    type_id: i64,
) -> Result<category::Model> {
    apply_update(db, category_id, new_name, Some(type_id)).await
}

/// Renames a category, keeping its type.
#[instrument(skip(db))]
pub async fn rename_category(
    db: &DatabaseConnection,
    category_id: i64,
    new_name: &str,
) -> Result<category::Model> {
    apply_update(db, category_id, new_name, None).await
}

/// Deletes a category with no subcategories and no entries.
///
/// # Errors
/// Returns `NotFound` if the category does not exist and `DependencyExists`
/// while subcategories or entries still reference it.
#[instrument(skip(db))]
pub async fn delete_category(db: &DatabaseConnection, category_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let existing = find_existing(&txn, category_id).await?;

    let subcategories = Subcategory::find()
        .filter(subcategory::Column::CategoryId.eq(category_id))
        .count(&txn)
        .await?;
    let entries = Cashflow::find()
        .filter(cashflow::Column::CategoryId.eq(category_id))
        .count(&txn)
        .await?;
    if subcategories > 0 || entries > 0 {
        warn!(
            "Refusing to delete category {}: {} subcategories, {} entries",
            category_id, subcategories, entries
        );
        return Err(Error::DependencyExists {
            message:
                "Cannot delete a category while subcategories or cash-flow entries reference it"
                    .to_string(),
        });
    }

    existing.delete(&txn).await?;
    txn.commit().await?;

    info!("Deleted category {}", category_id);
    Ok(())
}

async fn apply_update(
    db: &DatabaseConnection,
    category_id: i64,
    new_name: &str,
    type_id: Option<i64>,
) -> Result<category::Model> {
    let name = require_name(new_name)?;

    let txn = db.begin().await?;
    let existing = find_existing(&txn, category_id).await?;
    let type_id = type_id.unwrap_or(existing.type_id);

    if type_id != existing.type_id {
        ensure_type_exists(&txn, type_id).await?;

        let entries = Cashflow::find()
            .filter(cashflow::Column::CategoryId.eq(category_id))
            .count(&txn)
            .await?;
        if entries > 0 {
            warn!(
                "Refusing to move category {} to type {}: {} entries",
                category_id, type_id, entries
            );
            return Err(Error::DependencyExists {
                message: "Cannot change the type of a category while cash-flow entries reference it"
                    .to_string(),
            });
        }
    }

    ensure_unique_name(&txn, type_id, &name, Some(category_id)).await?;

    let mut category: category::ActiveModel = existing.into();
    category.name = Set(name);
    category.type_id = Set(type_id);
    let updated = category.update(&txn).await?;
    txn.commit().await?;

    info!(
        "Updated category {} to '{}' under type {}",
        updated.id, updated.name, updated.type_id
    );
    Ok(updated)
}

async fn find_existing(txn: &DatabaseTransaction, category_id: i64) -> Result<category::Model> {
    Category::find_by_id(category_id)
        .one(txn)
        .await?
        .ok_or(Error::NotFound {
            entity: ENTITY,
            id: category_id,
        })
}

async fn ensure_type_exists(txn: &DatabaseTransaction, type_id: i64) -> Result<()> {
    FlowType::find_by_id(type_id)
        .one(txn)
        .await?
        .map(|_| ())
        .ok_or(Error::NotFound {
            entity: "Type",
            id: type_id,
        })
}

async fn ensure_unique_name(
    txn: &DatabaseTransaction,
    type_id: i64,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<()> {
    let mut query = Category::find()
        .filter(category::Column::TypeId.eq(type_id))
        .filter(category::Column::Name.eq(name));
    if let Some(id) = exclude_id {
        query = query.filter(category::Column::Id.ne(id));
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
    use crate::core::flow_type::create_type;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_category_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let expense = create_type(&db, "Expense").await?;

        let result = create_category(&db, "", expense.id).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        assert!(get_all_categories(&db).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_category_names_are_unique_per_type() -> Result<()> {
        let db = setup_test_db().await?;
        let income = create_type(&db, "Income").await?;
        let expense = create_type(&db, "Expense").await?;

        create_category(&db, "Other", income.id).await?;
        // Same name under a different type is fine
        create_category(&db, "Other", expense.id).await?;

        let result = create_category(&db, "Other", income.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Conflict { entity: "Category", .. }
        ));

        let missing_type = create_category(&db, "Loose", 999).await;
        assert!(matches!(
            missing_type.unwrap_err(),
            Error::NotFound { entity: "Type", id: 999 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_rename_category_conflicts_with_sibling() -> Result<()> {
        let db = setup_test_db().await?;
        let expense = create_type(&db, "Expense").await?;
        let income = create_type(&db, "Income").await?;
        let a = create_category(&db, "A", expense.id).await?;
        create_category(&db, "B", expense.id).await?;
        create_category(&db, "C", income.id).await?;

        let result = rename_category(&db, a.id, "B").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Conflict { entity: "Category", .. }
        ));
        assert_eq!(get_category_by_id(&db, a.id).await?.unwrap().name, "A");

        // A name used only under another type is free
        let renamed = rename_category(&db, a.id, "C").await?;
        assert_eq!(renamed.name, "C");
        let renamed = rename_category(&db, a.id, "Unique").await?;
        assert_eq!(renamed.name, "Unique");

        Ok(())
    }

    #[tokio::test]
    async fn test_categories_ordered_by_type_then_name() -> Result<()> {
        let db = setup_test_db().await?;
        let income = create_type(&db, "Income").await?;
        let expense = create_type(&db, "Expense").await?;
        create_category(&db, "Salary", income.id).await?;
        create_category(&db, "Marketing", expense.id).await?;
        create_category(&db, "Bonus", income.id).await?;

        let categories = get_all_categories(&db).await?;
        let listed: Vec<_> = categories
            .iter()
            .map(|c| (c.type_name.as_str(), c.name.as_str()))
            .collect();
        assert_eq!(
            listed,
            vec![
                ("Expense", "Marketing"),
                ("Income", "Bonus"),
                ("Income", "Salary"),
            ]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_move_category_blocked_by_entries() -> Result<()> {
        let (db, hierarchy) = setup_with_hierarchy().await?;
        let other_type = create_type(&db, "Income").await?;

        // Renaming while keeping the type is always allowed
        let renamed = rename_category(&db, hierarchy.category.id, "Servers").await?;
        assert_eq!(renamed.type_id, hierarchy.flow_type.id);

        create_test_entry(&db, &hierarchy, "2024-05-01", "10").await?;
        let result = update_category(&db, hierarchy.category.id, "Servers", other_type.id).await;
        assert!(matches!(result.unwrap_err(), Error::DependencyExists { .. }));

        let unchanged = get_category_by_id(&db, hierarchy.category.id).await?.unwrap();
        assert_eq!(unchanged.type_id, hierarchy.flow_type.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_move_unused_category() -> Result<()> {
        let db = setup_test_db().await?;
        let income = create_type(&db, "Income").await?;
        let expense = create_type(&db, "Expense").await?;
        let category = create_category(&db, "Refunds", expense.id).await?;

        let moved = update_category(&db, category.id, "Refunds", income.id).await?;
        assert_eq!(moved.type_id, income.id);

        let bad_type = update_category(&db, category.id, "Refunds", 999).await;
        assert!(matches!(bad_type.unwrap_err(), Error::NotFound { entity: "Type", .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_category_guarded_by_subcategories() -> Result<()> {
        let (db, hierarchy) = setup_with_hierarchy().await?;

        let result = delete_category(&db, hierarchy.category.id).await;
        assert!(matches!(result.unwrap_err(), Error::DependencyExists { .. }));

        let empty = create_category(&db, "Empty", hierarchy.flow_type.id).await?;
        delete_category(&db, empty.id).await?;
        assert!(get_category_by_id(&db, empty.id).await?.is_none());

        Ok(())
    }
}
