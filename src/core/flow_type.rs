//! Type business logic - the income/expense axis every category hangs off.

use crate::{
    core::validation::require_name,
    entities::{Cashflow, Category, FlowType, cashflow, category, flow_type},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

const ENTITY: &str = "Type";

/// Retrieves all types, ordered alphabetically by name.
pub async fn get_all_types<C>(db: &C) -> Result<Vec<flow_type::Model>>
where
    C: ConnectionTrait,
{
    FlowType::find()
        .order_by_asc(flow_type::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a type by its unique ID.
pub async fn get_type_by_id(
    db: &DatabaseConnection,
    type_id: i64,
) -> Result<Option<flow_type::Model>> {
    FlowType::find_by_id(type_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new type.
///
/// # Errors
/// Returns `Validation` for an empty name and `Conflict` if the name is taken.
#[instrument(skip(db))]
pub async fn create_type(db: &DatabaseConnection, name: &str) -> Result<flow_type::Model> {
    let name = require_name(name)?;

    let txn = db.begin().await?;
    ensure_unique_name(&txn, &name, None).await?;

    let created = flow_type::ActiveModel {
        name: Set(name),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!("Created type '{}' (ID: {})", created.name, created.id);
    Ok(created)
}

/// Renames an existing type.
#[instrument(skip(db))]
pub async fn rename_type(
    db: &DatabaseConnection,
    type_id: i64,
    new_name: &str,
) -> Result<flow_type::Model> {
    let name = require_name(new_name)?;

    let txn = db.begin().await?;
    let existing = FlowType::find_by_id(type_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: ENTITY,
            id: type_id,
        })?;
    ensure_unique_name(&txn, &name, Some(type_id)).await?;

    let mut flow_type: flow_type::ActiveModel = existing.into();
    flow_type.name = Set(name);
    let updated = flow_type.update(&txn).await?;
    txn.commit().await?;

    info!("Renamed type {} to '{}'", updated.id, updated.name);
    Ok(updated)
}

/// Deletes a type with no categories and no entries.
///
/// # Errors
/// Returns `NotFound` if the type does not exist and `DependencyExists`
/// while categories or entries still reference it.
#[instrument(skip(db))]
pub async fn delete_type(db: &DatabaseConnection, type_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let existing = FlowType::find_by_id(type_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: ENTITY,
            id: type_id,
        })?;

    let categories = Category::find()
        .filter(category::Column::TypeId.eq(type_id))
        .count(&txn)
        .await?;
    let entries = Cashflow::find()
        .filter(cashflow::Column::TypeId.eq(type_id))
        .count(&txn)
        .await?;
    if categories > 0 || entries > 0 {
        warn!(
            "Refusing to delete type {}: {} categories, {} entries",
            type_id, categories, entries
        );
        return Err(Error::DependencyExists {
            message: "Cannot delete a type while categories or cash-flow entries reference it"
                .to_string(),
        });
    }

    existing.delete(&txn).await?;
    txn.commit().await?;

    info!("Deleted type {}", type_id);
    Ok(())
}

async fn ensure_unique_name<C>(db: &C, name: &str, exclude_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = FlowType::find().filter(flow_type::Column::Name.eq(name));
    if let Some(id) = exclude_id {
        query = query.filter(flow_type::Column::Id.ne(id));
    }
    if query.count(db).await? > 0 {
        return Err(Error::Conflict {
            entity: ENTITY,
            name: name.to_string(),
        });
    }
    Ok(())
}
