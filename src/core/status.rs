//! Status business logic - create, rename, delete and list statuses.
//!
//! Status names are globally unique. A status cannot be deleted while any
//! cash-flow entry still uses it.

use crate::{
    core::validation::require_name,
    entities::{Cashflow, Status, cashflow, status},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

const ENTITY: &str = "Status";

/// Retrieves all statuses, ordered alphabetically by name.
pub async fn get_all_statuses<C>(db: &C) -> Result<Vec<status::Model>>
where
    C: ConnectionTrait,
{
    Status::find()
        .order_by_asc(status::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a status by its unique ID.
pub async fn get_status_by_id(
    db: &DatabaseConnection,
    status_id: i64,
) -> Result<Option<status::Model>> {
    Status::find_by_id(status_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new status.
///
/// # Errors
/// Returns an error if:
/// - The name is empty or whitespace-only (`Validation`)
/// - Another status already has this name (`Conflict`)
/// - The database insert fails
#[instrument(skip(db))]
pub async fn create_status(db: &DatabaseConnection, name: &str) -> Result<status::Model> {
    let name = require_name(name)?;

    let txn = db.begin().await?;
    ensure_unique_name(&txn, &name, None).await?;

    let created = status::ActiveModel {
        name: Set(name),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!("Created status '{}' (ID: {})", created.name, created.id);
    Ok(created)
}

/// Renames an existing status.
///
/// # Errors
/// Returns `Validation` for an empty name, `NotFound` if the status does not
/// exist and `Conflict` if another status already has the new name.
#[instrument(skip(db))]
pub async fn rename_status(
    db: &DatabaseConnection,
    status_id: i64,
    new_name: &str,
) -> Result<status::Model> {
    let name = require_name(new_name)?;

    let txn = db.begin().await?;
    let existing = Status::find_by_id(status_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: ENTITY,
            id: status_id,
        })?;
    ensure_unique_name(&txn, &name, Some(status_id)).await?;

    let mut status: status::ActiveModel = existing.into();
    status.name = Set(name);
    let updated = status.update(&txn).await?;
    txn.commit().await?;

    info!("Renamed status {} to '{}'", updated.id, updated.name);
    Ok(updated)
}

/// Deletes a status that no cash-flow entry references.
///
/// # Errors
/// Returns `NotFound` if the status does not exist and `DependencyExists`
/// while entries still use it.
#[instrument(skip(db))]
pub async fn delete_status(db: &DatabaseConnection, status_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let existing = Status::find_by_id(status_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: ENTITY,
            id: status_id,
        })?;

    let entries = Cashflow::find()
        .filter(cashflow::Column::StatusId.eq(status_id))
        .count(&txn)
        .await?;
    if entries > 0 {
        warn!(
            "Refusing to delete status {}: {} entries reference it",
            status_id, entries
        );
        return Err(Error::DependencyExists {
            message: "Cannot delete a status while cash-flow entries reference it".to_string(),
        });
    }

    existing.delete(&txn).await?;
    txn.commit().await?;

    info!("Deleted status {}", status_id);
    Ok(())
}

async fn ensure_unique_name<C>(db: &C, name: &str, exclude_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = Status::find().filter(status::Column::Name.eq(name));
    if let Some(id) = exclude_id {
        query = query.filter(status::Column::Id.ne(id));
    }
    if query.count(db).await? > 0 {
        return Err(Error::Conflict {
            entity: ENTITY,
            name: name.to_string(),
        });
    }
    Ok(())
}
