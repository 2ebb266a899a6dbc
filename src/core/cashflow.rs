//! Cash-flow ledger business logic.
//!
//! Entries are written only after [`validate_entry`] accepts them against a
//! reference snapshot loaded inside the same transaction, so a concurrent
//! delete of a category cannot slip between the check and the write.

use crate::{
    core::{
        reference::load_reference_data,
        validation::{EntryForm, NewEntry, parse_date, parse_id, validate_entry},
    },
    entities::{Cashflow, cashflow, category, flow_type, status, subcategory},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{
    DatabaseTransaction, FromQueryResult, JoinType, QueryOrder, QuerySelect, Set,
    TransactionTrait, prelude::*,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

const ENTITY: &str = "Entry";

/// Optional, AND-combined restrictions on the ledger listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CashflowFilter {
    /// Earliest date, inclusive
    pub date_from: Option<NaiveDate>,
    /// Latest date, inclusive
    pub date_to: Option<NaiveDate>,
    /// Only entries with this status
    pub status_id: Option<i64>,
    /// Only entries of this type
    pub type_id: Option<i64>,
    /// Only entries in this category
    pub category_id: Option<i64>,
    /// Only entries in this subcategory
    pub subcategory_id: Option<i64>,
}

impl CashflowFilter {
    /// Builds a filter from query-string parameters.
    ///
    /// Missing and empty values leave the field unset. Values that do not
    /// parse are ignored as well, so a mangled bookmark still lists entries.
    #[must_use]
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        Self {
            date_from: param(params, "date_from", parse_date),
            date_to: param(params, "date_to", parse_date),
            status_id: param(params, "status_id", parse_id),
            type_id: param(params, "type_id", parse_id),
            category_id: param(params, "category_id", parse_id),
            subcategory_id: param(params, "subcategory_id", parse_id),
        }
    }

    /// Whether no restriction is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn param<T>(
    params: &HashMap<String, String>,
    key: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())?;
    let parsed = parse(raw);
    if parsed.is_none() {
        debug!("Ignoring unparseable filter {}={:?}", key, raw);
    }
    parsed
}

/// A ledger row joined with the names of its reference rows.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct CashflowRow {
    /// Entry ID
    pub id: i64,
    /// Date of the movement
    pub recorded_on: NaiveDate,
    /// Status ID
    pub status_id: i64,
    /// Type ID
    pub type_id: i64,
    /// Category ID
    pub category_id: i64,
    /// Subcategory ID
    pub subcategory_id: i64,
    /// Amount in minor units
    pub amount_cents: i64,
    /// Optional comment
    pub comment: Option<String>,
    /// Joined `statuses.name`
    pub status_name: String,
    /// Joined `types.name`
    pub type_name: String,
    /// Joined `categories.name`
    pub category_name: String,
    /// Joined `subcategories.name`
    pub subcategory_name: String,
}

/// Lists entries matching `filter`, newest first (by date, then by ID).
pub async fn list_entries(
    db: &DatabaseConnection,
    filter: &CashflowFilter,
) -> Result<Vec<CashflowRow>> {
    let mut query = Cashflow::find()
        .select_only()
        .columns([
            cashflow::Column::Id,
            cashflow::Column::RecordedOn,
            cashflow::Column::StatusId,
            cashflow::Column::TypeId,
            cashflow::Column::CategoryId,
            cashflow::Column::SubcategoryId,
            cashflow::Column::AmountCents,
            cashflow::Column::Comment,
        ])
        .column_as(status::Column::Name, "status_name")
        .column_as(flow_type::Column::Name, "type_name")
        .column_as(category::Column::Name, "category_name")
        .column_as(subcategory::Column::Name, "subcategory_name")
        .join(JoinType::InnerJoin, cashflow::Relation::Status.def())
        .join(JoinType::InnerJoin, cashflow::Relation::FlowType.def())
        .join(JoinType::InnerJoin, cashflow::Relation::Category.def())
        .join(JoinType::InnerJoin, cashflow::Relation::Subcategory.def());

    if let Some(date_from) = filter.date_from {
        query = query.filter(cashflow::Column::RecordedOn.gte(date_from));
    }
    if let Some(date_to) = filter.date_to {
        query = query.filter(cashflow::Column::RecordedOn.lte(date_to));
    }
    if let Some(status_id) = filter.status_id {
        query = query.filter(cashflow::Column::StatusId.eq(status_id));
    }
    if let Some(type_id) = filter.type_id {
        query = query.filter(cashflow::Column::TypeId.eq(type_id));
    }
    if let Some(category_id) = filter.category_id {
        query = query.filter(cashflow::Column::CategoryId.eq(category_id));
    }
    if let Some(subcategory_id) = filter.subcategory_id {
        query = query.filter(cashflow::Column::SubcategoryId.eq(subcategory_id));
    }

    let rows = query
        .order_by_desc(cashflow::Column::RecordedOn)
        .order_by_desc(cashflow::Column::Id)
        .into_model::<CashflowRow>()
        .all(db)
        .await?;

    debug!("Listed {} entries for {:?}", rows.len(), filter);
    Ok(rows)
}

/// Finds an entry by its unique ID.
pub async fn get_entry(db: &DatabaseConnection, entry_id: i64) -> Result<Option<cashflow::Model>> {
    Cashflow::find_by_id(entry_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Validates and records a new entry.
///
/// # Errors
/// Returns `Validation` carrying every violated rule, or a database error.
#[instrument(skip(db, form))]
pub async fn create_entry(db: &DatabaseConnection, form: &EntryForm) -> Result<cashflow::Model> {
    let txn = db.begin().await?;
    let entry = validate_in(&txn, form).await?;

    let created = cashflow::ActiveModel {
        recorded_on: Set(entry.recorded_on),
        status_id: Set(entry.status_id),
        type_id: Set(entry.type_id),
        category_id: Set(entry.category_id),
        subcategory_id: Set(entry.subcategory_id),
        amount_cents: Set(entry.amount_cents),
        comment: Set(entry.comment),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(
        "Recorded entry {} on {} for {} cents",
        created.id, created.recorded_on, created.amount_cents
    );
    Ok(created)
}

/// Validates `form` and overwrites the entry with it.
///
/// # Errors
/// Returns `NotFound` if the entry does not exist and `Validation` if the
/// form is rejected.
#[instrument(skip(db, form))]
pub async fn update_entry(
    db: &DatabaseConnection,
    entry_id: i64,
    form: &EntryForm,
) -> Result<cashflow::Model> {
    let txn = db.begin().await?;
    let existing = Cashflow::find_by_id(entry_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: ENTITY,
            id: entry_id,
        })?;
    let entry = validate_in(&txn, form).await?;

    let mut active: cashflow::ActiveModel = existing.into();
    active.recorded_on = Set(entry.recorded_on);
    active.status_id = Set(entry.status_id);
    active.type_id = Set(entry.type_id);
    active.category_id = Set(entry.category_id);
    active.subcategory_id = Set(entry.subcategory_id);
    active.amount_cents = Set(entry.amount_cents);
    active.comment = Set(entry.comment);
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    info!("Updated entry {}", updated.id);
    Ok(updated)
}

/// Deletes an entry.
///
/// # Errors
/// Returns `NotFound` if the entry does not exist.
#[instrument(skip(db))]
pub async fn delete_entry(db: &DatabaseConnection, entry_id: i64) -> Result<()> {
    let result = Cashflow::delete_by_id(entry_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: ENTITY,
            id: entry_id,
        });
    }

    info!("Deleted entry {}", entry_id);
    Ok(())
}

async fn validate_in(txn: &DatabaseTransaction, form: &EntryForm) -> Result<NewEntry> {
    let refs = load_reference_data(txn).await?;
    validate_entry(form, &refs).map_err(|messages| {
        debug!("Entry rejected: {:?}", messages);
        Error::Validation { messages }
    })
}
