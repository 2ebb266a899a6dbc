//! First-run seeding of the reference tables.

use crate::{
    config::seed::SeedConfig,
    entities::{Category, FlowType, Status, category, flow_type, status, subcategory},
    errors::Result,
};
use sea_orm::{PaginatorTrait, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{info, instrument, warn};

/// How many rows each table received.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Statuses inserted
    pub statuses: usize,
    /// Types inserted
    pub types: usize,
    /// Categories inserted
    pub categories: usize,
    /// Subcategories inserted
    pub subcategories: usize,
}

/// Inserts the configured starter set.
///
/// Each table is seeded independently and only while it is empty, so running
/// this on every start is safe and never overrides user edits. Categories
/// naming a type that is not in the database are skipped with a warning.
#[instrument(skip(db, seed))]
pub async fn seed_reference_data(db: &DatabaseConnection, seed: &SeedConfig) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();
    let txn = db.begin().await?;

    if Status::find().count(&txn).await? == 0 {
        for name in &seed.statuses {
            status::ActiveModel {
                name: Set(name.clone()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            summary.statuses += 1;
        }
    }

    if FlowType::find().count(&txn).await? == 0 {
        for name in &seed.types {
            flow_type::ActiveModel {
                name: Set(name.clone()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            summary.types += 1;
        }
    }

    if Category::find().count(&txn).await? == 0 {
        let type_ids: HashMap<String, i64> = FlowType::find()
            .all(&txn)
            .await?
            .into_iter()
            .map(|t| (t.name, t.id))
            .collect();

        for category_seed in &seed.categories {
            let Some(&type_id) = type_ids.get(&category_seed.type_name) else {
                warn!(
                    "Skipping seed category '{}': unknown type '{}'",
                    category_seed.name, category_seed.type_name
                );
                continue;
            };

            let created = category::ActiveModel {
                type_id: Set(type_id),
                name: Set(category_seed.name.clone()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            summary.categories += 1;

            for name in &category_seed.subcategories {
                subcategory::ActiveModel {
                    category_id: Set(created.id),
                    name: Set(name.clone()),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
                summary.subcategories += 1;
            }
        }
    }

    txn.commit().await?;

    if summary == SeedSummary::default() {
        info!("Reference data already present, nothing seeded");
    } else {
        info!(
            "Seeded {} statuses, {} types, {} categories, {} subcategories",
            summary.statuses, summary.types, summary.categories, summary.subcategories
        );
    }
    Ok(summary)
}
