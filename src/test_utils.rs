//! Shared test utilities for the cashbook.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test reference rows and entries with sensible defaults.

use crate::{
    core::{
        category, cashflow, flow_type, status, subcategory,
        validation::EntryForm,
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test status.
pub async fn create_test_status(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::status::Model> {
    status::create_status(db, name).await
}

/// Creates a test type.
pub async fn create_test_type(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::flow_type::Model> {
    flow_type::create_type(db, name).await
}

/// Creates a test category under `type_id`.
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
    type_id: i64,
) -> Result<entities::category::Model> {
    category::create_category(db, name, type_id).await
}

/// Creates a test subcategory under `category_id`.
pub async fn create_test_subcategory(
    db: &DatabaseConnection,
    name: &str,
    category_id: i64,
) -> Result<entities::subcategory::Model> {
    subcategory::create_subcategory(db, name, category_id).await
}

/// One consistent status/type/category/subcategory chain.
#[derive(Debug, Clone)]
pub struct TestHierarchy {
    /// "Business"
    pub status: entities::status::Model,
    /// "Expense"
    pub flow_type: entities::flow_type::Model,
    /// "Infrastructure", under the type
    pub category: entities::category::Model,
    /// "VPS", under the category
    pub subcategory: entities::subcategory::Model,
}

/// Sets up a complete test environment with one reference chain.
/// Returns (db, hierarchy) for entry-related tests.
pub async fn setup_with_hierarchy() -> Result<(DatabaseConnection, TestHierarchy)> {
    let db = setup_test_db().await?;
    let status = create_test_status(&db, "Business").await?;
    let flow_type = create_test_type(&db, "Expense").await?;
    let category = create_test_category(&db, "Infrastructure", flow_type.id).await?;
    let subcategory = create_test_subcategory(&db, "VPS", category.id).await?;
    Ok((
        db,
        TestHierarchy {
            status,
            flow_type,
            category,
            subcategory,
        },
    ))
}

/// Builds an entry form pointing at every row of `hierarchy`.
///
/// # Defaults
/// * `comment`: empty
#[must_use]
pub fn entry_form(hierarchy: &TestHierarchy, recorded_on: &str, amount: &str) -> EntryForm {
    EntryForm {
        recorded_on: recorded_on.to_string(),
        status_id: hierarchy.status.id.to_string(),
        type_id: hierarchy.flow_type.id.to_string(),
        category_id: hierarchy.category.id.to_string(),
        subcategory_id: hierarchy.subcategory.id.to_string(),
        amount: amount.to_string(),
        comment: String::new(),
    }
}

/// Creates a test entry on the given chain.
///
/// # Arguments
/// * `recorded_on` - Date as `YYYY-MM-DD`
/// * `amount` - Decimal amount as typed into the form
pub async fn create_test_entry(
    db: &DatabaseConnection,
    hierarchy: &TestHierarchy,
    recorded_on: &str,
    amount: &str,
) -> Result<entities::cashflow::Model> {
    cashflow::create_entry(db, &entry_form(hierarchy, recorded_on, amount)).await
}
