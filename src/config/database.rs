//! Database configuration module for the cashbook.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs. Creation is idempotent (`IF NOT EXISTS`), which lets the
//! application provision the schema on every start.

use crate::entities::{Cashflow, Category, FlowType, Status, Subcategory, category, subcategory};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info, instrument};

/// Used when neither `DATABASE_URL` nor the configuration file names a database.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://cashbook.sqlite?mode=rwc";

/// Resolves the database URL: `DATABASE_URL` wins over the configured value,
/// which wins over [`DEFAULT_DATABASE_URL`].
#[must_use]
pub fn get_database_url(configured: Option<&str>) -> String {
    std::env::var("DATABASE_URL")
        .ok()
        .or_else(|| configured.map(ToString::to_string))
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database at `database_url`.
///
/// `SQLite` connections opened through sqlx enforce foreign keys by default,
/// which serves as a backstop behind the explicit dependency checks.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables and unique indexes if they do not exist yet.
///
/// Parents are created before children so foreign keys resolve:
/// statuses, types, categories, subcategories, cashflows.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, Status).await?;
    create_table(db, &schema, FlowType).await?;
    create_table(db, &schema, Category).await?;
    create_table(db, &schema, Subcategory).await?;
    create_table(db, &schema, Cashflow).await?;

    let category_name_index = Index::create()
        .name("idx_categories_type_name")
        .table(Category)
        .col(category::Column::TypeId)
        .col(category::Column::Name)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&category_name_index)).await?;

    let subcategory_name_index = Index::create()
        .name("idx_subcategories_category_name")
        .table(Subcategory)
        .col(subcategory::Column::CategoryId)
        .col(subcategory::Column::Name)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&subcategory_name_index)).await?;

    info!("Database tables ensured");
    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}
