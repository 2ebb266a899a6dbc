//! Subcategory entity - the finest classification level, owned by a category.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Subcategory database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subcategories")]
pub struct Model {
    /// Unique identifier for the subcategory
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning category
    pub category_id: i64,
    /// Display name, unique within the owning category
    pub name: String,
}

/// Defines relationships between Subcategory and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each subcategory belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "Cascade"
    )]
    Category,
    /// One subcategory is used by many cash-flow entries
    #[sea_orm(has_many = "super::cashflow::Entity")]
    Cashflows,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::cashflow::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cashflows.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
