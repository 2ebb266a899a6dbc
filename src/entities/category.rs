//! Category entity - a grouping of money movements under one type.
//!
//! Category names are unique per owning type (enforced by the
//! `idx_categories_type_name` index created in `config::database`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning type
    pub type_id: i64,
    /// Display name, unique within the owning type
    pub name: String,
}

/// Defines relationships between Category and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each category belongs to one type
    #[sea_orm(
        belongs_to = "super::flow_type::Entity",
        from = "Column::TypeId",
        to = "super::flow_type::Column::Id",
        on_delete = "Cascade"
    )]
    FlowType,
    /// One category owns many subcategories
    #[sea_orm(has_many = "super::subcategory::Entity")]
    Subcategories,
    /// One category is used by many cash-flow entries
    #[sea_orm(has_many = "super::cashflow::Entity")]
    Cashflows,
}

impl Related<super::flow_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FlowType.def()
    }
}

impl Related<super::subcategory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subcategories.def()
    }
}

impl Related<super::cashflow::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cashflows.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
