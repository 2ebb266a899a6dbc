//! Cash-flow entity - one recorded money movement in the ledger.
//!
//! Each entry references a `status_id`, `type_id`, `category_id` and
//! `subcategory_id`. The amount is stored in minor units (cents) and carries
//! no sign; the direction is implied by the type.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cash-flow entry database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cashflows")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Calendar date the movement happened on
    pub recorded_on: Date,
    /// ID of the status
    pub status_id: i64,
    /// ID of the type
    pub type_id: i64,
    /// ID of the category (must belong to `type_id`)
    pub category_id: i64,
    /// ID of the subcategory (must belong to `category_id`)
    pub subcategory_id: i64,
    /// Amount in minor currency units, always positive
    pub amount_cents: i64,
    /// Optional free-text comment
    pub comment: Option<String>,
}

/// Defines relationships between a cash-flow entry and the reference tables
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry has one status
    #[sea_orm(
        belongs_to = "super::status::Entity",
        from = "Column::StatusId",
        to = "super::status::Column::Id"
    )]
    Status,
    /// Each entry has one type
    #[sea_orm(
        belongs_to = "super::flow_type::Entity",
        from = "Column::TypeId",
        to = "super::flow_type::Column::Id"
    )]
    FlowType,
    /// Each entry belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    /// Each entry belongs to one subcategory
    #[sea_orm(
        belongs_to = "super::subcategory::Entity",
        from = "Column::SubcategoryId",
        to = "super::subcategory::Column::Id"
    )]
    Subcategory,
}

impl Related<super::status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Status.def()
    }
}

impl Related<super::flow_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FlowType.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::subcategory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subcategory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
