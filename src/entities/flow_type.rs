//! Flow type entity - the direction of a money movement (income, expense).
//!
//! Types are the root of the category hierarchy: every category belongs to
//! exactly one type. The table is called `types`; the module is named
//! `flow_type` because `type` is a keyword.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Flow type database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "types")]
pub struct Model {
    /// Unique identifier for the type
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, unique across all types
    #[sea_orm(unique)]
    pub name: String,
}

/// Defines relationships between Type and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One type owns many categories
    #[sea_orm(has_many = "super::category::Entity")]
    Categories,
    /// One type is used by many cash-flow entries
    #[sea_orm(has_many = "super::cashflow::Entity")]
    Cashflows,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::cashflow::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cashflows.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
