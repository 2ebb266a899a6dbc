//! Status entity - how a cash-flow entry is classified for reporting
//! (e.g. business, personal, tax).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "statuses")]
pub struct Model {
    /// Unique identifier for the status
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, unique across all statuses
    #[sea_orm(unique)]
    pub name: String,
}

/// Defines relationships between Status and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One status is used by many cash-flow entries
    #[sea_orm(has_many = "super::cashflow::Entity")]
    Cashflows,
}

impl Related<super::cashflow::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cashflows.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
