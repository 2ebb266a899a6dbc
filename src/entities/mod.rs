//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod cashflow;
pub mod category;
pub mod flow_type;
pub mod status;
pub mod subcategory;

// Re-export specific types to avoid conflicts
pub use cashflow::{Column as CashflowColumn, Entity as Cashflow, Model as CashflowModel};
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use flow_type::{Column as FlowTypeColumn, Entity as FlowType, Model as FlowTypeModel};
pub use status::{Column as StatusColumn, Entity as Status, Model as StatusModel};
pub use subcategory::{
    Column as SubcategoryColumn, Entity as Subcategory, Model as SubcategoryModel,
};
