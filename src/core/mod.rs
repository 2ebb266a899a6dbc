//! Core business logic module - Contains all domain logic separated from the
//! HTTP layer. Every function takes a database connection and returns
//! `errors::Result`, so the same operations back the web handlers, the CLI
//! and the tests.

/// Decimal amount parsing and formatting
pub mod amount;
/// Cash-flow ledger entries
pub mod cashflow;
/// Categories under a type
pub mod category;
/// Income/expense types
pub mod flow_type;
/// Snapshot of all reference tables
pub mod reference;
/// First-run reference data
pub mod seed;
/// Entry statuses
pub mod status;
/// Subcategories under a category
pub mod subcategory;
/// Form validation
pub mod validation;
