//! Starter reference data loaded from the `[seed]` section of the config file.
//!
//! The reference tables are seeded from this set on first run, one table at a
//! time and only while that table is still empty. When the section is absent
//! the built-in starter set is used.

use serde::Deserialize;

/// Configuration structure for the `[seed]` section
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SeedConfig {
    /// Status names to create
    pub statuses: Vec<String>,
    /// Type names to create
    pub types: Vec<String>,
    /// Categories to create, each with its subcategories
    pub categories: Vec<CategorySeed>,
}

/// Configuration for a single seeded category
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CategorySeed {
    /// Name of the category
    pub name: String,
    /// Name of the owning type; must appear in [`SeedConfig::types`]
    #[serde(rename = "type")]
    pub type_name: String,
    /// Names of the subcategories under this category
    #[serde(default)]
    pub subcategories: Vec<String>,
}

impl CategorySeed {
    fn new(name: &str, type_name: &str, subcategories: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            subcategories: subcategories.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            statuses: vec!["Business".into(), "Personal".into(), "Tax".into()],
            types: vec!["Income".into(), "Expense".into()],
            categories: vec![
                CategorySeed::new("Infrastructure", "Expense", &["VPS", "Proxy"]),
                CategorySeed::new("Marketing", "Expense", &["Farpost", "Avito"]),
                CategorySeed::new("Other", "Income", &["Investments", "Debt repayment"]),
            ],
        }
    }
}
