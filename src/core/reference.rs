//! A read-only snapshot of all four reference tables.
//!
//! Entry validation and the entry form both work from this snapshot. Loading
//! it through a transaction gives validation a consistent view of the
//! hierarchy for the duration of one write.

use crate::{
    core::{category, flow_type, status, subcategory},
    entities,
    errors::Result,
};
use sea_orm::ConnectionTrait;
use serde::Serialize;
use std::collections::BTreeMap;

pub use crate::core::category::CategoryView;
pub use crate::core::subcategory::SubcategoryView;

/// All statuses, types, categories and subcategories, each list in display
/// order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReferenceData {
    /// Statuses ordered by name
    pub statuses: Vec<entities::status::Model>,
    /// Types ordered by name
    pub types: Vec<entities::flow_type::Model>,
    /// Categories ordered by type name, then name
    pub categories: Vec<CategoryView>,
    /// Subcategories ordered by category name, then name
    pub subcategories: Vec<SubcategoryView>,
}

/// One option of a dependent select box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    /// Option value
    pub id: i64,
    /// Option label
    pub name: String,
}

impl ReferenceData {
    /// Looks up a status by ID.
    #[must_use]
    pub fn status(&self, id: i64) -> Option<&entities::status::Model> {
        self.statuses.iter().find(|s| s.id == id)
    }

    /// Looks up a type by ID.
    #[must_use]
    pub fn flow_type(&self, id: i64) -> Option<&entities::flow_type::Model> {
        self.types.iter().find(|t| t.id == id)
    }

    /// Looks up a category by ID.
    #[must_use]
    pub fn category(&self, id: i64) -> Option<&CategoryView> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Looks up a subcategory by ID.
    #[must_use]
    pub fn subcategory(&self, id: i64) -> Option<&SubcategoryView> {
        self.subcategories.iter().find(|s| s.id == id)
    }

    /// Categories of one type, in display order.
    pub fn categories_of(&self, type_id: i64) -> impl Iterator<Item = &CategoryView> {
        self.categories.iter().filter(move |c| c.type_id == type_id)
    }

    /// Subcategories of one category, in display order.
    pub fn subcategories_of(&self, category_id: i64) -> impl Iterator<Item = &SubcategoryView> {
        self.subcategories
            .iter()
            .filter(move |s| s.category_id == category_id)
    }

    /// Maps every type ID to its categories. Types without categories map to
    /// an empty list so the entry form can clear its select box.
    #[must_use]
    pub fn categories_by_type(&self) -> BTreeMap<i64, Vec<ChoiceOption>> {
        self.types
            .iter()
            .map(|t| {
                let options = self
                    .categories_of(t.id)
                    .map(|c| ChoiceOption {
                        id: c.id,
                        name: c.name.clone(),
                    })
                    .collect();
                (t.id, options)
            })
            .collect()
    }

    /// Maps every category ID to its subcategories.
    #[must_use]
    pub fn subcategories_by_category(&self) -> BTreeMap<i64, Vec<ChoiceOption>> {
        self.categories
            .iter()
            .map(|c| {
                let options = self
                    .subcategories_of(c.id)
                    .map(|s| ChoiceOption {
                        id: s.id,
                        name: s.name.clone(),
                    })
                    .collect();
                (c.id, options)
            })
            .collect()
    }
}

/// Loads a fresh snapshot of the reference tables.
///
/// Accepts either a connection or a transaction.
pub async fn load_reference_data<C>(db: &C) -> Result<ReferenceData>
where
    C: ConnectionTrait,
{
    Ok(ReferenceData {
        statuses: status::get_all_statuses(db).await?,
        types: flow_type::get_all_types(db).await?,
        categories: category::get_all_categories(db).await?,
        subcategories: subcategory::get_all_subcategories(db).await?,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{category::create_category, flow_type::create_type};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_load_reference_data() -> Result<()> {
        let (db, hierarchy) = setup_with_hierarchy().await?;

        let refs = load_reference_data(&db).await?;
        assert_eq!(refs.statuses.len(), 1);
        assert_eq!(refs.types.len(), 1);

        let category = refs.category(hierarchy.category.id).unwrap();
        assert_eq!(category.type_name, hierarchy.flow_type.name);

        let subcategory = refs.subcategory(hierarchy.subcategory.id).unwrap();
        assert_eq!(subcategory.type_id, hierarchy.flow_type.id);
        assert_eq!(subcategory.category_name, hierarchy.category.name);

        assert!(refs.status(999).is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_dependent_choice_maps() -> Result<()> {
        let (db, hierarchy) = setup_with_hierarchy().await?;
        let income = create_type(&db, "Income").await?;
        let empty = create_category(&db, "Gifts", income.id).await?;

        let refs = load_reference_data(&db).await?;

        let by_type = refs.categories_by_type();
        assert_eq!(by_type[&hierarchy.flow_type.id].len(), 1);
        assert_eq!(
            by_type[&income.id],
            vec![ChoiceOption {
                id: empty.id,
                name: "Gifts".to_string()
            }]
        );

        let by_category = refs.subcategories_by_category();
        assert_eq!(
            by_category[&hierarchy.category.id][0].id,
            hierarchy.subcategory.id
        );
        assert!(by_category[&empty.id].is_empty());

        Ok(())
    }
}
