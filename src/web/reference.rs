//! Reference data pages for statuses, types, categories and subcategories.
//!
//! All four kinds share one set of routes, keyed by [`ReferenceKind`] in the
//! path.

use crate::{
    core::{
        category, flow_type,
        reference::load_reference_data,
        status, subcategory,
        validation::parse_id,
    },
    errors::{Error, Result},
    web::{AppState, Notice, render, status_for},
};
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::collections::HashMap;

/// Which reference table a route addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    /// `/reference/statuses`
    Statuses,
    /// `/reference/types`
    Types,
    /// `/reference/categories`
    Categories,
    /// `/reference/subcategories`
    Subcategories,
}

impl ReferenceKind {
    /// Every kind, in page order.
    pub const ALL: [Self; 4] = [
        Self::Statuses,
        Self::Types,
        Self::Categories,
        Self::Subcategories,
    ];

    /// Path segment.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Statuses => "statuses",
            Self::Types => "types",
            Self::Categories => "categories",
            Self::Subcategories => "subcategories",
        }
    }

    /// Section heading.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Statuses => "Statuses",
            Self::Types => "Types",
            Self::Categories => "Categories",
            Self::Subcategories => "Subcategories",
        }
    }

    /// Singular name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Statuses => "Status",
            Self::Types => "Type",
            Self::Categories => "Category",
            Self::Subcategories => "Subcategory",
        }
    }
}

/// Raw reference form fields. Only categories use `type_id` and only
/// subcategories use `category_id`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReferenceForm {
    /// New name
    pub name: String,
    /// Owning type, for categories
    pub type_id: String,
    /// Owning category, for subcategories
    pub category_id: String,
}

fn required_parent(raw: &str, label: &str) -> Result<i64> {
    parse_id(raw).ok_or_else(|| Error::validation(format!("{label} is required")))
}

/// A blank parent keeps the current one; anything else must be a valid id.
fn optional_parent(raw: &str, label: &str) -> Result<Option<i64>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    required_parent(raw, label).map(Some)
}

/// `GET /reference`
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response> {
    let refs = load_reference_data(&state.db).await?;
    let notice = params.get("notice").and_then(|code| Notice::from_code(code));
    Ok(render::reference_page(&refs, notice, &[]).into_response())
}

/// `POST /reference/:kind`
pub async fn create(
    State(state): State<AppState>,
    Path(kind): Path<ReferenceKind>,
    Form(form): Form<ReferenceForm>,
) -> Result<Response> {
    match apply_create(&state.db, kind, &form).await {
        Ok(()) => Ok(Redirect::to(&Notice::ReferenceCreated.redirect_to("/reference")).into_response()),
        Err(err) => rejected_on_index(&state.db, err).await,
    }
}

/// `GET /reference/:kind/:id/edit`
pub async fn edit(
    State(state): State<AppState>,
    Path((kind, id)): Path<(ReferenceKind, i64)>,
) -> Result<Response> {
    let form = current_values(&state.db, kind, id).await?;
    let refs = load_reference_data(&state.db).await?;
    Ok(render::reference_edit_page(kind, id, &form, &refs, &[]).into_response())
}

/// `POST /reference/:kind/:id/edit`
pub async fn update(
    State(state): State<AppState>,
    Path((kind, id)): Path<(ReferenceKind, i64)>,
    Form(form): Form<ReferenceForm>,
) -> Result<Response> {
    match apply_update(&state.db, kind, id, &form).await {
        Ok(()) => Ok(Redirect::to(&Notice::ReferenceUpdated.redirect_to("/reference")).into_response()),
        Err(err @ Error::NotFound { .. }) => Err(err),
        Err(err) => {
            let Some(messages) = err.user_messages() else {
                return Err(err);
            };
            let refs = load_reference_data(&state.db).await?;
            let page = render::reference_edit_page(kind, id, &form, &refs, &messages);
            Ok((status_for(&err), page).into_response())
        }
    }
}

/// `POST /reference/:kind/:id/delete`
pub async fn delete(
    State(state): State<AppState>,
    Path((kind, id)): Path<(ReferenceKind, i64)>,
) -> Result<Response> {
    let result = match kind {
        ReferenceKind::Statuses => status::delete_status(&state.db, id).await,
        ReferenceKind::Types => flow_type::delete_type(&state.db, id).await,
        ReferenceKind::Categories => category::delete_category(&state.db, id).await,
        ReferenceKind::Subcategories => subcategory::delete_subcategory(&state.db, id).await,
    };
    match result {
        Ok(()) => Ok(Redirect::to(&Notice::ReferenceDeleted.redirect_to("/reference")).into_response()),
        Err(err @ Error::NotFound { .. }) => Err(err),
        Err(err) => rejected_on_index(&state.db, err).await,
    }
}

async fn apply_create(db: &DatabaseConnection, kind: ReferenceKind, form: &ReferenceForm) -> Result<()> {
    match kind {
        ReferenceKind::Statuses => status::create_status(db, &form.name).await.map(drop),
        ReferenceKind::Types => flow_type::create_type(db, &form.name).await.map(drop),
        ReferenceKind::Categories => {
            let type_id = required_parent(&form.type_id, "Type")?;
            category::create_category(db, &form.name, type_id)
                .await
                .map(drop)
        }
        ReferenceKind::Subcategories => {
            let category_id = required_parent(&form.category_id, "Category")?;
            subcategory::create_subcategory(db, &form.name, category_id)
                .await
                .map(drop)
        }
    }
}

/// Renames the row; categories and subcategories are also re-parented when
/// the form names a parent.
async fn apply_update(
    db: &DatabaseConnection,
    kind: ReferenceKind,
    id: i64,
    form: &ReferenceForm,
) -> Result<()> {
    match kind {
        ReferenceKind::Statuses => status::rename_status(db, id, &form.name).await.map(drop),
        ReferenceKind::Types => flow_type::rename_type(db, id, &form.name).await.map(drop),
        ReferenceKind::Categories => {
            let updated = match optional_parent(&form.type_id, "Type")? {
                Some(type_id) => category::update_category(db, id, &form.name, type_id).await,
                None => category::rename_category(db, id, &form.name).await,
            };
            updated.map(drop)
        }
        ReferenceKind::Subcategories => {
            let updated = match optional_parent(&form.category_id, "Category")? {
                Some(category_id) => {
                    subcategory::update_subcategory(db, id, &form.name, category_id).await
                }
                None => subcategory::rename_subcategory(db, id, &form.name).await,
            };
            updated.map(drop)
        }
    }
}

async fn current_values(db: &DatabaseConnection, kind: ReferenceKind, id: i64) -> Result<ReferenceForm> {
    let not_found = || Error::NotFound {
        entity: kind.label(),
        id,
    };
    let form = match kind {
        ReferenceKind::Statuses => {
            let row = status::get_status_by_id(db, id).await?.ok_or_else(not_found)?;
            ReferenceForm {
                name: row.name,
                ..ReferenceForm::default()
            }
        }
        ReferenceKind::Types => {
            let row = flow_type::get_type_by_id(db, id).await?.ok_or_else(not_found)?;
            ReferenceForm {
                name: row.name,
                ..ReferenceForm::default()
            }
        }
        ReferenceKind::Categories => {
            let row = category::get_category_by_id(db, id)
                .await?
                .ok_or_else(not_found)?;
            ReferenceForm {
                name: row.name,
                type_id: row.type_id.to_string(),
                ..ReferenceForm::default()
            }
        }
        ReferenceKind::Subcategories => {
            let row = subcategory::get_subcategory_by_id(db, id)
                .await?
                .ok_or_else(not_found)?;
            ReferenceForm {
                name: row.name,
                category_id: row.category_id.to_string(),
                ..ReferenceForm::default()
            }
        }
    };
    Ok(form)
}

/// Re-renders the reference index with the error's messages, or passes
/// infrastructure errors through.
async fn rejected_on_index(db: &DatabaseConnection, err: Error) -> Result<Response> {
    let Some(messages) = err.user_messages() else {
        return Err(err);
    };
    let refs = load_reference_data(db).await?;
    let page = render::reference_page(&refs, None, &messages);
    Ok((status_for(&err), page).into_response())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use crate::web::{router, test_support::*};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_create_reference_rows() -> Result<()> {
        let db = setup_test_db().await?;
        let app = router(AppState { db: db.clone() });

        let (status, location) = post_form(&app, "/reference/types", "name=Expense").await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location, "/reference?notice=reference_created");

        let expense = flow_type::get_all_types(&db).await?.pop().unwrap();
        let (status, _) = post_form(
            &app,
            "/reference/categories",
            &format!("name=Hosting&type_id={}", expense.id),
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);

        let (status, page) = get(&app, "/reference?notice=reference_created").await;
        assert_eq!(status, StatusCode::OK);
        assert!(page.contains("Reference value added."));
        assert!(page.contains("<td>Hosting</td><td>Expense</td>"));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_reference_errors_render_inline() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_status(&db, "Tax").await?;
        let app = router(AppState { db });

        let (status, page) = post_form(&app, "/reference/statuses", "name=Tax").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(page.contains("Status named &#39;Tax&#39; already exists"));

        let (status, page) = post_form(&app, "/reference/categories", "name=Loose").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(page.contains("Type is required"));

        let (status, page) = post_form(&app, "/reference/statuses", "name=+++").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(page.contains("Name is required"));

        Ok(())
    }

    #[tokio::test]
    async fn test_edit_and_reparent_category() -> Result<()> {
        let (db, hierarchy) = setup_with_hierarchy().await?;
        let income = create_test_type(&db, "Income").await?;
        create_test_entry(&db, &hierarchy, "2024-03-03", "1").await?;
        let app = router(AppState { db: db.clone() });

        let uri = format!("/reference/categories/{}/edit", hierarchy.category.id);
        let (status, page) = get(&app, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert!(page.contains("value=\"Infrastructure\""));

        let (status, page) =
            post_form(&app, &uri, &format!("name=Servers&type_id={}", income.id)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(page.contains("Cannot change the type of a category"));

        let (status, _) = post_form(
            &app,
            &uri,
            &format!("name=Servers&type_id={}", hierarchy.flow_type.id),
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        let renamed = category::get_category_by_id(&db, hierarchy.category.id)
            .await?
            .unwrap();
        assert_eq!(renamed.name, "Servers");

        let (status, _) = get(&app, "/reference/categories/999/edit").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn test_edit_rejects_unparseable_parent() -> Result<()> {
        let (db, hierarchy) = setup_with_hierarchy().await?;
        let app = router(AppState { db: db.clone() });

        let uri = format!("/reference/categories/{}/edit", hierarchy.category.id);
        let (status, page) = post_form(&app, &uri, "name=Servers&type_id=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(page.contains("Type is required"));
        let unchanged = category::get_category_by_id(&db, hierarchy.category.id)
            .await?
            .unwrap();
        assert_eq!(unchanged.name, "Infrastructure");

        let uri = format!("/reference/subcategories/{}/edit", hierarchy.subcategory.id);
        let (status, page) = post_form(&app, &uri, "name=Droplet&category_id=x1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(page.contains("Category is required"));

        // A blank parent keeps the current one
        let (status, _) = post_form(&app, &uri, "name=Droplet&category_id=").await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        let renamed = subcategory::get_subcategory_by_id(&db, hierarchy.subcategory.id)
            .await?
            .unwrap();
        assert_eq!(renamed.name, "Droplet");
        assert_eq!(renamed.category_id, hierarchy.category.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_reference_rows() -> Result<()> {
        let (db, hierarchy) = setup_with_hierarchy().await?;
        let app = router(AppState { db: db.clone() });

        let (status, page) = post_form(
            &app,
            &format!("/reference/types/{}/delete", hierarchy.flow_type.id),
            "",
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(page.contains("Cannot delete a type"));

        let (status, location) = post_form(
            &app,
            &format!("/reference/subcategories/{}/delete", hierarchy.subcategory.id),
            "",
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location, "/reference?notice=reference_deleted");

        let (status, _) = post_form(&app, "/reference/statuses/999/delete", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        Ok(())
    }
}
