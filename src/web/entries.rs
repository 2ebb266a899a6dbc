//! Ledger pages: listing, new entry, edit entry, delete entry.

use crate::{
    core::{
        cashflow::{self, CashflowFilter},
        reference::{ReferenceData, load_reference_data},
        validation::EntryForm,
    },
    errors::{Error, Result},
    web::{AppState, Notice, render},
};
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use std::collections::HashMap;
use tracing::debug;

/// `GET /` - filter form and matching entries.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response> {
    let filter = CashflowFilter::from_params(&params);
    let rows = cashflow::list_entries(&state.db, &filter).await?;
    let refs = load_reference_data(&state.db).await?;
    let notice = params.get("notice").and_then(|code| Notice::from_code(code));

    Ok(render::ledger_page(&rows, &refs, &params, notice).into_response())
}

/// `GET /entries/new` - blank form dated today.
pub async fn new(State(state): State<AppState>) -> Result<Response> {
    let refs = load_reference_data(&state.db).await?;
    let form = EntryForm {
        recorded_on: chrono::Local::now().date_naive().format("%Y-%m-%d").to_string(),
        ..EntryForm::default()
    };
    Ok(render::entry_form_page("New entry", "/entries/new", &form, &refs, &[])?.into_response())
}

/// `POST /entries/new`
pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<EntryForm>,
) -> Result<Response> {
    match cashflow::create_entry(&state.db, &form).await {
        Ok(_) => Ok(Redirect::to(&Notice::EntryCreated.redirect_to("/")).into_response()),
        Err(Error::Validation { messages }) => {
            let refs = load_reference_data(&state.db).await?;
            rejected("New entry", "/entries/new", &form, &refs, &messages)
        }
        Err(err) => Err(err),
    }
}

/// `GET /entries/:id/edit`
pub async fn edit(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let entry = cashflow::get_entry(&state.db, id)
        .await?
        .ok_or(Error::NotFound { entity: "Entry", id })?;
    let refs = load_reference_data(&state.db).await?;

    let action = format!("/entries/{id}/edit");
    let form = EntryForm::from_entry(&entry);
    Ok(render::entry_form_page("Edit entry", &action, &form, &refs, &[])?.into_response())
}

/// `POST /entries/:id/edit`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<EntryForm>,
) -> Result<Response> {
    match cashflow::update_entry(&state.db, id, &form).await {
        Ok(_) => Ok(Redirect::to(&Notice::EntryUpdated.redirect_to("/")).into_response()),
        Err(Error::Validation { messages }) => {
            let refs = load_reference_data(&state.db).await?;
            let action = format!("/entries/{id}/edit");
            rejected("Edit entry", &action, &form, &refs, &messages)
        }
        Err(err) => Err(err),
    }
}

/// `POST /entries/:id/delete`
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    cashflow::delete_entry(&state.db, id).await?;
    Ok(Redirect::to(&Notice::EntryDeleted.redirect_to("/")).into_response())
}

fn rejected(
    title: &str,
    action: &str,
    form: &EntryForm,
    refs: &ReferenceData,
    messages: &[String],
) -> Result<Response> {
    debug!("Re-rendering {} with {} errors", action, messages.len());
    let page = render::entry_form_page(title, action, form, refs, messages)?;
    Ok((StatusCode::BAD_REQUEST, page).into_response())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use crate::web::{router, test_support::*};

    fn form_body(hierarchy: &TestHierarchy, date: &str, amount: &str) -> String {
        format!(
            "recorded_on={date}&status_id={}&type_id={}&category_id={}&subcategory_id={}&amount={amount}&comment=hello",
            hierarchy.status.id,
            hierarchy.flow_type.id,
            hierarchy.category.id,
            hierarchy.subcategory.id,
        )
    }

    #[tokio::test]
    async fn test_create_entry_redirects_and_lists() -> Result<()> {
        let (db, hierarchy) = setup_with_hierarchy().await?;
        let app = router(AppState { db: db.clone() });

        let (status, location) = post_form(
            &app,
            "/entries/new",
            &form_body(&hierarchy, "2024-01-15", "1+234%2C50"),
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location, "/?notice=entry_created");

        let (status, page) = get(&app, "/?notice=entry_created").await;
        assert_eq!(status, StatusCode::OK);
        assert!(page.contains("Entry saved."));
        assert!(page.contains("1 234.50"));
        assert!(page.contains("hello"));

        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_entry_rerenders_form() -> Result<()> {
        let (db, hierarchy) = setup_with_hierarchy().await?;
        let app = router(AppState { db: db.clone() });

        let (status, page) =
            post_form(&app, "/entries/new", &form_body(&hierarchy, "", "0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(page.contains("Date is required"));
        assert!(page.contains("Amount must be greater than zero"));
        // The submitted comment survives the round trip
        assert!(page.contains("value=\"hello\""));

        let rows = cashflow::list_entries(&db, &CashflowFilter::default()).await?;
        assert!(rows.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_edit_and_delete_entry() -> Result<()> {
        let (db, hierarchy) = setup_with_hierarchy().await?;
        let entry = create_test_entry(&db, &hierarchy, "2024-01-10", "100").await?;
        let app = router(AppState { db: db.clone() });

        let (status, page) = get(&app, &format!("/entries/{}/edit", entry.id)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(page.contains("value=\"100.00\""));

        let (status, location) = post_form(
            &app,
            &format!("/entries/{}/edit", entry.id),
            &form_body(&hierarchy, "2024-01-11", "250"),
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location, "/?notice=entry_updated");
        let updated = cashflow::get_entry(&db, entry.id).await?.unwrap();
        assert_eq!(updated.amount_cents, 25_000);

        let (status, _) = post_form(&app, &format!("/entries/{}/delete", entry.id), "").await;
        assert_eq!(status, StatusCode::SEE_OTHER);

        let (status, _) = post_form(&app, &format!("/entries/{}/delete", entry.id), "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get(&app, &format!("/entries/{}/edit", entry.id)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_applies_filters() -> Result<()> {
        let (db, hierarchy) = setup_with_hierarchy().await?;
        create_test_entry(&db, &hierarchy, "2023-12-31", "11.11").await?;
        create_test_entry(&db, &hierarchy, "2024-01-20", "22.22").await?;
        let app = router(AppState { db });

        let (status, page) = get(&app, "/?date_from=2024-01-01&date_to=2024-01-31&type_id=bogus").await;
        assert_eq!(status, StatusCode::OK);
        assert!(page.contains("22.22"));
        assert!(!page.contains("11.11"));

        Ok(())
    }
}
