//! HTTP surface - server-rendered HTML pages over `axum`.
//!
//! Handlers stay thin: they extract the form or path, call into `core`, and
//! either redirect with a [`Notice`] or re-render the page with the error
//! messages. Errors that escape a handler are turned into a status page by
//! the [`IntoResponse`] impl for [`Error`].

/// Ledger entry pages
pub mod entries;
/// Success notices
pub mod notice;
/// Reference data pages
pub mod reference;
/// HTML rendering
pub mod render;

pub use notice::Notice;

use crate::errors::{Error, Result};
use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
}

/// Maps an error to the HTTP status it is reported with.
#[must_use]
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Validation { .. } => StatusCode::BAD_REQUEST,
        Error::NotFound { .. } => StatusCode::NOT_FOUND,
        Error::Conflict { .. } | Error::DependencyExists { .. } => StatusCode::CONFLICT,
        Error::Config { .. }
        | Error::Database(_)
        | Error::Io(_)
        | Error::EnvVar(_)
        | Error::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let messages = self.user_messages().unwrap_or_else(|| {
            error!("Request failed: {}", self);
            vec!["Something went wrong. Please try again.".to_string()]
        });
        (status, render::error_page(status, &messages)).into_response()
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(entries::list))
        .route("/entries/new", get(entries::new).post(entries::create))
        .route("/entries/:id/edit", get(entries::edit).post(entries::update))
        .route("/entries/:id/delete", post(entries::delete))
        .route("/reference", get(reference::index))
        .route("/reference/:kind", post(reference::create))
        .route(
            "/reference/:kind/:id/edit",
            get(reference::edit).post(reference::update),
        )
        .route("/reference/:kind/:id/delete", post(reference::delete))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Serves the application on `addr` until Ctrl-C.
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr, db: DatabaseConnection) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(AppState { db }))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
