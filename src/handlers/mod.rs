//! HTTP Request Handling Module
//!
//! Translates inbound requests into snippet store operations and renders the results.
//!
//! # Module Organization
//!
//! - **`pages`**: HTML views (listing, detail, add form)
//! - **`api`**: JSON export of the whole collection
//!

pub mod api;
pub mod pages;

use std::future::Future;
use std::io;
use std::sync::Arc;

use axum::Router;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use log::{error, info};
use tokio::net::TcpListener;

use crate::models::{SnippetStore, StoreError};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<SnippetStore>,
}

impl AppState {
    pub fn new(store: Arc<SnippetStore>) -> Self {
        Self { store }
    }
}

/// Failure inside a handler. Rendered as a plain 500 response.
#[derive(Debug)]
pub enum AppError {
    Store(StoreError),
    Task(tokio::task::JoinError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Task(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Store(err) => format!("could not save snippet: {err}"),
            AppError::Task(err) => format!("request task failed: {err}"),
        };
        error!("{message}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            message,
        )
            .into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/snippet/{id}", get(pages::view_snippet))
        .route("/add", get(pages::add_form).post(pages::add_snippet))
        .route("/api/snippets", get(api::list_snippets))
        .with_state(state)
}

/// Serves the app on `listener` until `shutdown` resolves, then flushes the store.
pub async fn serve<F>(listener: TcpListener, store: Arc<SnippetStore>, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("serving snippets on http://{addr}");
    }

    let app = router(AppState::new(store.clone()));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("server stopped, flushing {}", store.path().display());
    store.flush().map_err(io::Error::other)
}
