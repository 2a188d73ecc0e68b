//! Router assembly for the wiki.
//!
//! [`build_router`] wires all handler functions to their routes with a
//! tracing middleware layer.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete axum router.
///
/// Routes use axum 0.8 `/{param}` path syntax. Static segments win over
/// `{file}`, so only otherwise unmatched names reach the artifact handler.
/// The save route has no body limit: the form reader truncates the image
/// itself, so an oversized upload gets the form's size message.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::pages::welcome))
        .route("/pages/", get(handlers::pages::list_pages))
        .route("/pages/{page}/", get(handlers::pages::page_index))
        .route("/pages/{page}/play/", get(handlers::play::play))
        .route("/pages/{page}/edit/", get(handlers::edit::edit))
        .route(
            "/pages/{page}/save/",
            post(handlers::save::save).layer(DefaultBodyLimit::disable()),
        )
        .route(
            "/pages/{page}/res/{name}",
            get(handlers::resources::resource),
        )
        .route("/pages/{page}/{file}", get(handlers::resources::artifact))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
