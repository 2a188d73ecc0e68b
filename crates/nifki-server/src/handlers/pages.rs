//! Welcome page, page list and the bare page address.

use axum::extract::{Path, State};
use axum::response::{Html, Redirect};

use crate::error::ApiError;
use crate::render;
use crate::state::AppState;

use super::{parse_page, run_blocking};

/// `GET /`
pub async fn welcome() -> Html<String> {
    Html(render::welcome())
}

/// Lists every page in the wiki, sorted.
///
/// `GET /pages/`
pub async fn list_pages(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let pages = run_blocking(&state, |service| service.list_pages()).await?;
    Ok(Html(render::page_list(&pages)))
}

/// A page's own address shows the game.
///
/// `GET /pages/{page}/`
pub async fn page_index(Path(page): Path<String>) -> Result<Redirect, ApiError> {
    let page = parse_page(page)?;
    Ok(Redirect::to(&format!("/pages/{page}/play/")))
}
