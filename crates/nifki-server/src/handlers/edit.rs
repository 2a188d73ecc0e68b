//! The editor.

use axum::extract::{Path, State};
use axum::response::Html;

use crate::error::ApiError;
use crate::render;
use crate::schema::views::EditOutcome;
use crate::state::AppState;

use super::{parse_page, run_blocking};

/// Opens the edit form on the page's saved state. A missing page gets an
/// explanation rather than an error status.
///
/// `GET /pages/{page}/edit/`
pub async fn edit(
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> Result<Html<String>, ApiError> {
    let page = parse_page(page)?;
    let outcome = run_blocking(&state, move |service| service.edit(&page)).await?;
    Ok(Html(match outcome {
        EditOutcome::Form(view) => render::edit_form(&view),
        EditOutcome::NoSuchPage(page) => render::no_such_page(&page),
    }))
}
