//! The player.

use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};

use crate::error::ApiError;
use crate::render;
use crate::schema::views::PlayOutcome;
use crate::state::AppState;

use super::{parse_page, run_blocking};

/// Shows the built game, the compiler's complaints, or sends the visitor
/// to the editor when the page was never built.
///
/// `GET /pages/{page}/play/`
pub async fn play(
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> Result<Response, ApiError> {
    let page = parse_page(page)?;
    let random = chrono::Utc::now().timestamp();
    let outcome = run_blocking(&state, move |service| service.play(&page, random)).await?;
    Ok(match outcome {
        PlayOutcome::RenderGame(view) => Html(render::playing(&view)).into_response(),
        PlayOutcome::ShowDiagnostics { page, text } => {
            Html(render::compiler_output(&page, &text)).into_response()
        }
        PlayOutcome::RedirectToEditor(page) => {
            Redirect::to(&format!("/pages/{page}/edit/")).into_response()
        }
    })
}
