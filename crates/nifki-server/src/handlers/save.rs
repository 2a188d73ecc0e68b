//! Save handler and multipart form reading.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};

use crate::error::ApiError;
use crate::render;
use crate::schema::forms::{Field, SaveForm, UploadedFile, MAX_UPLOAD_BYTES};
use crate::schema::views::SaveOutcome;
use crate::state::AppState;

use super::{parse_page, run_blocking};

/// Saves (or uploads an image to) a page.
///
/// `POST /pages/{page}/save/`
pub async fn save(
    State(state): State<AppState>,
    Path(page): Path<String>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let page = parse_page(page)?;
    let form = read_save_form(multipart).await?;

    let target = form.rename_target();
    let mut pages = vec![&page];
    pages.extend(target.as_ref());
    let guard = state.locks.acquire(&pages).await;

    let outcome = {
        let page = page.clone();
        run_blocking(&state, move |service| {
            let _guard = guard;
            service.save(&page, &form)
        })
        .await?
    };

    Ok(match outcome {
        SaveOutcome::EditForm(view) => Html(render::edit_form(&view)).into_response(),
        SaveOutcome::RedirectToPlay(target) => {
            Redirect::to(&format!("/pages/{target}/play/")).into_response()
        }
        SaveOutcome::BuildToolError => {
            let page = Html(render::compiler_error());
            (StatusCode::INTERNAL_SERVER_ERROR, page).into_response()
        }
    })
}

fn bad_multipart(err: MultipartError) -> ApiError {
    ApiError::BadRequest(err.body_text())
}

/// Collects the form parts. Unknown parts are skipped and only the first
/// occurrence of a repeated part counts. The image is read up to
/// [`MAX_UPLOAD_BYTES`] bytes, enough to tell that it is too large.
pub async fn read_save_form(mut multipart: Multipart) -> Result<SaveForm, ApiError> {
    let mut form = SaveForm::default();
    while let Some(mut field) = multipart.next_field().await.map_err(bad_multipart)? {
        let Some(kind) = field.name().and_then(Field::from_form_name) else {
            continue;
        };
        match kind {
            Field::Debug => form.debug = true,
            Field::Upload => form.upload = true,
            Field::UploadedImage => {
                if form.uploaded_image.is_some() {
                    continue;
                }
                let filename = field.file_name().unwrap_or_default().to_string();
                let mut data = Vec::new();
                while let Some(chunk) = field.chunk().await.map_err(bad_multipart)? {
                    let room = MAX_UPLOAD_BYTES - data.len();
                    data.extend_from_slice(&chunk[..chunk.len().min(room)]);
                    if data.len() >= MAX_UPLOAD_BYTES {
                        break;
                    }
                }
                form.uploaded_image = Some(UploadedFile { filename, data });
            }
            text_field => {
                let slot = match text_field {
                    Field::Name => &mut form.name,
                    Field::Width => &mut form.width,
                    Field::Height => &mut form.height,
                    Field::MsPerFrame => &mut form.ms_per_frame,
                    Field::Source => &mut form.source,
                    Field::NewPage => &mut form.newpage,
                    _ => &mut form.csrf_token,
                };
                let text = field.text().await.map_err(bad_multipart)?;
                if slot.is_none() {
                    *slot = Some(text);
                }
            }
        }
    }
    Ok(form)
}
