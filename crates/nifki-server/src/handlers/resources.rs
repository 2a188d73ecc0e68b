//! Page images and built games.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;

use nifki_storage::is_valid_resource_name;

use crate::error::ApiError;
use crate::state::AppState;

use super::{parse_page, run_blocking};

/// HTTP date format, always in GMT.
const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// `GET /pages/{page}/res/{name}`
pub async fn resource(
    State(state): State<AppState>,
    Path((page, name)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let page = parse_page(page)?;
    if !is_valid_resource_name(&name) {
        return Err(ApiError::BadPageName(name));
    }
    let bytes = run_blocking(&state, move |service| service.resource(&page, &name)).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes))
}

/// Serves the built game under any `.jar` name. The play view puts a fresh
/// number in that name on every visit; the headers below add to that so no
/// cache ever hands out an old build.
///
/// `GET /pages/{page}/{file}`
pub async fn artifact(
    State(state): State<AppState>,
    Path((page, file)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let page = parse_page(page)?;
    if !file.ends_with(".jar") {
        return Err(ApiError::NotFound("Not found".to_string()));
    }
    let bytes = run_blocking(&state, move |service| service.artifact(&page)).await?;
    let now = chrono::Utc::now().format(HTTP_DATE).to_string();
    Ok((
        [
            (header::CONTENT_TYPE, "application/java-archive".to_string()),
            (header::LAST_MODIFIED, now.clone()),
            (header::DATE, now),
        ],
        bytes,
    ))
}
