//! HTTP handler modules for the wiki.
//!
//! Handlers validate path segments, delegate to [`PageService`] and render
//! the result. No page logic lives in handlers.

pub mod edit;
pub mod pages;
pub mod play;
pub mod resources;
pub mod save;

use nifki_core::PageName;

use crate::error::ApiError;
use crate::service::PageService;
use crate::state::AppState;

/// Checks a `{page}` path segment before it goes anywhere near storage.
pub(crate) fn parse_page(raw: String) -> Result<PageName, ApiError> {
    Ok(PageName::parse(raw)?)
}

/// Runs blocking service work off the async runtime.
pub(crate) async fn run_blocking<T, F>(state: &AppState, work: F) -> Result<T, ApiError>
where
    F: FnOnce(&PageService) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let service = state.service.clone();
    tokio::task::spawn_blocking(move || work(&service)).await?
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}
