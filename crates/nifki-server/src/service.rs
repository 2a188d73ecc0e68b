//! PageService: the single coordinator between HTTP handlers and the
//! storage and build crates.
//!
//! All page logic flows through [`PageService`]. Its methods are blocking;
//! handlers call them from `spawn_blocking` while holding the page locks.

use std::sync::Arc;

use nifki_build::{BuildError, BuildInvoker};
use nifki_core::PageName;
use nifki_storage::{BuildResult, PageStore, StorageError};

use crate::config::SecretKey;
use crate::csrf;
use crate::error::ApiError;
use crate::schema::forms::{SaveForm, ValidationContext};
use crate::schema::views::{EditOutcome, EditView, FormValues, GameView, PlayOutcome, SaveOutcome};
use crate::wrap::{wrap_diagnostic, DIAGNOSTIC_WIDTH};

/// The central service behind every page route.
pub struct PageService {
    store: Arc<dyn PageStore>,
    invoker: BuildInvoker,
    secret_key: SecretKey,
}

impl PageService {
    pub fn new(store: Arc<dyn PageStore>, invoker: BuildInvoker, secret_key: SecretKey) -> Self {
        PageService {
            store,
            invoker,
            secret_key,
        }
    }

    pub fn list_pages(&self) -> Result<Vec<PageName>, ApiError> {
        Ok(self.store.list_pages()?)
    }

    // -----------------------------------------------------------------------
    // Editor
    // -----------------------------------------------------------------------

    /// Opens the editor on the saved state of `page`.
    pub fn edit(&self, page: &PageName) -> Result<EditOutcome, ApiError> {
        let record = match self.store.load(page) {
            Ok(record) => record,
            Err(StorageError::PageNotFound(_)) => return Ok(EditOutcome::NoSuchPage(page.clone())),
            Err(err) => return Err(err.into()),
        };
        let values = FormValues::from_saved(page, record.source, &record.properties);
        Ok(EditOutcome::Form(EditView {
            page: page.clone(),
            error_message: None,
            values,
            resources: record.resources,
            csrf_token: csrf::token_for(&self.secret_key, page),
        }))
    }

    fn edit_view(
        &self,
        page: &PageName,
        values: FormValues,
        error_message: Option<String>,
    ) -> Result<EditView, ApiError> {
        Ok(EditView {
            page: page.clone(),
            error_message,
            values,
            resources: self.store.list_resource_names(page)?,
            csrf_token: csrf::token_for(&self.secret_key, page),
        })
    }

    // -----------------------------------------------------------------------
    // Save
    // -----------------------------------------------------------------------

    /// Validates and applies a submission of the edit form for `page`.
    ///
    /// The caller must hold the locks of `page` and of the form's rename
    /// target. Nothing is written unless the whole form is valid. An upload
    /// stores only the image; the other fields are shown again unsaved.
    pub fn save(&self, page: &PageName, form: &SaveForm) -> Result<SaveOutcome, ApiError> {
        if !self.store.exists(page) {
            return Err(StorageError::PageNotFound(page.clone()).into());
        }

        let ctx = ValidationContext {
            page,
            store: self.store.as_ref(),
            secret_key: &self.secret_key,
        };
        let valid = match form.validate(&ctx) {
            Ok(valid) => valid,
            Err(errors) => {
                let message = errors.first_error();
                tracing::info!(page = %page, message = ?message, "save rejected");
                return Ok(SaveOutcome::EditForm(self.edit_view(page, form.values(), message)?));
            }
        };

        if let Some(upload) = &valid.upload {
            let stored = self.store.add_resource(page, &upload.filename, &upload.data)?;
            tracing::info!(
                page = %page,
                resource = %stored,
                bytes = upload.data.len(),
                "image uploaded"
            );
            return Ok(SaveOutcome::EditForm(self.edit_view(page, form.values(), None)?));
        }

        let target = &valid.target;
        if target != page {
            self.store.create_by_copy(page, target)?;
            tracing::info!(from = %page, to = %target, "page copied");
        }
        self.store.write_source(target, &valid.source)?;
        self.store.write_properties(target, &valid.properties)?;

        match self.invoker.invoke(self.store.as_ref(), target) {
            Ok(report) if report.is_tool_failure() => Ok(SaveOutcome::BuildToolError),
            Ok(_) => Ok(SaveOutcome::RedirectToPlay(target.clone())),
            // Already logged and recorded by the invoker.
            Err(BuildError::Spawn { .. }) => Ok(SaveOutcome::BuildToolError),
            Err(err) => Err(err.into()),
        }
    }

    // -----------------------------------------------------------------------
    // Play
    // -----------------------------------------------------------------------

    /// Decides what the play route shows, from the latest build on disk.
    ///
    /// `random` varies the artifact URL of a rendered game.
    pub fn play(&self, page: &PageName, random: i64) -> Result<PlayOutcome, ApiError> {
        match self.store.read_build_artifact(page)? {
            BuildResult::Success { .. } => {
                let properties = self.store.read_properties(page)?;
                Ok(PlayOutcome::RenderGame(GameView {
                    page: page.clone(),
                    tagline: properties.tagline,
                    width: properties.width,
                    height: properties.height,
                    frame_interval_ms: properties.frame_interval_ms,
                    resources: self.store.list_resource_names(page)?,
                    random,
                }))
            }
            BuildResult::Failure { diagnostic } => Ok(PlayOutcome::ShowDiagnostics {
                page: page.clone(),
                text: wrap_diagnostic(&diagnostic, DIAGNOSTIC_WIDTH),
            }),
            BuildResult::NotBuilt => Ok(PlayOutcome::RedirectToEditor(page.clone())),
        }
    }

    pub fn resource(&self, page: &PageName, name: &str) -> Result<Vec<u8>, ApiError> {
        Ok(self.store.read_resource(page, name)?)
    }

    pub fn artifact(&self, page: &PageName) -> Result<Vec<u8>, ApiError> {
        Ok(self.store.read_artifact_bytes(page)?)
    }
}
