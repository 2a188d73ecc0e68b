//! Storage error types for nifki-storage.
//!
//! [`StorageError`] covers the failure modes of the page store: missing
//! pages and files, rename collisions, unreadable properties, and raw I/O.

use std::path::PathBuf;

use nifki_core::{CoreError, PageName};
use thiserror::Error;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No directory exists for the page.
    #[error("page not found: {0}")]
    PageNotFound(PageName),

    /// A create or rename target already has a directory.
    #[error("a page called '{0}' already exists")]
    DestinationExists(PageName),

    /// The page has no resource with the given name.
    #[error("resource not found: page={page}, name={name}")]
    ResourceNotFound { page: PageName, name: String },

    /// The page has no built artifact.
    #[error("no built artifact for page {0}")]
    ArtifactNotFound(PageName),

    /// The page's `properties.txt` could not be decoded.
    #[error("bad properties file for page {page}: {source}")]
    Properties {
        page: PageName,
        #[source]
        source: CoreError,
    },

    /// A file-system operation failed.
    #[error("I/O error at '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Returns a closure wrapping an `io::Error` with the path it concerns.
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> StorageError {
        let path = path.into();
        move |source| StorageError::Io { path, source }
    }
}
