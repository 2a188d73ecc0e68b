//! The [`PageStore`] trait defining the storage contract for wiki pages.
//!
//! The store exclusively owns page storage; no other component touches the
//! page directories directly. Every method takes an already validated
//! [`PageName`], so no unchecked identifier ever reaches a path.
//!
//! Nothing is cached: every read goes back to storage, which is therefore the
//! single source of truth.

use std::path::Path;

use nifki_core::{GameProperties, PageName};

use crate::error::StorageError;
use crate::types::{BuildResult, PageRecord};

/// The storage contract for wiki pages.
///
/// Methods take `&self`; backends are shared between request handlers and
/// must be `Send + Sync`.
pub trait PageStore: Send + Sync {
    /// The wiki root handed to the external compiler.
    fn root(&self) -> &Path;

    // -------------------------------------------------------------------
    // Page-level operations
    // -------------------------------------------------------------------

    /// Returns whether a directory exists for the page.
    fn exists(&self, id: &PageName) -> bool;

    /// Lists all stored pages, sorted.
    fn list_pages(&self) -> Result<Vec<PageName>, StorageError>;

    /// Creates an empty page: empty source, default properties, no resources.
    ///
    /// Fails with [`StorageError::DestinationExists`] if the page exists.
    fn create(&self, id: &PageName) -> Result<(), StorageError>;

    /// Loads the complete persisted page.
    ///
    /// Fails with [`StorageError::PageNotFound`] if no directory exists.
    fn load(&self, id: &PageName) -> Result<PageRecord, StorageError>;

    /// Reads just the page's properties.
    fn read_properties(&self, id: &PageName) -> Result<GameProperties, StorageError>;

    /// Copies the whole directory tree of `source` to a new page `dest`.
    ///
    /// The source page is left untouched. The copy becomes visible under
    /// `dest` all at once or not at all. Fails with
    /// [`StorageError::DestinationExists`] if `dest` already exists, in
    /// which case nothing is modified.
    fn create_by_copy(&self, source: &PageName, dest: &PageName) -> Result<(), StorageError>;

    /// Overwrites the page's source document.
    fn write_source(&self, id: &PageName, text: &str) -> Result<(), StorageError>;

    /// Overwrites the page's properties in canonical encoding.
    fn write_properties(&self, id: &PageName, props: &GameProperties) -> Result<(), StorageError>;

    // -------------------------------------------------------------------
    // Resources
    // -------------------------------------------------------------------

    /// Stores an image under a name derived from `suggested_name` by the
    /// policy in [`crate::naming::resource_name`], returning the stored name.
    fn add_resource(
        &self,
        id: &PageName,
        suggested_name: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError>;

    /// Lists the page's resource names, sorted lexicographically.
    fn list_resource_names(&self, id: &PageName) -> Result<Vec<String>, StorageError>;

    /// Reads the bytes of one resource.
    fn read_resource(&self, id: &PageName, name: &str) -> Result<Vec<u8>, StorageError>;

    // -------------------------------------------------------------------
    // Build output
    // -------------------------------------------------------------------

    /// Inspects the build output area for the page's latest result.
    fn read_build_artifact(&self, id: &PageName) -> Result<BuildResult, StorageError>;

    /// Reads the bytes of the page's built artifact.
    fn read_artifact_bytes(&self, id: &PageName) -> Result<Vec<u8>, StorageError>;

    /// Removes any recorded build result so the page reads as `NotBuilt`.
    fn clear_build_result(&self, id: &PageName) -> Result<(), StorageError>;

    /// Records `diagnostic` as the page's failed build, superseding any
    /// earlier artifact.
    fn record_build_failure(&self, id: &PageName, diagnostic: &str) -> Result<(), StorageError>;
}
