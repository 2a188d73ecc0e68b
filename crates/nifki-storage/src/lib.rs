//! Storage for Nifki wiki pages.
//!
//! Provides the [`PageStore`] trait defining the storage contract, and the
//! [`FsPageStore`] backend that keeps every page as a directory under a wiki
//! root.
//!
//! # Layout
//!
//! ```text
//! <root>/<page>/source.sss        game source, UTF-8
//! <root>/<page>/properties.txt    GameProperties, `key: value` lines
//! <root>/<page>/res/<image>       PNG resources
//! <root>/nifki-out/<page>.jar     built artifact (successful build)
//! <root>/nifki-out/<page>.err     compiler diagnostics (failed build)
//! ```
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`types`]: PageRecord and BuildResult
//! - [`traits`]: PageStore trait definition
//! - [`naming`]: resource naming policy
//! - [`fs`]: FsPageStore implementation

pub mod error;
pub mod fs;
pub mod naming;
pub mod traits;
pub mod types;

// Re-export key types for ergonomic use.
pub use error::StorageError;
pub use fs::FsPageStore;
pub use naming::{is_valid_resource_name, resource_name};
pub use traits::PageStore;
pub use types::{BuildResult, PageRecord};

/// Game source file inside a page directory.
pub const SOURCE_FILE: &str = "source.sss";

/// Properties file inside a page directory.
pub const PROPERTIES_FILE: &str = "properties.txt";

/// Resource subdirectory inside a page directory.
pub const RESOURCE_DIR: &str = "res";

/// Shared build output directory under the wiki root.
pub const BUILD_DIR: &str = "nifki-out";
