//! Core data model for Nifki wiki pages.
//!
//! - [`name`]: the [`PageName`] identifier and its validation rules
//! - [`properties`]: [`GameProperties`] and its `key: value` text codec
//! - [`error`]: [`CoreError`]

pub mod error;
pub mod name;
pub mod properties;

// Re-export commonly used types
pub use error::CoreError;
pub use name::{is_valid_page_name, PageName};
pub use properties::GameProperties;
