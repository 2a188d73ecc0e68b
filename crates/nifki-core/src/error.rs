//! Core error types for nifki-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering
//! identifier validation and the properties file codec.

use thiserror::Error;

/// Core errors produced by the nifki-core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A string was rejected by the page name rules.
    #[error("bad page name '{name}'")]
    InvalidPageName { name: String },

    /// A non-blank, non-comment properties line has no `:` separator.
    #[error("Colon missing from '{line}'")]
    MalformedProperties { line: String },

    /// A recognised properties key carries a value of the wrong type.
    #[error("invalid value for '{key}': '{value}'")]
    InvalidPropertyValue { key: String, value: String },
}
