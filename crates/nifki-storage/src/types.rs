//! Storage-layer types for persisted pages and their build state.

use std::path::PathBuf;

use nifki_core::{GameProperties, PageName};
use serde::{Deserialize, Serialize};

/// The outcome of the most recent build of a page, as found on disk.
///
/// A later build always overwrites the earlier result for the same page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildResult {
    /// The compiler produced a playable artifact.
    Success { artifact: PathBuf },
    /// The compiler rejected the page; `diagnostic` is its report.
    Failure { diagnostic: String },
    /// No build has been recorded for the page.
    NotBuilt,
}

impl BuildResult {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildResult::Success { .. })
    }
}

/// A page as persisted by the store.
///
/// Resources are listed by name only; their bytes are read on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub name: PageName,
    pub source: String,
    pub properties: GameProperties,
    /// Resource names, sorted.
    pub resources: Vec<String>,
    pub build: BuildResult,
}
