//! Build error types covering the ways a build can fail to happen at all.
//!
//! A page whose source does not compile is *not* an error here: the tool ran,
//! wrote its diagnostics, and the result is an ordinary
//! [`BuildResult::Failure`](nifki_storage::BuildResult::Failure).

use nifki_storage::StorageError;

/// Errors that prevent a build from being attempted or recorded.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The compiler command line is empty or unusable.
    #[error("invalid build command: {0}")]
    InvalidCommand(String),

    /// The compiler process could not be started.
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Clearing or recording build markers failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
