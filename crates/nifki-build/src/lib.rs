//! Build invocation for Nifki pages.
//!
//! This crate runs the external compiler over a saved page and reports what
//! happened, without the child ever writing to the server's own stdio.
//!
//! # Modules
//!
//! - [`error`] -- BuildError for builds that could not run
//! - [`runner`] -- the [`ProcessRunner`] seam and the real [`SystemRunner`]
//! - [`invoker`] -- [`BuildInvoker`], which ties a runner to the page store

pub mod error;
pub mod invoker;
pub mod runner;

pub use error::BuildError;
pub use invoker::{BuildInvoker, BuildOutcome, BuildReport};
pub use runner::{BuildCommand, ProcessOutput, ProcessRunner, SystemRunner};

use std::time::Duration;

/// Default compiler command line.
pub const DEFAULT_COMPILER: &str = "java -jar compiler.jar";

/// Options controlling how the compiler is launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Executable to run.
    pub program: String,

    /// Arguments placed before the wiki root and page name.
    pub leading_args: Vec<String>,

    /// Kill the compiler after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl BuildOptions {
    /// Splits a whitespace separated command line such as
    /// `java -jar compiler.jar` into program and leading arguments.
    pub fn from_command_line(command_line: &str) -> Result<Self, BuildError> {
        let mut words = command_line.split_whitespace().map(str::to_string);
        let program = words
            .next()
            .ok_or_else(|| BuildError::InvalidCommand("empty compiler command".to_string()))?;
        Ok(BuildOptions {
            program,
            leading_args: words.collect(),
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            program: "java".to_string(),
            leading_args: vec!["-jar".to_string(), "compiler.jar".to_string()],
            timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_splits_on_whitespace() {
        let options = BuildOptions::from_command_line("  java  -jar compiler.jar ").unwrap();
        assert_eq!(options, BuildOptions::default());
        assert_eq!(
            BuildOptions::from_command_line(DEFAULT_COMPILER).unwrap(),
            BuildOptions::default()
        );
    }

    #[test]
    fn empty_command_line_is_rejected() {
        assert!(matches!(
            BuildOptions::from_command_line("   "),
            Err(BuildError::InvalidCommand(_))
        ));
    }
}
