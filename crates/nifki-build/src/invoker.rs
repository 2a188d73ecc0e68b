//! [`BuildInvoker`]: one compiler run over one saved page.
//!
//! The compiler is called as `<program> <leading args> <wiki root> <page>`.
//! On success it writes either `nifki-out/<page>.jar` or, when the page's
//! own source is broken, `nifki-out/<page>.err`. Stale markers are removed
//! before the run so whatever is on disk afterwards belongs to this build.
//!
//! The tool's stdout is logged at `info`. Anything on its stderr means the
//! tool itself had trouble and is logged at `error`. Neither ever reaches the
//! server's own output streams.

use std::sync::Arc;
use std::time::{Duration, Instant};

use nifki_core::PageName;
use nifki_storage::{BuildResult, PageStore};

use crate::error::BuildError;
use crate::runner::{BuildCommand, ProcessOutput, ProcessRunner};
use crate::BuildOptions;

/// What a single compiler run amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The tool ran and exited cleanly. The result is what it left on disk,
    /// which may be compile diagnostics for the page.
    Completed(BuildResult),
    /// The tool exited non-zero or was killed. `diagnostic` has been
    /// recorded as the page's failure marker.
    ToolFailed {
        exit_code: Option<i32>,
        diagnostic: String,
    },
    /// The tool overran its timeout and was killed.
    TimedOut { after: Duration },
}

/// Outcome plus the captured streams, for logging and the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub outcome: BuildOutcome,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl BuildReport {
    /// Whether the tool itself failed, as opposed to the page failing to
    /// compile.
    pub fn is_tool_failure(&self) -> bool {
        !matches!(self.outcome, BuildOutcome::Completed(_))
    }
}

/// Runs the external compiler for pages in a [`PageStore`].
#[derive(Clone)]
pub struct BuildInvoker {
    options: BuildOptions,
    runner: Arc<dyn ProcessRunner>,
}

impl BuildInvoker {
    pub fn new(options: BuildOptions, runner: Arc<dyn ProcessRunner>) -> Self {
        BuildInvoker { options, runner }
    }

    fn command_for(&self, store: &dyn PageStore, id: &PageName) -> BuildCommand {
        let mut args = self.options.leading_args.clone();
        args.push(store.root().display().to_string());
        args.push(id.to_string());
        BuildCommand {
            program: self.options.program.clone(),
            args,
            timeout: self.options.timeout,
        }
    }

    /// Builds `id`, whose source and properties must already be persisted.
    ///
    /// Returns `Err` only when the tool could not be started or the store
    /// could not be updated; everything the tool itself reports is in the
    /// [`BuildReport`].
    pub fn invoke(&self, store: &dyn PageStore, id: &PageName) -> Result<BuildReport, BuildError> {
        store.clear_build_result(id)?;

        let command = self.command_for(store, id);
        tracing::debug!(
            page = %id,
            program = %command.program,
            args = ?command.args,
            "running compiler"
        );
        let start = Instant::now();
        let output = match self.runner.run(&command) {
            Ok(output) => output,
            Err(source) => {
                let diagnostic = format!("Build tool could not be started: {source}");
                tracing::error!(page = %id, program = %command.program, "{diagnostic}");
                store.record_build_failure(id, &diagnostic)?;
                return Err(BuildError::Spawn {
                    program: command.program,
                    source,
                });
            }
        };
        let elapsed = start.elapsed();

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !stdout.trim().is_empty() {
            tracing::info!(page = %id, "{}", stdout.trim_end());
        }
        if !stderr.trim().is_empty() {
            tracing::error!(page = %id, "{}", stderr.trim_end());
        }

        let outcome = self.classify(store, id, &output, &stderr)?;
        match &outcome {
            BuildOutcome::Completed(result) => tracing::info!(
                page = %id,
                built = result.is_success(),
                elapsed_ms = elapsed.as_millis() as u64,
                "build completed"
            ),
            BuildOutcome::ToolFailed { exit_code, .. } => {
                tracing::error!(page = %id, exit_code = ?exit_code, "build tool failed")
            }
            BuildOutcome::TimedOut { after } => {
                tracing::error!(page = %id, timeout_secs = after.as_secs(), "build timed out")
            }
        }

        Ok(BuildReport {
            outcome,
            stdout,
            stderr,
            elapsed,
        })
    }

    fn classify(
        &self,
        store: &dyn PageStore,
        id: &PageName,
        output: &ProcessOutput,
        stderr: &str,
    ) -> Result<BuildOutcome, BuildError> {
        if output.timed_out {
            let after = self.options.timeout.unwrap_or_default();
            store.record_build_failure(
                id,
                &format!("Build timed out after {} seconds.", after.as_secs()),
            )?;
            return Ok(BuildOutcome::TimedOut { after });
        }
        if output.exit_code != Some(0) {
            let diagnostic = if stderr.trim().is_empty() {
                match output.exit_code {
                    Some(code) => format!("Build tool exited with status {code}."),
                    None => "Build tool was terminated by a signal.".to_string(),
                }
            } else {
                stderr.to_string()
            };
            store.record_build_failure(id, &diagnostic)?;
            return Ok(BuildOutcome::ToolFailed {
                exit_code: output.exit_code,
                diagnostic,
            });
        }
        Ok(BuildOutcome::Completed(store.read_build_artifact(id)?))
    }
}
