//! Process execution behind the [`ProcessRunner`] seam.
//!
//! [`SystemRunner`] spawns a real child with stdin closed and both output
//! streams piped. Each pipe is drained on its own thread so a chatty
//! compiler cannot deadlock against a full pipe buffer.
//!
//! A timeout kills only the direct child. Processes it started itself (a
//! wrapper script's `java`, say) keep running and may keep the pipes open,
//! so with a timeout set the output is collected for at most half a second
//! past the deadline and whatever arrived by then is kept.

use std::io::{ErrorKind, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

/// How often a timed wait polls the child.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How long the pipes may stay open once a timed run is over.
const PIPE_GRACE: Duration = Duration::from_millis(500);

/// One external process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
}

/// Everything a finished (or killed) process left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, or `None` if the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// The process overran its timeout and was killed.
    pub timed_out: bool,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Runs a command to completion and captures its output.
///
/// Implementations must never let the child inherit the caller's stdout or
/// stderr.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, command: &BuildCommand) -> std::io::Result<ProcessOutput>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, command: &BuildCommand) -> std::io::Result<ProcessOutput> {
        let start = Instant::now();
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let (status, timed_out) = match command.timeout {
            Some(timeout) => wait_with_timeout(&mut child, timeout)?,
            None => (child.wait()?, false),
        };

        let pipe_deadline = command
            .timeout
            .map(|timeout| (start + timeout).max(Instant::now()) + PIPE_GRACE);
        Ok(ProcessOutput {
            exit_code: status.code(),
            stdout: collect(&stdout, pipe_deadline),
            stderr: collect(&stderr, pipe_deadline),
            timed_out,
        })
    }
}

/// Reads `pipe` to its end on a new thread, sending chunks as they arrive.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    if let Some(mut pipe) = pipe {
        thread::spawn(move || {
            let mut buf = [0u8; 8192];
            loop {
                match pipe.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if tx.send(buf[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
        });
    }
    rx
}

/// Gathers drained chunks until the pipe closes or `deadline` passes.
fn collect(chunks: &Receiver<Vec<u8>>, deadline: Option<Instant>) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let chunk = match deadline {
            Some(deadline) => {
                let left = deadline.saturating_duration_since(Instant::now());
                chunks.recv_timeout(left).ok()
            }
            None => chunks.recv().ok(),
        };
        match chunk {
            Some(chunk) => out.extend_from_slice(&chunk),
            None => return out,
        }
    }
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> std::io::Result<(ExitStatus, bool)> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok((status, false));
        }
        if Instant::now() >= deadline {
            // The child may exit between try_wait and kill.
            let _ = child.kill();
            return Ok((child.wait()?, true));
        }
        thread::sleep(POLL_INTERVAL);
    }
}
