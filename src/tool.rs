//! Bounded execution of external programs.
//!
//! Every run has a wall-clock limit. A child that outlives it is killed
//! and reported as [`ToolFailure::TimedOut`], which callers treat as
//! retryable.

use std::ffi::{OsStr, OsString};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver};

use crate::error::{Error, Result, ToolFailure};

/// Default RTF filter binary.
pub const DEFAULT_PANDOC: &str = "pandoc";

/// Default wall-clock limit for one external run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Largest accepted wall-clock limit.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How long to wait for pipe readers after the child has exited.
/// Grandchildren may keep a pipe open past that point.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Turn a limit in seconds into a [`Duration`].
///
/// Fails with [`Error::InvalidInput`] unless `secs` is positive and at most
/// [`MAX_TIMEOUT`].
pub fn timeout_from_secs(secs: f64) -> Result<Duration> {
    match Duration::try_from_secs_f64(secs) {
        Ok(timeout) if !timeout.is_zero() && timeout <= MAX_TIMEOUT => Ok(timeout),
        _ => Err(Error::InvalidInput(format!(
            "timeout must be between 0 and {} seconds, got {}",
            MAX_TIMEOUT.as_secs(),
            secs
        ))),
    }
}

/// Captured output of a successful run.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Standard output
    pub stdout: Vec<u8>,
    /// Standard error
    pub stderr: Vec<u8>,
}

/// An external program invocation.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ToolCommand {
    /// Create a command for `program`.
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Name used in error messages.
    pub fn tool_name(&self) -> String {
        self.program
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    /// Run to completion, feeding `input` on stdin.
    ///
    /// Fails with [`Error::ExternalToolFailure`] if the program cannot be
    /// started, exits non-zero, or runs longer than `timeout`.
    pub fn run(&self, input: Option<&[u8]>, timeout: Duration) -> Result<ToolOutput> {
        let tool = self.tool_name();
        log::debug!("running {} {:?}", self.program.display(), self.args);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::ExternalToolFailure {
                tool: tool.clone(),
                reason: ToolFailure::Spawn(e.to_string()),
            })?;

        if let (Some(data), Some(mut stdin)) = (input, child.stdin.take()) {
            let data = data.to_vec();
            // A child that exits early closes the pipe; the status tells the story.
            thread::spawn(move || {
                let _ = stdin.write_all(&data);
            });
        }

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match wait_with_deadline(&mut child, timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                reap(&mut child);
                log::warn!("{} killed after {:?}", tool, timeout);
                return Err(Error::ExternalToolFailure {
                    tool,
                    reason: ToolFailure::TimedOut { after: timeout },
                });
            }
            Err(e) => {
                reap(&mut child);
                return Err(e.into());
            }
        };

        let stdout = collect(&tool, "stdout", &stdout)?;
        let stderr = collect(&tool, "stderr", &stderr).unwrap_or_default();
        let output = ToolOutput { stdout, stderr };

        if !status.success() {
            return Err(Error::ExternalToolFailure {
                tool,
                reason: ToolFailure::Exit {
                    code: status.code(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                },
            });
        }
        Ok(output)
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<Vec<u8>> {
    let (tx, rx) = bounded(1);
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        let _ = tx.send(buf);
    });
    rx
}

/// Wait for a drained pipe. A pipe still held open by a grandchild after
/// the grace period is a failure, not empty output.
fn collect(tool: &str, pipe: &str, rx: &Receiver<Vec<u8>>) -> Result<Vec<u8>> {
    rx.recv_timeout(DRAIN_GRACE).map_err(|_| {
        log::warn!("{} {} still open {:?} after exit", tool, pipe, DRAIN_GRACE);
        Error::ExternalToolFailure {
            tool: tool.to_string(),
            reason: ToolFailure::TimedOut { after: DRAIN_GRACE },
        }
    })
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// `Ok(None)` means the deadline passed. A deadline past the end of the
/// clock means no deadline.
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
    let deadline = Instant::now().checked_add(timeout);
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}
