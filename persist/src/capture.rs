//! Capturing the standard output of a generator program.
//!
//! The program runs with stdin closed and both output pipes drained on
//! background threads so that a chatty child cannot fill a pipe buffer and
//! deadlock before it exits. The wait is bounded by
//! [`CaptureOptions::timeout`]; on expiry the child is killed. Collecting
//! the pipes after exit shares the same deadline (with a short grace), so a
//! background process that inherited stdout cannot hold the run open.

use std::io::{ErrorKind, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use tracing::debug;
use wait_timeout::ChildExt;

use crate::error::ResolveError;

/// Default capture timeout (milliseconds).
pub const DEFAULT_CAPTURE_TIMEOUT_MS: u64 = 120_000;

/// Maximum number of stderr bytes attached to a failure.
const STDERR_PREVIEW_BYTES: usize = 2048;

/// Minimum time left for draining the pipes once the program has exited.
const PIPE_DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Settings for running generator programs.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub timeout: Duration,
    /// Working directory for the child; `None` inherits the caller's.
    pub working_dir: Option<PathBuf>,
    /// Extra environment variables.
    pub env: Vec<(String, String)>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_CAPTURE_TIMEOUT_MS),
            working_dir: None,
            env: Vec::new(),
        }
    }
}

/// Program and arguments for one process-backed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Builds `interpreter… source`, or just `source` when there is no
    /// interpreter.
    pub fn new(source: &std::path::Path, interpreter: Option<&[String]>) -> Self {
        let source = source.display().to_string();
        match interpreter.and_then(|argv| argv.split_first()) {
            Some((program, rest)) => {
                let mut args = rest.to_vec();
                args.push(source);
                Self {
                    program: program.clone(),
                    args,
                }
            }
            None => Self {
                program: source,
                args: Vec::new(),
            },
        }
    }

    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }

    fn label(&self) -> String {
        self.argv().join(" ")
    }
}

type PipeReader = Receiver<(Vec<u8>, std::io::Result<usize>)>;

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<PipeReader> {
    pipe.map(|mut pipe| {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let result = pipe.read_to_end(&mut buf);
            let _ = tx.send((buf, result));
        });
        rx
    })
}

/// Waits for a pipe reader until `deadline`. A reader still blocked at the
/// deadline is abandoned; its thread ends when the pipe closes.
fn collect(
    reader: Option<PipeReader>,
    stream: &str,
    deadline: Instant,
    io_errors: &mut Vec<String>,
) -> Vec<u8> {
    let Some(reader) = reader else {
        return Vec::new();
    };
    let remaining = deadline
        .saturating_duration_since(Instant::now())
        .max(PIPE_DRAIN_GRACE);
    match reader.recv_timeout(remaining) {
        Ok((buf, result)) => {
            if let Err(e) = result {
                io_errors.push(format!("{stream} read failed: {e}"));
            }
            buf
        }
        Err(RecvTimeoutError::Timeout) => {
            io_errors.push(format!(
                "{stream} still open after exit (held by a background process?)"
            ));
            Vec::new()
        }
        Err(RecvTimeoutError::Disconnected) => {
            io_errors.push(format!("{stream} reader stopped unexpectedly"));
            Vec::new()
        }
    }
}

/// Runs `spec` and returns its standard output.
pub fn capture_stdout(spec: &CommandSpec, options: &CaptureOptions) -> Result<String, ResolveError> {
    let label = spec.label();
    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = options.working_dir.as_ref() {
        command.current_dir(dir);
    }
    for (key, value) in &options.env {
        command.env(key, value);
    }

    debug!(command = %label, "spawning generator");
    let mut child = command.spawn().map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            debug!(command = %label, "generator not found");
        }
        ResolveError::Spawn {
            program: label.clone(),
            source,
        }
    })?;

    let deadline = Instant::now() + options.timeout;
    let stdout_reader = drain(child.stdout.take());
    let stderr_reader = drain(child.stderr.take());

    let status = match wait(&mut child, options.timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            debug!(command = %label, timeout_ms = options.timeout.as_millis() as u64, "generator timed out, killing process");
            let _ = child.kill();
            let _ = child.wait();
            return Err(ResolveError::Timeout {
                program: label,
                timeout_ms: options.timeout.as_millis() as u64,
            });
        }
        Err(e) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ResolveError::Capture {
                program: label,
                detail: format!("wait failed: {e}"),
            });
        }
    };

    let mut io_errors = Vec::new();
    let stdout = collect(stdout_reader, "stdout", deadline, &mut io_errors);
    let stderr = collect(stderr_reader, "stderr", deadline, &mut io_errors);

    if !status.success() {
        return Err(ResolveError::NonZeroExit {
            program: label,
            status: describe_status(status),
            stderr: stderr_preview(&stderr),
        });
    }
    if !io_errors.is_empty() {
        return Err(ResolveError::Capture {
            program: label,
            detail: io_errors.join("; "),
        });
    }

    debug!(command = %label, bytes = stdout.len(), "captured generator output");
    Ok(String::from_utf8_lossy(&stdout).into_owned())
}

fn wait(child: &mut Child, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
    child.wait_timeout(timeout)
}

fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {code}"),
        None => format!("status {status}"),
    }
}

fn stderr_preview(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let trimmed = text.trim();
    if trimmed.len() <= STDERR_PREVIEW_BYTES {
        return trimmed.to_string();
    }
    let mut end = STDERR_PREVIEW_BYTES;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}
