//! Subprocess execution with concurrent output streaming.
//!
//! ffmpeg interleaves diagnostics and progress across stdout and stderr, and
//! stalls as soon as either pipe's OS buffer fills. Both pipes are therefore
//! drained on their own reader threads into a single channel, and the lines
//! are handed to the caller on the invoking thread in channel order. Lines
//! from one stream arrive in write order; no order is defined between the
//! two streams.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use crate::error::{CoreError, CoreResult};

/// Which output stream of the child a line was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSource {
    Stdout,
    Stderr,
}

/// Fully buffered output of a one-shot command.
#[derive(Debug)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Kills and reaps the child on every exit path, including handler errors
/// and panics. `wait` consumes the guard so a reaped child is never killed.
struct ChildGuard {
    child: Option<Child>,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self { child: Some(child) }
    }

    fn kill(&mut self) {
        if let Some(child) = self.child.as_mut() {
            let _ = child.kill();
        }
    }

    fn wait(mut self) -> std::io::Result<ExitStatus> {
        let mut child = self.child.take().expect("child already reaped");
        child.wait()
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn spawn_command(tool: &str, args: &[String]) -> CoreResult<Child> {
    debug!("running: {} {}", tool, args.join(" "));

    Command::new(tool)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                CoreError::ToolNotFound {
                    tool: tool.to_string(),
                }
            } else {
                CoreError::CommandStart {
                    tool: tool.to_string(),
                    source: err,
                }
            }
        })
}

/// Runs a command to completion, buffering both streams.
///
/// Used for short probe invocations where streaming buys nothing. Output is
/// decoded lossily so stray non-UTF-8 bytes in metadata cannot poison the
/// whole capture.
pub fn run_capture(tool: &str, args: &[String]) -> CoreResult<CapturedOutput> {
    let child = spawn_command(tool, args)?;
    let output = child.wait_with_output()?;

    Ok(CapturedOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Runs a command, delivering each output line to `on_line` as it arrives,
/// and returns the exit status once both streams hit end-of-file.
///
/// A handler error kills the child, but both streams are still drained to
/// end-of-file before returning the error, so the child can never block on
/// a full pipe while being torn down.
pub fn run_streaming<F>(tool: &str, args: &[String], mut on_line: F) -> CoreResult<ExitStatus>
where
    F: FnMut(StreamSource, &str) -> CoreResult<()>,
{
    let mut child = spawn_command(tool, args)?;

    let stdout = child.stdout.take().ok_or_else(|| {
        CoreError::CommandStart {
            tool: tool.to_string(),
            source: std::io::Error::other("stdout pipe missing"),
        }
    })?;
    let stderr = child.stderr.take().ok_or_else(|| {
        CoreError::CommandStart {
            tool: tool.to_string(),
            source: std::io::Error::other("stderr pipe missing"),
        }
    })?;

    let mut guard = ChildGuard::new(child);

    let (tx, rx) = mpsc::channel();
    let stdout_reader = spawn_line_reader(StreamSource::Stdout, stdout, tx.clone());
    let stderr_reader = spawn_line_reader(StreamSource::Stderr, stderr, tx);

    // The receive loop ends when both reader threads drop their senders.
    let mut handler_error: Option<CoreError> = None;
    for (source, line) in rx {
        if handler_error.is_some() {
            continue; // keep draining so the child cannot stall
        }
        if let Err(err) = on_line(source, &line) {
            handler_error = Some(err);
            guard.kill();
        }
    }

    let _ = stdout_reader.join();
    let _ = stderr_reader.join();

    let status = guard.wait()?;
    match handler_error {
        Some(err) => Err(err),
        None => Ok(status),
    }
}

/// Reads a pipe to end-of-file, sending one record per line.
///
/// ffmpeg rewrites its progress line with bare carriage returns and only
/// terminates it with a newline at the end of the run, so both `\n` and `\r`
/// delimit lines here. Trailing whitespace is trimmed; bytes are decoded
/// lossily.
fn spawn_line_reader<R>(
    source: StreamSource,
    mut pipe: R,
    tx: Sender<(StreamSource, String)>,
) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut pending: Vec<u8> = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            let read = match pipe.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) => {
                    warn!("error reading child {source:?}: {err}");
                    break;
                }
            };
            pending.extend_from_slice(&chunk[..read]);

            while let Some(pos) = pending.iter().position(|&b| b == b'\n' || b == b'\r') {
                let line = String::from_utf8_lossy(&pending[..pos])
                    .trim_end()
                    .to_string();
                pending.drain(..=pos);
                if tx.send((source, line)).is_err() {
                    return;
                }
            }
        }

        // Partial final line without a terminator.
        if !pending.is_empty() {
            let line = String::from_utf8_lossy(&pending).trim_end().to_string();
            let _ = tx.send((source, line));
        }
    })
}
