//! Launches the tool in batch mode and watches its output stream.
//!
//! Stdout is forwarded line-by-line from a reader thread so the watcher can
//! apply a deadline; the subprocess is killed and reaped on the error marker
//! and on timeout instead of being left running.

use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Executable the install folder must contain; also the `-jar` argument.
pub const CUBEMX_EXECUTABLE: &str = "STM32CubeMX.exe";

/// Failure signal scanned for in the tool's output lines.
pub const ERROR_MARKER: &str = "[ERROR]";

// The tool ships its own JRE; the launcher path is relative to the install
// folder.
#[cfg(windows)]
const JRE_LAUNCHER: &str = "jre\\bin\\java.exe";
#[cfg(not(windows))]
const JRE_LAUNCHER: &str = "jre/bin/java";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOutcome {
    /// The tool exited on its own.
    Completed,
    /// The error marker appeared; the tool was terminated.
    Failed,
    /// The deadline passed; the tool was terminated.
    TimedOut,
}

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("write script {path}: {source}")]
    WriteScript { path: PathBuf, source: io::Error },
    #[error("spawn {command}: {source}")]
    Spawn { command: String, source: io::Error },
    #[error("tool stdout unavailable")]
    CaptureStdout,
}

/// One tool invocation.
#[derive(Debug)]
pub struct DriveRequest<'a> {
    /// Install folder; `None` still attempts the launch with the relative
    /// launcher path so a misconfigured install fails at the OS level.
    pub install_dir: Option<&'a Path>,
    pub script: Option<&'a str>,
    pub script_path: &'a Path,
    /// `-q` quiet mode instead of `-s` scripted-interactive.
    pub headless: bool,
    pub timeout: Duration,
}

/// Script file that exists only for the duration of one invocation.
struct ScriptFile {
    path: PathBuf,
}

impl ScriptFile {
    fn write(path: &Path, script: &str) -> Result<Self, DriveError> {
        fs::write(path, script).map_err(|source| DriveError::WriteScript {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl Drop for ScriptFile {
    fn drop(&mut self) {
        if let Err(source) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), %source, "remove script file");
        }
    }
}

/// Run the tool once, watching its output for the error marker.
pub fn run_tool(request: &DriveRequest<'_>) -> Result<DriveOutcome, DriveError> {
    let _script_file = request
        .script
        .map(|script| ScriptFile::write(request.script_path, script))
        .transpose()?;

    let launcher = match request.install_dir {
        Some(dir) => dir.join(JRE_LAUNCHER),
        None => PathBuf::from(JRE_LAUNCHER),
    };
    let mode_flag = if request.headless { "-q" } else { "-s" };

    let mut cmd = Command::new(&launcher);
    cmd.args(["-jar", CUBEMX_EXECUTABLE, mode_flag]);
    if request.script.is_some() {
        cmd.arg(request.script_path);
    }
    if let Some(dir) = request.install_dir {
        cmd.current_dir(dir);
    }
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::null());

    let mut child = cmd.spawn().map_err(|source| DriveError::Spawn {
        command: launcher.display().to_string(),
        source,
    })?;
    let stdout = child.stdout.take().ok_or(DriveError::CaptureStdout)?;

    let (lines_tx, lines_rx) = mpsc::channel();
    let reader = thread::spawn(move || forward_lines(BufReader::new(stdout), &lines_tx));

    let deadline = Instant::now() + request.timeout;
    let outcome = loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break DriveOutcome::TimedOut;
        }
        match lines_rx.recv_timeout(remaining) {
            Ok(line) => {
                if line.contains(ERROR_MARKER) {
                    tracing::warn!(%line, "error marker in tool output");
                    break DriveOutcome::Failed;
                }
                tracing::debug!(%line, "tool output");
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break DriveOutcome::Completed,
            Err(mpsc::RecvTimeoutError::Timeout) => break DriveOutcome::TimedOut,
        }
    };

    match outcome {
        DriveOutcome::Completed => match child.wait() {
            Ok(status) => tracing::info!(%status, "tool exited"),
            Err(source) => tracing::warn!(%source, "wait for tool"),
        },
        DriveOutcome::Failed | DriveOutcome::TimedOut => {
            if let Err(source) = child.kill() {
                tracing::warn!(%source, "kill tool");
            }
            let _ = child.wait();
        }
    }
    let _ = reader.join();

    Ok(outcome)
}

/// Forward output lines to the watcher, stopping after the error marker or
/// once the watcher has gone away. Returns the number of lines consumed.
fn forward_lines<R: BufRead>(reader: R, lines: &mpsc::Sender<String>) -> usize {
    let mut consumed = 0;
    for line in reader.lines() {
        let Ok(line) = line else { break };
        consumed += 1;
        let stop = line.contains(ERROR_MARKER);
        if lines.send(line).is_err() || stop {
            break;
        }
    }
    consumed
}

/// Resolve the tool install folder from the configured value.
///
/// A blank value falls back to a PATH lookup. Every miss is logged and maps
/// to `None`; the caller proceeds with a degraded launch rather than abort.
pub fn locate_install(configured: &str) -> Option<PathBuf> {
    let configured = configured.trim();
    if configured.is_empty() {
        return match which::which(CUBEMX_EXECUTABLE) {
            Ok(exe) => {
                tracing::info!(path = %exe.display(), "CUBEMX_LOC not set, using executable from PATH");
                exe.parent().map(Path::to_path_buf)
            }
            Err(_) => {
                tracing::warn!("CUBEMX_LOC not specified in config.toml");
                None
            }
        };
    }

    let mut dir = PathBuf::from(configured);
    if dir.is_file() {
        dir.pop();
    }
    if !dir.exists() {
        tracing::warn!(path = %dir.display(), "invalid path entered for CUBEMX_LOC");
        return None;
    }
    if !dir.join(CUBEMX_EXECUTABLE).exists() {
        tracing::warn!(path = %dir.display(), "CubeMX not found in the specified location");
        return None;
    }
    Some(dir)
}
