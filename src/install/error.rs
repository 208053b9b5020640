//! Typed failures raised by the installer components.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("refusing to run as root; run as the desktop user (sudo is used where needed)")]
    RunningAsRoot,

    #[error("cancelled by operator")]
    Cancelled,

    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error("download of {url} failed: {reason}")]
    Download { url: String, reason: String },

    #[error("extraction of {archive} failed: {reason}")]
    Extract { archive: PathBuf, reason: String },

    #[error("`{program}` failed: {detail}")]
    Command { program: String, detail: String },

    #[error("daemon did not answer RPC within {0:?}")]
    DaemonTimeout(Duration),

    #[error("daemon exited before becoming ready ({0})")]
    DaemonExited(String),

    #[error("unexpected {what} output from simplewallet: {excerpt}")]
    OutputFormat { what: &'static str, excerpt: String },

    #[error("wallet file {0} already exists")]
    WalletExists(PathBuf),

    #[error("{0}")]
    System(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SetupError {
    /// Build a `Command` error from a finished process' stderr.
    pub fn command(program: &str, output: &std::process::Output) -> Self {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = if stderr.trim().is_empty() {
            format!("exit status {}", output.status)
        } else {
            stderr.trim().to_string()
        };
        SetupError::Command {
            program: program.to_string(),
            detail,
        }
    }
}
