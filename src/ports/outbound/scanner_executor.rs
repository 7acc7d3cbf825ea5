use crate::shared::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// One scanner run: what to execute, where, and with which environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerInvocation {
    /// Script to run, relative to `working_dir` (e.g. `./detect.sh`)
    pub executable: String,
    /// Arguments passed to the script as-is, one argv element each
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    /// Extra `KEY=VALUE` pairs for the scanner process
    pub env: Vec<(String, String)>,
}

impl ScannerInvocation {
    /// The invocation as a shell-quoted line, for display only
    pub fn command_line(&self) -> String {
        std::iter::once(self.executable.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,@%+".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\\''"))
    }
}

/// ScannerExecutor port for downloading, running and removing the scanner
///
/// `run` must stop the scanner process when its future is dropped so a
/// timeout or cancellation never leaves it running. `remove` is synchronous
/// so it can be called from a drop guard.
#[async_trait]
pub trait ScannerExecutor: Send + Sync {
    /// Downloads the scanner script from `url` to `destination`
    async fn download(&self, url: &str, destination: &Path) -> Result<()>;

    /// Runs the scanner to completion and returns its exit code
    async fn run(&self, invocation: &ScannerInvocation) -> Result<i32>;

    /// Removes a downloaded scanner; a missing file is not an error
    fn remove(&self, path: &Path) -> Result<()>;
}
