use crate::ports::outbound::{ScannerExecutor, ScannerInvocation};
use crate::shared::error::ScanError;
use crate::shared::security::reject_symlink;
use crate::shared::Result;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Interpreter for the downloaded scanner script
const SHELL: &str = "bash";

/// Exit code reported when the scanner was killed by a signal
const SIGNAL_EXIT_CODE: i32 = -1;

/// ShellScannerExecutor adapter running the scanner script through bash
///
/// Downloads the script with reqwest and marks it executable, then runs
/// `bash <script> <args...>` in the invocation's working directory. The
/// arguments are handed over as argv and never parsed by a shell. The
/// scanner's stdout is forwarded to stderr so stdout stays free for the
/// report. The child is killed when the run future is dropped.
pub struct ShellScannerExecutor {
    client: reqwest::Client,
}

impl ShellScannerExecutor {
    pub fn new() -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("sca-reconcile/{}", version);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    fn download_failed(url: &str, details: impl ToString) -> anyhow::Error {
        ScanError::ScannerDownloadFailed {
            url: url.to_string(),
            details: details.to_string(),
        }
        .into()
    }

    async fn make_executable(path: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
                .await
                .map_err(|e| ScanError::FileWriteError {
                    path: path.to_path_buf(),
                    details: format!("Failed to make the scanner executable: {}", e),
                })?;
        }
        #[cfg(not(unix))]
        let _ = path;
        Ok(())
    }
}

#[async_trait]
impl ScannerExecutor for ShellScannerExecutor {
    async fn download(&self, url: &str, destination: &Path) -> Result<()> {
        reject_symlink(destination, "Write")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::download_failed(url, e))?;
        if !response.status().is_success() {
            return Err(Self::download_failed(
                url,
                format!("server returned status code {}", response.status()),
            ));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| Self::download_failed(url, e))?;

        tokio::fs::write(destination, &body)
            .await
            .map_err(|e| ScanError::FileWriteError {
                path: destination.to_path_buf(),
                details: e.to_string(),
            })?;
        Self::make_executable(destination).await
    }

    async fn run(&self, invocation: &ScannerInvocation) -> Result<i32> {
        let status = Command::new(SHELL)
            .arg(&invocation.executable)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::from(std::io::stderr()))
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "Failed to start the scanner in {}: {}",
                    invocation.working_dir.display(),
                    e
                )
            })?;

        Ok(status.code().unwrap_or(SIGNAL_EXIT_CODE))
    }

    fn remove(&self, path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ScanError::FileWriteError {
                path: path.to_path_buf(),
                details: format!("Failed to remove the scanner: {}", e),
            }
            .into()),
        }
    }
}
