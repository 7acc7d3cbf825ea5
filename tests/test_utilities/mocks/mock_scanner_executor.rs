use async_trait::async_trait;
use sca_reconcile::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock ScannerExecutor recording downloads, runs and removals
#[derive(Default, Clone)]
pub struct MockScannerExecutor {
    exit_code: i32,
    run_delay: Option<Duration>,
    pub downloads: Arc<Mutex<Vec<(String, PathBuf)>>>,
    pub invocations: Arc<Mutex<Vec<ScannerInvocation>>>,
    pub removals: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockScannerExecutor {
    pub fn new(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Default::default()
        }
    }

    /// The scanner takes `delay` before exiting
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.run_delay = Some(delay);
        self
    }

    pub fn last_invocation(&self) -> Option<ScannerInvocation> {
        self.invocations.lock().unwrap().last().cloned()
    }

    pub fn download_urls(&self) -> Vec<String> {
        self.downloads
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    pub fn removal_count(&self) -> usize {
        self.removals.lock().unwrap().len()
    }
}

#[async_trait]
impl ScannerExecutor for MockScannerExecutor {
    async fn download(&self, url: &str, destination: &Path) -> Result<()> {
        self.downloads
            .lock()
            .unwrap()
            .push((url.to_string(), destination.to_path_buf()));
        Ok(())
    }

    async fn run(&self, invocation: &ScannerInvocation) -> Result<i32> {
        self.invocations.lock().unwrap().push(invocation.clone());
        if let Some(delay) = self.run_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.exit_code)
    }

    fn remove(&self, path: &Path) -> Result<()> {
        self.removals.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}
