use sca_reconcile::prelude::*;
use std::sync::{Arc, Mutex};

/// Mock OutputPresenter capturing the presented report
#[derive(Default, Clone)]
pub struct MockOutputPresenter {
    pub outputs: Arc<Mutex<Vec<String>>>,
}

impl MockOutputPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last presented content, or an empty string
    pub fn last_output(&self) -> String {
        self.outputs.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

impl OutputPresenter for MockOutputPresenter {
    fn present(&self, content: &str) -> Result<()> {
        self.outputs.lock().unwrap().push(content.to_string());
        Ok(())
    }
}
