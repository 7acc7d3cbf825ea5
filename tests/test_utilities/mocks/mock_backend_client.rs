use async_trait::async_trait;
use sca_reconcile::prelude::*;
use std::sync::{Arc, Mutex};

/// Mock BackendClient serving a fixed scan snapshot
#[derive(Default, Clone)]
pub struct MockBackendClient {
    snapshot: ScanSnapshot,
    unavailable: bool,
    pub requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockBackendClient {
    pub fn new(snapshot: ScanSnapshot) -> Self {
        Self {
            snapshot,
            ..Default::default()
        }
    }

    /// Every query fails with `BackendUnavailable`
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    fn check(&self, operation: &str, project_name: &str, version_name: &str) -> Result<()> {
        self.requests
            .lock()
            .unwrap()
            .push((project_name.to_string(), version_name.to_string()));
        if self.unavailable {
            return Err(ScanError::BackendUnavailable {
                operation: operation.to_string(),
                details: "server returned status code 503".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl BackendClient for MockBackendClient {
    async fn get_components(&self, project_name: &str, version_name: &str) -> Result<Vec<Component>> {
        self.check("fetch components", project_name, version_name)?;
        Ok(self.snapshot.components.clone())
    }

    async fn get_hierarchical_components(
        &self,
        project_name: &str,
        version_name: &str,
    ) -> Result<Vec<HierarchicalComponent>> {
        self.check("fetch hierarchical components", project_name, version_name)?;
        Ok(self.snapshot.hierarchical_components.clone())
    }

    async fn get_vulnerabilities(
        &self,
        project_name: &str,
        version_name: &str,
    ) -> Result<VulnerabilitySet> {
        self.check("fetch vulnerabilities", project_name, version_name)?;
        Ok(self.snapshot.vulnerabilities.clone())
    }

    async fn get_policy_status(&self, project_name: &str, version_name: &str) -> Result<PolicyStatus> {
        self.check("fetch policy status", project_name, version_name)?;
        Ok(self.snapshot.policy_status.clone())
    }
}
