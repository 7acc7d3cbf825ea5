use crate::reconciliation::domain::{
    Component, HierarchicalComponent, PolicyStatus, VulnerabilitySet,
};
use crate::shared::Result;
use async_trait::async_trait;

/// BackendClient port for reading scan results from the SCA backend
///
/// Every query addresses one project version by project name and version
/// name. Implementations report transport and authentication failures as
/// [`ScanError::BackendUnavailable`](crate::shared::error::ScanError).
///
/// # Async Support
/// Implementations must be `Send + Sync`; the orchestrator awaits each
/// query in sequence.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Components of the project version that carry license policy rules
    async fn get_components(&self, project_name: &str, version_name: &str)
        -> Result<Vec<Component>>;

    /// The hierarchical bill of materials, including component origins
    async fn get_hierarchical_components(
        &self,
        project_name: &str,
        version_name: &str,
    ) -> Result<Vec<HierarchicalComponent>>;

    /// Vulnerabilities affecting the components of the project version
    async fn get_vulnerabilities(
        &self,
        project_name: &str,
        version_name: &str,
    ) -> Result<VulnerabilitySet>;

    async fn get_policy_status(&self, project_name: &str, version_name: &str)
        -> Result<PolicyStatus>;
}
