use super::{Component, HierarchicalComponent, PolicyStatus, VulnerabilitySet};

/// Everything the backend reported for one project version after a scan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanSnapshot {
    pub components: Vec<Component>,
    pub hierarchical_components: Vec<HierarchicalComponent>,
    pub vulnerabilities: VulnerabilitySet,
    pub policy_status: PolicyStatus,
}
