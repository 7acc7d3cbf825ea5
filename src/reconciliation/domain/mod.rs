pub mod assessment;
pub mod component;
pub mod package_url;
pub mod policy_status;
pub mod scan_snapshot;
pub mod vulnerability;

pub use assessment::{AnalysisOutcome, Assessment};
pub use component::{
    Component, ComponentKey, ComponentLookup, HierarchicalComponent, Origin, IN_VIOLATION,
};
pub use package_url::PackageUrl;
pub use policy_status::{PolicyStatus, PolicyViolationDetails};
pub use scan_snapshot::ScanSnapshot;
pub use vulnerability::{RemediationStatus, Severity, Vulnerability, VulnerabilitySet};
