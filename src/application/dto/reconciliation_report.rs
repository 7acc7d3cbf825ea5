use crate::reconciliation::domain::{Assessment, ComponentKey, PolicyStatus, VulnerabilitySet};
use crate::reconciliation::services::PurlResolutionFailure;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

/// Who produced the report, for which project version, and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub project_name: String,
    pub project_version: String,
    pub generated_at: String,
    pub run_id: String,
    pub tool_name: String,
    pub tool_version: String,
}

impl ReportMetadata {
    /// Metadata stamped with the current time and a fresh run id
    pub fn generate(project_name: &str, project_version: &str) -> Self {
        Self {
            project_name: project_name.to_string(),
            project_version: project_version.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            run_id: Uuid::new_v4().to_string(),
            tool_name: env!("CARGO_PKG_NAME").to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Scanner outcome as classified from its exit code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannerResultView {
    pub exit_code: i32,
    pub category: String,
    pub message: String,
}

/// Anomalies found while reconciling; none of them fail the run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDiagnostics {
    pub purl_resolution_failures: Vec<PurlResolutionFailure>,
    pub unapplied_assessments: Vec<Assessment>,
    pub duplicate_components: Vec<ComponentKey>,
    pub unattached_vulnerabilities: usize,
}

impl ReportDiagnostics {
    pub fn is_empty(&self) -> bool {
        self.purl_resolution_failures.is_empty()
            && self.unapplied_assessments.is_empty()
            && self.duplicate_components.is_empty()
            && self.unattached_vulnerabilities == 0
    }
}

/// The persisted reconciliation artifact
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    #[serde(flatten)]
    pub metadata: ReportMetadata,
    pub scanner: ScannerResultView,
    pub policy_violations: usize,
    pub policy_status: PolicyStatus,
    pub active_vulnerabilities: usize,
    pub major_vulnerabilities: usize,
    pub unassessed_vulnerabilities: VulnerabilitySet,
    pub assessed_vulnerabilities: VulnerabilitySet,
    pub diagnostics: ReportDiagnostics,
}

/// ScanResponse - what a completed run hands back to the caller
#[derive(Debug, Clone)]
pub struct ScanResponse {
    pub report: ReconciliationReport,
}

impl ScanResponse {
    pub fn new(report: ReconciliationReport) -> Self {
        Self { report }
    }
}
