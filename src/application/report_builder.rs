//! Builds the persisted reconciliation report from engine output

use crate::application::dto::{
    ReconciliationReport, ReportDiagnostics, ReportMetadata, ScannerResultView,
};
use crate::reconciliation::services::{ExitCodeClassification, ReconciliationResult};
use crate::shared::Result;

/// Turns a [`ReconciliationResult`] into the report artifact
pub struct ReportBuilder;

impl ReportBuilder {
    pub fn build(
        result: ReconciliationResult,
        classification: &ExitCodeClassification,
        metadata: ReportMetadata,
    ) -> ReconciliationReport {
        ReconciliationReport {
            metadata,
            scanner: ScannerResultView {
                exit_code: classification.code,
                category: classification.category.clone(),
                message: classification.message.clone(),
            },
            policy_violations: result.policy_violations,
            policy_status: result.policy_status,
            active_vulnerabilities: result.active_vulnerabilities,
            major_vulnerabilities: result.major_vulnerabilities,
            unassessed_vulnerabilities: result.unassessed,
            assessed_vulnerabilities: result.assessed,
            diagnostics: ReportDiagnostics {
                purl_resolution_failures: result.resolution_failures,
                unapplied_assessments: result.unapplied_assessments,
                duplicate_components: result.duplicate_components,
                unattached_vulnerabilities: result.unattached_vulnerabilities,
            },
        }
    }

    /// Compact JSON, one line
    pub fn to_json(report: &ReconciliationReport) -> Result<String> {
        Ok(serde_json::to_string(report)?)
    }
}
