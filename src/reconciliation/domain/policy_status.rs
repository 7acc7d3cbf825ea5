use super::component::IN_VIOLATION;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-severity breakdown of the policy violations of a project version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyViolationDetails {
    pub name: String,
    pub severity_levels: BTreeMap<String, u32>,
}

/// Overall policy status of the scanned project version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyStatus {
    pub overall_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation_details: Option<PolicyViolationDetails>,
}

impl PolicyStatus {
    pub fn is_in_violation(&self) -> bool {
        self.overall_status == IN_VIOLATION
    }

    /// Sum of violations across all severity levels
    pub fn violation_count(&self) -> u32 {
        self.violation_details
            .as_ref()
            .map(|details| details.severity_levels.values().sum())
            .unwrap_or(0)
    }
}
