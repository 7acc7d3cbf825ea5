use super::component::ComponentKey;
use serde::{Serialize, Serializer};
use std::fmt;

/// Severity assigned to a vulnerability by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Unspecified,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Parses the backend's severity label; unknown labels become `Unspecified`
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_uppercase().as_str() {
            "LOW" => Severity::Low,
            "MEDIUM" => Severity::Medium,
            "HIGH" => Severity::High,
            "CRITICAL" => Severity::Critical,
            _ => Severity::Unspecified,
        }
    }

    /// HIGH and CRITICAL form the "major" tier
    pub fn is_major(self) -> bool {
        matches!(self, Severity::High | Severity::Critical)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Unspecified => "UNSPECIFIED",
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Remediation status of a vulnerability in the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RemediationStatus {
    New,
    NeedsReview,
    RemediationRequired,
    RemediationComplete,
    Patched,
    Mitigated,
    Ignored,
    Duplicate,
    /// A status this version does not know; treated as active
    Other(String),
}

impl RemediationStatus {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_uppercase().as_str() {
            "NEW" => RemediationStatus::New,
            "NEEDS_REVIEW" => RemediationStatus::NeedsReview,
            "REMEDIATION_REQUIRED" => RemediationStatus::RemediationRequired,
            "REMEDIATION_COMPLETE" => RemediationStatus::RemediationComplete,
            "PATCHED" => RemediationStatus::Patched,
            "MITIGATED" => RemediationStatus::Mitigated,
            "IGNORED" => RemediationStatus::Ignored,
            "DUPLICATE" => RemediationStatus::Duplicate,
            other => RemediationStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RemediationStatus::New => "NEW",
            RemediationStatus::NeedsReview => "NEEDS_REVIEW",
            RemediationStatus::RemediationRequired => "REMEDIATION_REQUIRED",
            RemediationStatus::RemediationComplete => "REMEDIATION_COMPLETE",
            RemediationStatus::Patched => "PATCHED",
            RemediationStatus::Mitigated => "MITIGATED",
            RemediationStatus::Ignored => "IGNORED",
            RemediationStatus::Duplicate => "DUPLICATE",
            RemediationStatus::Other(label) => label,
        }
    }

    /// Terminal statuses mean the finding is resolved or no longer tracked
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RemediationStatus::Ignored
                | RemediationStatus::Patched
                | RemediationStatus::Mitigated
                | RemediationStatus::RemediationComplete
                | RemediationStatus::Duplicate
        )
    }
}

impl fmt::Display for RemediationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for RemediationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One vulnerability affecting one component version of the scanned project
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    pub name: String,
    pub component_name: String,
    pub component_version: String,
    pub base_score: f64,
    pub overall_score: f64,
    pub severity: Severity,
    pub remediation_status: RemediationStatus,
    pub description: String,
    pub ignored: bool,
    /// Key of the hierarchical component this vulnerability belongs to.
    /// Attached during reconciliation; `None` when the backend has no match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentKey>,
}

impl Vulnerability {
    pub fn new(
        name: impl Into<String>,
        component_name: impl Into<String>,
        component_version: impl Into<String>,
        severity: Severity,
        remediation_status: RemediationStatus,
    ) -> Self {
        Self {
            name: name.into(),
            component_name: component_name.into(),
            component_version: component_version.into(),
            base_score: 0.0,
            overall_score: 0.0,
            severity,
            remediation_status,
            description: String::new(),
            ignored: false,
            component: None,
        }
    }

    pub fn with_scores(mut self, base_score: f64, overall_score: f64) -> Self {
        self.base_score = base_score;
        self.overall_score = overall_score;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_ignored(mut self, ignored: bool) -> Self {
        self.ignored = ignored;
        self
    }

    /// Key of the component this vulnerability was reported against
    pub fn component_key(&self) -> ComponentKey {
        ComponentKey::new(&self.component_name, &self.component_version)
    }
}

/// An ordered collection of vulnerabilities whose count always matches its items
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilitySet {
    total_count: usize,
    items: Vec<Vulnerability>,
}

impl VulnerabilitySet {
    pub fn new(items: Vec<Vulnerability>) -> Self {
        Self {
            total_count: items.len(),
            items,
        }
    }

    pub fn push(&mut self, vulnerability: Vulnerability) {
        self.items.push(vulnerability);
        self.total_count = self.items.len();
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn items(&self) -> &[Vulnerability] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vulnerability> {
        self.items.iter()
    }

    pub fn into_items(self) -> Vec<Vulnerability> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Vulnerability> for VulnerabilitySet {
    fn from_iter<I: IntoIterator<Item = Vulnerability>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for VulnerabilitySet {
    type Item = Vulnerability;
    type IntoIter = std::vec::IntoIter<Vulnerability>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a VulnerabilitySet {
    type Item = &'a Vulnerability;
    type IntoIter = std::slice::Iter<'a, Vulnerability>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
