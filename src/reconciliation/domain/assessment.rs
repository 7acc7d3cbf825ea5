use serde::{Serialize, Serializer};
use std::fmt;

/// Outcome recorded by whoever reviewed the vulnerability
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnalysisOutcome {
    RiskAccepted,
    FalsePositive,
    NotPresent,
    Mitigated,
    Other(String),
}

impl AnalysisOutcome {
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "RiskAccepted" => AnalysisOutcome::RiskAccepted,
            "FalsePositive" => AnalysisOutcome::FalsePositive,
            "NotPresent" => AnalysisOutcome::NotPresent,
            "Mitigated" => AnalysisOutcome::Mitigated,
            other => AnalysisOutcome::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AnalysisOutcome::RiskAccepted => "RiskAccepted",
            AnalysisOutcome::FalsePositive => "FalsePositive",
            AnalysisOutcome::NotPresent => "NotPresent",
            AnalysisOutcome::Mitigated => "Mitigated",
            AnalysisOutcome::Other(label) => label,
        }
    }
}

impl fmt::Display for AnalysisOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for AnalysisOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Externally authored risk-acceptance record for one vulnerability
///
/// Applies to every package identity listed in `purls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub vulnerability_name: String,
    pub analysis: AnalysisOutcome,
    pub purls: Vec<String>,
}

impl Assessment {
    pub fn new(
        vulnerability_name: impl Into<String>,
        analysis: AnalysisOutcome,
        purls: Vec<String>,
    ) -> Self {
        Self {
            vulnerability_name: vulnerability_name.into(),
            analysis,
            purls,
        }
    }

    /// Assessments match vulnerabilities by exact name
    pub fn applies_to(&self, vulnerability_name: &str) -> bool {
        self.vulnerability_name == vulnerability_name
    }
}
