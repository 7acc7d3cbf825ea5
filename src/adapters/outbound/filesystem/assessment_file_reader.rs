use crate::ports::outbound::AssessmentSource;
use crate::reconciliation::domain::{AnalysisOutcome, Assessment};
use crate::shared::error::ScanError;
use crate::shared::security::{validate_input_file, MAX_INPUT_FILE_SIZE};
use crate::shared::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default assessment file, relative to the working directory
pub const DEFAULT_ASSESSMENT_FILE: &str = ".pipeline/assessments.yaml";

#[derive(Debug, Deserialize)]
struct AssessmentFile {
    ignore: Vec<AssessmentEntry>,
}

#[derive(Debug, Deserialize)]
struct AssessmentEntry {
    vulnerability: String,
    analysis: String,
    #[serde(default)]
    purls: Vec<PurlEntry>,
}

/// Either `- purl: pkg:...` or a bare `- pkg:...`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PurlEntry {
    Mapping { purl: String },
    Plain(String),
}

impl PurlEntry {
    fn into_purl(self) -> String {
        match self {
            PurlEntry::Mapping { purl } | PurlEntry::Plain(purl) => purl,
        }
    }
}

/// AssessmentFileReader adapter reading assessments from a YAML file
///
/// ```yaml
/// ignore:
///   - vulnerability: BDSA-2019-2021
///     analysis: RiskAccepted
///     purls:
///       - purl: pkg:maven/spring/spring-web@5.3.9
/// ```
///
/// Without a path, or when an optional default path does not exist, the
/// reader yields no assessments.
pub struct AssessmentFileReader {
    path: Option<PathBuf>,
    required: bool,
}

impl AssessmentFileReader {
    /// Reads `path`; a missing file is an error
    pub fn new(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            required: true,
        }
    }

    /// Reads `path` only if it exists
    pub fn optional(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            required: false,
        }
    }

    pub fn none() -> Self {
        Self {
            path: None,
            required: false,
        }
    }

    fn parse(path: &Path, content: &str) -> Result<Vec<Assessment>> {
        let file: AssessmentFile =
            serde_yaml_ng::from_str(content).map_err(|e| ScanError::AssessmentParseError {
                path: path.to_path_buf(),
                details: e.to_string(),
            })?;

        file.ignore
            .into_iter()
            .map(|entry| -> Result<Assessment> {
                if entry.vulnerability.trim().is_empty() {
                    return Err(ScanError::AssessmentParseError {
                        path: path.to_path_buf(),
                        details: "an entry has an empty 'vulnerability'".to_string(),
                    }
                    .into());
                }
                Ok(Assessment::new(
                    entry.vulnerability.trim(),
                    AnalysisOutcome::from_label(&entry.analysis),
                    entry.purls.into_iter().map(PurlEntry::into_purl).collect(),
                ))
            })
            .collect()
    }
}

impl AssessmentSource for AssessmentFileReader {
    fn load_assessments(&self) -> Result<Vec<Assessment>> {
        let Some(path) = &self.path else {
            return Ok(Vec::new());
        };
        if !self.required && !path.exists() {
            return Ok(Vec::new());
        }

        validate_input_file(path, "Assessment file", MAX_INPUT_FILE_SIZE)?;
        let content = fs::read_to_string(path).map_err(|e| ScanError::FileReadError {
            path: path.clone(),
            details: e.to_string(),
        })?;

        Self::parse(path, &content)
    }
}
