use crate::shared::error::ScanError;
use std::collections::BTreeMap;

/// Category used for codes below 100 that are missing from the table
pub const UNKNOWN_TABLE_ENTRY: &str = "unknown table entry";

/// Catch-all category for scanner-internal crashes (codes >= 100)
pub const FAILURE_UNKNOWN_ERROR: &str = "FAILURE_UNKNOWN_ERROR";

/// Codes at or above this value always classify as `FAILURE_UNKNOWN_ERROR`
pub const UNKNOWN_ERROR_THRESHOLD: i32 = 100;

/// Category of the scanner's own policy check failure
pub const FAILURE_POLICY_VIOLATION: &str = "FAILURE_POLICY_VIOLATION";

const SUCCESS: &str = "SUCCESS";

/// Documented Detect exit codes
const DEFAULT_ENTRIES: &[(i32, &str, &str)] = &[
    (1, "FAILURE_BLACKDUCK_CONNECTIVITY", "Detect was unable to connect to Black Duck."),
    (2, "FAILURE_TIMEOUT", "Detect could not wait for actions to be completed on Black Duck. Check your Black Duck server or increase your timeout."),
    (3, FAILURE_POLICY_VIOLATION, "Detect found policy violations."),
    (4, "FAILURE_PROXY_CONNECTIVITY", "Detect was unable to use the configured proxy. Check your proxy configuration."),
    (5, "FAILURE_DETECTOR", "Detect had one or more detector failures while extracting dependencies. Check that all projects build and your environment is configured correctly."),
    (6, "FAILURE_SCAN", "Detect was unable to run the signature scanner against your source. Check your configuration."),
    (7, "FAILURE_CONFIGURATION", "Detect was unable to start due to issues with its configuration. Check and fix your configuration."),
    (9, "FAILURE_DETECTOR_REQUIRED", "Detect did not run all of the required detectors. Fix detector issues or disable required detectors."),
    (10, "FAILURE_BLACKDUCK_VERSION_NOT_SUPPORTED", "Detect attempted an operation that was not supported by your version of Black Duck. Ensure your Black Duck is compatible with this version of Detect."),
    (11, "FAILURE_BLACKDUCK_FEATURE_ERROR", "Detect encountered an error while attempting an operation on Black Duck. Ensure your Black Duck is compatible with this version of Detect."),
    (12, "FAILURE_POLARIS_CONNECTIVITY", "Detect was unable to connect to Polaris. Check your configuration and connection."),
    (99, "FAILURE_GENERAL_ERROR", "Detect encountered a known error, details of the error are provided."),
    (100, FAILURE_UNKNOWN_ERROR, "Detect encountered an unknown error."),
];

/// One row of the exit code table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitCodeEntry {
    pub category: String,
    pub description: String,
}

/// Result of classifying a scanner exit code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitCodeClassification {
    pub code: i32,
    pub category: String,
    pub message: String,
}

impl ExitCodeClassification {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// The scanner failed because its own policy check fired
    pub fn is_policy_failure(&self) -> bool {
        self.category == FAILURE_POLICY_VIOLATION
    }

    /// Converts a failing classification into the error surfaced to the caller
    pub fn into_error(self) -> Option<ScanError> {
        if self.is_success() {
            return None;
        }
        Some(ScanError::ScannerExecutionFailure {
            code: self.code,
            category: self.category,
            message: self.message,
        })
    }
}

/// Maps scanner exit codes to failure categories.
///
/// The table is data: it starts from the documented codes and can be
/// extended or overridden from the configuration file. Code 0 is always
/// success and codes from [`UNKNOWN_ERROR_THRESHOLD`] up are always the
/// catch-all; neither range can be overridden.
#[derive(Debug, Clone)]
pub struct ExitCodeClassifier {
    table: BTreeMap<i32, ExitCodeEntry>,
}

impl ExitCodeClassifier {
    pub fn new() -> Self {
        let table = DEFAULT_ENTRIES
            .iter()
            .map(|(code, category, description)| {
                (
                    *code,
                    ExitCodeEntry {
                        category: category.to_string(),
                        description: description.to_string(),
                    },
                )
            })
            .collect();
        Self { table }
    }

    /// Whether a table entry for `code` may be added or replaced
    pub fn is_overridable(code: i32) -> bool {
        code != 0 && code < UNKNOWN_ERROR_THRESHOLD
    }

    /// Adds or replaces a table entry; codes that are not overridable are ignored
    pub fn with_entry(
        mut self,
        code: i32,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        if Self::is_overridable(code) {
            self.table.insert(
                code,
                ExitCodeEntry {
                    category: category.into(),
                    description: description.into(),
                },
            );
        }
        self
    }

    pub fn entry(&self, code: i32) -> Option<&ExitCodeEntry> {
        self.table.get(&code)
    }

    pub fn classify(&self, code: i32) -> ExitCodeClassification {
        if code == 0 {
            return ExitCodeClassification {
                code,
                category: SUCCESS.to_string(),
                message: format!("{} => Detect Scan completed successfully", SUCCESS),
            };
        }

        if let Some(entry) = self.table.get(&code) {
            return ExitCodeClassification {
                code,
                category: entry.category.clone(),
                message: format!("{} => {}", entry.category, entry.description),
            };
        }

        if code >= UNKNOWN_ERROR_THRESHOLD {
            let description = self
                .table
                .get(&UNKNOWN_ERROR_THRESHOLD)
                .map(|entry| entry.description.as_str())
                .unwrap_or("Detect encountered an unknown error.");
            return ExitCodeClassification {
                code,
                category: FAILURE_UNKNOWN_ERROR.to_string(),
                message: format!("{} => {}", FAILURE_UNKNOWN_ERROR, description),
            };
        }

        ExitCodeClassification {
            code,
            category: UNKNOWN_TABLE_ENTRY.to_string(),
            message: format!("{} => Not known exit code key", code),
        }
    }
}

impl Default for ExitCodeClassifier {
    fn default() -> Self {
        Self::new()
    }
}
