use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow CI systems to distinguish between different
/// types of failures and successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - scanner passed and no active policy violations
    Success = 0,
    /// Active license policy violations were found
    PolicyViolations = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (backend error, configuration error, file I/O error, etc.)
    ApplicationError = 3,
    /// The scanner process failed with a classified exit code
    ScannerFailure = 4,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Picks the exit code matching the error that ended the run
    pub fn for_error(error: &anyhow::Error) -> Self {
        match error.downcast_ref::<ScanError>() {
            Some(ScanError::PolicyViolationDetected { .. }) => ExitCode::PolicyViolations,
            Some(ScanError::ScannerExecutionFailure { .. })
            | Some(ScanError::ScannerTimedOut { .. }) => ExitCode::ScannerFailure,
            _ => ExitCode::ApplicationError,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::PolicyViolations => write!(f, "Policy Violations (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
            ExitCode::ScannerFailure => write!(f, "Scanner Failure (4)"),
        }
    }
}

/// Application-specific errors for scanning and reconciliation.
///
/// The `Display` text of the scanner and policy variants is part of the
/// process contract: build logs grep for these exact messages.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The scanner exited non-zero; `message` is the classified exit code text
    #[error("{message}")]
    ScannerExecutionFailure {
        code: i32,
        category: String,
        message: String,
    },

    #[error("SCANNER_TIMEOUT => The scanner did not finish within {seconds} seconds and was stopped.\n\n💡 Hint: Increase scan_timeout_seconds or check why the scan hangs")]
    ScannerTimedOut { seconds: u64 },

    #[error("Failed to download scanner from {url}\nDetails: {details}\n\n💡 Hint: Check your network connection and proxy settings")]
    ScannerDownloadFailed { url: String, details: String },

    /// Transport or authentication failure talking to the SCA backend
    #[error("BACKEND_UNAVAILABLE => Failed to {operation}: {details}")]
    BackendUnavailable { operation: String, details: String },

    #[error("License Policy Violations found")]
    PolicyViolationDetected { count: usize },

    #[error("Failed to parse assessment file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file contains a top-level 'ignore' list")]
    AssessmentParseError { path: PathBuf, details: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },

    /// Validation error for configuration and options
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Security violation: {path}\nReason: {reason}\n\n💡 Hint: {hint}")]
    SecurityError {
        path: PathBuf,
        reason: String,
        hint: String,
    },
}

/// Errors raised while turning a package URL into a vendor coordinate.
///
/// These never abort a reconciliation pass; they are recorded per purl.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("Malformed package URL '{purl}': {reason}")]
    MalformedPurl { purl: String, reason: String },

    #[error("Unsupported ecosystem '{ecosystem}' in package URL '{purl}'")]
    UnsupportedEcosystem { purl: String, ecosystem: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::PolicyViolations.as_i32(), 1);
        assert_eq!(ExitCode::InvalidArguments.as_i32(), 2);
        assert_eq!(ExitCode::ApplicationError.as_i32(), 3);
        assert_eq!(ExitCode::ScannerFailure.as_i32(), 4);
    }

    #[test]
    fn test_exit_code_display() {
        assert_eq!(format!("{}", ExitCode::Success), "Success (0)");
        assert_eq!(
            format!("{}", ExitCode::PolicyViolations),
            "Policy Violations (1)"
        );
        assert_eq!(
            format!("{}", ExitCode::ScannerFailure),
            "Scanner Failure (4)"
        );
    }

    #[test]
    fn test_exit_code_for_policy_violation() {
        let err: anyhow::Error = ScanError::PolicyViolationDetected { count: 2 }.into();
        assert_eq!(ExitCode::for_error(&err), ExitCode::PolicyViolations);
    }

    #[test]
    fn test_exit_code_for_scanner_failure() {
        let err: anyhow::Error = ScanError::ScannerExecutionFailure {
            code: 1,
            category: "FAILURE_BLACKDUCK_CONNECTIVITY".to_string(),
            message: "FAILURE_BLACKDUCK_CONNECTIVITY => Detect was unable to connect to Black Duck."
                .to_string(),
        }
        .into();
        assert_eq!(ExitCode::for_error(&err), ExitCode::ScannerFailure);

        let err: anyhow::Error = ScanError::ScannerTimedOut { seconds: 5 }.into();
        assert_eq!(ExitCode::for_error(&err), ExitCode::ScannerFailure);
    }

    #[test]
    fn test_exit_code_for_other_errors() {
        let err: anyhow::Error = ScanError::BackendUnavailable {
            operation: "authenticate".to_string(),
            details: "401".to_string(),
        }
        .into();
        assert_eq!(ExitCode::for_error(&err), ExitCode::ApplicationError);

        let err = anyhow::anyhow!("plain failure");
        assert_eq!(ExitCode::for_error(&err), ExitCode::ApplicationError);
    }

    #[test]
    fn test_policy_violation_message_is_literal() {
        let error = ScanError::PolicyViolationDetected { count: 7 };
        assert_eq!(error.to_string(), "License Policy Violations found");
    }

    #[test]
    fn test_scanner_failure_message_is_classification() {
        let error = ScanError::ScannerExecutionFailure {
            code: 3,
            category: "FAILURE_POLICY_VIOLATION".to_string(),
            message: "FAILURE_POLICY_VIOLATION => Detect found policy violations.".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "FAILURE_POLICY_VIOLATION => Detect found policy violations."
        );
    }

    #[test]
    fn test_backend_unavailable_display() {
        let error = ScanError::BackendUnavailable {
            operation: "load vulnerabilities".to_string(),
            details: "connection refused".to_string(),
        };
        let display = error.to_string();
        assert!(display.contains("BACKEND_UNAVAILABLE"));
        assert!(display.contains("load vulnerabilities"));
        assert!(display.contains("connection refused"));
    }

    #[test]
    fn test_file_write_error_display() {
        let error = ScanError::FileWriteError {
            path: PathBuf::from("/test/report.json"),
            details: "Permission denied".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Failed to write to file"));
        assert!(display.contains("/test/report.json"));
        assert!(display.contains("Permission denied"));
        assert!(display.contains("💡 Hint:"));
    }

    #[test]
    fn test_security_error_display() {
        let error = ScanError::SecurityError {
            path: PathBuf::from("/test/symlink"),
            reason: "Symbolic links are not allowed".to_string(),
            hint: "Use a regular file instead".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Security violation"));
        assert!(display.contains("/test/symlink"));
        assert!(display.contains("Use a regular file instead"));
    }

    #[test]
    fn test_identity_error_display() {
        let error = IdentityError::UnsupportedEcosystem {
            purl: "pkg:cargo/serde@1.0.0".to_string(),
            ecosystem: "cargo".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Unsupported ecosystem 'cargo' in package URL 'pkg:cargo/serde@1.0.0'"
        );

        let error = IdentityError::MalformedPurl {
            purl: "maven/spring".to_string(),
            reason: "must start with 'pkg:'".to_string(),
        };
        assert!(error.to_string().contains("Malformed package URL"));
    }
}
