use clap::Parser;
use std::path::PathBuf;

use sca_reconcile::application::dto::VersioningModel;

/// Run a Detect scan and reconcile Black Duck findings against assessments
#[derive(Parser, Debug, Default)]
#[command(name = "sca-reconcile")]
#[command(version)]
#[command(
    about = "Run a Detect scan and reconcile Black Duck findings against risk-acceptance assessments",
    long_about = None
)]
pub struct Args {
    /// Black Duck server URL
    #[arg(long, env = "BLACKDUCK_URL")]
    pub server_url: Option<String>,

    /// Black Duck API token
    #[arg(long, env = "BLACKDUCK_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Black Duck project name
    #[arg(long)]
    pub project_name: Option<String>,

    /// Full build version; the project version name is derived from it
    #[arg(id = "project_version", long = "project-version", value_name = "VERSION")]
    pub version: Option<String>,

    /// Explicit project version name (overrides --versioning-model)
    #[arg(long)]
    pub custom_scan_version: Option<String>,

    /// How the version name is derived: major, major-minor, semantic or full
    #[arg(long)]
    pub versioning_model: Option<VersioningModel>,

    /// Code location name (defaults to <project>/<version>)
    #[arg(long)]
    pub code_location: Option<String>,

    /// Extra scanner property, passed through unchanged (repeatable)
    #[arg(long = "scan-property", value_name = "PROPERTY", allow_hyphen_values = true)]
    pub scan_properties: Vec<String>,

    /// Path for the signature scanner (repeatable)
    #[arg(long = "scan-path", value_name = "PATH")]
    pub scan_paths: Vec<String>,

    /// User group assigned to the project (repeatable)
    #[arg(long = "group", value_name = "GROUP")]
    pub groups: Vec<String>,

    /// Policy severities that fail the scan, comma separated; NONE disables the policy failure
    #[arg(long, value_delimiter = ',', value_name = "SEVERITIES")]
    pub fail_on: Vec<String>,

    /// Report the policy error when the scanner also failed
    #[arg(long)]
    pub fail_on_severe_vulnerabilities: bool,

    /// Source path for the scanner (defaults to '.')
    #[arg(long)]
    pub dependency_path: Option<String>,

    /// Unmap previous code locations from the project version
    #[arg(long)]
    pub unmap: bool,

    /// Only scan when the dependencies changed
    #[arg(long)]
    pub scan_on_changes: bool,

    /// Detector type to include (repeatable)
    #[arg(long = "include-package-manager", value_name = "TYPE")]
    pub included_package_managers: Vec<String>,

    /// Detector type to exclude (repeatable)
    #[arg(long = "exclude-package-manager", value_name = "TYPE")]
    pub excluded_package_managers: Vec<String>,

    /// Maven scope to exclude (repeatable)
    #[arg(long = "maven-excluded-scope", value_name = "SCOPE")]
    pub maven_excluded_scopes: Vec<String>,

    /// Detect tool to run (repeatable)
    #[arg(long = "detect-tool", value_name = "TOOL")]
    pub detect_tools: Vec<String>,

    /// Minimum minutes between signature scans
    #[arg(long)]
    pub min_scan_interval: Option<u32>,

    /// Maven local repository path, relative to the working directory
    #[arg(long)]
    pub m2_path: Option<String>,

    /// Maven project settings file
    #[arg(long)]
    pub project_settings_file: Option<String>,

    /// Maven global settings file
    #[arg(long)]
    pub global_settings_file: Option<String>,

    /// Environment variable for the scanner as KEY=VALUE (repeatable)
    #[arg(long = "env", value_name = "KEY=VALUE")]
    pub custom_environment_variables: Vec<String>,

    /// Scanner release to download (e.g. 8.10.0)
    #[arg(long)]
    pub scanner_version: Option<String>,

    /// Base URL the scanner script is downloaded from
    #[arg(long)]
    pub scanner_base_url: Option<String>,

    /// Scanner timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub scan_timeout: Option<u64>,

    /// Working directory of the scan (defaults to current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Assessment file (defaults to .pipeline/assessments.yaml when present)
    #[arg(short, long)]
    pub assessment_file: Option<PathBuf>,

    /// Report file; '-' writes to stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Configuration file (defaults to sca-reconcile.config.yml in the working directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let args = Args::try_parse_from([
            "sca-reconcile",
            "--server-url",
            "https://bd.example.com",
            "--project-name",
            "demo",
        ])
        .unwrap();
        assert_eq!(args.server_url.as_deref(), Some("https://bd.example.com"));
        assert_eq!(args.project_name.as_deref(), Some("demo"));
        assert!(!args.unmap);
        assert!(args.fail_on.is_empty());
    }

    #[test]
    fn test_parse_lists_and_flags() {
        let args = Args::try_parse_from([
            "sca-reconcile",
            "--fail-on",
            "BLOCKER,CRITICAL",
            "--scan-property",
            "--detect.detector.search.depth=5",
            "--scan-property",
            "--detect.timeout=600",
            "--env",
            "DETECT_LATEST_RELEASE_VERSION=6.8.0",
            "--unmap",
            "--scan-on-changes",
            "--versioning-model",
            "major-minor",
            "--min-scan-interval",
            "4",
        ])
        .unwrap();
        assert_eq!(args.fail_on, vec!["BLOCKER", "CRITICAL"]);
        assert_eq!(args.scan_properties.len(), 2);
        assert_eq!(
            args.custom_environment_variables,
            vec!["DETECT_LATEST_RELEASE_VERSION=6.8.0"]
        );
        assert!(args.unmap);
        assert!(args.scan_on_changes);
        assert_eq!(args.versioning_model, Some(VersioningModel::MajorMinor));
        assert_eq!(args.min_scan_interval, Some(4));
    }

    #[test]
    fn test_invalid_versioning_model() {
        let err = Args::try_parse_from(["sca-reconcile", "--versioning-model", "weekly"])
            .unwrap_err();
        assert!(err.to_string().contains("Invalid versioning model"));
    }

    #[test]
    fn test_invalid_timeout() {
        assert!(Args::try_parse_from(["sca-reconcile", "--scan-timeout", "soon"]).is_err());
    }
}
