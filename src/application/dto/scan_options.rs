use crate::shared::error::ScanError;
use crate::shared::Result;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default location of the scanner download scripts
pub const DEFAULT_SCANNER_BASE_URL: &str = "https://detect.synopsys.com";

/// Default upper bound for one scanner run (two hours)
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

/// How the project version name is derived from the full build version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersioningModel {
    /// `1.2.3` -> `1`
    #[default]
    Major,
    /// `1.2.3` -> `1.2`
    MajorMinor,
    /// `1.2.3-SNAPSHOT` -> `1.2.3`
    Semantic,
    /// The version unchanged
    Full,
}

impl VersioningModel {
    /// Applies the model to `version`; missing parts are filled with `0`
    pub fn apply(self, version: &str) -> String {
        let version = version.trim();
        if version.is_empty() {
            return String::new();
        }

        let parts = match self {
            VersioningModel::Full => return version.to_string(),
            VersioningModel::Major => 1,
            VersioningModel::MajorMinor => 2,
            VersioningModel::Semantic => 3,
        };

        let release = version
            .split_once(['-', '+'])
            .map_or(version, |(release, _)| release);
        let mut segments: Vec<&str> = release
            .split('.')
            .filter(|segment| !segment.is_empty())
            .take(parts)
            .collect();
        while segments.len() < parts {
            segments.push("0");
        }
        segments.join(".")
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VersioningModel::Major => "major",
            VersioningModel::MajorMinor => "major-minor",
            VersioningModel::Semantic => "semantic",
            VersioningModel::Full => "full",
        }
    }
}

impl FromStr for VersioningModel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "major" => Ok(VersioningModel::Major),
            "major-minor" => Ok(VersioningModel::MajorMinor),
            "semantic" => Ok(VersioningModel::Semantic),
            "full" => Ok(VersioningModel::Full),
            _ => Err(format!(
                "Invalid versioning model: {}. Please specify 'major', 'major-minor', 'semantic' or 'full'",
                s
            )),
        }
    }
}

/// An exit code table entry added or replaced through configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitCodeOverride {
    pub code: i32,
    pub category: String,
    pub description: String,
}

/// An ecosystem registered through configuration with a coordinate template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcosystemTemplate {
    pub pkg_type: String,
    pub namespace: String,
    pub template: String,
}

/// ScanOptions - request DTO for one scan and reconciliation run
///
/// Combines command-line arguments and the configuration file. The token is
/// only ever supplied from the command line or the environment.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub server_url: String,
    pub token: String,
    pub project_name: String,
    /// Full build version the version name is derived from
    pub version: String,
    /// Explicit version name; wins over `version` and `versioning_model`
    pub custom_scan_version: Option<String>,
    pub versioning_model: VersioningModel,
    pub code_location: Option<String>,
    /// Raw scanner properties passed through unchanged
    pub scan_properties: Vec<String>,
    pub scan_paths: Vec<String>,
    pub groups: Vec<String>,
    /// Policy severities that fail the scan (`NONE` disables the policy error)
    pub fail_on: Vec<String>,
    pub fail_on_severe_vulnerabilities: bool,
    /// Source path; `.` when unset
    pub dependency_path: Option<String>,
    pub unmap: bool,
    pub scan_on_changes: bool,
    pub included_package_managers: Vec<String>,
    pub excluded_package_managers: Vec<String>,
    pub maven_excluded_scopes: Vec<String>,
    pub detect_tools: Vec<String>,
    /// Minimum minutes between signature scans; 0 leaves the scanner default
    pub min_scan_interval: u32,
    pub m2_path: Option<String>,
    pub project_settings_file: Option<String>,
    pub global_settings_file: Option<String>,
    /// `KEY=VALUE` pairs for the scanner process
    pub custom_environment_variables: Vec<String>,
    pub scanner_version_override: Option<String>,
    pub scanner_base_url: String,
    pub scan_timeout: Duration,
    pub working_dir: PathBuf,
    pub exit_code_overrides: Vec<ExitCodeOverride>,
    pub ecosystems: Vec<EcosystemTemplate>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            token: String::new(),
            project_name: String::new(),
            version: String::new(),
            custom_scan_version: None,
            versioning_model: VersioningModel::default(),
            code_location: None,
            scan_properties: Vec::new(),
            scan_paths: Vec::new(),
            groups: Vec::new(),
            fail_on: Vec::new(),
            fail_on_severe_vulnerabilities: false,
            dependency_path: None,
            unmap: false,
            scan_on_changes: false,
            included_package_managers: Vec::new(),
            excluded_package_managers: Vec::new(),
            maven_excluded_scopes: Vec::new(),
            detect_tools: Vec::new(),
            min_scan_interval: 0,
            m2_path: None,
            project_settings_file: None,
            global_settings_file: None,
            custom_environment_variables: Vec::new(),
            scanner_version_override: None,
            scanner_base_url: DEFAULT_SCANNER_BASE_URL.to_string(),
            scan_timeout: DEFAULT_SCAN_TIMEOUT,
            working_dir: PathBuf::from("."),
            exit_code_overrides: Vec::new(),
            ecosystems: Vec::new(),
        }
    }
}

impl ScanOptions {
    /// The project version name used both for the scanner and the backend
    pub fn version_name(&self) -> String {
        match self.custom_scan_version.as_deref().map(str::trim) {
            Some(custom) if !custom.is_empty() => custom.to_string(),
            _ => self.versioning_model.apply(&self.version),
        }
    }

    /// `failOn: NONE` turns off the policy-violation build failure
    pub fn policy_failure_disabled(&self) -> bool {
        self.fail_on
            .iter()
            .any(|severity| severity.trim().eq_ignore_ascii_case("NONE"))
    }

    /// Parses `custom_environment_variables` into key/value pairs
    pub fn environment(&self) -> Result<Vec<(String, String)>> {
        self.custom_environment_variables
            .iter()
            .map(|entry| {
                entry
                    .split_once('=')
                    .filter(|(key, _)| !key.trim().is_empty())
                    .map(|(key, value)| (key.trim().to_string(), value.to_string()))
                    .ok_or_else(|| {
                        anyhow::Error::from(ScanError::Validation {
                            message: format!(
                                "custom environment variable '{}' must have the form KEY=VALUE",
                                entry
                            ),
                        })
                    })
            })
            .collect()
    }

    /// Validates the options that the run cannot start without
    pub fn validate(&self) -> Result<()> {
        if self.server_url.trim().is_empty() {
            return Err(ScanError::Validation {
                message: "server URL must not be empty".to_string(),
            }
            .into());
        }
        if self.token.trim().is_empty() {
            return Err(ScanError::Validation {
                message: "API token must not be empty (use --token or BLACKDUCK_API_TOKEN)"
                    .to_string(),
            }
            .into());
        }
        if self.project_name.trim().is_empty() {
            return Err(ScanError::Validation {
                message: "project name must not be empty".to_string(),
            }
            .into());
        }
        if self.scan_timeout.is_zero() {
            return Err(ScanError::Validation {
                message: "scan timeout must be greater than zero".to_string(),
            }
            .into());
        }
        self.environment()?;
        Ok(())
    }
}
