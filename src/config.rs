//! Configuration file support for sca-reconcile.
//!
//! Provides YAML-based configuration through `sca-reconcile.config.yml`
//! files, including data structures, file loading, and validation.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use sca_reconcile::application::dto::{EcosystemTemplate, ExitCodeOverride, VersioningModel};
use sca_reconcile::reconciliation::services::UNKNOWN_ERROR_THRESHOLD;
use sca_reconcile::shared::Result;

pub const CONFIG_FILENAME: &str = "sca-reconcile.config.yml";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub server_url: Option<String>,
    pub project_name: Option<String>,
    pub version: Option<String>,
    pub custom_scan_version: Option<String>,
    pub versioning_model: Option<String>,
    pub code_location: Option<String>,
    pub scan_properties: Option<Vec<String>>,
    pub scan_paths: Option<Vec<String>>,
    pub groups: Option<Vec<String>>,
    pub fail_on: Option<Vec<String>>,
    pub fail_on_severe_vulnerabilities: Option<bool>,
    pub dependency_path: Option<String>,
    pub unmap: Option<bool>,
    pub scan_on_changes: Option<bool>,
    pub included_package_managers: Option<Vec<String>>,
    pub excluded_package_managers: Option<Vec<String>>,
    pub maven_excluded_scopes: Option<Vec<String>>,
    pub detect_tools: Option<Vec<String>>,
    pub min_scan_interval: Option<u32>,
    pub m2_path: Option<String>,
    pub project_settings_file: Option<String>,
    pub global_settings_file: Option<String>,
    pub custom_environment_variables: Option<Vec<String>>,
    pub scanner_version: Option<String>,
    pub scanner_base_url: Option<String>,
    pub scan_timeout_seconds: Option<u64>,
    pub assessment_file: Option<String>,
    pub output: Option<String>,
    /// Additional or replacement scanner exit codes
    pub exit_codes: Option<Vec<ExitCodeConfig>>,
    /// Additional purl ecosystems
    pub ecosystems: Option<Vec<EcosystemConfig>>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

/// A scanner exit code entry.
#[derive(Debug, Deserialize)]
pub struct ExitCodeConfig {
    pub code: i32,
    pub category: String,
    #[serde(default)]
    pub description: String,
}

/// A purl ecosystem with its coordinate template, e.g.
/// `{type: pypi, namespace: pypi, template: "{name}/{version}"}`.
#[derive(Debug, Deserialize)]
pub struct EcosystemConfig {
    #[serde(rename = "type")]
    pub pkg_type: String,
    pub namespace: String,
    pub template: String,
}

impl ConfigFile {
    pub fn exit_code_overrides(&self) -> Vec<ExitCodeOverride> {
        self.exit_codes
            .iter()
            .flatten()
            .map(|entry| ExitCodeOverride {
                code: entry.code,
                category: entry.category.trim().to_string(),
                description: entry.description.clone(),
            })
            .collect()
    }

    pub fn ecosystem_templates(&self) -> Vec<EcosystemTemplate> {
        self.ecosystems
            .iter()
            .flatten()
            .map(|entry| EcosystemTemplate {
                pkg_type: entry.pkg_type.trim().to_string(),
                namespace: entry.namespace.clone(),
                template: entry.template.clone(),
            })
            .collect()
    }
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    if config.unknown_fields.contains_key("token") {
        bail!(
            "Invalid config: 'token' must not be stored in the config file.\n\n\
             💡 Hint: Pass the API token with --token or the BLACKDUCK_API_TOKEN environment variable."
        );
    }

    if let Some(ref model) = config.versioning_model {
        model
            .parse::<VersioningModel>()
            .map_err(|e| anyhow::anyhow!("Invalid config: {}", e))?;
    }

    if config.scan_timeout_seconds == Some(0) {
        bail!(
            "Invalid config: scan_timeout_seconds must be greater than 0.\n\n\
             💡 Hint: Remove the field to use the default of two hours."
        );
    }

    if let Some(ref exit_codes) = config.exit_codes {
        for (i, entry) in exit_codes.iter().enumerate() {
            if entry.code == 0 {
                bail!(
                    "Invalid config: exit_codes[{}].code must not be 0.\n\n\
                     💡 Hint: Exit code 0 always means success.",
                    i
                );
            }
            if entry.code >= UNKNOWN_ERROR_THRESHOLD {
                bail!(
                    "Invalid config: exit_codes[{}].code must be below {}.\n\n\
                     💡 Hint: Codes from {} up are always reported as FAILURE_UNKNOWN_ERROR.",
                    i,
                    UNKNOWN_ERROR_THRESHOLD,
                    UNKNOWN_ERROR_THRESHOLD
                );
            }
            if entry.category.trim().is_empty() {
                bail!(
                    "Invalid config: exit_codes[{}].category must not be empty.\n\n\
                     💡 Hint: Use a category such as \"FAILURE_CUSTOM\".",
                    i
                );
            }
        }
    }

    if let Some(ref ecosystems) = config.ecosystems {
        for (i, entry) in ecosystems.iter().enumerate() {
            if entry.pkg_type.trim().is_empty() {
                bail!("Invalid config: ecosystems[{}].type must not be empty.", i);
            }
            if !entry.template.contains("{name}") {
                bail!(
                    "Invalid config: ecosystems[{}].template must contain {{name}}.\n\n\
                     💡 Hint: Templates may use {{namespace}}, {{name}} and {{version}}, e.g. \"{{name}}/{{version}}\".",
                    i
                );
            }
        }
    }

    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    for key in config.unknown_fields.keys() {
        eprintln!(
            "⚠️  Warning: Unknown config field '{}' will be ignored.",
            key
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let config_path = dir.path().join("config.yml");
        fs::write(&config_path, content).unwrap();
        config_path
    }

    #[test]
    fn test_load_valid_config() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(
            &dir,
            r#"
server_url: https://my.blackduck.system
project_name: SHC-PiperTest
version: 1.0.0
versioning_model: major-minor
fail_on:
  - BLOCKER
  - CRITICAL
scan_properties:
  - --detect.detector.search.depth=5
unmap: true
scan_timeout_seconds: 600
exit_codes:
  - code: 42
    category: FAILURE_WRAPPER
    description: Wrapper script failed.
ecosystems:
  - type: pypi
    namespace: pypi
    template: "{name}/{version}"
"#,
        );

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(config.server_url.as_deref(), Some("https://my.blackduck.system"));
        assert_eq!(config.project_name.as_deref(), Some("SHC-PiperTest"));
        assert_eq!(config.versioning_model.as_deref(), Some("major-minor"));
        assert_eq!(
            config.fail_on.as_deref(),
            Some(&["BLOCKER".to_string(), "CRITICAL".to_string()][..])
        );
        assert_eq!(config.unmap, Some(true));
        assert_eq!(config.scan_timeout_seconds, Some(600));

        let overrides = config.exit_code_overrides();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].code, 42);
        assert_eq!(overrides[0].category, "FAILURE_WRAPPER");

        let ecosystems = config.ecosystem_templates();
        assert_eq!(ecosystems[0].pkg_type, "pypi");
        assert_eq!(ecosystems[0].template, "{name}/{version}");
    }

    #[test]
    fn test_discover_config_found() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            "project_name: demo\nfail_on_severe_vulnerabilities: true\n",
        )
        .unwrap();

        let config = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.project_name.as_deref(), Some("demo"));
        assert_eq!(config.fail_on_severe_vulnerabilities, Some(true));
    }

    #[test]
    fn test_discover_config_not_found() {
        let dir = TempDir::new().unwrap();
        let config = discover_config(dir.path()).unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config_from_path(Path::new("/nonexistent/config.yml"));
        let err = format!("{}", result.unwrap_err());
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_load_config_parse_error() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir, "invalid: yaml: [[[broken");

        let err = format!("{}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_token_in_config_is_rejected() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir, "token: abc\n");

        let err = format!("{}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("'token' must not be stored"));
    }

    #[test]
    fn test_invalid_versioning_model() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir, "versioning_model: weekly\n");

        let err = format!("{}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("Invalid versioning model"));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir, "scan_timeout_seconds: 0\n");

        let err = format!("{}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("scan_timeout_seconds must be greater than 0"));
    }

    #[test]
    fn test_exit_code_zero_is_rejected() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(
            &dir,
            "exit_codes:\n  - code: 0\n    category: FAILURE_ZERO\n",
        );

        let err = format!("{}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("exit_codes[0].code must not be 0"));
    }

    #[test]
    fn test_exit_code_in_unknown_error_range_is_rejected() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(
            &dir,
            "exit_codes:\n  - code: 8\n    category: FAILURE_OK\n  - code: 150\n    category: FAILURE_WRAPPER\n",
        );

        let err = format!("{}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("exit_codes[1].code must be below 100"));
    }

    #[test]
    fn test_empty_exit_code_category_is_rejected() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir, "exit_codes:\n  - code: 8\n    category: '  '\n");

        let err = format!("{}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("category must not be empty"));
    }

    #[test]
    fn test_ecosystem_template_without_name_is_rejected() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(
            &dir,
            "ecosystems:\n  - type: golang\n    namespace: golang\n    template: \"{version}\"\n",
        );

        let err = format!("{}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("ecosystems[0].template must contain {name}"));
    }

    #[test]
    fn test_unknown_fields_warning() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(
            &dir,
            r#"
project_name: demo
unknown_field: true
another_unknown: value
"#,
        );

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(config.unknown_fields.len(), 2);
        assert!(config.unknown_fields.contains_key("unknown_field"));
        assert!(config.unknown_fields.contains_key("another_unknown"));
    }

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();
        assert!(config.server_url.is_none());
        assert!(config.exit_codes.is_none());
        assert!(config.ecosystem_templates().is_empty());
        assert!(config.exit_code_overrides().is_empty());
        assert!(config.unknown_fields.is_empty());
    }
}
