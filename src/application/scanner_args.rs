//! Maps scan options to scanner command-line flags.
//!
//! Every flag is one argv element. Nothing here is parsed by a shell, so
//! values are passed through exactly as configured, spaces included.

use crate::application::dto::ScanOptions;
use std::path::Path;

/// Builds the scanner arguments following `prefix`
pub fn build_scanner_args(prefix: &[String], options: &ScanOptions) -> Vec<String> {
    let mut args: Vec<String> = prefix.to_vec();

    if options.min_scan_interval > 0 {
        args.push(format!(
            "--detect.blackduck.signature.scanner.arguments=--min-scan-interval={}",
            options.min_scan_interval
        ));
    }

    // Independent switches; the scanner decides how they combine.
    if options.unmap {
        args.push("--detect.project.codelocation.unmap=true".to_string());
    }
    if options.scan_on_changes {
        args.push("--report".to_string());
    }

    args.extend(options.scan_properties.iter().cloned());

    args.push(format!("--blackduck.url={}", options.server_url));
    args.push(format!("--blackduck.api.token={}", options.token));

    let version_name = options.version_name();
    args.push(flag("detect.project.name", &options.project_name));
    args.push(flag("detect.project.version.name", &version_name));

    if !options.groups.is_empty() {
        args.push(flag("detect.project.user.groups", &options.groups.join(",")));
    }

    if !options.fail_on.is_empty() {
        args.push(format!(
            "--detect.policy.check.fail.on.severities={}",
            options.fail_on.join(",")
        ));
    }

    args.push(flag(
        "detect.code.location.name",
        &code_location(options, &version_name),
    ));

    if !options.scan_paths.is_empty() {
        args.push(format!(
            "--detect.blackduck.signature.scanner.paths={}",
            options.scan_paths.join(",")
        ));
    }

    match options.dependency_path.as_deref() {
        Some(path) if !path.trim().is_empty() => {
            args.push(format!("--detect.source.path={}", path))
        }
        _ => args.push("--detect.source.path=.".to_string()),
    }

    if !options.included_package_managers.is_empty() {
        args.push(format!(
            "--detect.included.detector.types={}",
            upper_joined(&options.included_package_managers)
        ));
    }
    if !options.excluded_package_managers.is_empty() {
        args.push(format!(
            "--detect.excluded.detector.types={}",
            upper_joined(&options.excluded_package_managers)
        ));
    }
    if !options.maven_excluded_scopes.is_empty() {
        let scopes: Vec<String> = options
            .maven_excluded_scopes
            .iter()
            .map(|scope| scope.to_lowercase())
            .collect();
        args.push(format!("--detect.maven.excluded.scopes={}", scopes.join(",")));
    }
    if !options.detect_tools.is_empty() {
        args.push(format!("--detect.tools={}", options.detect_tools.join(",")));
    }

    if let Some(command) = maven_build_command(options, &options.working_dir) {
        args.push(flag("detect.maven.build.command", &command));
    }

    args
}

/// `--<key>=<value>`
fn flag(key: &str, value: &str) -> String {
    format!("--{}={}", key, value)
}

fn upper_joined(values: &[String]) -> String {
    values
        .iter()
        .map(|value| value.to_uppercase())
        .collect::<Vec<_>>()
        .join(",")
}

/// Explicit code location, else `<project>/<version>` when a project is named
fn code_location(options: &ScanOptions, version_name: &str) -> String {
    match options.code_location.as_deref() {
        Some(location) if !location.is_empty() => location.to_string(),
        _ if !options.project_name.is_empty() => {
            format!("{}/{}", options.project_name, version_name)
        }
        _ => String::new(),
    }
}

fn maven_build_command(options: &ScanOptions, working_dir: &Path) -> Option<String> {
    let mut parts = Vec::new();

    if let Some(global) = non_empty(&options.global_settings_file) {
        parts.push(format!("--global-settings {}", global));
    }
    if let Some(project) = non_empty(&options.project_settings_file) {
        parts.push(format!("--settings {}", project));
    }
    if let Some(m2_path) = non_empty(&options.m2_path) {
        let path = Path::new(m2_path);
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            working_dir.join(path)
        };
        parts.push(format!("-Dmaven.repo.local={}", absolute.display()));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
