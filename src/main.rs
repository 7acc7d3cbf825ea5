mod cli;
mod config;

use cli::Args;
use config::ConfigFile;
use sca_reconcile::adapters::outbound::console::StderrProgressReporter;
use sca_reconcile::adapters::outbound::filesystem::{
    AssessmentFileReader, FileSystemWriter, StdoutPresenter, DEFAULT_ASSESSMENT_FILE,
    DEFAULT_REPORT_FILE,
};
use sca_reconcile::adapters::outbound::network::BlackDuckClient;
use sca_reconcile::adapters::outbound::process::ShellScannerExecutor;
use sca_reconcile::application::dto::{ScanOptions, VersioningModel, DEFAULT_SCANNER_BASE_URL};
use sca_reconcile::application::use_cases::ExecuteScanUseCase;
use sca_reconcile::ports::outbound::OutputPresenter;
use sca_reconcile::shared::error::{ExitCode, ScanError};
use sca_reconcile::shared::Result;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

/// Report target meaning stdout
const STDOUT_TARGET: &str = "-";

#[tokio::main]
async fn main() {
    let args = Args::parse_args();

    let exit_code = match run(args).await {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            // Display error chain
            let mut source = e.source();
            while let Some(err) = source {
                eprintln!("\nCaused by: {}", err);
                source = err.source();
            }

            eprintln!();
            ExitCode::for_error(&e)
        }
    };

    process::exit(exit_code.as_i32());
}

async fn run(args: Args) -> Result<()> {
    let working_dir = args.path.clone().unwrap_or_else(|| PathBuf::from("."));
    validate_working_dir(&working_dir)?;

    let config = match args.config.as_deref() {
        Some(path) => config::load_config_from_path(path)?,
        None => config::discover_config(&working_dir)?.unwrap_or_default(),
    };

    let assessment_source = assessment_source(&args, &config, &working_dir);
    let output_target = args
        .output
        .clone()
        .or_else(|| config.output.clone())
        .unwrap_or_else(|| DEFAULT_REPORT_FILE.to_string());
    let options = build_scan_options(args, config, working_dir)?;

    // Create adapters (Dependency Injection)
    let backend_client = BlackDuckClient::new(&options.server_url, &options.token)?;
    let scanner_executor = ShellScannerExecutor::new()?;
    let presenter = presenter_for(&output_target, &options.working_dir);
    let progress_reporter = StderrProgressReporter::new();

    let use_case = ExecuteScanUseCase::new(
        backend_client,
        scanner_executor,
        assessment_source,
        presenter,
        progress_reporter,
    );

    use_case.execute(options).await?;
    Ok(())
}

/// Merges arguments over the config file; arguments win.
fn build_scan_options(args: Args, config: ConfigFile, working_dir: PathBuf) -> Result<ScanOptions> {
    let exit_code_overrides = config.exit_code_overrides();
    let ecosystems = config.ecosystem_templates();

    let versioning_model = match args.versioning_model {
        Some(model) => model,
        None => config
            .versioning_model
            .as_deref()
            .map(str::parse::<VersioningModel>)
            .transpose()
            .map_err(|message| ScanError::Validation { message })?
            .unwrap_or_default(),
    };

    let scan_timeout = args
        .scan_timeout
        .or(config.scan_timeout_seconds)
        .map(Duration::from_secs);

    let defaults = ScanOptions::default();
    Ok(ScanOptions {
        server_url: args.server_url.or(config.server_url).unwrap_or_default(),
        token: args.token.unwrap_or_default(),
        project_name: args.project_name.or(config.project_name).unwrap_or_default(),
        version: args.version.or(config.version).unwrap_or_default(),
        custom_scan_version: args.custom_scan_version.or(config.custom_scan_version),
        versioning_model,
        code_location: args.code_location.or(config.code_location),
        scan_properties: list_or(args.scan_properties, config.scan_properties),
        scan_paths: list_or(args.scan_paths, config.scan_paths),
        groups: list_or(args.groups, config.groups),
        fail_on: list_or(args.fail_on, config.fail_on),
        fail_on_severe_vulnerabilities: args.fail_on_severe_vulnerabilities
            || config.fail_on_severe_vulnerabilities.unwrap_or(false),
        dependency_path: args.dependency_path.or(config.dependency_path),
        unmap: args.unmap || config.unmap.unwrap_or(false),
        scan_on_changes: args.scan_on_changes || config.scan_on_changes.unwrap_or(false),
        included_package_managers: list_or(
            args.included_package_managers,
            config.included_package_managers,
        ),
        excluded_package_managers: list_or(
            args.excluded_package_managers,
            config.excluded_package_managers,
        ),
        maven_excluded_scopes: list_or(args.maven_excluded_scopes, config.maven_excluded_scopes),
        detect_tools: list_or(args.detect_tools, config.detect_tools),
        min_scan_interval: args
            .min_scan_interval
            .or(config.min_scan_interval)
            .unwrap_or(0),
        m2_path: args.m2_path.or(config.m2_path),
        project_settings_file: args.project_settings_file.or(config.project_settings_file),
        global_settings_file: args.global_settings_file.or(config.global_settings_file),
        custom_environment_variables: list_or(
            args.custom_environment_variables,
            config.custom_environment_variables,
        ),
        scanner_version_override: args.scanner_version.or(config.scanner_version),
        scanner_base_url: args
            .scanner_base_url
            .or(config.scanner_base_url)
            .unwrap_or_else(|| DEFAULT_SCANNER_BASE_URL.to_string()),
        scan_timeout: scan_timeout.unwrap_or(defaults.scan_timeout),
        working_dir,
        exit_code_overrides,
        ecosystems,
    })
}

/// Command-line lists replace config lists rather than extending them
fn list_or(from_args: Vec<String>, from_config: Option<Vec<String>>) -> Vec<String> {
    if from_args.is_empty() {
        from_config.unwrap_or_default()
    } else {
        from_args
    }
}

fn assessment_source(args: &Args, config: &ConfigFile, working_dir: &Path) -> AssessmentFileReader {
    match args
        .assessment_file
        .clone()
        .or_else(|| config.assessment_file.as_ref().map(|path| working_dir.join(path)))
    {
        Some(path) => AssessmentFileReader::new(path),
        None => AssessmentFileReader::optional(working_dir.join(DEFAULT_ASSESSMENT_FILE)),
    }
}

/// Relative report paths are resolved against the working directory
fn presenter_for(target: &str, working_dir: &Path) -> Box<dyn OutputPresenter> {
    if target == STDOUT_TARGET {
        Box::new(StdoutPresenter::new())
    } else {
        Box::new(FileSystemWriter::new(working_dir.join(target)))
    }
}

fn validate_working_dir(path: &Path) -> Result<()> {
    let metadata = std::fs::symlink_metadata(path).map_err(|e| ScanError::Validation {
        message: format!("working directory {} is not accessible: {}", path.display(), e),
    })?;

    if metadata.is_symlink() {
        return Err(ScanError::SecurityError {
            path: path.to_path_buf(),
            reason: "The working directory is a symbolic link".to_string(),
            hint: "Pass the real directory with --path".to_string(),
        }
        .into());
    }

    if !metadata.is_dir() {
        return Err(ScanError::Validation {
            message: format!("working directory {} is not a directory", path.display()),
        }
        .into());
    }

    Ok(())
}
