/// Integration tests for the scan use case wired through the public API
mod test_utilities;

use sca_reconcile::prelude::*;
use std::path::PathBuf;
use std::time::Duration;
use test_utilities::mocks::*;

fn scan_options() -> ScanOptions {
    ScanOptions {
        server_url: "https://blackduck.example.com".to_string(),
        token: "integration-token".to_string(),
        project_name: "SHC-PiperTest".to_string(),
        version: "1.0.0".to_string(),
        working_dir: PathBuf::from("/tmp/integration"),
        ..Default::default()
    }
}

fn snapshot(policy_status: &str) -> ScanSnapshot {
    ScanSnapshot {
        components: vec![
            Component::new("Spring Framework", "5.3.9", Some("Java".to_string()), policy_status),
            Component::new("Apache Log4j", "4.5.16", Some("Java".to_string()), policy_status),
        ],
        hierarchical_components: vec![
            HierarchicalComponent::new(
                "Spring Framework",
                "5.3.9",
                vec![Origin::new("maven", "org.springframework:spring-core:5.3.9")],
                policy_status,
            ),
            HierarchicalComponent::new(
                "Apache Log4j",
                "4.5.16",
                vec![Origin::new("maven", "org.apache.logging.log4j:log4j-core:4.5.16")],
                policy_status,
            ),
        ],
        vulnerabilities: VulnerabilitySet::new(vec![
            Vulnerability::new(
                "BDSA-2019-2021",
                "Spring Framework",
                "5.3.9",
                Severity::High,
                RemediationStatus::New,
            ),
            Vulnerability::new(
                "CVE-2021-44228",
                "Apache Log4j",
                "4.5.16",
                Severity::Critical,
                RemediationStatus::New,
            ),
        ]),
        policy_status: PolicyStatus {
            overall_status: policy_status.to_string(),
            violation_details: None,
        },
    }
}

#[tokio::test]
async fn test_scan_produces_report_for_clean_project() {
    let backend = MockBackendClient::new(snapshot("NOT_IN_VIOLATION"));
    let executor = MockScannerExecutor::new(0);
    let presenter = MockOutputPresenter::new();
    let reporter = MockProgressReporter::new();

    let use_case = ExecuteScanUseCase::new(
        backend.clone(),
        executor.clone(),
        MockAssessmentSource::new(),
        presenter.clone(),
        reporter.clone(),
    );
    let response = use_case.execute(scan_options()).await.unwrap();

    assert_eq!(response.report.policy_violations, 0);
    assert_eq!(response.report.scanner.category, "SUCCESS");
    assert_eq!(response.report.metadata.project_version, "1");
    assert_eq!(response.report.unassessed_vulnerabilities.total_count(), 2);

    let json = presenter.last_output();
    assert!(json.contains("\"projectName\":\"SHC-PiperTest\""));

    assert_eq!(
        executor.download_urls(),
        vec!["https://detect.synopsys.com/detect7.sh".to_string()]
    );
    assert_eq!(executor.removal_count(), 1);
    let invocation = executor.last_invocation().unwrap();
    assert_eq!(invocation.executable, "./detect.sh");
    assert_eq!(invocation.working_dir, PathBuf::from("/tmp/integration"));
    assert!(backend
        .requests
        .lock()
        .unwrap()
        .iter()
        .all(|(project, version)| project == "SHC-PiperTest" && version == "1"));
    assert_eq!(reporter.get_secrets(), vec!["integration-token".to_string()]);
    assert!(reporter.contains("Completed:"));
}

#[tokio::test]
async fn test_assessment_moves_vulnerability_to_assessed() {
    let presenter = MockOutputPresenter::new();
    let assessments = MockAssessmentSource::new().with_assessment(
        "CVE-2021-44228",
        AnalysisOutcome::RiskAccepted,
        &["pkg:maven/org.apache.logging.log4j/log4j-core@4.5.16"],
    );

    let use_case = ExecuteScanUseCase::new(
        MockBackendClient::new(snapshot("NOT_IN_VIOLATION")),
        MockScannerExecutor::new(0),
        assessments,
        presenter.clone(),
        MockProgressReporter::new(),
    );
    let response = use_case.execute(scan_options()).await.unwrap();

    let report = response.report;
    assert_eq!(report.assessed_vulnerabilities.total_count(), 1);
    assert_eq!(report.assessed_vulnerabilities.items()[0].name, "CVE-2021-44228");
    assert_eq!(report.unassessed_vulnerabilities.total_count(), 1);
    assert!(report.diagnostics.unapplied_assessments.is_empty());
}

#[tokio::test]
async fn test_unresolvable_assessment_purl_is_warned() {
    let reporter = MockProgressReporter::new();
    let assessments = MockAssessmentSource::new().with_assessment(
        "CVE-2021-44228",
        AnalysisOutcome::RiskAccepted,
        &["pkg:cargo/log4rs@1.0.0"],
    );

    let use_case = ExecuteScanUseCase::new(
        MockBackendClient::new(snapshot("NOT_IN_VIOLATION")),
        MockScannerExecutor::new(0),
        assessments,
        MockOutputPresenter::new(),
        reporter.clone(),
    );
    let response = use_case.execute(scan_options()).await.unwrap();

    assert_eq!(response.report.assessed_vulnerabilities.total_count(), 0);
    assert_eq!(response.report.diagnostics.purl_resolution_failures.len(), 1);
    assert!(reporter
        .get_messages()
        .iter()
        .any(|m| m.starts_with("Error:") && m.contains("skipped purl")));
}

#[tokio::test]
async fn test_policy_violation_maps_to_exit_code_one() {
    let presenter = MockOutputPresenter::new();
    let use_case = ExecuteScanUseCase::new(
        MockBackendClient::new(snapshot("IN_VIOLATION")),
        MockScannerExecutor::new(0),
        MockAssessmentSource::new(),
        presenter.clone(),
        MockProgressReporter::new(),
    );

    let err = use_case.execute(scan_options()).await.unwrap_err();

    assert_eq!(err.to_string(), "License Policy Violations found");
    assert_eq!(ExitCode::for_error(&err), ExitCode::PolicyViolations);
    assert!(presenter.last_output().contains("\"policyViolations\":2"));
}

#[tokio::test]
async fn test_scanner_failure_maps_to_exit_code_four() {
    let use_case = ExecuteScanUseCase::new(
        MockBackendClient::new(snapshot("NOT_IN_VIOLATION")),
        MockScannerExecutor::new(3),
        MockAssessmentSource::new(),
        MockOutputPresenter::new(),
        MockProgressReporter::new(),
    );

    let err = use_case.execute(scan_options()).await.unwrap_err();

    assert!(err.to_string().starts_with("FAILURE_POLICY_VIOLATION =>"));
    assert_eq!(ExitCode::for_error(&err), ExitCode::ScannerFailure);
}

#[tokio::test]
async fn test_scanner_timeout_skips_backend() {
    let backend = MockBackendClient::new(snapshot("NOT_IN_VIOLATION"));
    let executor = MockScannerExecutor::new(0).with_delay(Duration::from_secs(5));
    let presenter = MockOutputPresenter::new();

    let use_case = ExecuteScanUseCase::new(
        backend.clone(),
        executor.clone(),
        MockAssessmentSource::new(),
        presenter.clone(),
        MockProgressReporter::new(),
    );
    let options = ScanOptions {
        scan_timeout: Duration::from_millis(50),
        ..scan_options()
    };

    let err = use_case.execute(options).await.unwrap_err();

    assert!(err.to_string().starts_with("SCANNER_TIMEOUT =>"));
    assert_eq!(ExitCode::for_error(&err), ExitCode::ScannerFailure);
    assert!(backend.requests.lock().unwrap().is_empty());
    assert!(presenter.last_output().is_empty());
    assert_eq!(executor.removal_count(), 1);
}

#[tokio::test]
async fn test_backend_outage_is_application_error() {
    let presenter = MockOutputPresenter::new();
    let use_case = ExecuteScanUseCase::new(
        MockBackendClient::unavailable(),
        MockScannerExecutor::new(0),
        MockAssessmentSource::new(),
        presenter.clone(),
        MockProgressReporter::new(),
    );

    let err = use_case.execute(scan_options()).await.unwrap_err();

    assert!(err.to_string().starts_with("BACKEND_UNAVAILABLE =>"));
    assert_eq!(ExitCode::for_error(&err), ExitCode::ApplicationError);
    assert!(presenter.last_output().is_empty());
}
