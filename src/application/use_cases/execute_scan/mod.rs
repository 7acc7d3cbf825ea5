use crate::application::dto::{ReportMetadata, ScanOptions, ScanResponse};
use crate::application::report_builder::ReportBuilder;
use crate::application::scanner_args::build_scanner_args;
use crate::application::scanner_release::{ScannerRelease, SCANNER_SCRIPT};
use crate::ports::outbound::{
    AssessmentSource, BackendClient, OutputPresenter, ProgressReporter, ScannerExecutor,
    ScannerInvocation,
};
use crate::reconciliation::domain::{Assessment, ScanSnapshot};
use crate::reconciliation::services::{
    CoordinateTemplate, EcosystemRegistry, ExitCodeClassification, ExitCodeClassifier,
    IdentityResolver, ReconciliationEngine, ReconciliationResult,
};
use crate::shared::error::ScanError;
use crate::shared::Result;
use std::path::PathBuf;

/// Number of backend queries per run, for progress reporting
const BACKEND_STEPS: usize = 4;

/// ExecuteScanUseCase - runs the scanner and reconciles its results
///
/// Downloads and runs the scanner, classifies its exit code, then always
/// pulls the scan results from the backend and reconciles them against the
/// risk-acceptance assessments. The report is written before the final
/// pass/fail decision so a failing build still leaves its artifact.
///
/// # Type Parameters
/// * `B` - BackendClient implementation
/// * `E` - ScannerExecutor implementation
/// * `A` - AssessmentSource implementation
/// * `O` - OutputPresenter implementation for the report
/// * `PR` - ProgressReporter implementation
pub struct ExecuteScanUseCase<B, E, A, O, PR> {
    backend_client: B,
    scanner_executor: E,
    assessment_source: A,
    output_presenter: O,
    progress_reporter: PR,
}

impl<B, E, A, O, PR> ExecuteScanUseCase<B, E, A, O, PR>
where
    B: BackendClient,
    E: ScannerExecutor,
    A: AssessmentSource,
    O: OutputPresenter,
    PR: ProgressReporter,
{
    /// Creates a new ExecuteScanUseCase with injected dependencies
    pub fn new(
        backend_client: B,
        scanner_executor: E,
        assessment_source: A,
        output_presenter: O,
        progress_reporter: PR,
    ) -> Self {
        Self {
            backend_client,
            scanner_executor,
            assessment_source,
            output_presenter,
            progress_reporter,
        }
    }

    /// Executes one scan and reconciliation run
    ///
    /// # Errors
    /// The error message is the classified scanner message, the literal
    /// `License Policy Violations found`, or the backend / I/O failure that
    /// stopped the run.
    pub async fn execute(&self, options: ScanOptions) -> Result<ScanResponse> {
        self.progress_reporter.register_secret(&options.token);
        options.validate()?;

        // Step 1: Per-run configuration; nothing is shared between runs
        let classifier = build_classifier(&options);
        let resolver = IdentityResolver::new(build_registry(&options)?);

        // Step 2: Assessments first, so a broken file fails before a long scan
        let assessments = self.load_assessments()?;

        // Step 3: Scanner
        let classification = self.run_scanner(&options, &classifier).await?;

        // Step 4: Backend results, fetched regardless of the scanner outcome
        let version_name = options.version_name();
        let snapshot = self
            .fetch_snapshot(&options.project_name, &version_name)
            .await?;

        // Step 5: Reconciliation
        let engine = ReconciliationEngine::new(resolver);
        let result = engine.reconcile(snapshot, &assessments);
        self.report_diagnostics(&result);

        // Step 6: Report
        let policy_violations = result.policy_violations;
        let report = ReportBuilder::build(
            result,
            &classification,
            ReportMetadata::generate(&options.project_name, &version_name),
        );
        self.progress_reporter.report(&format!(
            "📊 {} policy violation(s), {} unassessed vulnerability(ies) ({} major), {} assessed",
            report.policy_violations,
            report.unassessed_vulnerabilities.total_count(),
            report.major_vulnerabilities,
            report.assessed_vulnerabilities.total_count()
        ));
        self.output_presenter
            .present(&ReportBuilder::to_json(&report)?)?;

        // Step 7: Final decision
        if let Some(error) = decide_outcome(policy_violations, &classification, &options) {
            return Err(error.into());
        }

        self.progress_reporter
            .report_completion("✅ Scan and reconciliation completed successfully");
        Ok(ScanResponse::new(report))
    }

    fn load_assessments(&self) -> Result<Vec<Assessment>> {
        let assessments = self.assessment_source.load_assessments()?;
        if !assessments.is_empty() {
            self.progress_reporter
                .report(&format!("📋 Loaded {} assessment(s)", assessments.len()));
        }
        Ok(assessments)
    }

    /// Downloads, runs and removes the scanner; returns the classified exit code
    async fn run_scanner(
        &self,
        options: &ScanOptions,
        classifier: &ExitCodeClassifier,
    ) -> Result<ExitCodeClassification> {
        let release = ScannerRelease::resolve(options, |key| std::env::var(key).ok())?;
        let script_path = options.working_dir.join(SCANNER_SCRIPT);

        // Removes the script on every path out of this function, including
        // errors, the timeout and a dropped future.
        let _cleanup = ScannerCleanup {
            executor: &self.scanner_executor,
            reporter: &self.progress_reporter,
            path: script_path.clone(),
        };

        self.progress_reporter.report(&format!(
            "⬇️  Downloading scanner from {}",
            release.download_url
        ));
        self.scanner_executor
            .download(&release.download_url, &script_path)
            .await?;

        let mut env = vec![("BLACKDUCK_SKIP_PHONE_HOME".to_string(), "true".to_string())];
        env.extend(options.environment()?);

        let invocation = ScannerInvocation {
            executable: format!("./{}", SCANNER_SCRIPT),
            args: build_scanner_args(&[], options),
            working_dir: options.working_dir.clone(),
            env,
        };
        self.progress_reporter
            .report(&format!("▶️  {}", invocation.command_line()));
        self.progress_reporter.start_spinner("🔍 Running scanner...");

        let exit_code = match tokio::time::timeout(
            options.scan_timeout,
            self.scanner_executor.run(&invocation),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(ScanError::ScannerTimedOut {
                    seconds: options.scan_timeout.as_secs(),
                }
                .into())
            }
        };

        let classification = classifier.classify(exit_code);
        if classification.is_success() {
            self.progress_reporter
                .report(&format!("✅ {}", classification.message));
        } else {
            self.progress_reporter.report_error(&format!(
                "⚠️  Scanner exited with code {}: {}",
                exit_code, classification.message
            ));
        }

        Ok(classification)
    }

    async fn fetch_snapshot(&self, project_name: &str, version_name: &str) -> Result<ScanSnapshot> {
        self.progress_reporter.report(&format!(
            "🔗 Loading scan results for {} / {}",
            project_name, version_name
        ));

        self.progress_reporter
            .report_progress(0, BACKEND_STEPS, Some("components"));
        let components = self
            .backend_client
            .get_components(project_name, version_name)
            .await?;

        self.progress_reporter
            .report_progress(1, BACKEND_STEPS, Some("hierarchical components"));
        let hierarchical_components = self
            .backend_client
            .get_hierarchical_components(project_name, version_name)
            .await?;

        self.progress_reporter
            .report_progress(2, BACKEND_STEPS, Some("vulnerabilities"));
        let vulnerabilities = self
            .backend_client
            .get_vulnerabilities(project_name, version_name)
            .await?;

        self.progress_reporter
            .report_progress(3, BACKEND_STEPS, Some("policy status"));
        let policy_status = self
            .backend_client
            .get_policy_status(project_name, version_name)
            .await?;
        self.progress_reporter
            .report_progress(BACKEND_STEPS, BACKEND_STEPS, Some("done"));

        Ok(ScanSnapshot {
            components,
            hierarchical_components,
            vulnerabilities,
            policy_status,
        })
    }

    fn report_diagnostics(&self, result: &ReconciliationResult) {
        for key in &result.duplicate_components {
            self.progress_reporter.report_error(&format!(
                "⚠️  Warning: Component '{}' appears more than once; the first occurrence is used.",
                key
            ));
        }

        if result.unattached_vulnerabilities > 0 {
            self.progress_reporter.report_error(&format!(
                "⚠️  Warning: {} vulnerability(ies) reference components missing from the hierarchical BOM.",
                result.unattached_vulnerabilities
            ));
        }

        for failure in &result.resolution_failures {
            self.progress_reporter.report_error(&format!(
                "⚠️  Warning: Assessment for {} skipped purl: {}",
                failure.vulnerability_name, failure.reason
            ));
        }

        for assessment in &result.unapplied_assessments {
            self.progress_reporter.report_error(&format!(
                "⚠️  Warning: Assessment for {} did not apply to any vulnerability.",
                assessment.vulnerability_name
            ));
        }
    }
}

/// Decides the error that ends the run, if any.
///
/// - policy violations fail on the policy whenever the scanner passed or
///   failed on its own policy check;
/// - a scanner failure for any other reason without policy violations fails
///   with its classification;
/// - when both occur the policy error wins only if failing on severe
///   vulnerabilities was requested.
///
/// `failOn: NONE` removes the policy error entirely.
pub fn decide_outcome(
    policy_violations: usize,
    classification: &ExitCodeClassification,
    options: &ScanOptions,
) -> Option<ScanError> {
    let policy_error = (policy_violations > 0 && !options.policy_failure_disabled()).then_some(
        ScanError::PolicyViolationDetected {
            count: policy_violations,
        },
    );
    let scanner_error = classification.clone().into_error();

    match (policy_error, scanner_error) {
        (Some(policy), Some(scanner)) => {
            if classification.is_policy_failure() || options.fail_on_severe_vulnerabilities {
                Some(policy)
            } else {
                Some(scanner)
            }
        }
        (Some(policy), None) => Some(policy),
        (None, scanner) => scanner,
    }
}

fn build_classifier(options: &ScanOptions) -> ExitCodeClassifier {
    options
        .exit_code_overrides
        .iter()
        .fold(ExitCodeClassifier::new(), |classifier, entry| {
            classifier.with_entry(entry.code, entry.category.clone(), entry.description.clone())
        })
}

fn build_registry(options: &ScanOptions) -> Result<EcosystemRegistry> {
    let mut registry = EcosystemRegistry::with_defaults();
    for ecosystem in &options.ecosystems {
        let template = CoordinateTemplate::new(ecosystem.template.clone())
            .map_err(|message| ScanError::Validation { message })?;
        registry.register(&ecosystem.pkg_type, &ecosystem.namespace, template);
    }
    Ok(registry)
}

/// Removes the downloaded scanner when dropped
struct ScannerCleanup<'a, E: ScannerExecutor, PR: ProgressReporter> {
    executor: &'a E,
    reporter: &'a PR,
    path: PathBuf,
}

impl<E: ScannerExecutor, PR: ProgressReporter> Drop for ScannerCleanup<'_, E, PR> {
    fn drop(&mut self) {
        if let Err(e) = self.executor.remove(&self.path) {
            self.reporter.report_error(&format!(
                "⚠️  Warning: Failed to remove scanner {}: {}",
                self.path.display(),
                e
            ));
        }
    }
}
