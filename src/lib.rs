//! sca-reconcile - Detect scan runner and Black Duck reconciliation
//!
//! This library runs the Synopsys Detect scanner, classifies its exit code,
//! pulls the scan results from Black Duck and reconciles the vulnerabilities
//! against externally authored risk-acceptance assessments, following
//! hexagonal architecture and Domain-Driven Design principles.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`reconciliation`): Pure business logic and domain models
//! - **Application Layer** (`application`): Use cases, DTOs and scanner arguments
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): Concrete implementations of ports
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use sca_reconcile::prelude::*;
//! use std::path::PathBuf;
//!
//! # async fn run() -> Result<()> {
//! // Create adapters
//! let backend = BlackDuckClient::new("https://blackduck.example.com", "api-token")?;
//! let executor = ShellScannerExecutor::new()?;
//! let assessments = AssessmentFileReader::optional(PathBuf::from(".pipeline/assessments.yaml"));
//! let presenter = FileSystemWriter::new(PathBuf::from("blackduck-ip.json"));
//! let progress_reporter = StderrProgressReporter::new();
//!
//! // Create use case
//! let use_case = ExecuteScanUseCase::new(backend, executor, assessments, presenter, progress_reporter);
//!
//! // Execute
//! let options = ScanOptions {
//!     server_url: "https://blackduck.example.com".to_string(),
//!     token: "api-token".to_string(),
//!     project_name: "my-project".to_string(),
//!     version: "1.2.3".to_string(),
//!     ..Default::default()
//! };
//! let response = use_case.execute(options).await?;
//! println!("{} policy violation(s)", response.report.policy_violations);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod ports;
pub mod reconciliation;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::{
        AssessmentFileReader, FileSystemWriter, StdoutPresenter,
    };
    pub use crate::adapters::outbound::network::BlackDuckClient;
    pub use crate::adapters::outbound::process::ShellScannerExecutor;
    pub use crate::application::dto::{
        EcosystemTemplate, ExitCodeOverride, ReconciliationReport, ScanOptions, ScanResponse,
        VersioningModel,
    };
    pub use crate::application::use_cases::ExecuteScanUseCase;
    pub use crate::ports::outbound::{
        AssessmentSource, BackendClient, OutputPresenter, ProgressReporter, ScannerExecutor,
        ScannerInvocation,
    };
    pub use crate::reconciliation::domain::{
        AnalysisOutcome, Assessment, Component, HierarchicalComponent, Origin, PolicyStatus,
        PolicyViolationDetails, RemediationStatus, ScanSnapshot, Severity, Vulnerability,
        VulnerabilitySet,
    };
    pub use crate::reconciliation::services::{
        EcosystemRegistry, ExitCodeClassifier, IdentityResolver, ReconciliationEngine,
        ReconciliationResult,
    };
    pub use crate::shared::error::{ExitCode, ScanError};
    pub use crate::shared::Result;
}
