/// Data Transfer Objects for application layer
///
/// DTOs are used to transfer data between the application layer
/// and adapters, keeping the domain layer isolated.
mod reconciliation_report;
mod scan_options;

pub use reconciliation_report::{
    ReconciliationReport, ReportDiagnostics, ReportMetadata, ScanResponse, ScannerResultView,
};
pub use scan_options::{
    EcosystemTemplate, ExitCodeOverride, ScanOptions, VersioningModel, DEFAULT_SCANNER_BASE_URL,
    DEFAULT_SCAN_TIMEOUT,
};
