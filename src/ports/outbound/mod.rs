/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (backend, scanner process, file system,
/// console).
pub mod assessment_source;
pub mod backend_client;
pub mod output_presenter;
pub mod progress_reporter;
pub mod scanner_executor;

pub use assessment_source::AssessmentSource;
pub use backend_client::BackendClient;
pub use output_presenter::OutputPresenter;
pub use progress_reporter::ProgressReporter;
pub use scanner_executor::{ScannerExecutor, ScannerInvocation};
