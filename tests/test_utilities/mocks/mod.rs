/// Mock implementations for testing
mod mock_assessment_source;
mod mock_backend_client;
mod mock_output_presenter;
mod mock_progress_reporter;
mod mock_scanner_executor;

pub use mock_assessment_source::MockAssessmentSource;
pub use mock_backend_client::MockBackendClient;
pub use mock_output_presenter::MockOutputPresenter;
pub use mock_progress_reporter::MockProgressReporter;
pub use mock_scanner_executor::MockScannerExecutor;
