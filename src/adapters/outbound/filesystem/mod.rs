/// Filesystem adapters for file I/O operations
mod assessment_file_reader;
mod file_writer;

pub use assessment_file_reader::{AssessmentFileReader, DEFAULT_ASSESSMENT_FILE};
pub use file_writer::{FileSystemWriter, StdoutPresenter, DEFAULT_REPORT_FILE};
