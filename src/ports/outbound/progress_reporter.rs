/// ProgressReporter port for reporting progress during operations
///
/// This port abstracts progress reporting (e.g., to stderr)
/// to provide user feedback during long-running operations.
/// Every message passes through secret masking once a secret is registered.
pub trait ProgressReporter {
    /// Reports a progress message
    fn report(&self, message: &str);

    /// Reports progress with a percentage
    ///
    /// # Arguments
    /// * `current` - Current progress value
    /// * `total` - Total expected value
    /// * `message` - Optional message to include
    fn report_progress(&self, current: usize, total: usize, message: Option<&str>);

    /// Reports an error or warning message
    fn report_error(&self, message: &str);

    /// Reports completion of an operation
    fn report_completion(&self, message: &str);

    /// Indicates a long-running step that gives no intermediate progress.
    /// The indicator stops at the next report call.
    fn start_spinner(&self, message: &str) {
        self.report(message);
    }

    /// Registers a value (e.g. an API token) that must never appear in output
    fn register_secret(&self, secret: &str);
}
