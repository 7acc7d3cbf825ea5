use crate::shared::Result;

/// OutputPresenter port for presenting final output
///
/// This port abstracts the output destination (stdout, file, etc.)
/// where the serialized reconciliation report is presented.
pub trait OutputPresenter {
    /// Presents the serialized report to the output destination
    ///
    /// # Errors
    /// Returns an error if:
    /// - Writing to the output destination fails
    /// - The destination is a symbolic link
    /// - File permissions prevent writing
    fn present(&self, content: &str) -> Result<()>;
}

impl<P: OutputPresenter + ?Sized> OutputPresenter for Box<P> {
    fn present(&self, content: &str) -> Result<()> {
        (**self).present(content)
    }
}
