/// Result alias used throughout the crate; errors are `anyhow::Error` so
/// adapters can attach context while `ScanError` stays downcastable.
pub type Result<T> = std::result::Result<T, anyhow::Error>;
