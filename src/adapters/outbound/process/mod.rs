/// Process adapters for running the external scanner
mod shell_scanner_executor;

pub use shell_scanner_executor::ShellScannerExecutor;
