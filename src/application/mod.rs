/// Application layer - Use cases and DTOs
///
/// This layer contains the application logic that orchestrates
/// domain services and coordinates with infrastructure through ports.
pub mod dto;
pub mod report_builder;
pub mod scanner_args;
pub mod scanner_release;
pub mod use_cases;
