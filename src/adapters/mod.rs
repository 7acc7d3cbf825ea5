/// Adapters layer - Black Duck, scanner process, filesystem and console
/// implementations of the outbound ports.
pub mod outbound;
