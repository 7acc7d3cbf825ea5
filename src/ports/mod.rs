/// Ports module defining interfaces for hexagonal architecture
///
/// The application core drives the backend, the scanner process and the
/// output destinations only through the outbound ports defined here.
pub mod outbound;
