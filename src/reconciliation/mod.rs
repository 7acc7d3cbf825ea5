/// Reconciliation domain layer
///
/// Pure business logic: the scan snapshot value objects, exit code
/// classification, package identity resolution and the reconciliation engine.
/// Nothing in this layer performs I/O.
pub mod domain;
pub mod services;
