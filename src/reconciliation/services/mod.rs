pub mod exit_code_classifier;
pub mod identity_resolver;
pub mod reconciliation_engine;

pub use exit_code_classifier::{
    ExitCodeClassification, ExitCodeClassifier, ExitCodeEntry, FAILURE_POLICY_VIOLATION,
    FAILURE_UNKNOWN_ERROR,
    UNKNOWN_ERROR_THRESHOLD, UNKNOWN_TABLE_ENTRY,
};
pub use identity_resolver::{
    CoordinateBuilder, CoordinateTemplate, EcosystemRegistry, IdentityResolver, VendorCoordinate,
};
pub use reconciliation_engine::{
    AssessedPartition, PurlResolutionFailure, ReconciliationEngine, ReconciliationResult,
};
