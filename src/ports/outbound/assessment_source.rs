use crate::reconciliation::domain::Assessment;
use crate::shared::Result;

/// AssessmentSource port for reading risk-acceptance assessments
///
/// Returns the full list for one run, in the order the source defines.
/// A source with nothing configured returns an empty list.
pub trait AssessmentSource {
    /// # Errors
    /// Returns an error if the source exists but cannot be read or parsed
    fn load_assessments(&self) -> Result<Vec<Assessment>>;
}
