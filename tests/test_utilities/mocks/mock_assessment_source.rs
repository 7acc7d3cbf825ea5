use sca_reconcile::prelude::*;

/// Mock AssessmentSource returning a fixed list
#[derive(Default)]
pub struct MockAssessmentSource {
    assessments: Vec<Assessment>,
}

impl MockAssessmentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assessment(
        mut self,
        vulnerability_name: &str,
        analysis: AnalysisOutcome,
        purls: &[&str],
    ) -> Self {
        self.assessments.push(Assessment::new(
            vulnerability_name,
            analysis,
            purls.iter().map(|p| p.to_string()).collect(),
        ));
        self
    }
}

impl AssessmentSource for MockAssessmentSource {
    fn load_assessments(&self) -> Result<Vec<Assessment>> {
        Ok(self.assessments.clone())
    }
}
