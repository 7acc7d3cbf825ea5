use super::identity_resolver::IdentityResolver;
use crate::reconciliation::domain::{
    Assessment, Component, ComponentKey, ComponentLookup, HierarchicalComponent, PolicyStatus,
    ScanSnapshot, Vulnerability, VulnerabilitySet, IN_VIOLATION,
};
use serde::Serialize;
use std::collections::HashMap;

/// A purl from an assessment that could not be turned into a vendor coordinate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurlResolutionFailure {
    pub vulnerability_name: String,
    pub purl: String,
    pub reason: String,
}

/// Vulnerabilities split by whether an assessment covers them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssessedPartition {
    pub unassessed: VulnerabilitySet,
    pub assessed: VulnerabilitySet,
    pub resolution_failures: Vec<PurlResolutionFailure>,
    /// Assessments that matched no vulnerability of this scan
    pub unapplied_assessments: Vec<Assessment>,
}

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationResult {
    pub policy_violations: usize,
    pub policy_status: PolicyStatus,
    pub unassessed: VulnerabilitySet,
    pub assessed: VulnerabilitySet,
    /// Unassessed vulnerabilities whose remediation status is not terminal
    pub active_vulnerabilities: usize,
    /// Active unassessed vulnerabilities in the HIGH/CRITICAL tier
    pub major_vulnerabilities: usize,
    /// Vulnerabilities whose component is missing from the hierarchical BOM
    pub unattached_vulnerabilities: usize,
    pub duplicate_components: Vec<ComponentKey>,
    pub resolution_failures: Vec<PurlResolutionFailure>,
    pub unapplied_assessments: Vec<Assessment>,
}

impl ReconciliationResult {
    pub fn has_policy_violations(&self) -> bool {
        self.policy_violations > 0
    }
}

/// Coordinates an assessment resolved to, computed once per pass
struct ResolvedAssessment<'a> {
    assessment: &'a Assessment,
    coordinates: Vec<String>,
}

/// Correlates components, vulnerabilities and risk-acceptance assessments.
///
/// Holds no state between passes; build one per run so identity resolution
/// never leaks across runs.
#[derive(Debug, Default)]
pub struct ReconciliationEngine {
    resolver: IdentityResolver,
}

impl ReconciliationEngine {
    pub fn new(resolver: IdentityResolver) -> Self {
        Self { resolver }
    }

    pub fn is_active_policy_violation(status: &str) -> bool {
        status == IN_VIOLATION
    }

    pub fn count_active_policy_violations(components: &[Component]) -> usize {
        components
            .iter()
            .filter(|component| Self::is_active_policy_violation(&component.policy_status))
            .count()
    }

    pub fn is_active_vulnerability(vulnerability: &Vulnerability) -> bool {
        !vulnerability.remediation_status.is_terminal()
    }

    /// Severity alone decides the tier; numeric scores are not consulted
    pub fn is_major_vulnerability(vulnerability: &Vulnerability) -> bool {
        !vulnerability.ignored && vulnerability.severity.is_major()
    }

    /// Attaches the matching hierarchical component key to each vulnerability.
    ///
    /// Vulnerabilities without a match keep `component == None` and stay in
    /// the set; backend data may be eventually consistent.
    pub fn attach_components(
        vulnerabilities: VulnerabilitySet,
        lookup: &ComponentLookup<'_>,
    ) -> VulnerabilitySet {
        vulnerabilities
            .into_iter()
            .map(|mut vulnerability| {
                let key = vulnerability.component_key();
                vulnerability.component = lookup.contains(&key).then_some(key);
                vulnerability
            })
            .collect()
    }

    /// Splits vulnerabilities into unassessed and assessed.
    ///
    /// A vulnerability is assessed when an assessment with the same name lists
    /// a purl whose vendor coordinate equals one of the origins of the
    /// vulnerability's component. Missing components and unresolvable purls
    /// never move a vulnerability out of the unassessed set.
    pub fn filter_assessed_vulnerabilities(
        &self,
        vulnerabilities: VulnerabilitySet,
        assessments: &[Assessment],
        lookup: &ComponentLookup<'_>,
    ) -> AssessedPartition {
        let mut resolution_failures = Vec::new();
        let resolved = self.resolve_assessments(assessments, &mut resolution_failures);

        let mut by_name: HashMap<&str, Vec<usize>> = HashMap::new();
        for (index, entry) in resolved.iter().enumerate() {
            by_name
                .entry(entry.assessment.vulnerability_name.as_str())
                .or_default()
                .push(index);
        }

        let mut applied = vec![false; resolved.len()];
        let mut unassessed = VulnerabilitySet::default();
        let mut assessed = VulnerabilitySet::default();

        for vulnerability in vulnerabilities {
            let component = Self::component_of(&vulnerability, lookup);
            let matched = match (component, by_name.get(vulnerability.name.as_str())) {
                (Some(component), Some(candidates)) => candidates
                    .iter()
                    .copied()
                    .find(|&index| Self::covers(&resolved[index], component)),
                _ => None,
            };

            match matched {
                Some(index) => {
                    applied[index] = true;
                    assessed.push(vulnerability);
                }
                None => unassessed.push(vulnerability),
            }
        }

        let unapplied_assessments = resolved
            .iter()
            .zip(applied)
            .filter(|(_, applied)| !applied)
            .map(|(entry, _)| entry.assessment.clone())
            .collect();

        AssessedPartition {
            unassessed,
            assessed,
            resolution_failures,
            unapplied_assessments,
        }
    }

    /// Runs the full pass over one scan snapshot
    pub fn reconcile(&self, snapshot: ScanSnapshot, assessments: &[Assessment]) -> ReconciliationResult {
        let ScanSnapshot {
            components,
            hierarchical_components,
            vulnerabilities,
            policy_status,
        } = snapshot;

        let policy_violations = Self::count_active_policy_violations(&components);
        let lookup = ComponentLookup::build(&hierarchical_components);

        let vulnerabilities = Self::attach_components(vulnerabilities, &lookup);
        let unattached_vulnerabilities = vulnerabilities
            .iter()
            .filter(|vulnerability| vulnerability.component.is_none())
            .count();

        let partition = self.filter_assessed_vulnerabilities(vulnerabilities, assessments, &lookup);

        let active_vulnerabilities = partition
            .unassessed
            .iter()
            .filter(|vulnerability| Self::is_active_vulnerability(vulnerability))
            .count();
        let major_vulnerabilities = partition
            .unassessed
            .iter()
            .filter(|vulnerability| {
                Self::is_active_vulnerability(vulnerability)
                    && Self::is_major_vulnerability(vulnerability)
            })
            .count();

        ReconciliationResult {
            policy_violations,
            policy_status,
            unassessed: partition.unassessed,
            assessed: partition.assessed,
            active_vulnerabilities,
            major_vulnerabilities,
            unattached_vulnerabilities,
            duplicate_components: lookup.duplicates().to_vec(),
            resolution_failures: partition.resolution_failures,
            unapplied_assessments: partition.unapplied_assessments,
        }
    }

    fn resolve_assessments<'a>(
        &self,
        assessments: &'a [Assessment],
        failures: &mut Vec<PurlResolutionFailure>,
    ) -> Vec<ResolvedAssessment<'a>> {
        assessments
            .iter()
            .map(|assessment| {
                let mut coordinates = Vec::with_capacity(assessment.purls.len());
                for purl in &assessment.purls {
                    match self.resolver.to_vendor_coordinate(purl) {
                        Ok(resolved) => coordinates.push(resolved.coordinate),
                        Err(e) => failures.push(PurlResolutionFailure {
                            vulnerability_name: assessment.vulnerability_name.clone(),
                            purl: purl.clone(),
                            reason: e.to_string(),
                        }),
                    }
                }
                ResolvedAssessment {
                    assessment,
                    coordinates,
                }
            })
            .collect()
    }

    fn component_of<'a>(
        vulnerability: &Vulnerability,
        lookup: &ComponentLookup<'a>,
    ) -> Option<&'a HierarchicalComponent> {
        match &vulnerability.component {
            Some(key) => lookup.get(key),
            None => lookup.get(&vulnerability.component_key()),
        }
    }

    fn covers(entry: &ResolvedAssessment<'_>, component: &HierarchicalComponent) -> bool {
        entry
            .coordinates
            .iter()
            .any(|coordinate| component.has_origin(coordinate))
    }
}
