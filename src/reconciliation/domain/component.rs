use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Policy status the backend assigns to a component that breaches a policy
pub const IN_VIOLATION: &str = "IN_VIOLATION";

/// A component of the scanned project version as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_language: Option<String>,
    pub policy_status: String,
}

impl Component {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        primary_language: Option<String>,
        policy_status: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            primary_language,
            policy_status: policy_status.into(),
        }
    }
}

/// Where a component came from, in the backend's native coordinate scheme
///
/// `vendor_coordinate` syntax depends on the ecosystem, e.g. Maven uses
/// `group:artifact:version` and npm uses `name@version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Origin {
    pub ecosystem_namespace: String,
    pub vendor_coordinate: String,
}

impl Origin {
    pub fn new(ecosystem_namespace: impl Into<String>, vendor_coordinate: impl Into<String>) -> Self {
        Self {
            ecosystem_namespace: ecosystem_namespace.into(),
            vendor_coordinate: vendor_coordinate.into(),
        }
    }
}

/// A component from the hierarchical bill of materials, carrying its origins
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchicalComponent {
    pub name: String,
    pub version: String,
    pub origins: Vec<Origin>,
    pub policy_status: String,
}

impl HierarchicalComponent {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        origins: Vec<Origin>,
        policy_status: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            origins,
            policy_status: policy_status.into(),
        }
    }

    pub fn key(&self) -> ComponentKey {
        ComponentKey::new(&self.name, &self.version)
    }

    /// Returns true if any origin carries exactly this vendor coordinate
    pub fn has_origin(&self, vendor_coordinate: &str) -> bool {
        self.origins
            .iter()
            .any(|origin| origin.vendor_coordinate == vendor_coordinate)
    }
}

/// Lookup key of a component within one scan snapshot: `<name>/<version>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ComponentKey(String);

impl ComponentKey {
    pub fn new(name: &str, version: &str) -> Self {
        Self(format!("{}/{}", name, version))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index from [`ComponentKey`] to the hierarchical components of one snapshot.
///
/// Borrowed from the snapshot it was built from, so it cannot outlive it.
/// When a key appears more than once the first component wins and the key is
/// remembered in [`ComponentLookup::duplicates`].
#[derive(Debug, Default)]
pub struct ComponentLookup<'a> {
    by_key: HashMap<ComponentKey, &'a HierarchicalComponent>,
    duplicates: Vec<ComponentKey>,
}

impl<'a> ComponentLookup<'a> {
    pub fn build(components: &'a [HierarchicalComponent]) -> Self {
        let mut by_key = HashMap::with_capacity(components.len());
        let mut duplicates = Vec::new();

        for component in components {
            let key = component.key();
            if by_key.contains_key(&key) {
                duplicates.push(key);
            } else {
                by_key.insert(key, component);
            }
        }

        Self { by_key, duplicates }
    }

    pub fn get(&self, key: &ComponentKey) -> Option<&'a HierarchicalComponent> {
        self.by_key.get(key).copied()
    }

    pub fn contains(&self, key: &ComponentKey) -> bool {
        self.by_key.contains_key(key)
    }

    /// Keys that appeared more than once in the snapshot, in encounter order
    pub fn duplicates(&self) -> &[ComponentKey] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
