use crate::reconciliation::domain::PackageUrl;
use crate::shared::error::IdentityError;
use std::collections::HashMap;
use std::fmt;

/// Builds a vendor coordinate from a parsed purl.
///
/// Returns the reason as `Err` when the purl lacks something the ecosystem
/// needs; the resolver turns it into [`IdentityError::MalformedPurl`].
pub trait CoordinateBuilder: Send + Sync {
    fn build(&self, purl: &PackageUrl) -> Result<String, String>;
}

impl<F> CoordinateBuilder for F
where
    F: Fn(&PackageUrl) -> Result<String, String> + Send + Sync,
{
    fn build(&self, purl: &PackageUrl) -> Result<String, String> {
        self(purl)
    }
}

/// Coordinate builder driven by a `{namespace}` / `{name}` / `{version}` template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateTemplate {
    template: String,
}

impl CoordinateTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self, String> {
        let template = template.into();
        if !template.contains("{name}") {
            return Err(format!(
                "coordinate template '{}' must contain {{name}}",
                template
            ));
        }
        Ok(Self { template })
    }
}

impl CoordinateBuilder for CoordinateTemplate {
    /// Substitutes placeholders in one left-to-right pass, so values that
    /// themselves look like placeholders are copied verbatim.
    fn build(&self, purl: &PackageUrl) -> Result<String, String> {
        let mut coordinate = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('{') {
            coordinate.push_str(&rest[..start]);
            let tail = &rest[start..];
            if let Some(after) = tail.strip_prefix("{name}") {
                coordinate.push_str(&purl.name);
                rest = after;
            } else if let Some(after) = tail.strip_prefix("{namespace}") {
                let namespace = purl
                    .namespace
                    .as_deref()
                    .ok_or_else(|| format!("{} purls need a namespace", purl.pkg_type))?;
                coordinate.push_str(namespace);
                rest = after;
            } else if let Some(after) = tail.strip_prefix("{version}") {
                coordinate.push_str(required_version(purl)?);
                rest = after;
            } else {
                coordinate.push('{');
                rest = &tail[1..];
            }
        }
        coordinate.push_str(rest);

        Ok(coordinate)
    }
}

fn required_version(purl: &PackageUrl) -> Result<&str, String> {
    purl.version
        .as_deref()
        .ok_or_else(|| "a version is required to build a coordinate".to_string())
}

/// `group:artifact:version`
fn maven_coordinate(purl: &PackageUrl) -> Result<String, String> {
    let group = purl
        .namespace
        .as_deref()
        .ok_or_else(|| "maven purls need a group namespace".to_string())?;
    Ok(format!("{}:{}:{}", group, purl.name, required_version(purl)?))
}

/// `name@version`, or `@scope/name@version` for scoped packages
fn npm_coordinate(purl: &PackageUrl) -> Result<String, String> {
    let version = required_version(purl)?;
    Ok(match purl.namespace.as_deref() {
        Some(scope) => format!("{}/{}@{}", scope, purl.name, version),
        None => format!("{}@{}", purl.name, version),
    })
}

/// `name:version`
fn nuget_coordinate(purl: &PackageUrl) -> Result<String, String> {
    Ok(format!("{}:{}", purl.name, required_version(purl)?))
}

struct EcosystemEntry {
    namespace: String,
    builder: Box<dyn CoordinateBuilder>,
}

/// Registry of coordinate builders keyed by purl type.
///
/// New ecosystems are added by registration; the matcher never changes.
pub struct EcosystemRegistry {
    entries: HashMap<String, EcosystemEntry>,
}

impl EcosystemRegistry {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registry with Maven, npm and NuGet support
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register("maven", "maven", maven_coordinate);
        registry.register("npm", "npmjs", npm_coordinate);
        registry.register("nuget", "nuget", nuget_coordinate);
        registry
    }

    /// Registers (or replaces) the builder for `pkg_type`
    pub fn register(
        &mut self,
        pkg_type: &str,
        namespace: &str,
        builder: impl CoordinateBuilder + 'static,
    ) {
        self.entries.insert(
            pkg_type.to_ascii_lowercase(),
            EcosystemEntry {
                namespace: namespace.to_string(),
                builder: Box::new(builder),
            },
        );
    }

    pub fn supports(&self, pkg_type: &str) -> bool {
        self.entries.contains_key(&pkg_type.to_ascii_lowercase())
    }

    /// Registered purl types, sorted
    pub fn ecosystems(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl Default for EcosystemRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for EcosystemRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcosystemRegistry")
            .field("ecosystems", &self.ecosystems())
            .finish()
    }
}

/// A purl translated into the backend's coordinate scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorCoordinate {
    pub coordinate: String,
    pub ecosystem_namespace: String,
}

/// Translates package URLs into vendor coordinates comparable with
/// [`Origin::vendor_coordinate`](crate::reconciliation::domain::Origin).
#[derive(Debug, Default)]
pub struct IdentityResolver {
    registry: EcosystemRegistry,
}

impl IdentityResolver {
    pub fn new(registry: EcosystemRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &EcosystemRegistry {
        &self.registry
    }

    pub fn to_vendor_coordinate(&self, purl: &str) -> Result<VendorCoordinate, IdentityError> {
        let parsed = PackageUrl::parse(purl)?;

        let entry = self.registry.entries.get(&parsed.pkg_type).ok_or_else(|| {
            IdentityError::UnsupportedEcosystem {
                purl: purl.to_string(),
                ecosystem: parsed.pkg_type.clone(),
            }
        })?;

        let coordinate =
            entry
                .builder
                .build(&parsed)
                .map_err(|reason| IdentityError::MalformedPurl {
                    purl: purl.to_string(),
                    reason,
                })?;

        Ok(VendorCoordinate {
            coordinate,
            ecosystem_namespace: entry.namespace.clone(),
        })
    }
}
