use crate::shared::error::IdentityError;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Package URL (purl) identifying a package independently of any vendor.
///
/// Format: `pkg:type/namespace/name@version?qualifiers#subpath`
///
/// Examples:
/// - `pkg:maven/org.springframework/spring-web@5.3.9`
/// - `pkg:npm/%40angular/core@16.2.0`
/// - `pkg:nuget/Newtonsoft.Json@13.0.1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageUrl {
    /// Ecosystem type, always lower case (maven, npm, nuget, ...)
    pub pkg_type: String,
    /// Maven group, npm scope, or any other ecosystem-specific prefix
    pub namespace: Option<String>,
    pub name: String,
    pub version: Option<String>,
    pub qualifiers: BTreeMap<String, String>,
    pub subpath: Option<String>,
}

impl PackageUrl {
    /// Parses a purl string; every component comes back percent-decoded.
    pub fn parse(purl: &str) -> Result<Self, IdentityError> {
        let malformed = |reason: String| IdentityError::MalformedPurl {
            purl: purl.to_string(),
            reason,
        };

        let parsed =
            packageurl::PackageUrl::from_str(purl.trim()).map_err(|e| malformed(e.to_string()))?;

        if parsed.name().is_empty() {
            return Err(malformed("missing package name".to_string()));
        }
        if parsed.version() == Some("") {
            return Err(malformed("version after '@' is empty".to_string()));
        }

        Ok(Self {
            pkg_type: parsed.ty().to_ascii_lowercase(),
            namespace: parsed
                .namespace()
                .filter(|namespace| !namespace.is_empty())
                .map(str::to_string),
            name: parsed.name().to_string(),
            version: parsed.version().map(str::to_string),
            qualifiers: parsed
                .qualifiers()
                .iter()
                .map(|(key, value)| (key.to_ascii_lowercase(), value.to_string()))
                .collect(),
            subpath: parsed
                .subpath()
                .filter(|subpath| !subpath.is_empty())
                .map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_maven() {
        let purl = PackageUrl::parse("pkg:maven/spring/spring-web@5.3.9").unwrap();
        assert_eq!(purl.pkg_type, "maven");
        assert_eq!(purl.namespace.as_deref(), Some("spring"));
        assert_eq!(purl.name, "spring-web");
        assert_eq!(purl.version.as_deref(), Some("5.3.9"));
        assert!(purl.qualifiers.is_empty());
        assert!(purl.subpath.is_none());
    }

    #[test]
    fn test_parse_npm_scoped_encoded() {
        let purl = PackageUrl::parse("pkg:npm/%40angular/core@16.2.0").unwrap();
        assert_eq!(purl.namespace.as_deref(), Some("@angular"));
        assert_eq!(purl.name, "core");
        assert_eq!(purl.version.as_deref(), Some("16.2.0"));
    }

    #[test]
    fn test_parse_without_namespace() {
        let purl = PackageUrl::parse("pkg:nuget/Newtonsoft.Json@13.0.1").unwrap();
        assert_eq!(purl.pkg_type, "nuget");
        assert_eq!(purl.name, "Newtonsoft.Json");
        assert!(purl.namespace.is_none());
    }

    #[test]
    fn test_parse_without_version() {
        let purl = PackageUrl::parse("pkg:maven/org.apache/commons-io").unwrap();
        assert_eq!(purl.name, "commons-io");
        assert!(purl.version.is_none());
    }

    #[test]
    fn test_parse_qualifiers_and_subpath() {
        let purl =
            PackageUrl::parse("pkg:maven/org.apache/commons-io@2.11.0?type=jar&classifier=sources#src/main")
                .unwrap();
        assert_eq!(purl.version.as_deref(), Some("2.11.0"));
        assert_eq!(purl.qualifiers.get("type").map(String::as_str), Some("jar"));
        assert_eq!(
            purl.qualifiers.get("classifier").map(String::as_str),
            Some("sources")
        );
        assert_eq!(purl.subpath.as_deref(), Some("src/main"));
    }

    #[test]
    fn test_parse_nested_namespace() {
        let purl = PackageUrl::parse("pkg:golang/github.com/gin-gonic/gin@v1.9.1").unwrap();
        assert_eq!(purl.namespace.as_deref(), Some("github.com/gin-gonic"));
        assert_eq!(purl.name, "gin");
    }

    #[test]
    fn test_parse_rejects_missing_scheme() {
        let err = PackageUrl::parse("maven/spring/spring-web@5.3.9").unwrap_err();
        assert!(matches!(err, IdentityError::MalformedPurl { .. }));
    }

    #[test]
    fn test_parse_rejects_missing_name() {
        assert!(PackageUrl::parse("pkg:maven").is_err());
        assert!(PackageUrl::parse("pkg:maven/").is_err());
    }

    #[test]
    fn test_parse_error_names_the_purl() {
        let err = PackageUrl::parse("not a purl").unwrap_err();
        assert!(err.to_string().contains("'not a purl'"));
    }
}
