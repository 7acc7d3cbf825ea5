use crate::ports::outbound::BackendClient;
use crate::reconciliation::domain::{
    Component, HierarchicalComponent, Origin, PolicyStatus, PolicyViolationDetails,
    RemediationStatus, Severity, Vulnerability, VulnerabilitySet,
};
use crate::shared::error::ScanError;
use crate::shared::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Items requested per page; larger listings are read page by page
const PAGE_SIZE: usize = 999;
const LICENSE_POLICY_FILTER: &str = "filter=policyCategory%3Alicense";

/// Refresh the bearer token this long before the server says it expires
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticationResponse {
    bearer_token: String,
    #[serde(default)]
    expires_in_milliseconds: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
    #[serde(default)]
    total_count: Option<usize>,
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
struct Meta {
    #[serde(default)]
    links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    rel: String,
    href: String,
}

impl Meta {
    fn link(&self, rel: &str) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.rel == rel)
            .map(|link| link.href.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct ProjectItem {
    name: String,
    #[serde(rename = "_meta", default)]
    meta: Meta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionItem {
    version_name: String,
    #[serde(rename = "_meta", default)]
    meta: Meta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComponentItem {
    component_name: String,
    #[serde(default)]
    component_version_name: String,
    #[serde(default)]
    primary_language: Option<String>,
    #[serde(default)]
    policy_status: String,
    #[serde(default)]
    origins: Vec<OriginItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OriginItem {
    #[serde(default)]
    external_namespace: String,
    #[serde(default)]
    external_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VulnerableComponentItem {
    component_name: String,
    #[serde(default)]
    component_version_name: String,
    #[serde(default)]
    ignored: bool,
    vulnerability_with_remediation: VulnerabilityItem,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VulnerabilityItem {
    vulnerability_name: String,
    #[serde(default)]
    base_score: f64,
    #[serde(default)]
    overall_score: f64,
    #[serde(default)]
    severity: String,
    #[serde(default)]
    remediation_status: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicyStatusItem {
    #[serde(default)]
    overall_status: String,
    #[serde(default)]
    component_version_policy_violation_details: Option<ViolationDetailsItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViolationDetailsItem {
    #[serde(default)]
    name: String,
    #[serde(default)]
    severity_levels: Vec<SeverityLevelItem>,
}

#[derive(Debug, Deserialize)]
struct SeverityLevelItem {
    name: String,
    #[serde(default)]
    value: u32,
}

impl From<ComponentItem> for Component {
    fn from(item: ComponentItem) -> Self {
        Component::new(
            item.component_name,
            item.component_version_name,
            item.primary_language,
            item.policy_status,
        )
    }
}

impl From<ComponentItem> for HierarchicalComponent {
    fn from(item: ComponentItem) -> Self {
        let origins = item
            .origins
            .into_iter()
            .map(|origin| Origin::new(origin.external_namespace, origin.external_id))
            .collect();
        HierarchicalComponent::new(
            item.component_name,
            item.component_version_name,
            origins,
            item.policy_status,
        )
    }
}

impl From<VulnerableComponentItem> for Vulnerability {
    fn from(item: VulnerableComponentItem) -> Self {
        let details = item.vulnerability_with_remediation;
        Vulnerability::new(
            details.vulnerability_name,
            item.component_name,
            item.component_version_name,
            Severity::from_label(&details.severity),
            RemediationStatus::from_label(&details.remediation_status),
        )
        .with_scores(details.base_score, details.overall_score)
        .with_description(details.description)
        .with_ignored(item.ignored)
    }
}

impl From<PolicyStatusItem> for PolicyStatus {
    fn from(item: PolicyStatusItem) -> Self {
        PolicyStatus {
            overall_status: item.overall_status,
            violation_details: item.component_version_policy_violation_details.map(|details| {
                PolicyViolationDetails {
                    name: details.name,
                    severity_levels: details
                        .severity_levels
                        .into_iter()
                        .map(|level| (level.name, level.value))
                        .collect::<BTreeMap<_, _>>(),
                }
            }),
        }
    }
}

/// Links of one project version, resolved once per client
#[derive(Debug, Clone, PartialEq, Eq)]
struct VersionLinks {
    components: String,
    hierarchical_components: String,
    vulnerable_components: String,
    policy_status: String,
}

impl VersionLinks {
    fn from_meta(meta: &Meta) -> std::result::Result<Self, String> {
        let require = |rel: &str| {
            meta.link(rel)
                .map(str::to_string)
                .ok_or_else(|| format!("project version has no '{}' link", rel))
        };
        Ok(Self {
            components: require("components")?,
            hierarchical_components: require("hierarchical-components")?,
            vulnerable_components: require("vulnerable-components")?,
            policy_status: require("policy-status")?,
        })
    }
}

struct CachedToken {
    bearer: String,
    expires_at: Instant,
}

/// BlackDuckClient adapter for reading scan results from the Black Duck REST API
///
/// This adapter implements the BackendClient port. It exchanges the API
/// token for a bearer token on first use, resolves the project version's
/// links through the project and version listings, and caches both for the
/// lifetime of the client.
pub struct BlackDuckClient {
    client: reqwest::Client,
    server_url: String,
    api_token: String,
    bearer: Mutex<Option<CachedToken>>,
    versions: Mutex<HashMap<(String, String), VersionLinks>>,
}

impl BlackDuckClient {
    pub fn new(server_url: &str, api_token: &str) -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("sca-reconcile/{}", version);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            server_url: server_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
            bearer: Mutex::new(None),
            versions: Mutex::new(HashMap::new()),
        })
    }

    fn unavailable(operation: &str, details: impl ToString) -> anyhow::Error {
        ScanError::BackendUnavailable {
            operation: operation.to_string(),
            details: details.to_string(),
        }
        .into()
    }

    fn cached_bearer(&self) -> Option<String> {
        let guard = self.bearer.lock().ok()?;
        guard
            .as_ref()
            .filter(|token| token.expires_at > Instant::now())
            .map(|token| token.bearer.clone())
    }

    async fn bearer_token(&self) -> Result<String> {
        if let Some(bearer) = self.cached_bearer() {
            return Ok(bearer);
        }

        let operation = "authenticate";
        let url = format!("{}/api/tokens/authenticate", self.server_url);
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, format!("token {}", self.api_token))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Self::unavailable(operation, e))?;

        if !response.status().is_success() {
            return Err(Self::unavailable(
                operation,
                format!("server returned status code {}", response.status()),
            ));
        }

        let auth: AuthenticationResponse = response
            .json()
            .await
            .map_err(|e| Self::unavailable(operation, e))?;

        let lifetime = Duration::from_millis(auth.expires_in_milliseconds)
            .saturating_sub(TOKEN_EXPIRY_MARGIN);
        if let Ok(mut guard) = self.bearer.lock() {
            *guard = Some(CachedToken {
                bearer: auth.bearer_token.clone(),
                expires_at: Instant::now() + lifetime,
            });
        }
        Ok(auth.bearer_token)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, operation: &str) -> Result<T> {
        let bearer = self.bearer_token().await?;
        let response = self
            .client
            .get(url)
            .bearer_auth(bearer)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Self::unavailable(operation, e))?;

        if !response.status().is_success() {
            return Err(Self::unavailable(
                operation,
                format!("server returned status code {} for {}", response.status(), url),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| Self::unavailable(operation, e))
    }

    async fn version_links(&self, project_name: &str, version_name: &str) -> Result<VersionLinks> {
        let key = (project_name.to_string(), version_name.to_string());
        if let Some(links) = self
            .versions
            .lock()
            .ok()
            .and_then(|cache| cache.get(&key).cloned())
        {
            return Ok(links);
        }

        let operation = "look up project version";
        let projects: Page<ProjectItem> = self
            .get_json(&project_query_url(&self.server_url, project_name), operation)
            .await?;
        let project = projects
            .items
            .iter()
            .find(|item| item.name == project_name)
            .ok_or_else(|| {
                Self::unavailable(operation, format!("project '{}' not found", project_name))
            })?;
        let versions_href = project.meta.link("versions").ok_or_else(|| {
            Self::unavailable(
                operation,
                format!("project '{}' has no versions link", project_name),
            )
        })?;

        let versions: Vec<VersionItem> = self.get_all_items(versions_href, None, operation).await?;
        let version = versions
            .iter()
            .find(|item| item.version_name == version_name)
            .ok_or_else(|| {
                Self::unavailable(
                    operation,
                    format!(
                        "version '{}' of project '{}' not found",
                        version_name, project_name
                    ),
                )
            })?;

        let links =
            VersionLinks::from_meta(&version.meta).map_err(|e| Self::unavailable(operation, e))?;
        if let Ok(mut cache) = self.versions.lock() {
            cache.insert(key, links.clone());
        }
        Ok(links)
    }

    /// Reads every page of a listing, following `totalCount`
    async fn get_all_items<T: DeserializeOwned>(
        &self,
        href: &str,
        filter: Option<&str>,
        operation: &str,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut offset = 0;
        loop {
            let query = match filter {
                Some(filter) => format!("{}&{}", filter, page_query(offset)),
                None => page_query(offset),
            };
            let page: Page<T> = self.get_json(&paged_url(href, &query), operation).await?;
            let total_count = page.total_count;
            let received = page.items.len();
            items.extend(page.items);

            match next_offset(total_count, received, items.len()) {
                Some(next) => offset = next,
                None => {
                    if let Some(missing) = missing_items(total_count, items.len()) {
                        eprintln!(
                            "⚠️  Warning: Black Duck reported {} more item(s) than it returned while trying to {}.",
                            missing, operation
                        );
                    }
                    return Ok(items);
                }
            }
        }
    }
}

fn page_query(offset: usize) -> String {
    format!("limit={}&offset={}", PAGE_SIZE, offset)
}

/// Offset of the next page, or `None` once the listing is exhausted
fn next_offset(total_count: Option<usize>, received: usize, fetched: usize) -> Option<usize> {
    match total_count {
        Some(total) if received > 0 && fetched < total => Some(fetched),
        _ => None,
    }
}

fn missing_items(total_count: Option<usize>, fetched: usize) -> Option<usize> {
    total_count
        .filter(|total| *total > fetched)
        .map(|total| total - fetched)
}

fn project_query_url(server_url: &str, project_name: &str) -> String {
    format!(
        "{}/api/projects?q=name%3A{}",
        server_url,
        urlencoding::encode(project_name)
    )
}

fn paged_url(href: &str, query: &str) -> String {
    let separator = if href.contains('?') { '&' } else { '?' };
    format!("{}{}{}", href, separator, query)
}

#[async_trait]
impl BackendClient for BlackDuckClient {
    async fn get_components(&self, project_name: &str, version_name: &str) -> Result<Vec<Component>> {
        let links = self.version_links(project_name, version_name).await?;
        let items: Vec<ComponentItem> = self
            .get_all_items(
                &links.components,
                Some(LICENSE_POLICY_FILTER),
                "fetch components",
            )
            .await?;
        Ok(items.into_iter().map(Component::from).collect())
    }

    async fn get_hierarchical_components(
        &self,
        project_name: &str,
        version_name: &str,
    ) -> Result<Vec<HierarchicalComponent>> {
        let links = self.version_links(project_name, version_name).await?;
        let items: Vec<ComponentItem> = self
            .get_all_items(
                &links.hierarchical_components,
                None,
                "fetch hierarchical components",
            )
            .await?;
        Ok(items
            .into_iter()
            .map(HierarchicalComponent::from)
            .collect())
    }

    async fn get_vulnerabilities(
        &self,
        project_name: &str,
        version_name: &str,
    ) -> Result<VulnerabilitySet> {
        let links = self.version_links(project_name, version_name).await?;
        let items: Vec<VulnerableComponentItem> = self
            .get_all_items(&links.vulnerable_components, None, "fetch vulnerabilities")
            .await?;
        Ok(items.into_iter().map(Vulnerability::from).collect())
    }

    async fn get_policy_status(&self, project_name: &str, version_name: &str) -> Result<PolicyStatus> {
        let links = self.version_links(project_name, version_name).await?;
        let item: PolicyStatusItem = self
            .get_json(&links.policy_status, "fetch policy status")
            .await?;
        Ok(item.into())
    }
}
