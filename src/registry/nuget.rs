//! NuGet feed adapter
//!
//! v3 feeds: the service index at the source URL lists the feed's resources.
//! `RegistrationsBaseUrl` leaves carry a `listed` flag, so unlisted versions
//! are dropped; feeds without a registration resource fall back to the
//! `PackageBaseAddress/3.0.0` flat container, which lists every version.
//! v2 feeds: `FindPackagesById()?id='{id}'` returns an Atom feed whose entries
//! carry `Version`, `IsListed` and `Published` properties.
//!
//! Neither endpoint filters prereleases server-side, so the flag is applied to
//! the returned list.

use crate::domain::RegistrySource;
use crate::error::RegistryError;
use crate::registry::{Credential, HttpClient, RegistryAdapter};
use crate::update::{select_latest, PackageVersion};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Registration resource types, most capable first
const REGISTRATIONS_BASE_URL: [&str; 5] = [
    "RegistrationsBaseUrl/3.6.0",
    "RegistrationsBaseUrl/3.4.0",
    "RegistrationsBaseUrl/3.0.0-rc",
    "RegistrationsBaseUrl/3.0.0-beta",
    "RegistrationsBaseUrl",
];

/// Resource type carrying the flat container base address
const PACKAGE_BASE_ADDRESS: &str = "PackageBaseAddress/3.0.0";

/// `Published` date NuGet stamps on unlisted packages
const UNLISTED_PUBLISHED: &str = "1900-01-01";

/// Default bound on followed `next` links in a v2 feed
const MAX_V2_PAGES: usize = 50;

#[derive(Debug, Deserialize)]
struct ServiceIndex {
    #[serde(default)]
    resources: Vec<ServiceResource>,
}

#[derive(Debug, Deserialize)]
struct ServiceResource {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@type")]
    kind: ResourceType,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResourceType {
    One(String),
    Many(Vec<String>),
}

impl ResourceType {
    fn is(&self, wanted: &str) -> bool {
        match self {
            ResourceType::One(t) => t == wanted,
            ResourceType::Many(ts) => ts.iter().any(|t| t == wanted),
        }
    }
}

impl ServiceIndex {
    fn resource(&self, wanted: &str) -> Option<String> {
        self.resources
            .iter()
            .find(|r| r.kind.is(wanted))
            .map(|r| r.id.trim_end_matches('/').to_string())
    }
}

/// Version listing endpoint resolved from a service index
#[derive(Debug, Clone, PartialEq, Eq)]
enum VersionEndpoint {
    Registrations(String),
    FlatContainer(String),
}

#[derive(Debug, Deserialize)]
struct FlatContainerIndex {
    #[serde(default)]
    versions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RegistrationIndex {
    #[serde(default)]
    items: Vec<RegistrationPage>,
}

/// A page of registration leaves; large packages omit `items` and link the page instead
#[derive(Debug, Deserialize)]
struct RegistrationPage {
    #[serde(rename = "@id")]
    id: String,
    #[serde(default)]
    items: Option<Vec<RegistrationLeaf>>,
}

#[derive(Debug, Deserialize)]
struct RegistrationLeaf {
    #[serde(rename = "catalogEntry")]
    catalog_entry: CatalogEntry,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    version: String,
    #[serde(default)]
    listed: Option<bool>,
    #[serde(default)]
    published: Option<String>,
}

impl CatalogEntry {
    fn is_listed(&self) -> bool {
        is_listed(self.listed, self.published.as_deref())
    }
}

/// Listed unless flagged otherwise or stamped with the unlisted publish date
fn is_listed(listed: Option<bool>, published: Option<&str>) -> bool {
    listed.unwrap_or(true) && !published.is_some_and(|p| p.starts_with(UNLISTED_PUBLISHED))
}

/// NuGet v2/v3 adapter
pub struct NuGetAdapter {
    client: HttpClient,
    /// Version listing endpoint per service index URL
    endpoints: RwLock<HashMap<String, VersionEndpoint>>,
    max_v2_pages: usize,
}

impl NuGetAdapter {
    /// Create a new NuGet adapter
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            endpoints: RwLock::new(HashMap::new()),
            max_v2_pages: MAX_V2_PAGES,
        }
    }

    /// Set how many v2 feed pages are followed per lookup
    #[cfg(test)]
    fn with_max_v2_pages(mut self, max_v2_pages: usize) -> Self {
        self.max_v2_pages = max_v2_pages.max(1);
        self
    }

    async fn endpoint(
        &self,
        source: &RegistrySource,
        credential: Option<&Credential>,
        package: &str,
    ) -> Result<VersionEndpoint, RegistryError> {
        if let Some(endpoint) = self.endpoints.read().await.get(&source.url) {
            return Ok(endpoint.clone());
        }

        let index: ServiceIndex = self
            .client
            .get_json(&source.url, credential, package, &source.key)
            .await?;
        let endpoint = REGISTRATIONS_BASE_URL
            .iter()
            .find_map(|kind| index.resource(kind))
            .map(VersionEndpoint::Registrations)
            .or_else(|| index.resource(PACKAGE_BASE_ADDRESS).map(VersionEndpoint::FlatContainer))
            .ok_or_else(|| {
                RegistryError::invalid_response(
                    package,
                    &source.key,
                    format!(
                        "service index has neither a RegistrationsBaseUrl nor a {} resource",
                        PACKAGE_BASE_ADDRESS
                    ),
                )
            })?;

        debug!(source = %source.key, ?endpoint, "resolved version endpoint");
        self.endpoints
            .write()
            .await
            .insert(source.url.clone(), endpoint.clone());
        Ok(endpoint)
    }

    async fn versions_v3(
        &self,
        package: &str,
        source: &RegistrySource,
        credential: Option<&Credential>,
    ) -> Result<Vec<String>, RegistryError> {
        let id = package.to_lowercase();
        match self.endpoint(source, credential, package).await? {
            VersionEndpoint::Registrations(base) => {
                let url = format!("{}/{}/index.json", base, id);
                self.listed_registrations(&url, package, source, credential)
                    .await
            }
            VersionEndpoint::FlatContainer(base) => {
                let url = format!("{}/{}/index.json", base, id);
                let index: FlatContainerIndex = self
                    .client
                    .get_json(&url, credential, package, &source.key)
                    .await?;
                Ok(index.versions)
            }
        }
    }

    async fn listed_registrations(
        &self,
        url: &str,
        package: &str,
        source: &RegistrySource,
        credential: Option<&Credential>,
    ) -> Result<Vec<String>, RegistryError> {
        let index: RegistrationIndex = self
            .client
            .get_json(url, credential, package, &source.key)
            .await?;

        let mut versions = Vec::new();
        let mut unlisted = 0;
        for page in index.items {
            let leaves = match page.items {
                Some(leaves) => leaves,
                None => {
                    let page: RegistrationPage = self
                        .client
                        .get_json(&page.id, credential, package, &source.key)
                        .await?;
                    page.items.unwrap_or_default()
                }
            };
            for leaf in leaves {
                if leaf.catalog_entry.is_listed() {
                    versions.push(leaf.catalog_entry.version);
                } else {
                    unlisted += 1;
                }
            }
        }

        if unlisted > 0 {
            debug!(package, source = %source.key, unlisted, "ignored unlisted versions");
        }
        Ok(versions)
    }

    async fn versions_v2(
        &self,
        package: &str,
        source: &RegistrySource,
        credential: Option<&Credential>,
    ) -> Result<Vec<String>, RegistryError> {
        let mut url = format!(
            "{}/FindPackagesById()?id='{}'",
            source.url.trim_end_matches('/'),
            package
        );
        let mut versions = Vec::new();
        let mut pages = 0;

        loop {
            let body = self
                .client
                .get_text(&url, credential, package, &source.key)
                .await?;
            let page = parse_v2_feed(&body)
                .map_err(|message| RegistryError::invalid_response(package, &source.key, message))?;
            versions.extend(page.versions);
            pages += 1;

            match page.next {
                Some(next) if pages < self.max_v2_pages => url = next,
                Some(_) => {
                    warn!(
                        package,
                        source = %source.key,
                        pages,
                        "v2 feed page limit reached, newer versions may be missing"
                    );
                    break;
                }
                None => break,
            }
        }

        Ok(versions)
    }
}

#[async_trait]
impl RegistryAdapter for NuGetAdapter {
    fn registry_name(&self) -> &'static str {
        "NuGet"
    }

    async fn latest_version(
        &self,
        package: &str,
        source: &RegistrySource,
        credential: Option<&Credential>,
        include_prerelease: bool,
    ) -> Result<Option<PackageVersion>, RegistryError> {
        let versions = if source.is_v3() {
            self.versions_v3(package, source, credential).await
        } else {
            self.versions_v2(package, source, credential).await
        };

        let versions = match versions {
            Ok(v) => v,
            Err(RegistryError::PackageNotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        Ok(select_latest(
            versions.iter().map(String::as_str),
            include_prerelease,
        ))
    }
}

struct V2Page {
    /// Listed versions on this page
    versions: Vec<String>,
    next: Option<String>,
}

fn parse_v2_feed(body: &str) -> Result<V2Page, String> {
    let doc = roxmltree::Document::parse(body).map_err(|e| format!("invalid feed XML: {}", e))?;
    let root = doc.root_element();

    let versions = root
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "entry")
        .filter_map(|entry| {
            let version = v2_property(entry, "Version")?;
            let listed = v2_property(entry, "IsListed").map(|v| !v.eq_ignore_ascii_case("false"));
            let published = v2_property(entry, "Published");
            is_listed(listed, published.as_deref()).then_some(version)
        })
        .collect();

    let next = root
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "link")
        .find(|n| n.attribute("rel") == Some("next"))
        .and_then(|n| n.attribute("href"))
        .map(str::to_string);

    Ok(V2Page { versions, next })
}

/// Text of the first `name` element under a feed entry
fn v2_property(entry: roxmltree::Node, name: &str) -> Option<String> {
    entry
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == name)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
