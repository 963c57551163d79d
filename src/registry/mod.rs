//! Registry access for fetching latest package versions
//!
//! This module provides:
//! - HTTP client shared foundation with retry logic
//! - Feed credentials looked up by source URL
//! - NuGet v2/v3 feed adapter
//! - `RegistryClient`, which fans one package lookup out across sources and ranks the answers

mod client;
mod credentials;
mod nuget;

pub use client::HttpClient;
pub use credentials::{Credential, CredentialStore, DEFAULT_CREDENTIALS_ENV};
pub use nuget::NuGetAdapter;

use crate::domain::RegistrySource;
use crate::error::RegistryError;
use crate::update::{rank_results, PackageVersion, VersionResult};
use async_trait::async_trait;
use futures::future::join_all;
use std::time::Duration;
use tracing::{debug, warn};

/// Default deadline for one source lookup
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(5);

/// Trait for registry adapters
#[async_trait]
pub trait RegistryAdapter: Send + Sync {
    /// Get the registry name
    fn registry_name(&self) -> &'static str;

    /// Latest version of `package` on one source, `None` if the source does not have it
    async fn latest_version(
        &self,
        package: &str,
        source: &RegistrySource,
        credential: Option<&Credential>,
        include_prerelease: bool,
    ) -> Result<Option<PackageVersion>, RegistryError>;
}

/// Looks a package up on every configured source
pub struct RegistryClient {
    adapter: Box<dyn RegistryAdapter>,
    credentials: CredentialStore,
    timeout: Duration,
}

impl RegistryClient {
    /// Create a client around an adapter, with no credentials
    pub fn new(adapter: Box<dyn RegistryAdapter>) -> Self {
        Self {
            adapter,
            credentials: CredentialStore::empty(),
            timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }

    /// Create a client backed by the NuGet adapter
    pub fn nuget(client: HttpClient) -> Self {
        Self::new(Box::new(NuGetAdapter::new(client)))
    }

    /// Set the credential table
    pub fn with_credentials(mut self, credentials: CredentialStore) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set the per-source deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Latest version of `package` from each source, best first
    ///
    /// An empty `sources` slice means the public nuget.org feed. Sources that
    /// fail, time out or do not know the package contribute nothing; the
    /// result is empty only if no source answered.
    pub async fn latest_versions(
        &self,
        package: &str,
        sources: &[RegistrySource],
        include_prerelease: bool,
    ) -> Vec<VersionResult> {
        let defaults;
        let sources = if sources.is_empty() {
            defaults = [RegistrySource::nuget_org()];
            &defaults[..]
        } else {
            sources
        };

        let lookups = sources
            .iter()
            .map(|source| self.query_source(package, source, include_prerelease));
        let mut results: Vec<VersionResult> = join_all(lookups)
            .await
            .into_iter()
            .flatten()
            .filter(|r| include_prerelease || !r.is_prerelease)
            .collect();

        rank_results(&mut results);
        results
    }

    async fn query_source(
        &self,
        package: &str,
        source: &RegistrySource,
        include_prerelease: bool,
    ) -> Option<VersionResult> {
        let credential = self.credentials.lookup(&source.url);
        let lookup =
            self.adapter
                .latest_version(package, source, credential, include_prerelease);

        let registry = self.adapter.registry_name();
        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(Some(version))) => Some(VersionResult::new(source.clone(), &version)),
            Ok(Ok(None)) => {
                debug!(package, registry, source = %source.key, "no version on source");
                None
            }
            Ok(Err(e)) => {
                warn!(package, registry, source = %source.key, error = %e, "source lookup failed");
                None
            }
            Err(_) => {
                warn!(
                    package,
                    registry,
                    source = %source.key,
                    timeout = ?self.timeout,
                    "source lookup timed out"
                );
                None
            }
        }
    }
}
