//! Feed credentials
//!
//! Credentials come from a JSON blob in the shape used by the Azure Artifacts
//! credential provider:
//!
//! ```json
//! {"endpointCredentials": [{"endpoint": "https://...", "userName": "u", "password": "p"}]}
//! ```
//!
//! A source gets a credential only when its URL matches an endpoint exactly.

use crate::error::CredentialError;
use serde::Deserialize;
use std::fmt;

/// Environment variable read by default
pub const DEFAULT_CREDENTIALS_ENV: &str = "VSS_NUGET_EXTERNAL_FEED_ENDPOINTS";

/// Basic-auth credential for one endpoint
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credential {
    #[serde(rename = "userName")]
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct EndpointCredential {
    endpoint: String,
    #[serde(flatten)]
    credential: Credential,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialBlob {
    #[serde(default)]
    endpoint_credentials: Vec<EndpointCredential>,
}

/// Read-only credential table keyed by endpoint URL
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    entries: Vec<EndpointCredential>,
}

impl CredentialStore {
    /// An empty store: every source is queried unauthenticated
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a credential blob; `origin` names where it came from for errors
    pub fn from_json(origin: &str, json: &str) -> Result<Self, CredentialError> {
        let blob: CredentialBlob =
            serde_json::from_str(json).map_err(|e| CredentialError::InvalidJson {
                origin: origin.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            entries: blob.endpoint_credentials,
        })
    }

    /// Load from an environment variable; an unset or blank variable yields an empty store
    pub fn from_env(var: &str) -> Result<Self, CredentialError> {
        match std::env::var(var) {
            Ok(json) if !json.trim().is_empty() => Self::from_json(var, &json),
            _ => Ok(Self::empty()),
        }
    }

    /// Add a credential for `endpoint`
    pub fn with_credential(
        mut self,
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.entries.push(EndpointCredential {
            endpoint: endpoint.into(),
            credential: Credential {
                username: username.into(),
                password: password.into(),
            },
        });
        self
    }

    /// Credential for a source URL, by exact match
    pub fn lookup(&self, url: &str) -> Option<&Credential> {
        self.entries
            .iter()
            .find(|e| e.endpoint == url)
            .map(|e| &e.credential)
    }

    /// Number of configured endpoints
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no endpoints are configured
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
