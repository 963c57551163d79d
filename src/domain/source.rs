//! Registry source records read from nuget.config

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of the public registry substituted when no sources are configured
pub const NUGET_ORG_KEY: &str = "nuget";

/// Service index of the public registry
pub const NUGET_ORG_URL: &str = "https://api.nuget.org/v3/index.json";

/// A named package registry endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySource {
    /// Source key, unique within one scan
    pub key: String,
    /// Declared `protocolVersion`, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<String>,
    /// Endpoint URL
    pub url: String,
}

impl RegistrySource {
    /// Creates a source without a declared protocol version
    pub fn new(key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            protocol_version: None,
            url: url.into(),
        }
    }

    /// Sets the protocol version (builder pattern)
    pub fn with_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = Some(version.into());
        self
    }

    /// The public nuget.org source
    pub fn nuget_org() -> Self {
        Self::new(NUGET_ORG_KEY, NUGET_ORG_URL)
    }

    /// Returns true if this endpoint speaks the v3 JSON protocol
    ///
    /// An explicit `protocolVersion` wins; otherwise v3 feeds are recognised by
    /// their service index URL.
    pub fn is_v3(&self) -> bool {
        match self.protocol_version.as_deref() {
            Some("3") => true,
            Some(_) => false,
            None => self.url.trim_end_matches('/').ends_with("index.json"),
        }
    }
}

impl fmt::Display for RegistrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.key, self.url)
    }
}
