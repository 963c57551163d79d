//! Dependency information structures

use super::RegistrySource;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current version recorded when a `$(Name)` reference has no value
pub const NO_PARAMETER: &str = "-No Parameter-";

/// Latest version recorded when no registry knows the package
pub const NOT_FOUND_VERSION: &str = "Not Found";

/// A package reference declared in a project manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    /// Package id (the `Include` attribute)
    pub name: String,
    /// Version as declared, or as resolved through the parameter table
    pub current_version: String,
    /// Whether the version was declared as `$(Name)`
    #[serde(default)]
    pub is_parameter: bool,
    /// Parameter name when `is_parameter` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_name: Option<String>,
    /// Set once the checker has processed this dependency
    #[serde(default)]
    pub is_checked: bool,
    /// Newest version found, empty until checked
    #[serde(default)]
    pub latest_version: String,
    /// Whether `current_version` equals `latest_version`
    #[serde(default)]
    pub is_latest: bool,
    /// Registry source that supplied `latest_version`
    #[serde(default)]
    pub source: Option<RegistrySource>,
    /// No registry returned a version
    #[serde(default)]
    pub is_not_found: bool,
    /// Position among the manifest's versioned references with the same name
    #[serde(skip)]
    pub occurrence: usize,
}

impl Dependency {
    /// Creates an unchecked dependency with a literal version
    pub fn new(name: impl Into<String>, current_version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            current_version: current_version.into(),
            is_parameter: false,
            parameter_name: None,
            is_checked: false,
            latest_version: String::new(),
            is_latest: false,
            source: None,
            is_not_found: false,
            occurrence: 0,
        }
    }

    /// Creates an unchecked dependency whose version comes from `$(parameter)`
    ///
    /// `resolved` is the parameter table value, `None` when the table has no
    /// entry, in which case the current version is [`NO_PARAMETER`].
    pub fn parameterized(
        name: impl Into<String>,
        parameter: impl Into<String>,
        resolved: Option<&str>,
    ) -> Self {
        let mut dep = Self::new(name, resolved.unwrap_or(NO_PARAMETER));
        dep.is_parameter = true;
        dep.parameter_name = Some(parameter.into());
        dep
    }

    /// Returns true if the parameter reference could not be resolved
    pub fn is_unresolved(&self) -> bool {
        self.current_version == NO_PARAMETER
    }

    /// Returns true if this dependency was checked and a newer version exists
    pub fn is_outdated(&self) -> bool {
        self.is_checked && !self.is_latest && !self.is_not_found
    }

    /// Record the outcome of a registry lookup that returned a version
    pub fn mark_found(&mut self, latest_version: &str, source: RegistrySource) {
        self.is_checked = true;
        self.is_not_found = false;
        self.latest_version = latest_version.to_string();
        self.is_latest = self.current_version == latest_version;
        self.source = Some(source);
    }

    /// Record the outcome of a registry lookup that returned nothing
    pub fn mark_not_found(&mut self) {
        self.is_checked = true;
        self.is_not_found = true;
        self.latest_version = NOT_FOUND_VERSION.to_string();
        self.is_latest = false;
        self.source = None;
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parameter_name {
            Some(param) => write!(f, "{}@{} ($({}))", self.name, self.current_version, param),
            None => write!(f, "{}@{}", self.name, self.current_version),
        }
    }
}
