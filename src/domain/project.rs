//! Project records produced by the manifest parser

use super::Dependency;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Prefix written in front of an import path that does not exist
pub const NOT_FOUND_PREFIX: &str = "(NOT FOUND!) ";

/// Parameter name to value, scoped to one manifest
pub type ParameterTable = BTreeMap<String, String>;

/// Where the parameter table of a project came from
///
/// On the wire this is a single string: empty when the manifest has no import,
/// the absolute path when the import resolved, or the path prefixed with
/// [`NOT_FOUND_PREFIX`] when it did not.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParameterFile {
    /// The manifest has no usable import directive
    #[default]
    None,
    /// The import resolved to this file
    Found(PathBuf),
    /// The import pointed at this path, which does not exist
    NotFound(PathBuf),
}

impl ParameterFile {
    /// Returns the resolved path if the import was found
    pub fn path(&self) -> Option<&Path> {
        match self {
            ParameterFile::Found(path) => Some(path),
            _ => None,
        }
    }

    /// Returns true if the import pointed at a missing file
    pub fn is_not_found(&self) -> bool {
        matches!(self, ParameterFile::NotFound(_))
    }

    fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            ParameterFile::None
        } else if let Some(path) = raw.strip_prefix(NOT_FOUND_PREFIX) {
            ParameterFile::NotFound(PathBuf::from(path))
        } else {
            ParameterFile::Found(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for ParameterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterFile::None => Ok(()),
            ParameterFile::Found(path) => write!(f, "{}", path.display()),
            ParameterFile::NotFound(path) => write!(f, "{}{}", NOT_FOUND_PREFIX, path.display()),
        }
    }
}

impl Serialize for ParameterFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ParameterFile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| Self::parse(&s)).unwrap_or_default())
    }
}

/// A parsed project manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Absolute path of the manifest
    pub file: PathBuf,
    /// Display name (manifest file name)
    pub name: String,
    /// Package references in declaration order
    pub dependencies: Vec<Dependency>,
    /// Values read from the imported parameter file
    #[serde(default)]
    pub parameters: ParameterTable,
    /// Imported parameter file
    #[serde(default)]
    pub parameter_file: ParameterFile,
}

impl Project {
    /// Creates an empty project for the manifest at `file`
    pub fn new(file: impl Into<PathBuf>) -> Self {
        let file = file.into();
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            file,
            name,
            dependencies: Vec::new(),
            parameters: ParameterTable::new(),
            parameter_file: ParameterFile::None,
        }
    }

    /// Returns dependencies that were checked and found outdated
    pub fn outdated(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(|d| d.is_outdated())
    }
}
