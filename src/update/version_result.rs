//! Latest-version results and cross-source ranking

use super::PackageVersion;
use crate::domain::RegistrySource;
use serde::{Deserialize, Serialize};

/// The latest version one registry source reported for a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResult {
    /// Source that answered
    pub source: RegistrySource,
    /// Version text as reported
    pub version: String,
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub revision: u64,
    pub is_prerelease: bool,
    /// Four-part version with a non-zero revision
    pub is_legacy: bool,
    pub is_sem_ver2: bool,
    /// Build metadata label, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

impl VersionResult {
    /// Build a result from a parsed version
    pub fn new(source: RegistrySource, version: &PackageVersion) -> Self {
        Self {
            source,
            version: version.original.clone(),
            major: version.major,
            minor: version.minor,
            patch: version.patch,
            revision: version.revision,
            is_prerelease: version.is_prerelease(),
            is_legacy: version.is_legacy(),
            is_sem_ver2: version.is_semver2(),
            metadata: version.metadata.clone(),
        }
    }

    /// Numeric components as a tuple
    pub fn tuple(&self) -> (u64, u64, u64, u64) {
        (self.major, self.minor, self.patch, self.revision)
    }
}

/// Sort results so the latest comes first
///
/// Only the numeric `(major, minor, patch, revision)` tuple is compared, so a
/// prerelease and a release with the same numbers tie. Ties keep their input
/// order (the sort is stable), which is the order sources were queried in.
pub fn rank_results(results: &mut [VersionResult]) {
    results.sort_by(|a, b| b.tuple().cmp(&a.tuple()));
}
