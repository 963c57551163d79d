//! Update candidate selection
//!
//! Turns a checked scan into the list of rewrites handed to the manifest
//! writer. A candidate is a dependency that was checked, has a newer version,
//! was found on some registry and has a resolvable current version.

use super::UpdateFilter;
use crate::domain::{Dependency, ParameterFile, Project, ScanResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One dependency to pin, with the project context the writer needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTarget {
    /// The checked dependency; `latest_version` is the value to write
    pub dependency: Dependency,
    /// Manifest declaring the dependency
    pub project_file: PathBuf,
    /// Parameter file of that manifest
    #[serde(default)]
    pub parameter_file: ParameterFile,
}

impl UpdateTarget {
    /// Create a target for `dependency` declared in `project`
    pub fn new(project: &Project, dependency: &Dependency) -> Self {
        Self {
            dependency: dependency.clone(),
            project_file: project.file.clone(),
            parameter_file: project.parameter_file.clone(),
        }
    }

    /// The version that will be written
    pub fn new_version(&self) -> &str {
        &self.dependency.latest_version
    }
}

/// Collect update candidates from a checked scan, in project then declaration order
pub fn update_candidates(scan: &ScanResult, filter: &UpdateFilter) -> Vec<UpdateTarget> {
    scan.projects
        .iter()
        .flat_map(|project| {
            project
                .outdated()
                .filter(|dep| !dep.is_unresolved())
                .filter(|dep| filter.should_process_package(&dep.name))
                .map(move |dep| UpdateTarget::new(project, dep))
        })
        .collect()
}
