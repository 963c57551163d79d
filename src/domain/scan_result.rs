//! Aggregate result of scanning a project tree

use super::{Dependency, Project, RegistrySource};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// A manifest that could not be read or parsed during a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanIssue {
    /// Manifest path
    pub file: PathBuf,
    /// Human-readable reason
    pub message: String,
}

/// Everything one scan found beneath a root path
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Absolute scan root
    pub root_path: PathBuf,
    /// Parsed projects in discovery order
    pub projects: Vec<Project>,
    /// Registry sources from top-level nuget.config files, deduplicated by key
    pub sources: Vec<RegistrySource>,
    /// Manifests skipped because they could not be parsed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ScanIssue>,
}

impl ScanResult {
    /// Creates an empty result for `root_path`
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            ..Default::default()
        }
    }

    /// Iterates every dependency across all projects
    pub fn dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.projects.iter().flat_map(|p| p.dependencies.iter())
    }

    /// Iterates every dependency mutably across all projects
    pub fn dependencies_mut(&mut self) -> impl Iterator<Item = &mut Dependency> {
        self.projects.iter_mut().flat_map(|p| p.dependencies.iter_mut())
    }

    /// Distinct package names in first-seen order
    pub fn package_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.dependencies()
            .filter(|d| seen.insert(d.name.as_str()))
            .map(|d| d.name.clone())
            .collect()
    }

    /// Returns true if any manifest was skipped
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}
