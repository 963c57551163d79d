//! Project scanner
//!
//! Walks a root directory, parses every manifest and collects the registry
//! sources declared in top-level `nuget.config` files. A manifest that cannot
//! be parsed is recorded as a [`ScanIssue`] and does not stop the scan.

use crate::domain::{RegistrySource, ScanIssue, ScanResult};
use crate::error::ScanError;
use crate::manifest::{discover, parse_manifest, read_sources};
use std::path::Path;
use tracing::{debug, warn};

/// Scan `root` (the current directory when empty)
pub fn scan(root: &Path) -> Result<ScanResult, ScanError> {
    let root = if root.as_os_str().is_empty() {
        Path::new(".")
    } else {
        root
    };
    if !root.exists() {
        return Err(ScanError::path_not_found(root));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    let root = root.canonicalize().map_err(|e| ScanError::io(root, e))?;

    let found = discover(&root);
    debug!(
        root = %root.display(),
        manifests = found.manifests.len(),
        configs = found.configs.len(),
        "discovered files"
    );

    let mut result = ScanResult::new(&root);

    for config in &found.configs {
        match read_sources(config) {
            Ok(sources) => merge_sources(&mut result.sources, sources),
            Err(e) => {
                warn!(file = %config.display(), error = %e, "skipping registry configuration");
                result.issues.push(ScanIssue {
                    file: config.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    for manifest in &found.manifests {
        match parse_manifest(manifest) {
            Ok(project) => result.projects.push(project),
            Err(e) => {
                warn!(file = %manifest.display(), error = %e, "skipping manifest");
                result.issues.push(ScanIssue {
                    file: manifest.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(result)
}

/// Append sources whose key is not already present
fn merge_sources(into: &mut Vec<RegistrySource>, sources: Vec<RegistrySource>) {
    for source in sources {
        if into.iter().any(|s| s.key == source.key) {
            debug!(key = %source.key, "duplicate source key ignored");
            continue;
        }
        into.push(source);
    }
}
