//! Manifest and registry configuration discovery
//!
//! Manifests are found recursively; `nuget.config` only at the top level of
//! the root. Entries are visited in file-name order so discovery order is
//! stable across platforms.

use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Project manifest extensions
pub const MANIFEST_EXTENSIONS: &[&str] = &["csproj", "fsproj", "vbproj"];

/// Registry configuration file name, matched case-insensitively
const CONFIG_FILE_NAME: &str = "nuget.config";

/// Files found beneath a scan root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Project manifests in discovery order
    pub manifests: Vec<PathBuf>,
    /// Top-level registry configuration files
    pub configs: Vec<PathBuf>,
}

/// Returns true if `path` has a project manifest extension
pub fn is_manifest_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| MANIFEST_EXTENSIONS.iter().any(|m| m.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Returns true if `path` is named `nuget.config`
pub fn is_config_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.eq_ignore_ascii_case(CONFIG_FILE_NAME))
        .unwrap_or(false)
}

/// Discover manifests and registry configuration beneath `root`
///
/// Unreadable directories are logged and skipped.
pub fn discover(root: &Path) -> Discovery {
    let mut discovery = Discovery::default();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if is_manifest_file(path) {
            discovery.manifests.push(path.to_path_buf());
        } else if entry.depth() == 1 && is_config_file(path) {
            discovery.configs.push(path.to_path_buf());
        }
    }

    discovery
}
