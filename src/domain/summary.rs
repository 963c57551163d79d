//! Summary counts over a scan result
//!
//! These are the figures shown above the per-project tables.

use super::ScanResult;
use serde::Serialize;

/// Counts derived from a [`ScanResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    /// Number of projects
    pub projects: usize,
    /// Number of dependency records
    pub dependencies: usize,
    /// Dependencies that went through a check
    pub checked: usize,
    /// Checked dependencies with a newer version available
    pub outdated: usize,
    /// Checked dependencies already on the latest version
    pub up_to_date: usize,
    /// Checked dependencies no registry knows about
    pub not_found: usize,
    /// Dependencies whose `$(Name)` reference has no value
    pub unresolved: usize,
}

impl ScanSummary {
    /// Computes the summary of a scan result
    pub fn from_scan(scan: &ScanResult) -> Self {
        let mut summary = Self {
            projects: scan.projects.len(),
            ..Default::default()
        };

        for dep in scan.dependencies() {
            summary.dependencies += 1;
            if dep.is_unresolved() {
                summary.unresolved += 1;
            }
            if !dep.is_checked {
                continue;
            }
            summary.checked += 1;
            if dep.is_not_found {
                summary.not_found += 1;
            } else if dep.is_latest {
                summary.up_to_date += 1;
            } else {
                summary.outdated += 1;
            }
        }

        summary
    }

    /// Returns true if every dependency was checked
    pub fn all_checked(&self) -> bool {
        self.checked == self.dependencies
    }
}
