//! Version checking and update selection
//!
//! This module provides:
//! - NuGet version parsing and precedence
//! - Per-source version results and cross-source ranking
//! - The dependency checker that merges registry answers into a scan
//! - Package name filters and update candidate selection

mod candidates;
mod checker;
mod filter;
mod package_version;
mod version_result;

pub use candidates::{update_candidates, UpdateTarget};
pub use checker::{CheckCycle, CheckOptions, CheckReport, DEFAULT_CONCURRENCY};
pub use filter::UpdateFilter;
pub use package_version::{select_latest, PackageVersion};
pub use version_result::{rank_results, VersionResult};
