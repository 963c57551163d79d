//! Core domain models for depsight
//!
//! This module contains the fundamental types used throughout the application:
//! - Registry sources read from nuget.config
//! - Dependency records and their check state
//! - Project records with their parameter table
//! - Scan results and summary counts

mod dependency;
mod project;
mod scan_result;
mod source;
mod summary;

pub use dependency::{Dependency, NOT_FOUND_VERSION, NO_PARAMETER};
pub use project::{ParameterFile, ParameterTable, Project, NOT_FOUND_PREFIX};
pub use scan_result::{ScanIssue, ScanResult};
pub use source::{RegistrySource, NUGET_ORG_KEY, NUGET_ORG_URL};
pub use summary::ScanSummary;
