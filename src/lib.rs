//! depsight - NuGet dependency inventory, check and update library
//!
//! This library provides the core functionality for:
//! - Scanning a tree for `.csproj`/`.vbproj`/`.fsproj` manifests and `nuget.config` sources
//! - Resolving `$(Name)` versions through an imported parameter file
//! - Querying registry sources for the latest version of each package
//! - Pinning outdated references in place, preserving file formatting

pub mod cli;
pub mod domain;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod registry;
pub mod scanner;
pub mod update;
