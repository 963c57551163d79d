//! Project manifest parsing
//!
//! Reads `ItemGroup/PackageReference` items and resolves `$(Name)` versions
//! through the first resolvable `Import` of the manifest.

use super::{is_element, parse_xml, read_file, read_parameter_file, split_bom};
use crate::domain::{Dependency, ParameterFile, ParameterTable, Project};
use crate::error::ManifestError;
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// `$(Name)` version reference
static PARAMETER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$\(([^)]+)\)$").unwrap());

/// Parse the manifest at `path` and its imported parameter file
pub fn parse_manifest(path: &Path) -> Result<Project, ManifestError> {
    let content = read_file(path)?;
    parse_manifest_str(path, &content)
}

/// Parse manifest text; `path` locates the manifest for import resolution
pub fn parse_manifest_str(path: &Path, content: &str) -> Result<Project, ManifestError> {
    let (_, body) = split_bom(content);
    let doc = parse_xml(path, body)?;
    let root = doc.root_element();
    let mut project = Project::new(path);

    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let imports: Vec<&str> = root
        .children()
        .filter(|n| is_element(n, "Import"))
        .filter(|n| n.attribute("Sdk").is_none())
        .filter_map(|n| n.attribute("Project"))
        .collect();
    let (parameter_file, parameters) = resolve_imports(base_dir, &imports)?;
    project.parameter_file = parameter_file;
    project.parameters = parameters;

    let references = root
        .descendants()
        .filter(|n| is_element(n, "PackageReference"))
        .filter(|n| n.parent_element().is_some_and(|p| is_element(&p, "ItemGroup")));

    for reference in references {
        let Some(name) = reference.attribute("Include") else {
            continue;
        };
        let Some(version) = reference.attribute("Version") else {
            debug!(package = name, file = %path.display(), "no Version attribute, skipping");
            continue;
        };

        let mut dependency = match PARAMETER_RE.captures(version) {
            Some(caps) => {
                let parameter = &caps[1];
                let resolved = project.parameters.get(parameter).map(String::as_str);
                Dependency::parameterized(name, parameter, resolved)
            }
            None => Dependency::new(name, version),
        };
        dependency.occurrence = project
            .dependencies
            .iter()
            .filter(|d| d.name == name)
            .count();
        project.dependencies.push(dependency);
    }

    debug!(
        file = %path.display(),
        dependencies = project.dependencies.len(),
        parameter_file = %project.parameter_file,
        "parsed manifest"
    );
    Ok(project)
}

/// Pick the parameter file among the manifest's imports
///
/// The first import whose target exists supplies the table. When none exists,
/// the first one is reported as not found. Imports using MSBuild properties
/// cannot be resolved statically and are ignored.
fn resolve_imports(
    base_dir: &Path,
    imports: &[&str],
) -> Result<(ParameterFile, ParameterTable), ManifestError> {
    let mut missing = None;

    for raw in imports {
        if raw.trim().is_empty() || raw.contains("$(") {
            debug!(import = raw, "skipping unresolvable import");
            continue;
        }
        let resolved = normalize(&base_dir.join(raw.trim().replace('\\', "/")));
        if resolved.is_file() {
            let table = read_parameter_file(&resolved)?;
            return Ok((ParameterFile::Found(resolved), table));
        }
        missing.get_or_insert(resolved);
    }

    let file = missing.map_or(ParameterFile::None, ParameterFile::NotFound);
    Ok((file, ParameterTable::new()))
}

/// Resolve `.` and `..` components without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
