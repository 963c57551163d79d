//! Manifest rewriting
//!
//! This module provides:
//! - ManifestWriter for pinning update targets to their latest version
//! - Preflight rejection of batches that cannot be written safely
//! - Format preservation: only the bytes of the version value change
//! - ApplyOutcome, the `{success, message}` shape reported to callers
//!
//! Each write re-reads its file, locates exactly one node and splices the new
//! value into the original text at that node's byte range.

use super::parameters::{is_group, leaf_value};
use super::{is_element, parse_xml, read_file, split_bom};
use crate::domain::ParameterFile;
use crate::error::{ApplyError, ManifestError};
use crate::update::UpdateTarget;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Outcome of an apply call as reported at the boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOutcome {
    pub success: bool,
    pub message: String,
}

impl ApplyOutcome {
    /// Summarize the result of [`ManifestWriter::apply`]
    pub fn from_result(result: &Result<Vec<WriteResult>, ApplyError>) -> Self {
        match result {
            Ok(writes) => {
                let changed = writes.iter().filter(|w| w.file_modified).count();
                Self {
                    success: true,
                    message: format!(
                        "updated {} dependenc{} ({} file write{})",
                        writes.len(),
                        if writes.len() == 1 { "y" } else { "ies" },
                        changed,
                        if changed == 1 { "" } else { "s" }
                    ),
                }
            }
            Err(e) => Self {
                success: false,
                message: e.to_string(),
            },
        }
    }
}

/// One rewrite performed by the writer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResult {
    /// Package id
    pub dependency: String,
    /// File that holds the version (manifest or parameter file)
    pub path: PathBuf,
    /// Version written
    pub new_version: String,
    /// False when the file already carried `new_version`
    pub file_modified: bool,
}

/// Writer that pins update targets in their manifests or parameter files
#[derive(Debug, Default)]
pub struct ManifestWriter;

impl ManifestWriter {
    /// Create a new ManifestWriter
    pub fn new() -> Self {
        Self
    }

    /// Apply every target, or none if preflight rejects the batch
    ///
    /// The batch is rejected before any write when a target's project has a
    /// missing parameter file, or a target has no usable version. Writes are
    /// not rolled back if a later one fails.
    pub fn apply(&self, targets: &[UpdateTarget]) -> Result<Vec<WriteResult>, ApplyError> {
        let reasons = preflight(targets);
        if !reasons.is_empty() {
            return Err(ApplyError::Rejected { reasons });
        }

        let mut results = Vec::with_capacity(targets.len());
        for target in targets {
            let result = self.apply_one(target).map_err(|source| ApplyError::Write {
                written: results.len(),
                source,
            })?;
            results.push(result);
        }

        info!(dependencies = results.len(), "update applied");
        Ok(results)
    }

    fn apply_one(&self, target: &UpdateTarget) -> Result<WriteResult, ManifestError> {
        let dependency = &target.dependency;
        let version = target.new_version();

        let (path, parameter) = match (&dependency.parameter_name, target.parameter_file.path()) {
            (Some(parameter), Some(file)) => (file, Some(parameter.as_str())),
            _ => (target.project_file.as_path(), None),
        };

        let content = read_file(path)?;
        let (bom, body) = split_bom(&content);
        let doc = parse_xml(path, body)?;

        let located = match parameter {
            Some(parameter) => parameter_value_range(&doc, parameter),
            None => package_version_range(&doc, &dependency.name, dependency.occurrence),
        };
        let at = located.ok_or_else(|| {
            let what = match parameter {
                Some(parameter) => format!("<{}> element", parameter),
                None => format!("<PackageReference Include=\"{}\" Version=...>", dependency.name),
            };
            ManifestError::write_target_not_found(&dependency.name, what, path)
        })?;

        let escaped = escape(version);
        let file_modified = match &at {
            Splice::Replace(r) => &body[r.clone()] != escaped.as_str(),
            Splice::FillEmpty { .. } => true,
        };

        if file_modified {
            let updated = format!("{}{}", bom, splice(body, &at, &escaped));
            fs::write(path, updated).map_err(|e| ManifestError::write_error(path, e))?;
            debug!(package = %dependency.name, file = %path.display(), version, "wrote version");
        } else {
            debug!(package = %dependency.name, file = %path.display(), "already at version");
        }

        Ok(WriteResult {
            dependency: dependency.name.clone(),
            path: path.to_path_buf(),
            new_version: version.to_string(),
            file_modified,
        })
    }
}

fn preflight(targets: &[UpdateTarget]) -> Vec<ManifestError> {
    let mut reasons = Vec::new();
    for target in targets {
        let dependency = &target.dependency;
        if let ParameterFile::NotFound(path) = &target.parameter_file {
            reasons.push(ManifestError::ParameterFileNotFound {
                dependency: dependency.name.clone(),
                path: path.clone(),
            });
        } else if dependency.is_unresolved()
            || (dependency.parameter_name.is_some() && target.parameter_file.path().is_none())
        {
            reasons.push(ManifestError::UnresolvedParameter {
                dependency: dependency.name.clone(),
                parameter: dependency.parameter_name.clone().unwrap_or_default(),
            });
        } else if dependency.is_not_found || dependency.latest_version.is_empty() {
            reasons.push(ManifestError::NoTargetVersion {
                dependency: dependency.name.clone(),
            });
        }
    }
    reasons
}

/// Where the new value goes
enum Splice {
    /// Replace these bytes
    Replace(Range<usize>),
    /// Give a text-less element a value
    FillEmpty {
        element: Range<usize>,
        qname: String,
        self_closing: bool,
    },
}

fn splice(body: &str, at: &Splice, value: &str) -> String {
    match at {
        Splice::Replace(r) => format!("{}{}{}", &body[..r.start], value, &body[r.end..]),
        Splice::FillEmpty {
            element,
            qname,
            self_closing: true,
        } => {
            let raw = &body[element.clone()];
            let open = raw.trim_end_matches('>').trim_end().trim_end_matches('/').trim_end();
            format!(
                "{}{}>{}</{}>{}",
                &body[..element.start],
                open,
                value,
                qname,
                &body[element.end..]
            )
        }
        Splice::FillEmpty { element, .. } => {
            let raw = &body[element.clone()];
            let close = raw.rfind("</").map_or(element.end, |i| element.start + i);
            format!("{}{}{}", &body[..close], value, &body[close..])
        }
    }
}

/// Version attribute of the `occurrence`-th versioned reference to `name`
///
/// Counts the same references the parser turns into dependencies, so every
/// target maps back to its own node.
fn package_version_range(doc: &Document, name: &str, occurrence: usize) -> Option<Splice> {
    doc.descendants()
        .filter(|n| is_element(n, "PackageReference"))
        .filter(|n| n.parent_element().is_some_and(|p| is_element(&p, "ItemGroup")))
        .filter(|n| n.attribute("Include") == Some(name))
        .filter_map(|n| n.attributes().find(|a| a.name() == "Version"))
        .nth(occurrence)
        .map(|a| Splice::Replace(a.range_value()))
}

fn parameter_value_range(doc: &Document, parameter: &str) -> Option<Splice> {
    let node = doc
        .root_element()
        .children()
        .filter(Node::is_element)
        .flat_map(|child| {
            if is_group(&child) {
                child.children().filter(Node::is_element).collect::<Vec<_>>()
            } else {
                vec![child]
            }
        })
        .find(|n| n.tag_name().name() == parameter)?;

    if is_group(&node) {
        return None;
    }

    let text: Vec<Node> = node.children().filter(Node::is_text).collect();
    match text.as_slice() {
        [only] if !leaf_value(&node).is_empty() => {
            let raw = only.range();
            Some(Splice::Replace(trimmed_range(doc.input_text(), raw)))
        }
        _ if text.iter().all(|t| t.text().unwrap_or_default().trim().is_empty()) => {
            let element = node.range();
            let raw = &doc.input_text()[element.clone()];
            let qname = raw[1..]
                .split(|c: char| c.is_whitespace() || c == '/' || c == '>')
                .next()
                .unwrap_or_default()
                .to_string();
            Some(Splice::FillEmpty {
                self_closing: raw.trim_end().ends_with("/>"),
                element,
                qname,
            })
        }
        _ => None,
    }
}

/// Narrow `range` to exclude surrounding whitespace
fn trimmed_range(input: &str, range: Range<usize>) -> Range<usize> {
    let raw = &input[range.clone()];
    let start = range.start + (raw.len() - raw.trim_start().len());
    let end = range.end - (raw.len() - raw.trim_end().len());
    start..end.max(start)
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
