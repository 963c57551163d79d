//! Manifest discovery, parsing and rewriting
//!
//! This module provides functionality to:
//! - Discover project manifests and `nuget.config` files under a root
//! - Parse `PackageReference` items and resolve `$(Name)` versions through an imported parameter file
//! - Read registry sources from `nuget.config`
//! - Rewrite a single version in place, leaving the rest of the file untouched

mod detector;
mod nuget_config;
mod parameters;
mod parser;
mod writer;

pub use detector::{discover, is_config_file, is_manifest_file, Discovery, MANIFEST_EXTENSIONS};
pub use nuget_config::{parse_sources, read_sources};
pub use parameters::{parse_parameters, read_parameter_file};
pub use parser::{parse_manifest, parse_manifest_str};
pub use writer::{ApplyOutcome, ManifestWriter, WriteResult};

use crate::error::ManifestError;
use std::fs;
use std::path::Path;

const BOM: &str = "\u{feff}";

/// Split a leading UTF-8 byte order mark off `content`
fn split_bom(content: &str) -> (&str, &str) {
    match content.strip_prefix(BOM) {
        Some(rest) => (BOM, rest),
        None => ("", content),
    }
}

/// Parse XML text, mapping failures to [`ManifestError::XmlParseError`]
fn parse_xml<'a>(path: &Path, text: &'a str) -> Result<roxmltree::Document<'a>, ManifestError> {
    roxmltree::Document::parse(text).map_err(|e| ManifestError::xml_parse_error(path, e.to_string()))
}

/// Read a file into a string
fn read_file(path: &Path) -> Result<String, ManifestError> {
    fs::read_to_string(path).map_err(|e| ManifestError::read_error(path, e))
}

/// Returns true if `node` is an element whose local name is `name`
fn is_element(node: &roxmltree::Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}
