//! Parameter file reading
//!
//! A parameter file is an XML document whose root's immediate children are
//! `<Name>value</Name>` pairs. MSBuild property files wrap those pairs in a
//! `<PropertyGroup>`; a root child that only contains elements is read one
//! level deeper. The first occurrence of a name wins.

use super::{parse_xml, read_file, split_bom};
use crate::domain::ParameterTable;
use crate::error::ManifestError;
use roxmltree::Node;
use std::path::Path;

/// Read the parameter table from the file at `path`
pub fn read_parameter_file(path: &Path) -> Result<ParameterTable, ManifestError> {
    let content = read_file(path)?;
    parse_parameters(path, &content)
}

/// Parse a parameter table from XML text
pub fn parse_parameters(path: &Path, content: &str) -> Result<ParameterTable, ManifestError> {
    let (_, body) = split_bom(content);
    let doc = parse_xml(path, body)?;
    let mut table = ParameterTable::new();

    for child in doc.root_element().children().filter(Node::is_element) {
        if is_group(&child) {
            for pair in child.children().filter(Node::is_element) {
                insert_first(&mut table, &pair);
            }
        } else {
            insert_first(&mut table, &child);
        }
    }

    Ok(table)
}

/// A node with element children and no text of its own
pub(super) fn is_group(node: &Node<'_, '_>) -> bool {
    let mut has_elements = false;
    for child in node.children() {
        if child.is_element() {
            has_elements = true;
        } else if child.is_text() && !child.text().unwrap_or_default().trim().is_empty() {
            return false;
        }
    }
    has_elements
}

/// Text value of a leaf element
pub(super) fn leaf_value(node: &Node<'_, '_>) -> String {
    node.children()
        .filter(Node::is_text)
        .filter_map(|t| t.text())
        .collect::<String>()
        .trim()
        .to_string()
}

fn insert_first(table: &mut ParameterTable, node: &Node<'_, '_>) {
    table
        .entry(node.tag_name().name().to_string())
        .or_insert_with(|| leaf_value(node));
}
