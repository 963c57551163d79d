//! JSON output formatter for machine processing
//!
//! The scan tree is emitted in its boundary shape (lowerCamelCase keys) with
//! the command-specific sections alongside it.

use crate::domain::{ScanResult, ScanSummary};
use crate::manifest::{ApplyOutcome, WriteResult};
use crate::orchestrator::{OrchestratorResult, RunKind};
use crate::output::OutputFormatter;
use crate::update::{UpdateTarget, VersionResult};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

/// JSON representation of the full result
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    command: RunKind,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    dry_run: bool,
    summary: ScanSummary,
    #[serde(flatten)]
    scan: &'a ScanResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    lookup: Option<JsonLookup<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidates: Option<&'a [UpdateTarget]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    apply: Option<&'a ApplyOutcome>,
    #[serde(skip_serializing_if = "<[WriteResult]>::is_empty")]
    writes: &'a [WriteResult],
}

/// Ranked answers for `check --package`
#[derive(Serialize)]
struct JsonLookup<'a> {
    package: &'a str,
    results: &'a [VersionResult],
}

impl<'a> JsonOutput<'a> {
    fn from_result(result: &'a OrchestratorResult) -> Self {
        Self {
            command: result.kind,
            dry_run: result.dry_run,
            summary: result.summary,
            scan: &result.scan,
            lookup: result.lookup.as_ref().map(|l| JsonLookup {
                package: &l.package,
                results: &l.results,
            }),
            candidates: (result.kind == RunKind::Update).then_some(result.candidates.as_slice()),
            apply: result.apply.as_ref(),
            writes: &result.writes,
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput::from_result(result);
        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{}", json)
    }
}
