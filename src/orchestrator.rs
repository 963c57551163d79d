//! Workflow orchestrator
//!
//! This module provides:
//! - Workflow coordination: scan → check → select → write
//! - Registry client construction from CLI options and feed credentials
//! - Dry-run mode support
//! - Progress display for each phase

use crate::cli::{CliArgs, Command};
use crate::domain::{ScanResult, ScanSummary};
use crate::error::AppError;
use crate::manifest::{ApplyOutcome, ManifestWriter, WriteResult};
use crate::progress::Progress;
use crate::registry::{CredentialStore, HttpClient, RegistryClient};
use crate::scanner;
use crate::update::{update_candidates, CheckCycle, CheckReport, UpdateTarget, VersionResult};
use serde::Serialize;
use tracing::{debug, warn};

/// Exit code for a run that completed with skipped manifests or a failed update
pub const EXIT_PARTIAL: u8 = 2;

/// Orchestrator for one CLI invocation
pub struct Orchestrator {
    /// CLI arguments for configuration
    args: CliArgs,
    /// Registry access; absent for `scan`
    registry: Option<RegistryClient>,
}

/// Which command produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    #[default]
    Scan,
    Check,
    Update,
}

impl From<&Command> for RunKind {
    fn from(command: &Command) -> Self {
        match command {
            Command::Scan { .. } => RunKind::Scan,
            Command::Check { .. } => RunKind::Check,
            Command::Update { .. } => RunKind::Update,
        }
    }
}

/// Ranked answers for a single package lookup
#[derive(Debug, Clone)]
pub struct PackageLookup {
    pub package: String,
    pub results: Vec<VersionResult>,
}

/// Result of running the orchestrator
#[derive(Debug)]
pub struct OrchestratorResult {
    /// Command that ran
    pub kind: RunKind,
    /// Scan tree, merged with check results when a check ran
    pub scan: ScanResult,
    /// Counts over `scan`
    pub summary: ScanSummary,
    /// Set by `check` runs over the whole tree
    pub check: Option<CheckReport>,
    /// Set by `check --package`
    pub lookup: Option<PackageLookup>,
    /// Update candidates (update runs only)
    pub candidates: Vec<UpdateTarget>,
    /// Whether the writer was skipped on purpose
    pub dry_run: bool,
    /// Writer outcome (update runs that reached the writer)
    pub apply: Option<ApplyOutcome>,
    /// Rewrites performed
    pub writes: Vec<WriteResult>,
}

impl OrchestratorResult {
    /// Wrap a scan with no check or update results
    pub fn new(scan: ScanResult) -> Self {
        Self {
            kind: RunKind::Scan,
            summary: ScanSummary::from_scan(&scan),
            scan,
            check: None,
            lookup: None,
            candidates: Vec::new(),
            dry_run: false,
            apply: None,
            writes: Vec::new(),
        }
    }

    /// Returns true if an update was attempted and failed
    pub fn apply_failed(&self) -> bool {
        self.apply.as_ref().is_some_and(|a| !a.success)
    }

    /// Process exit code: 0 on success, 2 when something was skipped or failed
    pub fn exit_code(&self) -> u8 {
        if self.apply_failed() || self.scan.has_issues() {
            EXIT_PARTIAL
        } else {
            0
        }
    }
}

impl Orchestrator {
    /// Create a new orchestrator; builds the registry client when the command needs one
    pub fn new(args: CliArgs) -> Result<Self, AppError> {
        let registry = match args.registry() {
            Some(options) => {
                let credentials = CredentialStore::from_env(&options.credentials_env)?;
                debug!(endpoints = credentials.len(), "loaded feed credentials");
                let client = HttpClient::new()?;
                Some(
                    RegistryClient::nuget(client)
                        .with_credentials(credentials)
                        .with_timeout(options.timeout),
                )
            }
            None => None,
        };

        Ok(Self { args, registry })
    }

    /// Create an orchestrator with a custom registry client (for testing)
    pub fn with_registry(args: CliArgs, registry: RegistryClient) -> Self {
        Self {
            args,
            registry: Some(registry),
        }
    }

    /// Run the selected command
    pub async fn run(&self) -> Result<OrchestratorResult, AppError> {
        self.run_with_progress(self.args.show_progress()).await
    }

    /// Run the selected command with optional progress display
    pub async fn run_with_progress(&self, show_progress: bool) -> Result<OrchestratorResult, AppError> {
        let mut progress = Progress::new(show_progress);

        progress.spinner("Scanning projects...");
        let scan = scanner::scan(self.args.path());
        progress.finish_and_clear();
        let mut scan = scan?;

        for issue in &scan.issues {
            warn!(file = %issue.file.display(), "{}", issue.message);
        }

        let (registry, options) = match (&self.registry, self.args.registry()) {
            (Some(registry), Some(options)) => (registry, options),
            _ => return Ok(OrchestratorResult::new(scan)),
        };

        let mut cycle = CheckCycle::new(registry, options.check_options());

        if let Command::Check {
            package: Some(package),
            ..
        } = &self.args.command
        {
            progress.spinner(&format!("Looking up {}...", package));
            let results = cycle
                .check_package(&mut scan, package)
                .await
                .unwrap_or_default();
            progress.finish_and_clear();

            let mut result = OrchestratorResult::new(scan);
            result.kind = RunKind::Check;
            result.lookup = Some(PackageLookup {
                package: package.clone(),
                results,
            });
            return Ok(result);
        }

        let filter = options.filter();
        let total = scan
            .package_names()
            .iter()
            .filter(|name| filter.should_process_package(name))
            .count();
        progress.start(total as u64, "Checking packages");
        let report = cycle.check_all(&mut scan, &progress).await;
        progress.finish_and_clear();

        let mut result = OrchestratorResult::new(scan);
        result.kind = RunKind::from(&self.args.command);
        result.check = Some(report);

        if let Command::Update { dry_run, .. } = &self.args.command {
            result.candidates = update_candidates(&result.scan, &filter);
            result.dry_run = *dry_run;

            if !*dry_run && !result.candidates.is_empty() {
                progress.spinner("Writing updates...");
                let applied = ManifestWriter::new().apply(&result.candidates);
                progress.finish_and_clear();

                result.apply = Some(ApplyOutcome::from_result(&applied));
                match applied {
                    Ok(writes) => result.writes = writes,
                    Err(e) => warn!(error = %e, "update not applied"),
                }
            }
        }

        Ok(result)
    }
}
