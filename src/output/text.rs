//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Per-project dependency tables with check status
//! - Version change type indication (major/minor/patch)
//! - Single-package lookup listing
//! - Update candidates and writer outcome
//! - Summary counts

use crate::domain::{Dependency, ParameterFile, Project, ScanResult, ScanSummary};
use crate::orchestrator::{OrchestratorResult, PackageLookup, RunKind};
use crate::output::{OutputFormatter, Verbosity};
use crate::update::{PackageVersion, UpdateTarget};
use colored::{ColoredString, Colorize};
use std::io::Write;
use std::path::Path;

/// Change between a current and a latest version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChangeType {
    /// Major version change (breaking)
    Major,
    /// Minor version change (features)
    Minor,
    /// Patch, revision or label change
    Patch,
    /// Unknown or unparseable
    Unknown,
}

impl VersionChangeType {
    /// Determine the change type between two versions
    pub fn from_versions(old: &str, new: &str) -> Self {
        match (PackageVersion::parse(old), PackageVersion::parse(new)) {
            (Some(old), Some(new)) => {
                if new.major != old.major {
                    VersionChangeType::Major
                } else if new.minor != old.minor {
                    VersionChangeType::Minor
                } else {
                    VersionChangeType::Patch
                }
            }
            _ => VersionChangeType::Unknown,
        }
    }

    /// Get the display label with color
    pub fn colored_label(&self) -> String {
        match self {
            VersionChangeType::Major => "major".red().bold().to_string(),
            VersionChangeType::Minor => "minor".yellow().to_string(),
            VersionChangeType::Patch => "patch".green().to_string(),
            VersionChangeType::Unknown => "?".dimmed().to_string(),
        }
    }

    /// Get the plain label
    pub fn label(&self) -> &'static str {
        match self {
            VersionChangeType::Major => "major",
            VersionChangeType::Minor => "minor",
            VersionChangeType::Patch => "patch",
            VersionChangeType::Unknown => "?",
        }
    }
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether this is a dry-run
    dry_run: bool,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity, dry_run: bool) -> Self {
        Self::with_color(verbosity, dry_run, true)
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, dry_run: bool, color: bool) -> Self {
        Self {
            verbosity,
            dry_run,
            color,
        }
    }

    /// Apply a color style when colors are enabled
    fn paint(&self, text: &str, style: impl Fn(ColoredString) -> ColoredString) -> String {
        if self.color {
            style(text.normal()).to_string()
        } else {
            text.to_string()
        }
    }

    /// Get the dry-run prefix if applicable
    fn dry_run_prefix(&self) -> String {
        if self.dry_run {
            format!("{} ", self.paint("(dry-run)", |s| s.cyan()))
        } else {
            String::new()
        }
    }

    fn change_label(&self, change: VersionChangeType) -> String {
        if self.color {
            change.colored_label()
        } else {
            change.label().to_string()
        }
    }

    /// Path relative to the scan root when possible
    fn relative<'a>(&self, scan: &ScanResult, path: &'a Path) -> &'a Path {
        path.strip_prefix(&scan.root_path).unwrap_or(path)
    }

    /// Format one dependency row
    fn format_dependency(
        &self,
        dep: &Dependency,
        width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let name = format!("{:width$}", dep.name, width = width);
        let current = if dep.is_unresolved() {
            self.paint(&dep.current_version, |s| s.red())
        } else {
            dep.current_version.clone()
        };
        let parameter = dep
            .parameter_name
            .as_deref()
            .map(|p| format!(" {}", self.paint(&format!("$({})", p), |s| s.dimmed())))
            .unwrap_or_default();

        let status = if !dep.is_checked {
            String::new()
        } else if dep.is_not_found {
            format!(" {}", self.paint("not found", |s| s.red()))
        } else if dep.is_latest {
            format!(" {}", self.paint("up to date", |s| s.green()))
        } else {
            let change = VersionChangeType::from_versions(&dep.current_version, &dep.latest_version);
            let arrow = if self.color { "→" } else { "->" };
            let source = dep
                .source
                .as_ref()
                .map(|s| format!(" {}", self.paint(&format!("({})", s.key), |c| c.dimmed())))
                .unwrap_or_default();
            format!(
                " {} {} [{}]{}",
                arrow,
                self.paint(&dep.latest_version, |s| s.bright_white().bold()),
                self.change_label(change),
                source
            )
        };

        writeln!(writer, "  {}{}{}{}", name, current, parameter, status)
    }

    /// Format one project with its dependencies
    fn format_project(
        &self,
        scan: &ScanResult,
        project: &Project,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let path = self.relative(scan, &project.file).display().to_string();
        writeln!(
            writer,
            "{} {}",
            self.paint(&project.name, |s| s.bold()),
            self.paint(&format!("({})", path), |s| s.dimmed())
        )?;

        match &project.parameter_file {
            ParameterFile::None => {}
            ParameterFile::Found(file) => {
                let file = self.relative(scan, file).display().to_string();
                writeln!(writer, "  parameters: {}", file)?;
                if self.verbosity == Verbosity::Verbose {
                    for (name, value) in &project.parameters {
                        writeln!(
                            writer,
                            "    {}",
                            self.paint(&format!("{} = {}", name, value), |s| s.dimmed())
                        )?;
                    }
                }
            }
            ParameterFile::NotFound(_) => {
                let shown = project.parameter_file.to_string();
                writeln!(writer, "  parameters: {}", self.paint(&shown, |s| s.red()))?;
            }
        }

        if project.dependencies.is_empty() {
            writeln!(writer, "  {}", self.paint("(no package references)", |s| s.dimmed()))?;
        } else {
            let width = project
                .dependencies
                .iter()
                .map(|d| d.name.len())
                .max()
                .unwrap_or(0)
                .max(20)
                + 1;
            for dep in &project.dependencies {
                self.format_dependency(dep, width, writer)?;
            }
        }

        writeln!(writer)
    }

    /// Format the configured registry sources
    fn format_sources(&self, scan: &ScanResult, writer: &mut dyn Write) -> std::io::Result<()> {
        writeln!(writer, "{}", self.paint("Sources:", |s| s.bold()))?;
        if scan.sources.is_empty() {
            writeln!(
                writer,
                "  {}",
                self.paint("(none configured; nuget.org is used)", |s| s.dimmed())
            )?;
        }
        for source in &scan.sources {
            writeln!(writer, "  {} {}", source.key, self.paint(&source.url, |s| s.dimmed()))?;
        }
        writeln!(writer)
    }

    /// Format manifests and configuration files that were skipped
    fn format_issues(&self, scan: &ScanResult, writer: &mut dyn Write) -> std::io::Result<()> {
        if scan.issues.is_empty() {
            return Ok(());
        }

        writeln!(writer, "{}:", self.paint("Skipped", |s| s.yellow().bold()))?;
        for issue in &scan.issues {
            let file = self.relative(scan, &issue.file).display().to_string();
            let bullet = if self.color { "✗" } else { "-" };
            writeln!(
                writer,
                "  {} {}: {}",
                self.paint(bullet, |s| s.yellow()),
                file,
                issue.message
            )?;
        }
        writeln!(writer)
    }

    /// Format the ranked answers for one package
    fn format_lookup(&self, lookup: &PackageLookup, writer: &mut dyn Write) -> std::io::Result<()> {
        if lookup.results.is_empty() {
            return writeln!(
                writer,
                "{}: {}",
                self.paint(&lookup.package, |s| s.bold()),
                self.paint("not found on any source", |s| s.red())
            );
        }

        writeln!(writer, "{}:", self.paint(&lookup.package, |s| s.bold()))?;
        let width = lookup
            .results
            .iter()
            .map(|r| r.source.key.len())
            .max()
            .unwrap_or(0)
            .max(12);
        for (i, result) in lookup.results.iter().enumerate() {
            let mut markers = Vec::new();
            if i == 0 {
                markers.push("latest");
            }
            if result.is_prerelease {
                markers.push("prerelease");
            }
            if result.is_legacy {
                markers.push("legacy");
            }
            let markers = if markers.is_empty() {
                String::new()
            } else {
                format!(" {}", self.paint(&format!("({})", markers.join(", ")), |s| s.dimmed()))
            };
            let version = if i == 0 {
                self.paint(&result.version, |s| s.green().bold())
            } else {
                result.version.clone()
            };
            writeln!(
                writer,
                "  {:width$} {}{}",
                result.source.key,
                version,
                markers,
                width = width
            )?;
        }
        Ok(())
    }

    /// Format update candidates and the writer outcome
    fn format_updates(
        &self,
        result: &OrchestratorResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let prefix = self.dry_run_prefix();

        if result.candidates.is_empty() {
            writeln!(writer, "{}{}", prefix, self.paint("No updates available", |s| s.dimmed()))?;
            return writeln!(writer);
        }

        writeln!(writer, "{}{}:", prefix, self.paint("Updates", |s| s.bold()))?;
        for target in &result.candidates {
            self.format_target(&result.scan, target, writer)?;
        }

        if let Some(outcome) = &result.apply {
            if outcome.success {
                writeln!(
                    writer,
                    "{} {}",
                    self.paint(if self.color { "✓" } else { "ok:" }, |s| s.green()),
                    outcome.message
                )?;
            } else {
                writeln!(
                    writer,
                    "{} {}",
                    self.paint(if self.color { "✗" } else { "error:" }, |s| s.red()),
                    outcome.message
                )?;
            }
        }
        writeln!(writer)
    }

    fn format_target(
        &self,
        scan: &ScanResult,
        target: &UpdateTarget,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let dep = &target.dependency;
        let change = VersionChangeType::from_versions(&dep.current_version, target.new_version());
        let arrow = if self.color { "→" } else { "->" };
        let file = match (&dep.parameter_name, target.parameter_file.path()) {
            (Some(parameter), Some(path)) => format!(
                "{} $({})",
                self.relative(scan, path).display(),
                parameter
            ),
            _ => self.relative(scan, &target.project_file).display().to_string(),
        };

        writeln!(
            writer,
            "  {} {} {} {} [{}] {}",
            dep.name,
            self.paint(&dep.current_version, |s| s.dimmed()),
            arrow,
            self.paint(target.new_version(), |s| s.bright_white().bold()),
            self.change_label(change),
            self.paint(&format!("in {}", file), |s| s.dimmed())
        )
    }

    /// Format the summary counts
    fn format_summary(
        &self,
        summary: &ScanSummary,
        skipped: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        writeln!(writer, "{}:", self.paint("Summary", |s| s.bold()))?;
        writeln!(
            writer,
            "  {} project(s), {} dependenc{}",
            summary.projects,
            summary.dependencies,
            if summary.dependencies == 1 { "y" } else { "ies" }
        )?;
        if summary.checked > 0 {
            writeln!(
                writer,
                "  {} outdated, {} up to date, {} not found",
                self.paint(&summary.outdated.to_string(), |s| s.yellow()),
                self.paint(&summary.up_to_date.to_string(), |s| s.green()),
                self.paint(&summary.not_found.to_string(), |s| s.red())
            )?;
        }
        if summary.unresolved > 0 {
            writeln!(
                writer,
                "  {} unresolved parameter(s)",
                self.paint(&summary.unresolved.to_string(), |s| s.red())
            )?;
        }
        if skipped > 0 {
            writeln!(
                writer,
                "  {} file(s) skipped",
                self.paint(&skipped.to_string(), |s| s.yellow())
            )?;
        }
        Ok(())
    }

    /// One-line summary for quiet mode
    fn format_quiet(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let prefix = self.dry_run_prefix();

        if let Some(lookup) = &result.lookup {
            return match lookup.results.first() {
                Some(top) => writeln!(writer, "{} {}", lookup.package, top.version),
                None => writeln!(writer, "{} not found", lookup.package),
            };
        }

        match result.kind {
            RunKind::Scan => writeln!(
                writer,
                "{} project(s), {} dependencies",
                result.summary.projects, result.summary.dependencies
            )?,
            RunKind::Check => {
                if result.summary.outdated > 0 {
                    writeln!(
                        writer,
                        "{} outdated",
                        self.paint(&result.summary.outdated.to_string(), |s| s.yellow())
                    )?
                } else {
                    writeln!(writer, "{}", self.paint("All up to date", |s| s.dimmed()))?
                }
            }
            RunKind::Update => match &result.apply {
                Some(outcome) if !outcome.success => {
                    writeln!(writer, "{}", self.paint(&outcome.message, |s| s.red()))?
                }
                _ if result.candidates.is_empty() => {
                    writeln!(writer, "{}{}", prefix, self.paint("No updates", |s| s.dimmed()))?
                }
                _ => writeln!(
                    writer,
                    "{}{} updated",
                    prefix,
                    self.paint(&result.candidates.len().to_string(), |s| s.green())
                )?,
            },
        }
        Ok(())
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity == Verbosity::Quiet {
            return self.format_quiet(result, writer);
        }

        let scan = &result.scan;

        if let Some(lookup) = &result.lookup {
            self.format_lookup(lookup, writer)?;
            writeln!(writer)?;
            return self.format_issues(scan, writer);
        }

        if self.verbosity == Verbosity::Verbose {
            self.format_sources(scan, writer)?;
        }

        for project in &scan.projects {
            self.format_project(scan, project, writer)?;
        }

        self.format_issues(scan, writer)?;

        if result.kind == RunKind::Update {
            self.format_updates(result, writer)?;
        }

        self.format_summary(&result.summary, scan.issues.len(), writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RegistrySource, ScanIssue};
    use crate::manifest::ApplyOutcome;
    use crate::update::VersionResult;
    use std::path::PathBuf;

    fn sample_scan() -> ScanResult {
        let source = RegistrySource::nuget_org();
        let mut scan = ScanResult::new("/repo");

        let mut project = Project::new("/repo/src/App/App.csproj");
        let mut outdated = Dependency::new("Serilog", "2.10.0");
        outdated.mark_found("3.1.1", source.clone());
        let mut latest = Dependency::new("Dapper", "2.1.35");
        latest.mark_found("2.1.35", source.clone());
        let mut missing = Dependency::new("Internal.Tools", "1.0.0");
        missing.mark_not_found();
        let unresolved = Dependency::parameterized("Polly", "PollyVersion", None);
        project.dependencies = vec![outdated, latest, missing, unresolved];
        scan.projects.push(project);

        scan
    }

    fn render(formatter: &TextFormatter, result: &OrchestratorResult) -> String {
        let mut output = Vec::new();
        formatter.format(result, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    fn plain(verbosity: Verbosity, dry_run: bool) -> TextFormatter {
        TextFormatter::with_color(verbosity, dry_run, false)
    }

    fn check_result() -> OrchestratorResult {
        let mut result = OrchestratorResult::new(sample_scan());
        result.kind = RunKind::Check;
        result
    }

    #[test]
    fn test_version_change_type_major() {
        assert_eq!(
            VersionChangeType::from_versions("1.0.0", "2.0.0"),
            VersionChangeType::Major
        );
    }

    #[test]
    fn test_version_change_type_minor() {
        assert_eq!(
            VersionChangeType::from_versions("1.0.0", "1.1.0"),
            VersionChangeType::Minor
        );
    }

    #[test]
    fn test_version_change_type_patch_and_revision() {
        assert_eq!(
            VersionChangeType::from_versions("1.0.0", "1.0.1"),
            VersionChangeType::Patch
        );
        assert_eq!(
            VersionChangeType::from_versions("4.3.0.0", "4.3.0.1"),
            VersionChangeType::Patch
        );
    }

    #[test]
    fn test_version_change_type_unparseable() {
        assert_eq!(
            VersionChangeType::from_versions(crate::domain::NO_PARAMETER, "1.0.0"),
            VersionChangeType::Unknown
        );
    }

    #[test]
    fn test_dry_run_prefix() {
        assert_eq!(plain(Verbosity::Normal, true).dry_run_prefix(), "(dry-run) ");
        assert_eq!(plain(Verbosity::Normal, false).dry_run_prefix(), "");
    }

    #[test]
    fn test_format_check_rows() {
        let output = render(&plain(Verbosity::Normal, false), &check_result());

        assert!(output.contains("App.csproj (src/App/App.csproj)"));
        assert!(output.contains("2.10.0 -> 3.1.1 [major] (nuget)"));
        assert!(output.contains("2.1.35 up to date"));
        assert!(output.contains("1.0.0 not found"));
        assert!(output.contains("-No Parameter- $(PollyVersion)"));
        assert!(output.contains("4 dependencies"));
        assert!(output.contains("1 outdated, 1 up to date, 1 not found"));
        assert!(output.contains("1 unresolved parameter(s)"));
    }

    #[test]
    fn test_format_scan_has_no_status() {
        let mut scan = ScanResult::new("/repo");
        let mut project = Project::new("/repo/App.csproj");
        project.dependencies.push(Dependency::new("Serilog", "2.10.0"));
        scan.projects.push(project);

        let output = render(&plain(Verbosity::Normal, false), &OrchestratorResult::new(scan));
        assert!(output.contains("Serilog"));
        assert!(!output.contains("up to date"));
        assert!(!output.contains("outdated"));
    }

    #[test]
    fn test_format_verbose_shows_sources_and_parameters() {
        let mut scan = ScanResult::new("/repo");
        scan.sources.push(RegistrySource::new("private", "https://pkgs.example.com/index.json"));
        let mut project = Project::new("/repo/App.csproj");
        project.parameter_file = ParameterFile::Found(PathBuf::from("/repo/Versions.props"));
        project
            .parameters
            .insert("SerilogVersion".to_string(), "2.10.0".to_string());
        scan.projects.push(project);

        let output = render(&plain(Verbosity::Verbose, false), &OrchestratorResult::new(scan));
        assert!(output.contains("Sources:"));
        assert!(output.contains("private https://pkgs.example.com/index.json"));
        assert!(output.contains("parameters: Versions.props"));
        assert!(output.contains("SerilogVersion = 2.10.0"));
    }

    #[test]
    fn test_format_missing_parameter_file() {
        let mut scan = ScanResult::new("/repo");
        let mut project = Project::new("/repo/App.csproj");
        project.parameter_file = ParameterFile::NotFound(PathBuf::from("/repo/Missing.props"));
        scan.projects.push(project);

        let output = render(&plain(Verbosity::Normal, false), &OrchestratorResult::new(scan));
        assert!(output.contains("parameters: (NOT FOUND!) /repo/Missing.props"));
        assert!(output.contains("(no package references)"));
    }

    #[test]
    fn test_format_issues() {
        let mut scan = ScanResult::new("/repo");
        scan.issues.push(ScanIssue {
            file: PathBuf::from("/repo/Bad/Bad.csproj"),
            message: "failed to parse XML".to_string(),
        });

        let output = render(&plain(Verbosity::Normal, false), &OrchestratorResult::new(scan));
        assert!(output.contains("Skipped:"));
        assert!(output.contains("- Bad/Bad.csproj: failed to parse XML"));
        assert!(output.contains("1 file(s) skipped"));
    }

    #[test]
    fn test_format_lookup() {
        let pv = |v: &str| PackageVersion::parse(v).unwrap();
        let mut result = OrchestratorResult::new(ScanResult::new("/repo"));
        result.kind = RunKind::Check;
        result.lookup = Some(PackageLookup {
            package: "Serilog".to_string(),
            results: vec![
                VersionResult::new(RegistrySource::nuget_org(), &pv("3.1.1")),
                VersionResult::new(
                    RegistrySource::new("private", "https://pkgs.example.com/index.json"),
                    &pv("3.0.0-beta.1"),
                ),
            ],
        });

        let output = render(&plain(Verbosity::Normal, false), &result);
        assert!(output.contains("Serilog:"));
        assert!(output.contains("3.1.1 (latest)"));
        assert!(output.contains("3.0.0-beta.1 (prerelease)"));
        assert!(!output.contains("Summary"));
    }

    #[test]
    fn test_format_lookup_not_found() {
        let mut result = OrchestratorResult::new(ScanResult::new("/repo"));
        result.lookup = Some(PackageLookup {
            package: "Nope".to_string(),
            results: Vec::new(),
        });

        let output = render(&plain(Verbosity::Normal, false), &result);
        assert!(output.contains("Nope: not found on any source"));
    }

    #[test]
    fn test_format_update_dry_run() {
        let mut result = check_result();
        result.kind = RunKind::Update;
        result.dry_run = true;
        let project = &result.scan.projects[0];
        result.candidates = vec![UpdateTarget::new(project, &project.dependencies[0])];

        let output = render(&plain(Verbosity::Normal, true), &result);
        assert!(output.contains("(dry-run) Updates:"));
        assert!(output.contains("Serilog 2.10.0 -> 3.1.1 [major] in src/App/App.csproj"));
        assert!(!output.contains("ok:"));
    }

    #[test]
    fn test_format_update_outcome() {
        let mut result = check_result();
        result.kind = RunKind::Update;
        let project = &result.scan.projects[0];
        result.candidates = vec![UpdateTarget::new(project, &project.dependencies[0])];
        result.apply = Some(ApplyOutcome {
            success: false,
            message: "update rejected: no latest version recorded for 'Serilog'".to_string(),
        });

        let output = render(&plain(Verbosity::Normal, false), &result);
        assert!(output.contains("error: update rejected"));
    }

    #[test]
    fn test_format_update_nothing_to_do() {
        let mut result = OrchestratorResult::new(ScanResult::new("/repo"));
        result.kind = RunKind::Update;

        let output = render(&plain(Verbosity::Normal, false), &result);
        assert!(output.contains("No updates available"));
    }

    #[test]
    fn test_format_quiet() {
        let output = render(&plain(Verbosity::Quiet, false), &check_result());
        assert_eq!(output.trim(), "1 outdated");

        let scan_output = render(
            &plain(Verbosity::Quiet, false),
            &OrchestratorResult::new(sample_scan()),
        );
        assert_eq!(scan_output.trim(), "1 project(s), 4 dependencies");
    }

    #[test]
    fn test_format_quiet_update_dry_run() {
        let mut result = check_result();
        result.kind = RunKind::Update;
        let project = &result.scan.projects[0];
        result.candidates = vec![UpdateTarget::new(project, &project.dependencies[0])];

        let output = render(&plain(Verbosity::Quiet, true), &result);
        assert_eq!(output.trim(), "(dry-run) 1 updated");
    }

    #[test]
    fn test_colored_output_does_not_panic() {
        let output = render(&TextFormatter::new(Verbosity::Verbose, false), &check_result());
        assert!(output.contains("Serilog"));
    }
}
