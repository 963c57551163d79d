//! Dependency checker
//!
//! A [`CheckCycle`] queries the registry once per distinct package name and
//! copies the top-ranked answer into every dependency record with that name.
//! Lookups run concurrently; merging happens on the calling task, so each
//! name has exactly one writer.

use super::{UpdateFilter, VersionResult};
use crate::domain::ScanResult;
use crate::progress::Progress;
use crate::registry::RegistryClient;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use tracing::{debug, info};

/// Default number of packages looked up at once
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Options for a check cycle
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Allow prerelease versions as "latest"
    pub include_prerelease: bool,
    /// Maximum number of packages in flight
    pub concurrency: usize,
    /// Packages outside the filter stay unchecked
    pub filter: UpdateFilter,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            include_prerelease: false,
            concurrency: DEFAULT_CONCURRENCY,
            filter: UpdateFilter::default(),
        }
    }
}

impl CheckOptions {
    pub fn with_prerelease(mut self, include: bool) -> Self {
        self.include_prerelease = include;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_filter(mut self, filter: UpdateFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Counts from one `check_all` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Distinct package names queried
    pub packages: usize,
    /// Names at least one source knew
    pub found: usize,
    /// Names no source knew
    pub not_found: usize,
}

/// State of one check cycle
pub struct CheckCycle<'a> {
    registry: &'a RegistryClient,
    options: CheckOptions,
    /// Names already queried in this cycle
    queried: HashSet<String>,
}

impl<'a> CheckCycle<'a> {
    /// Start a new cycle with an empty queried set
    pub fn new(registry: &'a RegistryClient, options: CheckOptions) -> Self {
        Self {
            registry,
            options,
            queried: HashSet::new(),
        }
    }

    /// Returns true if `name` was already queried in this cycle
    pub fn is_queried(&self, name: &str) -> bool {
        self.queried.contains(name)
    }

    /// Check every not-yet-queried package in `scan`
    pub async fn check_all(&mut self, scan: &mut ScanResult, progress: &Progress) -> CheckReport {
        let pending: Vec<String> = scan
            .package_names()
            .into_iter()
            .filter(|name| self.options.filter.should_process_package(name))
            .filter(|name| !self.queried.contains(name))
            .collect();
        self.queried.extend(pending.iter().cloned());

        debug!(packages = pending.len(), "checking packages");

        let sources = scan.sources.clone();
        let sources = &sources;
        let registry = self.registry;
        let include_prerelease = self.options.include_prerelease;

        let mut lookups = stream::iter(pending)
            .map(move |name| async move {
                let results = registry
                    .latest_versions(&name, sources, include_prerelease)
                    .await;
                (name, results)
            })
            .buffer_unordered(self.options.concurrency.max(1));

        let mut report = CheckReport::default();
        while let Some((name, results)) = lookups.next().await {
            progress.set_message(&format!("Checked {}", name));
            progress.inc();
            report.packages += 1;
            if merge(scan, &name, results.first()) {
                report.found += 1;
            } else {
                report.not_found += 1;
            }
        }

        info!(
            packages = report.packages,
            found = report.found,
            not_found = report.not_found,
            "check finished"
        );
        report
    }

    /// Check a single package and merge the result into `scan`
    ///
    /// Returns `None` without querying if the name was already queried in
    /// this cycle, otherwise the ranked results.
    pub async fn check_package(
        &mut self,
        scan: &mut ScanResult,
        name: &str,
    ) -> Option<Vec<VersionResult>> {
        if !self.queried.insert(name.to_string()) {
            debug!(package = name, "already checked in this cycle");
            return None;
        }

        let results = self
            .registry
            .latest_versions(name, &scan.sources, self.options.include_prerelease)
            .await;
        merge(scan, name, results.first());
        Some(results)
    }
}

/// Copy the top result into every record named `name`; returns true if found
fn merge(scan: &mut ScanResult, name: &str, latest: Option<&VersionResult>) -> bool {
    for dep in scan.dependencies_mut().filter(|d| d.name == name) {
        match latest {
            Some(top) => dep.mark_found(&top.version, top.source.clone()),
            None => dep.mark_not_found(),
        }
    }
    match latest {
        Some(top) => {
            debug!(package = name, latest = %top.version, source = %top.source.key, "latest version");
            true
        }
        None => {
            debug!(package = name, "not found on any source");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dependency, Project, RegistrySource, NOT_FOUND_VERSION};
    use crate::registry::testing::{Scripted, StubAdapter};
    use std::sync::Arc;

    fn scan(projects: Vec<(&str, Vec<Dependency>)>) -> ScanResult {
        let mut result = ScanResult::new("/repo");
        for (file, deps) in projects {
            let mut project = Project::new(file);
            project.dependencies = deps;
            result.projects.push(project);
        }
        result
    }

    fn client(stub: &Arc<StubAdapter>) -> RegistryClient {
        RegistryClient::new(Box::new(Arc::clone(stub)))
    }

    #[tokio::test]
    async fn test_outdated_dependency() {
        let stub = Arc::new(StubAdapter::new().with("Foo", "nuget", Scripted::Version("2.3.1")));
        let registry = client(&stub);
        let mut result = scan(vec![("/repo/A.csproj", vec![Dependency::new("Foo", "1.0.0")])]);

        let report = CheckCycle::new(&registry, CheckOptions::default())
            .check_all(&mut result, &Progress::disabled())
            .await;

        let dep = &result.projects[0].dependencies[0];
        assert!(dep.is_checked);
        assert!(!dep.is_latest);
        assert_eq!(dep.latest_version, "2.3.1");
        assert_eq!(dep.source, Some(RegistrySource::nuget_org()));
        assert_eq!(
            report,
            CheckReport {
                packages: 1,
                found: 1,
                not_found: 0
            }
        );
    }

    #[tokio::test]
    async fn test_not_found_dependency() {
        let stub = Arc::new(StubAdapter::new());
        let registry = client(&stub);
        let mut result = scan(vec![("/repo/A.csproj", vec![Dependency::new("Nope", "1.0.0")])]);

        let report = CheckCycle::new(&registry, CheckOptions::default())
            .check_all(&mut result, &Progress::disabled())
            .await;

        let dep = &result.projects[0].dependencies[0];
        assert!(dep.is_checked);
        assert!(dep.is_not_found);
        assert!(!dep.is_latest);
        assert_eq!(dep.latest_version, NOT_FOUND_VERSION);
        assert_eq!(report.not_found, 1);
    }

    #[tokio::test]
    async fn test_same_name_queried_once() {
        let stub = Arc::new(StubAdapter::new().with("Foo", "nuget", Scripted::Version("2.0.0")));
        let registry = client(&stub);
        let mut result = scan(vec![
            ("/repo/A.csproj", vec![Dependency::new("Foo", "1.0.0")]),
            (
                "/repo/B.csproj",
                vec![Dependency::new("Foo", "2.0.0"), Dependency::new("Bar", "1.0.0")],
            ),
        ]);

        CheckCycle::new(&registry, CheckOptions::default())
            .check_all(&mut result, &Progress::disabled())
            .await;

        let mut queried = stub.queried_packages();
        queried.sort();
        assert_eq!(queried, vec!["Bar", "Foo"]);

        let a = &result.projects[0].dependencies[0];
        let b = &result.projects[1].dependencies[0];
        assert_eq!(a.latest_version, b.latest_version);
        assert_eq!(a.source, b.source);
        assert!(!a.is_latest);
        assert!(b.is_latest);
    }

    #[tokio::test]
    async fn test_cycle_does_not_requery() {
        let stub = Arc::new(StubAdapter::new().with("Foo", "nuget", Scripted::Version("2.0.0")));
        let registry = client(&stub);
        let mut result = scan(vec![("/repo/A.csproj", vec![Dependency::new("Foo", "1.0.0")])]);

        let mut cycle = CheckCycle::new(&registry, CheckOptions::default());
        cycle.check_all(&mut result, &Progress::disabled()).await;
        let second = cycle.check_all(&mut result, &Progress::disabled()).await;
        assert_eq!(second.packages, 0);
        assert!(cycle.is_queried("Foo"));
        assert!(cycle.check_package(&mut result, "Foo").await.is_none());
        assert_eq!(stub.queried_packages().len(), 1);

        CheckCycle::new(&registry, CheckOptions::default())
            .check_all(&mut result, &Progress::disabled())
            .await;
        assert_eq!(stub.queried_packages().len(), 2);
    }

    #[tokio::test]
    async fn test_check_package_merges_and_returns_ranked() {
        let stub = Arc::new(
            StubAdapter::new()
                .with("Foo", "a", Scripted::Version("1.5.0"))
                .with("Foo", "b", Scripted::Version("1.6.0")),
        );
        let registry = client(&stub);
        let mut result = scan(vec![("/repo/A.csproj", vec![Dependency::new("Foo", "1.5.0")])]);
        result.sources = vec![
            RegistrySource::new("a", "https://a.example/index.json"),
            RegistrySource::new("b", "https://b.example/index.json"),
        ];

        let mut cycle = CheckCycle::new(&registry, CheckOptions::default());
        let results = cycle.check_package(&mut result, "Foo").await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].version, "1.6.0");
        let dep = &result.projects[0].dependencies[0];
        assert_eq!(dep.latest_version, "1.6.0");
        assert_eq!(dep.source.as_ref().map(|s| s.key.as_str()), Some("b"));
    }

    #[tokio::test]
    async fn test_filter_leaves_packages_unchecked() {
        let stub = Arc::new(
            StubAdapter::new()
                .with("Foo", "nuget", Scripted::Version("2.0.0"))
                .with("Bar", "nuget", Scripted::Version("2.0.0")),
        );
        let registry = client(&stub);
        let mut result = scan(vec![(
            "/repo/A.csproj",
            vec![Dependency::new("Foo", "1.0.0"), Dependency::new("Bar", "1.0.0")],
        )]);

        let options =
            CheckOptions::default().with_filter(UpdateFilter::new().with_only(vec!["Foo".into()]));
        CheckCycle::new(&registry, options)
            .check_all(&mut result, &Progress::disabled())
            .await;

        assert!(result.projects[0].dependencies[0].is_checked);
        assert!(!result.projects[0].dependencies[1].is_checked);
        assert_eq!(stub.queried_packages(), vec!["Foo"]);
    }

    #[tokio::test]
    async fn test_many_packages_with_low_concurrency() {
        let mut stub = StubAdapter::new();
        let names: Vec<String> = (0..25).map(|i| format!("Pkg{}", i)).collect();
        for (i, name) in names.iter().enumerate() {
            let version = if i % 2 == 0 { "2.0.0" } else { "3.0.0" };
            stub = stub.with(name, "nuget", Scripted::Version(version));
        }
        let stub = Arc::new(stub);
        let registry = client(&stub);
        let deps = names.iter().map(|n| Dependency::new(n.as_str(), "1.0.0")).collect();
        let mut result = scan(vec![("/repo/A.csproj", deps)]);

        let report = CheckCycle::new(&registry, CheckOptions::default().with_concurrency(3))
            .check_all(&mut result, &Progress::disabled())
            .await;

        assert_eq!(report.packages, 25);
        assert!(result.dependencies().all(|d| d.is_checked && !d.is_not_found));
        assert_eq!(result.projects[0].dependencies[0].latest_version, "2.0.0");
        assert_eq!(result.projects[0].dependencies[13].latest_version, "3.0.0");
    }

    #[test]
    fn test_check_options_default() {
        let options = CheckOptions::default();
        assert!(!options.include_prerelease);
        assert_eq!(options.concurrency, DEFAULT_CONCURRENCY);
        assert!(options.filter.is_empty());
        assert_eq!(CheckOptions::default().with_concurrency(0).concurrency, 1);
    }
}
