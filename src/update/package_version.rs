//! NuGet package version parsing
//!
//! NuGet versions are `major[.minor[.patch[.revision]]][-label(.label)*][+metadata]`.
//! Unlike strict semver, one to four numeric components are allowed and the
//! a non-zero fourth (revision) component marks a legacy version.

use std::cmp::Ordering;

/// A parsed package version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVersion {
    /// Text as returned by the registry
    pub original: String,
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub revision: u64,
    /// Prerelease labels (the dot-separated part after `-`)
    pub release_labels: Vec<String>,
    /// Build metadata (the part after `+`)
    pub metadata: Option<String>,
}

impl PackageVersion {
    /// Parse a version string, returning `None` if it is not a NuGet version
    pub fn parse(input: &str) -> Option<Self> {
        let original = input.trim();
        let text = original
            .strip_prefix('v')
            .or_else(|| original.strip_prefix('V'))
            .unwrap_or(original);

        let (rest, metadata) = match text.split_once('+') {
            Some((rest, meta)) if is_valid_label_list(meta) => (rest, Some(meta.to_string())),
            Some(_) => return None,
            None => (text, None),
        };

        let (core, labels) = match rest.split_once('-') {
            Some((core, pre)) if is_valid_label_list(pre) => {
                (core, pre.split('.').map(str::to_string).collect())
            }
            Some(_) => return None,
            None => (rest, Vec::new()),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.is_empty() || parts.len() > 4 {
            return None;
        }
        let mut numbers = [0u64; 4];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            *slot = part.parse().ok()?;
        }

        Some(Self {
            original: original.to_string(),
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            revision: numbers[3],
            release_labels: labels,
            metadata,
        })
    }

    /// Numeric components as a tuple
    pub fn tuple(&self) -> (u64, u64, u64, u64) {
        (self.major, self.minor, self.patch, self.revision)
    }

    /// Returns true if the version carries prerelease labels
    pub fn is_prerelease(&self) -> bool {
        !self.release_labels.is_empty()
    }

    /// Returns true if the revision component is in use
    pub fn is_legacy(&self) -> bool {
        self.revision > 0
    }

    /// Returns true if the version needs SemVer 2.0 (dotted labels or metadata)
    pub fn is_semver2(&self) -> bool {
        self.release_labels.len() > 1 || self.metadata.is_some()
    }

    /// Compare by NuGet precedence
    ///
    /// Numeric components first; a release sorts above any prerelease of the
    /// same numbers; labels compare pairwise (numeric labels numerically and
    /// below alphanumeric ones, alphanumeric labels case-insensitively).
    /// Metadata is ignored.
    pub fn cmp_precedence(&self, other: &Self) -> Ordering {
        self.tuple()
            .cmp(&other.tuple())
            .then_with(|| compare_release_labels(&self.release_labels, &other.release_labels))
    }
}

fn is_valid_label_list(s: &str) -> bool {
    !s.is_empty()
        && s.split('.').all(|label| {
            !label.is_empty() && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        })
}

fn compare_release_labels(a: &[String], b: &[String]) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        _ => {}
    }

    for (x, y) in a.iter().zip(b) {
        let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
            (Ok(nx), Ok(ny)) => nx.cmp(&ny),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => x.to_ascii_lowercase().cmp(&y.to_ascii_lowercase()),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

/// Pick the highest version by NuGet precedence
///
/// Unparseable entries are ignored. Prereleases are skipped unless
/// `include_prerelease` is set.
pub fn select_latest<'a, I>(versions: I, include_prerelease: bool) -> Option<PackageVersion>
where
    I: IntoIterator<Item = &'a str>,
{
    versions
        .into_iter()
        .filter_map(PackageVersion::parse)
        .filter(|v| include_prerelease || !v.is_prerelease())
        .max_by(|a, b| a.cmp_precedence(b))
}
