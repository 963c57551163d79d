//! Package name filter
//!
//! `UpdateFilter` narrows which packages a check or update touches.
//! Package ids are matched case-insensitively, as NuGet treats them.

/// Filter configuration from `--only` / `--exclude`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateFilter {
    /// Packages to leave alone
    pub exclude: Vec<String>,
    /// If non-empty, only these packages
    pub only: Vec<String>,
}

impl UpdateFilter {
    /// Create a new UpdateFilter with default settings (process all)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set packages to exclude
    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    /// Set packages to include (only list)
    pub fn with_only(mut self, only: Vec<String>) -> Self {
        self.only = only;
        self
    }

    /// Returns true if no restriction is configured
    pub fn is_empty(&self) -> bool {
        self.only.is_empty() && self.exclude.is_empty()
    }

    /// Check if a package should be processed based on filters
    pub fn should_process_package(&self, name: &str) -> bool {
        // --only wins over --exclude
        if !self.only.is_empty() {
            return self.only.iter().any(|p| p.eq_ignore_ascii_case(name));
        }
        !self.exclude.iter().any(|p| p.eq_ignore_ascii_case(name))
    }
}
