//! CLI argument parsing module for depsight

use crate::registry::{DEFAULT_CREDENTIALS_ENV, DEFAULT_SOURCE_TIMEOUT};
use crate::update::{CheckOptions, UpdateFilter, DEFAULT_CONCURRENCY};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Parse a timeout: plain seconds, `Ns`, or `Nms`
fn parse_timeout(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty timeout".to_string());
    }

    let (num_str, millis) = if let Some(n) = s.strip_suffix("ms") {
        (n, true)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, false)
    } else {
        (s, false)
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid number in timeout: {}", num_str))?;
    if num == 0 {
        return Err("timeout must be greater than zero".to_string());
    }

    Ok(if millis {
        Duration::from_millis(num)
    } else {
        Duration::from_secs(num)
    })
}

/// NuGet dependency scanner, checker and updater
#[derive(Parser, Debug, Clone)]
#[command(
    name = "depsight",
    version,
    about = "Inventory, check and update NuGet package references"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (debug logging)
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List projects, parameter files and package references
    Scan {
        /// Root directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Scan, then look up the latest version of every package
    Check {
        /// Root directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Look up one package and list every source's answer
        #[arg(long, value_name = "NAME")]
        package: Option<String>,

        #[command(flatten)]
        registry: RegistryArgs,
    },

    /// Scan, check, then pin outdated packages to their latest version
    Update {
        /// Root directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Show what would be updated without making changes
        #[arg(short = 'n', long)]
        dry_run: bool,

        #[command(flatten)]
        registry: RegistryArgs,
    },
}

/// Options shared by commands that query registries
#[derive(Args, Debug, Clone)]
pub struct RegistryArgs {
    /// Consider prerelease versions
    #[arg(long)]
    pub prerelease: bool,

    /// Only these packages (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub only: Vec<String>,

    /// Skip these packages (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Packages looked up at once
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Deadline for one source lookup (e.g. 5, 10s, 500ms)
    #[arg(long, value_parser = parse_timeout, default_value = "5")]
    pub timeout: Duration,

    /// Environment variable holding the feed credential JSON
    #[arg(long, value_name = "VAR", default_value = DEFAULT_CREDENTIALS_ENV)]
    pub credentials_env: String,
}

impl Default for RegistryArgs {
    fn default() -> Self {
        Self {
            prerelease: false,
            only: Vec::new(),
            exclude: Vec::new(),
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_SOURCE_TIMEOUT,
            credentials_env: DEFAULT_CREDENTIALS_ENV.to_string(),
        }
    }
}

impl RegistryArgs {
    /// Package filter from `--only` / `--exclude`
    pub fn filter(&self) -> UpdateFilter {
        UpdateFilter::new()
            .with_only(self.only.clone())
            .with_exclude(self.exclude.clone())
    }

    /// Check options from these arguments
    pub fn check_options(&self) -> CheckOptions {
        CheckOptions::default()
            .with_prerelease(self.prerelease)
            .with_concurrency(self.concurrency)
            .with_filter(self.filter())
    }
}

impl CliArgs {
    /// Root directory of the selected command
    pub fn path(&self) -> &Path {
        match &self.command {
            Command::Scan { path } | Command::Check { path, .. } | Command::Update { path, .. } => {
                path
            }
        }
    }

    /// Registry options, if the command queries registries
    pub fn registry(&self) -> Option<&RegistryArgs> {
        match &self.command {
            Command::Scan { .. } => None,
            Command::Check { registry, .. } | Command::Update { registry, .. } => Some(registry),
        }
    }

    /// Check if this is an update in dry-run mode
    pub fn is_dry_run(&self) -> bool {
        matches!(self.command, Command::Update { dry_run: true, .. })
    }

    /// Check if progress output should be shown
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }
}
