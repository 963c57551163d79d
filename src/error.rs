//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ScanError: Issues with the scan root itself (fatal for a scan)
//! - ManifestError: Issues reading, parsing or rewriting manifest XML
//! - RegistryError: Issues with package registry communication
//! - ApplyError: A rejected or failed update batch
//! - CredentialError: Issues with the feed credential blob

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Scan root related errors
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Package registry related errors
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Update batch errors
    #[error(transparent)]
    Apply(#[from] ApplyError),

    /// Credential related errors
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// Errors that abort a whole scan
#[derive(Error, Debug)]
pub enum ScanError {
    /// Scan root does not exist
    #[error("path not found: {path}")]
    PathNotFound { path: PathBuf },

    /// Scan root exists but is not a directory
    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Failed to resolve the scan root or walk beneath it
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to manifest, parameter file and nuget.config operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Failed to read a file
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed XML
    #[error("failed to parse XML in {path}: {message}")]
    XmlParseError { path: PathBuf, message: String },

    /// Imported parameter file is missing; updates for its project are refused
    #[error("parameter file not found for '{dependency}': {path}")]
    ParameterFileNotFound { dependency: String, path: PathBuf },

    /// Dependency version refers to a parameter with no known value
    #[error("'{dependency}' uses $({parameter}) which has no value; fix the parameter file first")]
    UnresolvedParameter {
        dependency: String,
        parameter: String,
    },

    /// Update target carries no version to write
    #[error("no latest version recorded for '{dependency}'")]
    NoTargetVersion { dependency: String },

    /// The node to rewrite could not be located
    #[error("could not locate {target} for '{dependency}' in {path}")]
    WriteTargetNotFound {
        dependency: String,
        target: String,
        path: PathBuf,
    },
}

/// Errors related to package registry communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Package not found in registry
    #[error("package '{package}' not found in {registry}")]
    PackageNotFound { package: String, registry: String },

    /// Network request failed
    #[error("failed to fetch package '{package}' from {registry}: {message}")]
    NetworkError {
        package: String,
        registry: String,
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {registry}")]
    RateLimitExceeded { registry: String },

    /// Invalid response from registry
    #[error("invalid response from {registry} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        registry: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching '{package}' from {registry}")]
    Timeout { package: String, registry: String },

    /// Authentication error
    #[error("authentication failed for {registry}: {message}")]
    AuthenticationError { registry: String, message: String },
}

/// Errors that stop an update batch
#[derive(Error, Debug)]
pub enum ApplyError {
    /// Preflight found targets that must not be written; nothing was changed
    #[error("update rejected: {}", join_reasons(.reasons))]
    Rejected { reasons: Vec<ManifestError> },

    /// A write failed part-way; earlier files keep their new contents
    #[error("update failed after {written} write(s): {source}")]
    Write {
        written: usize,
        #[source]
        source: ManifestError,
    },
}

fn join_reasons(reasons: &[ManifestError]) -> String {
    reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors related to the feed credential blob
#[derive(Error, Debug)]
pub enum CredentialError {
    /// The credential JSON could not be parsed
    #[error("invalid credential JSON in {origin}: {message}")]
    InvalidJson { origin: String, message: String },
}

impl ScanError {
    /// Creates a new PathNotFound error
    pub fn path_not_found(path: impl Into<PathBuf>) -> Self {
        ScanError::PathNotFound { path: path.into() }
    }

    /// Creates a new Io error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::Io {
            path: path.into(),
            source,
        }
    }
}

impl ManifestError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new XmlParseError
    pub fn xml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::XmlParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new WriteTargetNotFound error
    pub fn write_target_not_found(
        dependency: impl Into<String>,
        target: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        ManifestError::WriteTargetNotFound {
            dependency: dependency.into(),
            target: target.into(),
            path: path.into(),
        }
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::NetworkError {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::InvalidResponse {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new RateLimitExceeded error
    pub fn rate_limit_exceeded(registry: impl Into<String>) -> Self {
        RegistryError::RateLimitExceeded {
            registry: registry.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
            registry: registry.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_path_not_found() {
        let err = ScanError::path_not_found("/missing/root");
        let msg = format!("{}", err);
        assert!(msg.contains("path not found"));
        assert!(msg.contains("/missing/root"));
    }

    #[test]
    fn test_manifest_error_xml_parse() {
        let err = ManifestError::xml_parse_error("/src/App.csproj", "unexpected end of stream");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to parse XML"));
        assert!(msg.contains("App.csproj"));
        assert!(msg.contains("unexpected end of stream"));
    }

    #[test]
    fn test_manifest_error_write_target_not_found() {
        let err = ManifestError::write_target_not_found(
            "Newtonsoft.Json",
            "<PackageReference Include=\"Newtonsoft.Json\">",
            "/src/App.csproj",
        );
        let msg = format!("{}", err);
        assert!(msg.contains("could not locate"));
        assert!(msg.contains("Newtonsoft.Json"));
        assert!(msg.contains("App.csproj"));
    }

    #[test]
    fn test_manifest_error_parameter_file_not_found() {
        let err = ManifestError::ParameterFileNotFound {
            dependency: "Serilog".to_string(),
            path: PathBuf::from("/repo/Versions.props"),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("parameter file not found"));
        assert!(msg.contains("Serilog"));
    }

    #[test]
    fn test_manifest_error_unresolved_parameter() {
        let err = ManifestError::UnresolvedParameter {
            dependency: "Foo".to_string(),
            parameter: "FooVersion".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("$(FooVersion)"));
    }

    #[test]
    fn test_apply_error_rejected_lists_every_reason() {
        let err = ApplyError::Rejected {
            reasons: vec![
                ManifestError::UnresolvedParameter {
                    dependency: "Foo".to_string(),
                    parameter: "FooVersion".to_string(),
                },
                ManifestError::ParameterFileNotFound {
                    dependency: "Bar".to_string(),
                    path: PathBuf::from("/repo/Missing.props"),
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("update rejected: "));
        assert!(msg.contains("$(FooVersion)"));
        assert!(msg.contains("Missing.props"));
    }

    #[test]
    fn test_apply_error_write_counts_progress() {
        let err = ApplyError::Write {
            written: 2,
            source: ManifestError::write_target_not_found("Foo", "Version attribute", "/a.csproj"),
        };
        assert!(err.to_string().contains("after 2 write(s)"));
    }

    #[test]
    fn test_registry_error_package_not_found() {
        let err = RegistryError::package_not_found("Nonexistent.Package", "nuget");
        let msg = format!("{}", err);
        assert!(msg.contains("package 'Nonexistent.Package' not found"));
        assert!(msg.contains("nuget"));
    }

    #[test]
    fn test_registry_error_network() {
        let err = RegistryError::network_error("Serilog", "nuget", "connection refused");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to fetch"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_registry_error_rate_limit() {
        let err = RegistryError::rate_limit_exceeded("nuget");
        assert!(err.to_string().contains("rate limit exceeded"));
    }

    #[test]
    fn test_registry_error_timeout() {
        let err = RegistryError::timeout("Serilog", "private-feed");
        let msg = format!("{}", err);
        assert!(msg.contains("timeout"));
        assert!(msg.contains("Serilog"));
        assert!(msg.contains("private-feed"));
    }

    #[test]
    fn test_credential_error_invalid_json() {
        let err = CredentialError::InvalidJson {
            origin: "VSS_NUGET_EXTERNAL_FEED_ENDPOINTS".to_string(),
            message: "expected value".to_string(),
        };
        assert!(err.to_string().contains("invalid credential JSON"));
    }

    #[test]
    fn test_app_error_from_scan_error() {
        let app_err: AppError = ScanError::path_not_found("/missing").into();
        assert!(app_err.to_string().contains("path not found"));
    }

    #[test]
    fn test_app_error_from_manifest_error() {
        let app_err: AppError = ManifestError::xml_parse_error("/a.csproj", "bad").into();
        assert!(app_err.to_string().contains("failed to parse XML"));
    }

    #[test]
    fn test_app_error_from_registry_error() {
        let app_err: AppError = RegistryError::package_not_found("pkg", "nuget").into();
        assert!(app_err.to_string().contains("package 'pkg' not found"));
    }

    #[test]
    fn test_error_debug_trait() {
        let err = ScanError::path_not_found("/test");
        let debug = format!("{:?}", err);
        assert!(debug.contains("PathNotFound"));
    }
}
