//! Error taxonomy for installation runs.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Problems with the requested options, detected before anything on the
/// host is mutated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("--release-path cannot be empty. Specify the release location to install from.")]
    MissingReleasePath,

    #[error("--region is required with an S3 release path ({path}).")]
    MissingRegion { path: String },

    #[error("Unsupported release path scheme '{scheme}://' in {path}. Use gs://, s3:// or a local path.")]
    UnsupportedScheme { scheme: String, path: String },

    #[error("Invalid release path {path}: {message}")]
    InvalidLocation { path: String, message: String },

    #[error("Unknown path --release-path={path}: the path does not exist.")]
    PathNotFound { path: String },

    #[error(
        "{tool} is required to retrieve the release from {backend}. \
         If you already have {tool}, fix your PATH. Otherwise {hint} Then run again."
    )]
    ClientToolMissing {
        tool: &'static str,
        backend: &'static str,
        hint: &'static str,
    },

    #[error("The path \"{path}\" does not seem to exist within {backend}. {tool} ls returned \"{output}\"")]
    RemotePathNotFound {
        path: String,
        backend: &'static str,
        tool: &'static str,
        output: String,
    },
}

/// Failures while reading `release_config.cfg`.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Could not read release config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No PACKAGE_LIST=\"...\" assignment found in {}", .path.display())]
    MissingPackageList { path: PathBuf },

    #[error("PACKAGE_LIST in {} does not name any packages", .path.display())]
    EmptyPackageList { path: PathBuf },
}

/// The launch script no longer has the shape the patcher expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptShapeError {
    #[error("expected a single-line {var}=... assignment")]
    MissingAssignment { var: &'static str },

    #[error("found {count} {var}=... assignments, expected exactly one")]
    AmbiguousAssignment { var: &'static str, count: usize },
}

#[derive(Debug, Error)]
pub enum InstallError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("COPY FAILED with {exit_code}: {output}{}", other_failures_suffix(.other_failures))]
    CopyFailed {
        source_path: String,
        exit_code: i32,
        output: String,
        other_failures: usize,
    },

    #[error(
        "Copy of {source_path} did not complete: {message}{}",
        other_failures_suffix(.other_failures)
    )]
    CopyAborted {
        source_path: String,
        message: String,
        other_failures: usize,
    },

    #[error("`{command}` failed with {exit_code}: {output}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        output: String,
    },

    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Unexpected launch script layout in {}: {source}", .script.display())]
    LaunchScript {
        script: PathBuf,
        #[source]
        source: ScriptShapeError,
    },

    #[error("Failed to patch {component}: {source}")]
    Patch {
        component: String,
        #[source]
        source: Box<InstallError>,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl InstallError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

fn other_failures_suffix(count: &usize) -> String {
    match *count {
        0 => String::new(),
        1 => " (1 other copy job also failed)".to_string(),
        n => format!(" ({n} other copy jobs also failed)"),
    }
}

pub type Result<T, E = InstallError> = std::result::Result<T, E>;
