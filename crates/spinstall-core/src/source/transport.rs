//! Reaching release sources through the matching client tool.

use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::{ArtifactLocation, BackendKind};
use crate::error::{ConfigError, InstallError, Result};
use crate::exec::{CommandRunner, CommandSpec, Elevation};

const GSUTIL_HINT: &str = "follow the instructions at \
    https://cloud.google.com/storage/docs/gsutil_install and be sure you run `gsutil config`.";
const AWS_HINT: &str = "install awscli with \"sudo apt-get install awscli\".";

/// Runs listing and copy commands for an [`ArtifactLocation`].
#[derive(Debug, Clone)]
pub struct Transport {
    runner: Arc<dyn CommandRunner>,
    elevation: Elevation,
}

impl Transport {
    pub fn new(runner: Arc<dyn CommandRunner>, elevation: Elevation) -> Self {
        Self { runner, elevation }
    }

    pub fn runner(&self) -> &Arc<dyn CommandRunner> {
        &self.runner
    }

    /// Whether the location exists.
    ///
    /// Local paths are checked directly; object-store paths exist when a
    /// listing of them exits with status zero.
    pub fn exists(&self, location: &ArtifactLocation) -> Result<bool> {
        let Some(command) = list_command(location) else {
            return Ok(location.local_path().is_some_and(Path::exists));
        };
        let output = self
            .runner
            .run(&command)
            .map_err(|source| InstallError::Spawn {
                command: command.to_string(),
                source,
            })?;
        Ok(output.is_success())
    }

    /// Check that the location can be read before anything is installed.
    ///
    /// Local paths must exist; no command is run for them. Object-store
    /// paths need their client tool on `PATH` and a successful listing.
    pub fn validate_reachable(&self, location: &ArtifactLocation) -> Result<(), ConfigError> {
        let kind = location.kind();
        let Some(tool) = kind.client_tool() else {
            if location.local_path().is_some_and(Path::exists) {
                return Ok(());
            }
            return Err(ConfigError::PathNotFound {
                path: location.to_string(),
            });
        };

        let missing_tool = || ConfigError::ClientToolMissing {
            tool,
            backend: kind.display_name(),
            hint: match kind {
                BackendKind::S3 => AWS_HINT,
                _ => GSUTIL_HINT,
            },
        };

        let probe = CommandSpec::new(tool).arg("--version");
        match self.runner.run(&probe) {
            Ok(output) if output.is_success() => {
                debug!(tool, version = %output.stdout.trim(), "client tool available");
            }
            Ok(_) => return Err(missing_tool()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(missing_tool()),
            Err(err) => {
                debug!(tool, error = %err, "client tool probe failed");
                return Err(missing_tool());
            }
        }

        let Some(listing) = list_command(location) else {
            return Ok(());
        };
        let output = match self.runner.run(&listing) {
            Ok(output) if output.is_success() => return Ok(()),
            Ok(output) => output.diagnostic(),
            Err(err) => err.to_string(),
        };
        Err(ConfigError::RemotePathNotFound {
            path: location.to_string(),
            backend: kind.display_name(),
            tool,
            output,
        })
    }

    /// Command copying `source` into `destination_dir`, elevated.
    ///
    /// Local sources go through `sh` so a wildcard in the path expands, while
    /// the path itself is still treated as a single word. Object-store copies
    /// forward the invoking user's `HOME` and `PATH` so credentials set up
    /// for that user keep working under `sudo`.
    pub fn copy_command(&self, source: &ArtifactLocation, destination_dir: &Path) -> CommandSpec {
        let destination = destination_dir.to_string_lossy().to_string();
        match source.kind() {
            BackendKind::Local => self.elevation.wrap(
                CommandSpec::new("sh")
                    .args(["-c", "IFS=; cp -- $1 \"$2\"", "sh"])
                    .arg(source.as_str())
                    .arg(destination),
            ),
            BackendKind::Gcs => self.elevation.wrap_with_user_env(
                CommandSpec::new("gsutil")
                    .args(["-m", "-q", "cp"])
                    .arg(source.as_str())
                    .arg(destination),
            ),
            BackendKind::S3 => self.elevation.wrap_with_user_env(
                CommandSpec::new("aws")
                    .args(["s3", "cp"])
                    .args(region_args(source))
                    .arg(source.as_str())
                    .arg(destination),
            ),
        }
    }
}

/// Listing command for object-store locations; `None` for local paths.
fn list_command(location: &ArtifactLocation) -> Option<CommandSpec> {
    match location.kind() {
        BackendKind::Local => None,
        BackendKind::Gcs => Some(CommandSpec::new("gsutil").arg("ls").arg(location.as_str())),
        BackendKind::S3 => Some(
            CommandSpec::new("aws")
                .args(["s3", "ls"])
                .args(region_args(location))
                .arg(location.as_str()),
        ),
    }
}

fn region_args(location: &ArtifactLocation) -> Vec<String> {
    match location.region() {
        Some(region) => vec!["--region".to_string(), region.to_string()],
        None => Vec::new(),
    }
}
