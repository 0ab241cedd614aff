//! Seeding the operator's local override file from the release prototype.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::InstallPaths;
use crate::error::{InstallError, Result};
use crate::exec::{CommandRunner, CommandSpec, Elevation, run_checked};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProvisionOutcome {
    Created { path: PathBuf, prototype: PathBuf },
    AlreadyPresent { path: PathBuf },
}

/// Creates `<user_config_dir>/<local_config_name>` when it is missing.
///
/// An existing file is never touched, so reruns keep the operator's edits.
#[derive(Debug, Clone)]
pub struct LocalConfigProvisioner {
    runner: Arc<dyn CommandRunner>,
    elevation: Elevation,
    user_config_dir: PathBuf,
    target: PathBuf,
    prototype: PathBuf,
}

impl LocalConfigProvisioner {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        elevation: Elevation,
        paths: &InstallPaths,
        local_config_name: &str,
        prototype_name: &str,
    ) -> Self {
        Self {
            runner,
            elevation,
            user_config_dir: paths.user_config_dir().to_path_buf(),
            target: paths.user_config_dir().join(local_config_name),
            prototype: paths.config_dir().join(prototype_name),
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn prototype(&self) -> &Path {
        &self.prototype
    }

    pub fn provision(&self) -> Result<ProvisionOutcome> {
        if self.target_exists()? {
            debug!(path = %self.target.display(), "local config already present");
            return Ok(ProvisionOutcome::AlreadyPresent {
                path: self.target.clone(),
            });
        }

        let content = fs::read(&self.prototype).map_err(|e| {
            InstallError::io(
                format!("Failed to read config prototype {}", self.prototype.display()),
                e,
            )
        })?;

        // Dropping the handle removes the staged copy.
        let mut staged = tempfile::NamedTempFile::new()
            .map_err(|e| InstallError::io("Failed to create temporary config file", e))?;
        staged
            .write_all(&content)
            .and_then(|()| staged.flush())
            .map_err(|e| InstallError::io("Failed to write temporary config file", e))?;

        let target = self.target.to_string_lossy().to_string();
        let commands = [
            CommandSpec::new("mkdir")
                .arg("-p")
                .arg(self.user_config_dir.to_string_lossy()),
            CommandSpec::new("cp")
                .arg(staged.path().to_string_lossy())
                .arg(target.clone()),
            CommandSpec::new("chmod").arg("600").arg(target),
        ];
        for command in commands {
            run_checked(self.runner.as_ref(), &self.elevation.wrap(command))?;
        }

        info!(
            path = %self.target.display(),
            prototype = %self.prototype.display(),
            "created default local config"
        );
        Ok(ProvisionOutcome::Created {
            path: self.target.clone(),
            prototype: self.prototype.clone(),
        })
    }

    /// Whether the target exists, asking with elevated rights when the
    /// invoking user cannot look inside the config directory.
    fn target_exists(&self) -> Result<bool> {
        match self.target.try_exists() {
            Ok(exists) => Ok(exists),
            Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                debug!(path = %self.target.display(), "existence check denied; retrying elevated");
                let command = self.elevation.wrap(
                    CommandSpec::new("test")
                        .arg("-e")
                        .arg(self.target.to_string_lossy()),
                );
                let output = self
                    .runner
                    .run(&command)
                    .map_err(|source| InstallError::Spawn {
                        command: command.to_string(),
                        source,
                    })?;
                match output.exit_code {
                    0 => Ok(true),
                    1 => Ok(false),
                    exit_code => Err(InstallError::CommandFailed {
                        command: command.to_string(),
                        exit_code,
                        output: output.diagnostic(),
                    }),
                }
            }
            Err(err) => Err(InstallError::io(
                format!("Failed to check {}", self.target.display()),
                err,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::fakes::ScriptedRunner;
    use crate::exec::{CommandOutput, ElevationMode};

    struct Fixture {
        _temp: tempfile::TempDir,
        paths: InstallPaths,
    }

    fn fixture() -> Fixture {
        let temp = tempfile::TempDir::new().unwrap();
        let paths = InstallPaths::new(
            temp.path().join("spinnaker"),
            temp.path().join("home/.spinnaker"),
            temp.path().join("opt"),
        );
        fs::create_dir_all(paths.config_dir()).unwrap();
        fs::write(
            paths.config_dir().join("default-spinnaker-local.yml"),
            "providers:\n  google:\n    enabled: false\n",
        )
        .unwrap();
        Fixture { _temp: temp, paths }
    }

    fn provisioner(
        paths: &InstallPaths,
        runner: ScriptedRunner,
    ) -> (Arc<ScriptedRunner>, LocalConfigProvisioner) {
        let runner = Arc::new(runner);
        let provisioner = LocalConfigProvisioner::new(
            runner.clone(),
            Elevation::new(ElevationMode::Sudo),
            paths,
            "spinnaker-local.yml",
            "default-spinnaker-local.yml",
        );
        (runner, provisioner)
    }

    #[test]
    fn missing_file_is_created_with_private_mode() {
        let fixture = fixture();
        let (runner, provisioner) = provisioner(&fixture.paths, ScriptedRunner::new());

        let outcome = provisioner.provision().unwrap();
        assert!(matches!(outcome, ProvisionOutcome::Created { .. }));

        let lines = runner.command_lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("sudo mkdir -p "));
        assert!(lines[1].starts_with("sudo cp "));
        assert!(lines[1].ends_with("home/.spinnaker/spinnaker-local.yml"));
        assert!(lines[2].starts_with("sudo chmod 600 "));
    }

    #[test]
    fn existing_file_is_left_alone() {
        let fixture = fixture();
        fs::create_dir_all(fixture.paths.user_config_dir()).unwrap();
        let target = fixture.paths.user_config_dir().join("spinnaker-local.yml");
        fs::write(&target, "operator: edits\n").unwrap();
        let (runner, provisioner) = provisioner(&fixture.paths, ScriptedRunner::new());

        let outcome = provisioner.provision().unwrap();
        assert_eq!(outcome, ProvisionOutcome::AlreadyPresent { path: target.clone() });
        assert_eq!(fs::read_to_string(target).unwrap(), "operator: edits\n");
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn missing_prototype_is_an_error() {
        let fixture = fixture();
        fs::remove_file(fixture.paths.config_dir().join("default-spinnaker-local.yml")).unwrap();
        let (runner, provisioner) = provisioner(&fixture.paths, ScriptedRunner::new());

        let err = provisioner.provision().unwrap_err();
        assert!(err.to_string().contains("default-spinnaker-local.yml"));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn failed_copy_stops_before_chmod() {
        let fixture = fixture();
        let (runner, provisioner) = provisioner(
            &fixture.paths,
            ScriptedRunner::new().on("sudo cp", CommandOutput::failure(1, "cp: Permission denied")),
        );

        let err = provisioner.provision().unwrap_err();
        assert!(matches!(err, InstallError::CommandFailed { .. }));
        assert_eq!(runner.count("chmod"), 0);
    }
}
