//! Installation context for unified dependency injection.

use std::sync::Arc;

use crate::config::InstallOptions;
use crate::config::InstallPaths;
use crate::config::options::{DEFAULT_INSTALL_COMMAND, DEFAULT_REPAIR_COMMAND};
use crate::exec::{CommandRunner, CommandSpec, Elevation, SystemRunner};
use crate::packages::{AptPrerequisites, PackageInstaller, Prerequisites};
use crate::patch::ConfigPatcher;
use crate::provision::LocalConfigProvisioner;
use crate::source::Transport;

/// Shared services and settings for one installation run.
///
/// Frontends create this once from resolved [`InstallOptions`] and hand it
/// to the orchestrator. Every component gets the same runner and elevation.
#[derive(Debug, Clone)]
pub struct InstallContext {
    options: InstallOptions,
    runner: Arc<dyn CommandRunner>,
    elevation: Elevation,
    prerequisites: Arc<dyn Prerequisites>,
}

impl InstallContext {
    /// Create a context that elevates with the invoking user's `HOME` and
    /// `PATH` forwarded.
    pub fn new(options: InstallOptions, runner: Arc<dyn CommandRunner>) -> Self {
        let elevation = Elevation::capture_user_env(options.elevation);
        Self::with_elevation(options, runner, elevation)
    }

    /// Create a context with an explicit elevation (for testing).
    pub fn with_elevation(
        options: InstallOptions,
        runner: Arc<dyn CommandRunner>,
        elevation: Elevation,
    ) -> Self {
        let prerequisites = Arc::new(AptPrerequisites::new(runner.clone(), elevation.clone()));
        Self {
            options,
            runner,
            elevation,
            prerequisites,
        }
    }

    /// Context running real commands on this host.
    pub fn system(options: InstallOptions) -> Self {
        Self::new(options, Arc::new(SystemRunner))
    }

    /// Replace the prerequisite installer.
    pub fn with_prerequisites(mut self, prerequisites: Arc<dyn Prerequisites>) -> Self {
        self.prerequisites = prerequisites;
        self
    }

    pub fn options(&self) -> &InstallOptions {
        &self.options
    }

    pub fn paths(&self) -> &InstallPaths {
        &self.options.paths
    }

    pub fn runner(&self) -> &Arc<dyn CommandRunner> {
        &self.runner
    }

    pub fn elevation(&self) -> &Elevation {
        &self.elevation
    }

    pub fn prerequisites(&self) -> &dyn Prerequisites {
        self.prerequisites.as_ref()
    }

    pub fn transport(&self) -> Transport {
        Transport::new(self.runner.clone(), self.elevation.clone())
    }

    pub fn package_installer(&self) -> PackageInstaller {
        PackageInstaller::new(
            self.runner.clone(),
            self.elevation.clone(),
            command_or_default(&self.options.install_command, DEFAULT_INSTALL_COMMAND),
            command_or_default(&self.options.repair_command, DEFAULT_REPAIR_COMMAND),
        )
    }

    pub fn config_patcher(&self) -> ConfigPatcher {
        ConfigPatcher::new(
            self.runner.clone(),
            self.elevation.clone(),
            self.options.paths.clone(),
            self.options.skip_patch.clone(),
        )
    }

    pub fn provisioner(&self) -> LocalConfigProvisioner {
        LocalConfigProvisioner::new(
            self.runner.clone(),
            self.elevation.clone(),
            &self.options.paths,
            &self.options.local_config_name,
            &self.options.prototype_name,
        )
    }
}

fn command_or_default(argv: &[String], default: &[&str]) -> CommandSpec {
    CommandSpec::from_argv(argv)
        .or_else(|| CommandSpec::from_argv(default))
        .unwrap_or_else(|| CommandSpec::new("true"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::ElevationMode;
    use crate::exec::fakes::ScriptedRunner;

    #[test]
    fn empty_package_commands_fall_back_to_defaults() {
        let options = InstallOptions {
            install_command: Vec::new(),
            ..InstallOptions::default()
        };
        let ctx = InstallContext::with_elevation(
            options,
            Arc::new(ScriptedRunner::new()),
            Elevation::new(ElevationMode::None),
        );
        let installer = ctx.package_installer();
        assert!(format!("{installer:?}").contains("dpkg"));
    }

    #[test]
    fn patcher_uses_configured_locations() {
        let ctx = InstallContext::with_elevation(
            InstallOptions::default(),
            Arc::new(ScriptedRunner::new()),
            Elevation::new(ElevationMode::None),
        );
        let patcher = ctx.config_patcher();
        assert_eq!(
            patcher.location().directive(),
            "-Dspring.config.location=/opt/spinnaker/config/,/root/.spinnaker/"
        );
        assert!(patcher.skips("deck"));
        assert_eq!(
            ctx.provisioner().target(),
            std::path::Path::new("/root/.spinnaker/spinnaker-local.yml")
        );
    }
}
