//! Sequential package installation with dependency repair.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{InstallError, Result};
use crate::exec::{CommandRunner, CommandSpec, Elevation, run_checked};
use crate::manifest::{PackageManifest, component_name};
use crate::patch::{ConfigPatcher, PatchOutcome};

/// Result of installing one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageResult {
    pub package: String,
    pub component: String,
    /// Exit status of the direct install. Non-zero is expected when
    /// dependencies are missing; the following repair pass resolves them.
    pub direct_install_exit: i32,
    pub patch: PatchOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallSummary {
    pub packages: Vec<PackageResult>,
    pub repair_passes: usize,
}

impl InstallSummary {
    /// Packages whose direct install exited non-zero.
    pub fn unclean_installs(&self) -> impl Iterator<Item = &PackageResult> {
        self.packages.iter().filter(|p| p.direct_install_exit != 0)
    }
}

/// Installs package files through the host package manager.
#[derive(Debug, Clone)]
pub struct PackageInstaller {
    runner: Arc<dyn CommandRunner>,
    elevation: Elevation,
    install: CommandSpec,
    repair: CommandSpec,
}

impl PackageInstaller {
    /// `install` receives the package path as its final argument; `repair`
    /// is run as-is.
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        elevation: Elevation,
        install: CommandSpec,
        repair: CommandSpec,
    ) -> Self {
        Self {
            runner,
            elevation,
            install,
            repair,
        }
    }

    /// Install every manifest package in order, repairing dependencies and
    /// patching the component after each one, then repair once more.
    ///
    /// Direct-install failures are recorded, not raised. A failed repair pass
    /// or patch stops the loop; packages already installed stay installed.
    pub fn install_sequentially(
        &self,
        package_dir: &Path,
        manifest: &PackageManifest,
        patcher: &ConfigPatcher,
    ) -> Result<InstallSummary> {
        let mut summary = InstallSummary::default();

        for package in manifest.packages() {
            let component = component_name(package);
            info!(package = %package, component, "installing package");

            let direct_install_exit = self.install_direct(&package_dir.join(package))?;
            self.repair_dependencies()?;
            summary.repair_passes += 1;

            let patch = patcher.patch(component).map_err(|source| InstallError::Patch {
                component: component.to_string(),
                source: Box::new(source),
            })?;

            summary.packages.push(PackageResult {
                package: package.clone(),
                component: component.to_string(),
                direct_install_exit,
                patch,
            });
        }

        self.repair_dependencies()?;
        summary.repair_passes += 1;

        Ok(summary)
    }

    /// Run the direct install and return its exit status.
    ///
    /// Only a failure to start the package manager is an error.
    pub fn install_direct(&self, package_path: &Path) -> Result<i32> {
        let command = self
            .elevation
            .wrap(self.install.clone().arg(package_path.to_string_lossy()));
        let output = self
            .runner
            .run(&command)
            .map_err(|source| InstallError::Spawn {
                command: command.to_string(),
                source,
            })?;

        if !output.is_success() {
            warn!(
                package = %package_path.display(),
                exit_code = output.exit_code,
                output = %output.diagnostic(),
                "direct install did not complete cleanly; relying on dependency repair"
            );
        }
        Ok(output.exit_code)
    }

    /// Let the package manager resolve missing dependencies. Any failure is
    /// fatal.
    pub fn repair_dependencies(&self) -> Result<()> {
        let command = self.elevation.wrap(self.repair.clone());
        run_checked(self.runner.as_ref(), &command)?;
        Ok(())
    }
}
