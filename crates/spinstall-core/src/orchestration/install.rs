//! Top-level installation run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use super::report::{InstallReport, PrerequisiteActions, ResolvedSource};
use super::stage::{Stage, StageFailure};
use crate::context::InstallContext;
use crate::copy::{CopiedArtifact, CopyJobSet, CopyJobSpec};
use crate::error::{ConfigError, InstallError, Result};
use crate::exec::{CommandSpec, run_checked};
use crate::manifest::PackageManifest;
use crate::patch::PatchOutcome;
use crate::source::ArtifactLocation;

/// Drives the installation stages strictly in order.
///
/// The first fatal error stops the run and is returned as a
/// [`StageFailure`]; nothing done by earlier stages is undone.
#[derive(Debug, Clone)]
pub struct InstallOrchestrator {
    ctx: InstallContext,
}

impl InstallOrchestrator {
    pub fn new(ctx: InstallContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &InstallContext {
        &self.ctx
    }

    /// Run every stage.
    pub fn run(&self) -> std::result::Result<InstallReport, StageFailure> {
        let options = self.ctx.options();
        let paths = self.ctx.paths();
        let mut report = InstallReport::start();

        let location = self.validate()?;
        report.source = location.as_ref().map(ResolvedSource::from);
        report.complete(Stage::ValidatingOptions);

        report.prerequisites = self
            .install_prerequisites()
            .map_err(|e| StageFailure::new(Stage::InstallingPrerequisites, e))?;
        report.complete(Stage::InstallingPrerequisites);

        let Some(location) = location else {
            info!("neither dependencies nor components requested; skipping release install");
            return Ok(report.finish());
        };

        self.prepare_install_root()
            .map_err(|e| StageFailure::new(Stage::PreparingInstallRoot, e))?;
        report.complete(Stage::PreparingInstallRoot);

        let manifest = if options.install_components {
            let manifest = PackageManifest::load(paths.install_root())
                .map_err(|e| StageFailure::new(Stage::ResolvingManifest, e))?;
            info!(
                source = %manifest.source().display(),
                packages = manifest.len(),
                "resolved release manifest"
            );
            report.complete(Stage::ResolvingManifest);

            report.artifacts = self
                .copy_artifacts(&location, &manifest)
                .map_err(|e| StageFailure::new(Stage::CopyingArtifacts, e))?;
            report.complete(Stage::CopyingArtifacts);
            Some(manifest)
        } else {
            info!("components not requested; skipping package download");
            None
        };

        report.executable_scripts = self
            .mark_scripts_executable()
            .map_err(|e| StageFailure::new(Stage::MarkingScriptsExecutable, e))?;
        report.complete(Stage::MarkingScriptsExecutable);

        if let Some(manifest) = manifest {
            let summary = self
                .ctx
                .package_installer()
                .install_sequentially(&paths.package_dir(), &manifest, &self.ctx.config_patcher())
                .map_err(|e| StageFailure::new(Stage::InstallingPackages, e))?;
            info!(
                packages = summary.packages.len(),
                repair_passes = summary.repair_passes,
                unclean = summary.unclean_installs().count(),
                "installed release packages"
            );
            report.packages = Some(summary);
            report.complete(Stage::InstallingPackages);
            report.complete(Stage::PatchingConfigs);
        }

        let provisioned = self
            .ctx
            .provisioner()
            .provision()
            .map_err(|e| StageFailure::new(Stage::ProvisioningLocalConfig, e))?;
        report.local_config = Some(provisioned);
        report.complete(Stage::ProvisioningLocalConfig);

        info!("finished installing the release");
        Ok(report.finish())
    }

    /// Check the options and the release source without changing the host.
    ///
    /// Returns the parsed location, or `None` when the run will not install
    /// the release.
    pub fn validate(&self) -> std::result::Result<Option<ArtifactLocation>, StageFailure> {
        self.resolve_location()
            .map_err(|e| StageFailure::new(Stage::ValidatingOptions, e))
    }

    /// Re-apply the launch-script patch for one component.
    pub fn patch_component(
        &self,
        component: &str,
    ) -> std::result::Result<PatchOutcome, StageFailure> {
        self.ctx
            .config_patcher()
            .patch(component)
            .map_err(|e| StageFailure::new(Stage::PatchingConfigs, e))
    }

    fn resolve_location(&self) -> std::result::Result<Option<ArtifactLocation>, ConfigError> {
        let options = self.ctx.options();
        if !options.installs_release() {
            return Ok(None);
        }

        let release_path = options
            .release_path
            .as_deref()
            .ok_or(ConfigError::MissingReleasePath)?;
        let location = ArtifactLocation::parse(release_path, options.region.as_deref())?;
        self.ctx.transport().validate_reachable(&location)?;
        info!(
            release_path = %location,
            backend = location.kind().display_name(),
            "release source is reachable"
        );
        Ok(Some(location))
    }

    fn install_prerequisites(&self) -> Result<PrerequisiteActions> {
        let options = self.ctx.options();
        let prerequisites = self.ctx.prerequisites();
        let mut actions = PrerequisiteActions::default();

        if options.install_dependencies {
            prerequisites.install_all(options.update_os)?;
            actions.install_all = true;
            actions.os_updates = options.update_os;
            return Ok(actions);
        }

        if !prerequisites.java_available() {
            prerequisites.install_java()?;
            actions.java = true;
        }
        if options.update_os {
            prerequisites.install_os_updates()?;
            actions.os_updates = true;
        }
        if options.install_components {
            prerequisites.install_web_server()?;
            actions.web_server = true;
        }
        Ok(actions)
    }

    /// Create the install root, the package staging directory and every
    /// bundle destination that does not exist yet.
    fn prepare_install_root(&self) -> Result<()> {
        let paths = self.ctx.paths();
        let mut wanted = vec![paths.install_root().to_path_buf(), paths.package_dir()];
        wanted.extend(
            self.ctx
                .options()
                .bundles
                .iter()
                .map(|bundle| paths.install_root().join(&bundle.destination)),
        );

        let missing: Vec<String> = wanted
            .iter()
            .filter(|dir| !dir.is_dir())
            .map(|dir| dir.to_string_lossy().to_string())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        info!(directories = ?missing, "creating install directories");
        let mkdir = self
            .ctx
            .elevation()
            .wrap(CommandSpec::new("mkdir").arg("-p").args(missing));
        run_checked(self.ctx.runner().as_ref(), &mkdir)?;
        Ok(())
    }

    fn copy_artifacts(
        &self,
        location: &ArtifactLocation,
        manifest: &PackageManifest,
    ) -> Result<Vec<CopiedArtifact>> {
        let paths = self.ctx.paths();
        let package_dir = paths.package_dir();

        let mut specs: Vec<CopyJobSpec> = manifest
            .packages()
            .iter()
            .map(|package| CopyJobSpec::new(location.join(package), package_dir.clone()))
            .collect();
        specs.extend(self.ctx.options().bundles.iter().map(|bundle| {
            CopyJobSpec::new(
                location.join(&bundle.source),
                paths.install_root().join(&bundle.destination),
            )
        }));

        info!(jobs = specs.len(), source = %location, "downloading release artifacts");
        let set = CopyJobSet::start_all(&self.ctx.transport(), specs)?;
        set.join_all().into_result()
    }

    /// `chmod +x` every `*.sh` in the scripts and package directories.
    fn mark_scripts_executable(&self) -> Result<Vec<PathBuf>> {
        let paths = self.ctx.paths();
        let mut scripts = shell_scripts(&paths.scripts_dir())?;
        scripts.extend(shell_scripts(&paths.package_dir())?);

        if scripts.is_empty() {
            info!("no shell scripts to mark executable");
            return Ok(scripts);
        }

        let chmod = self.ctx.elevation().wrap(
            CommandSpec::new("chmod")
                .arg("+x")
                .args(scripts.iter().map(|p| p.to_string_lossy().to_string())),
        );
        run_checked(self.ctx.runner().as_ref(), &chmod)?;
        Ok(scripts)
    }
}

/// `*.sh` files directly inside `dir`, sorted. A missing directory has none.
fn shell_scripts(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(InstallError::io(format!("Failed to list {}", dir.display()), err));
        }
    };

    let mut scripts = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| InstallError::io(format!("Failed to list {}", dir.display()), e))?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "sh") && path.is_file() {
            scripts.push(path);
        }
    }
    scripts.sort();
    Ok(scripts)
}
