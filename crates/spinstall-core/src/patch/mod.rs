//! Pointing installed components at the release and user configuration.

pub mod launch_script;

pub use launch_script::{
    CONFIG_LOCATION_FLAG, ConfigLocation, DEFAULT_OPTS_VAR, Rewrite, insert_config_location,
    locate_default_opts,
};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::InstallPaths;
use crate::error::{InstallError, Result};
use crate::exec::{CommandRunner, CommandSpec, Elevation, run_checked};

/// What [`ConfigPatcher::patch`] did to a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PatchOutcome {
    /// The component is on the skip list.
    Skipped { component: String },
    /// The script already sets a configuration location and was left alone.
    AlreadyConfigured {
        component: String,
        script: PathBuf,
        existing_line: String,
    },
    Patched { component: String, script: PathBuf },
}

impl PatchOutcome {
    pub fn component(&self) -> &str {
        match self {
            PatchOutcome::Skipped { component }
            | PatchOutcome::AlreadyConfigured { component, .. }
            | PatchOutcome::Patched { component, .. } => component,
        }
    }
}

/// Rewrites component launch scripts in place.
#[derive(Debug, Clone)]
pub struct ConfigPatcher {
    runner: Arc<dyn CommandRunner>,
    elevation: Elevation,
    paths: InstallPaths,
    location: ConfigLocation,
    skip: Vec<String>,
}

impl ConfigPatcher {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        elevation: Elevation,
        paths: InstallPaths,
        skip: Vec<String>,
    ) -> Self {
        let location = ConfigLocation::new(paths.config_dir(), paths.user_config_dir());
        Self {
            runner,
            elevation,
            paths,
            location,
            skip,
        }
    }

    pub fn location(&self) -> &ConfigLocation {
        &self.location
    }

    pub fn skips(&self, component: &str) -> bool {
        self.skip.iter().any(|s| s == component)
    }

    /// Add the configuration-location directive to `component`'s launch
    /// script. Safe to repeat.
    pub fn patch(&self, component: &str) -> Result<PatchOutcome> {
        if self.skips(component) {
            debug!(component, "component has no launch script to patch");
            return Ok(PatchOutcome::Skipped {
                component: component.to_string(),
            });
        }

        let script = self.paths.launch_script(component);
        let content = fs::read_to_string(&script).map_err(|e| {
            InstallError::io(format!("Failed to read launch script {}", script.display()), e)
        })?;

        let rewrite = insert_config_location(&content, &self.location).map_err(|source| {
            InstallError::LaunchScript {
                script: script.clone(),
                source,
            }
        })?;

        match rewrite {
            Rewrite::Unchanged { existing_line } => {
                warn!(
                    component,
                    script = %script.display(),
                    line = %existing_line,
                    "spring.config.location was already explicitly defined; leaving it"
                );
                Ok(PatchOutcome::AlreadyConfigured {
                    component: component.to_string(),
                    script,
                    existing_line,
                })
            }
            Rewrite::Rewritten(patched) => {
                self.replace_script(&script, &patched)?;
                info!(component, script = %script.display(), "patched launch script");
                Ok(PatchOutcome::Patched {
                    component: component.to_string(),
                    script,
                })
            }
        }
    }

    /// Write `content` to a temp file carrying the script's permission bits,
    /// then move it over the script with elevated rights.
    fn replace_script(&self, script: &Path, content: &str) -> Result<()> {
        let mut temp = tempfile::NamedTempFile::new()
            .map_err(|e| InstallError::io("Failed to create temporary launch script", e))?;
        temp.write_all(content.as_bytes())
            .and_then(|()| temp.flush())
            .map_err(|e| InstallError::io("Failed to write temporary launch script", e))?;

        let permissions = fs::metadata(script)
            .map_err(|e| {
                InstallError::io(format!("Failed to stat launch script {}", script.display()), e)
            })?
            .permissions();
        fs::set_permissions(temp.path(), permissions)
            .map_err(|e| InstallError::io("Failed to set launch script permissions", e))?;

        // Removed on drop if the move fails; a no-op once it succeeded.
        let temp_path = temp.into_temp_path();
        let mv = self.elevation.wrap(
            CommandSpec::new("mv")
                .arg(temp_path.to_string_lossy())
                .arg(script.to_string_lossy()),
        );
        run_checked(self.runner.as_ref(), &mv)?;
        Ok(())
    }
}
