//! Install layout and default locations.

use std::path::{Path, PathBuf};

/// Default installation root.
pub const DEFAULT_INSTALL_ROOT: &str = "/opt/spinnaker";
/// Default directory for the operator's override configuration.
pub const DEFAULT_USER_CONFIG_DIR: &str = "/root/.spinnaker";
/// Default directory holding installed components.
pub const DEFAULT_COMPONENTS_ROOT: &str = "/opt";

/// Release config expected inside the install root.
pub const RELEASE_CONFIG_FILE: &str = "release_config.cfg";
pub const PACKAGE_SUBDIR: &str = "install";
pub const SCRIPTS_SUBDIR: &str = "scripts";
pub const CONFIG_SUBDIR: &str = "config";

/// Directories an installation run reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPaths {
    install_root: PathBuf,
    user_config_dir: PathBuf,
    components_root: PathBuf,
}

impl InstallPaths {
    pub fn new(install_root: PathBuf, user_config_dir: PathBuf, components_root: PathBuf) -> Self {
        Self {
            install_root,
            user_config_dir,
            components_root,
        }
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    pub fn user_config_dir(&self) -> &Path {
        &self.user_config_dir
    }

    pub fn components_root(&self) -> &Path {
        &self.components_root
    }

    /// Staging directory for downloaded packages.
    pub fn package_dir(&self) -> PathBuf {
        self.install_root.join(PACKAGE_SUBDIR)
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.install_root.join(SCRIPTS_SUBDIR)
    }

    /// System-wide configuration shipped with the release.
    pub fn config_dir(&self) -> PathBuf {
        self.install_root.join(CONFIG_SUBDIR)
    }

    pub fn release_config(&self) -> PathBuf {
        self.install_root.join(RELEASE_CONFIG_FILE)
    }

    /// Launch script of an installed component.
    pub fn launch_script(&self, component: &str) -> PathBuf {
        self.components_root.join(component).join("bin").join(component)
    }
}

impl Default for InstallPaths {
    fn default() -> Self {
        Self::new(
            PathBuf::from(DEFAULT_INSTALL_ROOT),
            PathBuf::from(DEFAULT_USER_CONFIG_DIR),
            PathBuf::from(DEFAULT_COMPONENTS_ROOT),
        )
    }
}
