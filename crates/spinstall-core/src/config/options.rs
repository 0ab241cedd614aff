//! Resolved options for one installation run.

use std::path::PathBuf;

use super::paths::{DEFAULT_COMPONENTS_ROOT, DEFAULT_INSTALL_ROOT, DEFAULT_USER_CONFIG_DIR};
use super::{BundleEntry, InstallConfig, InstallPaths};
use crate::exec::ElevationMode;

/// The UI-only component ships without a JVM launch script.
pub const DEFAULT_SKIP_PATCH: &[&str] = &["deck"];
pub const DEFAULT_INSTALL_COMMAND: &[&str] = &["dpkg", "-i"];
pub const DEFAULT_REPAIR_COMMAND: &[&str] = &["apt-get", "install", "-f", "-y"];
pub const DEFAULT_LOCAL_CONFIG_NAME: &str = "spinnaker-local.yml";
pub const DEFAULT_PROTOTYPE_NAME: &str = "default-spinnaker-local.yml";

/// Every setting the engine needs, with defaults applied.
///
/// Built once from an [`InstallConfig`] and handed to each component through
/// [`InstallContext`](crate::context::InstallContext).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOptions {
    pub release_path: Option<String>,
    pub region: Option<String>,
    pub paths: InstallPaths,
    pub skip_patch: Vec<String>,
    pub elevation: ElevationMode,
    pub install_dependencies: bool,
    pub install_components: bool,
    pub update_os: bool,
    pub local_config_name: String,
    pub prototype_name: String,
    pub install_command: Vec<String>,
    pub repair_command: Vec<String>,
    pub bundles: Vec<BundleEntry>,
}

impl InstallOptions {
    pub fn from_config(config: InstallConfig) -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        let paths = InstallPaths::new(
            config
                .install_root
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INSTALL_ROOT)),
            config
                .user_config_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_USER_CONFIG_DIR)),
            config
                .components_root
                .unwrap_or_else(|| PathBuf::from(DEFAULT_COMPONENTS_ROOT)),
        );

        Self {
            release_path: config.release_path.filter(|p| !p.trim().is_empty()),
            region: config.region.filter(|r| !r.trim().is_empty()),
            paths,
            skip_patch: config
                .skip_patch
                .unwrap_or_else(|| owned(DEFAULT_SKIP_PATCH)),
            elevation: config.elevation.unwrap_or_default(),
            install_dependencies: config.install_dependencies.unwrap_or(true),
            install_components: config.install_components.unwrap_or(true),
            update_os: config.update_os.unwrap_or(false),
            local_config_name: config
                .local_config_name
                .unwrap_or_else(|| DEFAULT_LOCAL_CONFIG_NAME.to_string()),
            prototype_name: config
                .prototype_name
                .unwrap_or_else(|| DEFAULT_PROTOTYPE_NAME.to_string()),
            install_command: config
                .package_manager
                .install
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| owned(DEFAULT_INSTALL_COMMAND)),
            repair_command: config
                .package_manager
                .repair
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| owned(DEFAULT_REPAIR_COMMAND)),
            bundles: config.bundles,
        }
    }
}

impl InstallOptions {
    /// Whether the release itself is copied and installed. Skipped only when
    /// neither dependencies nor components are requested.
    pub fn installs_release(&self) -> bool {
        self.install_components || self.install_dependencies
    }
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self::from_config(InstallConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let options = InstallOptions::default();
        assert_eq!(options.paths, InstallPaths::default());
        assert_eq!(options.skip_patch, vec!["deck"]);
        assert_eq!(options.elevation, ElevationMode::Sudo);
        assert_eq!(options.install_command, vec!["dpkg", "-i"]);
        assert_eq!(options.repair_command, vec!["apt-get", "install", "-f", "-y"]);
        assert!(options.install_dependencies);
        assert!(options.install_components);
        assert!(!options.update_os);
        assert!(options.release_path.is_none());
    }

    #[test]
    fn release_install_needs_components_or_dependencies() {
        let mut options = InstallOptions::default();
        assert!(options.installs_release());
        options.install_components = false;
        assert!(options.installs_release());
        options.install_dependencies = false;
        assert!(!options.installs_release());
    }

    #[test]
    fn blank_release_path_counts_as_unset() {
        let options = InstallOptions::from_config(InstallConfig {
            release_path: Some("   ".to_string()),
            ..InstallConfig::default()
        });
        assert!(options.release_path.is_none());
    }
}
