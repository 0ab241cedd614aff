//! On-disk configuration schema for spinstall.toml.
//!
//! Every field is optional. Unset fields fall back to the defaults applied by
//! [`InstallOptions::from_config`](super::InstallOptions::from_config).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::exec::ElevationMode;

/// Root of spinstall.toml.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallConfig {
    /// Local directory, `gs://bucket/path` or `s3://bucket/path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_path: Option<String>,

    /// AWS region; required for `s3://` release paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_root: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_config_dir: Option<PathBuf>,

    /// Directory holding installed components (`<root>/<name>/bin/<name>`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components_root: Option<PathBuf>,

    /// Components whose launch script is left alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_patch: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<ElevationMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_dependencies: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_components: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_os: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_config_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prototype_name: Option<String>,

    #[serde(default, skip_serializing_if = "PackageManagerConfig::is_empty")]
    pub package_manager: PackageManagerConfig,

    /// Extra files copied alongside the packages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bundles: Vec<BundleEntry>,
}

/// Commands used to talk to the host package manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageManagerConfig {
    /// Direct install of a local package file; the file path is appended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install: Option<Vec<String>>,

    /// Dependency repair pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repair: Option<Vec<String>>,
}

impl PackageManagerConfig {
    pub fn is_empty(&self) -> bool {
        self.install.is_none() && self.repair.is_none()
    }
}

/// An ancillary file set copied from the release source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BundleEntry {
    /// Path relative to the release source; wildcards are allowed.
    pub source: String,
    /// Directory relative to the install root.
    pub destination: PathBuf,
}

impl InstallConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay `other` on top of `self`; set fields in `other` win.
    pub fn overlay(self, other: InstallConfig) -> InstallConfig {
        InstallConfig {
            release_path: other.release_path.or(self.release_path),
            region: other.region.or(self.region),
            install_root: other.install_root.or(self.install_root),
            user_config_dir: other.user_config_dir.or(self.user_config_dir),
            components_root: other.components_root.or(self.components_root),
            skip_patch: other.skip_patch.or(self.skip_patch),
            elevation: other.elevation.or(self.elevation),
            install_dependencies: other.install_dependencies.or(self.install_dependencies),
            install_components: other.install_components.or(self.install_components),
            update_os: other.update_os.or(self.update_os),
            local_config_name: other.local_config_name.or(self.local_config_name),
            prototype_name: other.prototype_name.or(self.prototype_name),
            package_manager: PackageManagerConfig {
                install: other.package_manager.install.or(self.package_manager.install),
                repair: other.package_manager.repair.or(self.package_manager.repair),
            },
            bundles: if other.bundles.is_empty() {
                self.bundles
            } else {
                other.bundles
            },
        }
    }

    /// Check values that are wrong regardless of where they came from.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(install) = &self.package_manager.install
            && install.is_empty()
        {
            anyhow::bail!("package_manager.install must name a command");
        }
        if let Some(repair) = &self.package_manager.repair
            && repair.is_empty()
        {
            anyhow::bail!("package_manager.repair must name a command");
        }
        for bundle in &self.bundles {
            if bundle.source.trim().is_empty() {
                anyhow::bail!("bundle source cannot be empty");
            }
            if bundle.destination.is_absolute() {
                anyhow::bail!(
                    "bundle destination must be relative to the install root: {}",
                    bundle.destination.display()
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_prefers_later_values() {
        let file = InstallConfig {
            release_path: Some("gs://releases/1.0".to_string()),
            region: Some("us-east-1".to_string()),
            ..InstallConfig::default()
        };
        let flags = InstallConfig {
            release_path: Some("/mnt/release".to_string()),
            ..InstallConfig::default()
        };

        let merged = file.overlay(flags);
        assert_eq!(merged.release_path.as_deref(), Some("/mnt/release"));
        assert_eq!(merged.region.as_deref(), Some("us-east-1"));
    }

    #[test]
    fn validate_rejects_absolute_bundle_destination() {
        let config = InstallConfig {
            bundles: vec![BundleEntry {
                source: "scripts/*.sh".to_string(),
                destination: PathBuf::from("/etc"),
            }],
            ..InstallConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_package_manager_command() {
        let config = InstallConfig {
            package_manager: PackageManagerConfig {
                install: Some(Vec::new()),
                repair: None,
            },
            ..InstallConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("package_manager.install"));
    }
}
