//! Locating and loading spinstall.toml.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{InstallConfig, parser};

pub const CONFIG_FILE_NAME: &str = "spinstall.toml";

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
    /// Whether the path was requested explicitly (then it must exist).
    explicit: bool,
}

impl ConfigStore {
    /// Use `<config_dir>/spinstall/spinstall.toml` when it exists.
    pub fn from_default_location() -> anyhow::Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("spinstall");
        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            explicit: false,
        })
    }

    /// Use a path given on the command line.
    pub fn from_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            explicit: true,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> anyhow::Result<InstallConfig> {
        if !self.config_path.exists() {
            if self.explicit {
                anyhow::bail!("Config file not found: {}", self.config_path.display());
            }
            return Ok(InstallConfig::new());
        }
        parser::parse_install_toml(&self.config_path)
    }

    pub fn save(&self, config: &InstallConfig) -> anyhow::Result<()> {
        let content = parser::to_toml(config)?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.config_path, content).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;
        Ok(())
    }
}
