//! The ordered package list of a release.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::paths::RELEASE_CONFIG_FILE;
use crate::error::ManifestError;

const PACKAGE_LIST_KEY: &str = "PACKAGE_LIST=\"";

/// Package filenames in installation order, as listed by the release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageManifest {
    source: PathBuf,
    packages: Vec<String>,
}

impl PackageManifest {
    /// Read `release_config.cfg` from the install root.
    pub fn load(install_root: &Path) -> Result<Self, ManifestError> {
        let path = install_root.join(RELEASE_CONFIG_FILE);
        let content = std::fs::read_to_string(&path).map_err(|source| ManifestError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Extract the `PACKAGE_LIST="a.deb b.deb"` assignment.
    pub fn parse(content: &str, source: PathBuf) -> Result<Self, ManifestError> {
        let list = content
            .lines()
            .find_map(|line| {
                let rest = line.strip_prefix(PACKAGE_LIST_KEY)?;
                let end = rest.find('"')?;
                Some(&rest[..end])
            })
            .ok_or_else(|| ManifestError::MissingPackageList {
                path: source.clone(),
            })?;

        let packages: Vec<String> = list.split_whitespace().map(str::to_string).collect();
        if packages.is_empty() {
            return Err(ManifestError::EmptyPackageList { path: source });
        }

        Ok(Self { source, packages })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Installed directory name of a package: the part before the first `_`
/// (`clouddriver_1.2.3_all.deb` → `clouddriver`). Filenames without an
/// underscore fall back to the name without its `.deb` extension.
pub fn component_name(package: &str) -> &str {
    match package.find('_') {
        Some(idx) => &package[..idx],
        None => package.strip_suffix(".deb").unwrap_or(package),
    }
}
