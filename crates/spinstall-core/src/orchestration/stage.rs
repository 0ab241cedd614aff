use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::error::InstallError;

/// Steps of an installation run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ValidatingOptions,
    InstallingPrerequisites,
    PreparingInstallRoot,
    ResolvingManifest,
    CopyingArtifacts,
    MarkingScriptsExecutable,
    InstallingPackages,
    PatchingConfigs,
    ProvisioningLocalConfig,
    Done,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::ValidatingOptions => "validating options",
            Stage::InstallingPrerequisites => "installing prerequisites",
            Stage::PreparingInstallRoot => "preparing install root",
            Stage::ResolvingManifest => "resolving manifest",
            Stage::CopyingArtifacts => "copying artifacts",
            Stage::MarkingScriptsExecutable => "marking scripts executable",
            Stage::InstallingPackages => "installing packages",
            Stage::PatchingConfigs => "patching configs",
            Stage::ProvisioningLocalConfig => "provisioning local config",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fatal error and the stage it stopped the run in.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct StageFailure {
    pub stage: Stage,
    #[source]
    pub source: InstallError,
}

impl StageFailure {
    /// Attribute `source` to `stage`. Patch errors raised from inside the
    /// install loop belong to [`Stage::PatchingConfigs`].
    pub fn new(stage: Stage, source: impl Into<InstallError>) -> Self {
        let source = source.into();
        let stage = match (&stage, &source) {
            (Stage::InstallingPackages, InstallError::Patch { .. }) => Stage::PatchingConfigs,
            _ => stage,
        };
        Self { stage, source }
    }
}
