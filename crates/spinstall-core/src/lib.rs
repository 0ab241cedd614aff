//! Spinstall Core Library
//!
//! Installs a Spinnaker release onto a Debian-based host: fetches the
//! release packages from a local directory, GCS or S3, installs them in
//! manifest order through the package manager, and points each component
//! at the system and user configuration directories.

pub mod config;
pub mod context;
pub mod copy;
pub mod error;
pub mod exec;
pub mod manifest;
pub mod orchestration;
pub mod packages;
pub mod patch;
pub mod provision;
pub mod source;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{ConfigStore, InstallConfig, InstallOptions, InstallPaths};
    pub use crate::context::InstallContext;

    // Errors
    pub use crate::error::{ConfigError, InstallError, ManifestError, ScriptShapeError};

    // Execution
    pub use crate::exec::{
        CommandOutput, CommandRunner, CommandSpec, Elevation, ElevationMode, SystemRunner,
    };

    // Sources and transfers
    pub use crate::copy::{CopiedArtifact, CopyJobSet, CopyJobSpec, JobStatus};
    pub use crate::source::{ArtifactLocation, BackendKind, Transport};

    // Installation
    pub use crate::manifest::{PackageManifest, component_name};
    pub use crate::orchestration::{InstallOrchestrator, InstallReport, Stage, StageFailure};
    pub use crate::packages::{AptPrerequisites, InstallSummary, PackageInstaller, Prerequisites};
    pub use crate::patch::{ConfigPatcher, PatchOutcome};
    pub use crate::provision::{LocalConfigProvisioner, ProvisionOutcome};
}
