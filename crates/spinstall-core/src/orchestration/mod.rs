//! Stage-by-stage installation of a release.

pub mod install;
pub mod report;
pub mod stage;

pub use install::InstallOrchestrator;
pub use report::{InstallReport, PrerequisiteActions, ResolvedSource};
pub use stage::{Stage, StageFailure};
