//! Host package management: release packages and runtime prerequisites.

pub mod installer;
pub mod prerequisites;

pub use installer::{InstallSummary, PackageInstaller, PackageResult};
pub use prerequisites::{AptPrerequisites, Prerequisites};
