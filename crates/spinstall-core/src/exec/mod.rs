//! External command execution.
//!
//! Every interaction with the host (package manager, object-store clients,
//! privilege elevation, file moves) is expressed as a [`CommandSpec`] and
//! handed to a [`CommandRunner`]. The engine never spawns processes itself,
//! which lets tests substitute a scripted runner (`fakes`, behind the
//! `test-support` feature).

mod command;
mod elevation;
#[cfg(any(test, feature = "test-support"))]
pub mod fakes;
mod system;

pub use command::{CommandOutput, CommandSpec};
pub use elevation::{Elevation, ElevationMode};
pub use system::SystemRunner;

use std::io;

use crate::error::{InstallError, Result};

/// Narrow synchronous capability for running one external command.
pub trait CommandRunner: Send + Sync + std::fmt::Debug {
    /// Run the command to completion and capture its output.
    ///
    /// A non-zero exit status is not an error at this level; only failing
    /// to start the process is.
    fn run(&self, command: &CommandSpec) -> io::Result<CommandOutput>;
}

/// Run a command and require a zero exit status.
pub fn run_checked(runner: &dyn CommandRunner, command: &CommandSpec) -> Result<CommandOutput> {
    let output = runner.run(command).map_err(|source| InstallError::Spawn {
        command: command.to_string(),
        source,
    })?;
    if !output.is_success() {
        return Err(InstallError::CommandFailed {
            command: command.to_string(),
            exit_code: output.exit_code,
            output: output.diagnostic(),
        });
    }
    Ok(output)
}
