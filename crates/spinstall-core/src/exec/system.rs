//! Runner backed by real processes.

use std::io;
use std::process::{Command, Stdio};

use tracing::debug;

use super::{CommandOutput, CommandRunner, CommandSpec};

/// Runs commands as child processes of the installer.
///
/// There is no timeout: a hung child blocks the caller until it exits.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: &CommandSpec) -> io::Result<CommandOutput> {
        debug!(command = %command, "spawning process");

        let output = Command::new(&command.program)
            .args(&command.args)
            .envs(&command.env)
            .stdin(Stdio::null())
            .output()?;

        let result = CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !result.is_success() {
            debug!(
                command = %command,
                exit_code = result.exit_code,
                stderr = %result.stderr.trim(),
                "command exited with failure"
            );
        }

        Ok(result)
    }
}
