//! Privilege elevation for commands that touch system-owned paths.

use serde::{Deserialize, Serialize};

use super::CommandSpec;

/// How privileged commands are run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElevationMode {
    /// Prefix privileged commands with `sudo`.
    #[default]
    Sudo,
    /// Run privileged commands as the current user (already root, or tests).
    None,
}

impl ElevationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ElevationMode::Sudo => "sudo",
            ElevationMode::None => "none",
        }
    }
}

/// Wraps commands that need elevated privileges.
///
/// `sudo` resets the environment, so commands that depend on the invoking
/// user's credentials (object-store clients configured under `$HOME`) get
/// `HOME` and `PATH` forwarded explicitly through `env`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Elevation {
    mode: ElevationMode,
    forwarded: Vec<(String, String)>,
}

impl Elevation {
    pub fn new(mode: ElevationMode) -> Self {
        Self {
            mode,
            forwarded: Vec::new(),
        }
    }

    /// Capture the invoking user's `HOME` and `PATH` for forwarding.
    pub fn capture_user_env(mode: ElevationMode) -> Self {
        let mut forwarded = Vec::new();
        if let Some(home) = dirs::home_dir() {
            forwarded.push(("HOME".to_string(), home.to_string_lossy().to_string()));
        }
        if let Ok(path) = std::env::var("PATH") {
            forwarded.push(("PATH".to_string(), path));
        }
        Self { mode, forwarded }
    }

    pub fn with_forwarded(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.forwarded.push((key.into(), value.into()));
        self
    }

    pub fn mode(&self) -> ElevationMode {
        self.mode
    }

    /// Elevate a command that does not need the user's environment.
    pub fn wrap(&self, command: CommandSpec) -> CommandSpec {
        match self.mode {
            ElevationMode::None => command,
            ElevationMode::Sudo => {
                let CommandSpec { program, args, env } = command;
                let mut wrapped = CommandSpec::new("sudo");
                if !env.is_empty() {
                    wrapped = wrapped
                        .arg("env")
                        .args(env.into_iter().map(|(k, v)| format!("{k}={v}")));
                }
                wrapped.arg(program).args(args)
            }
        }
    }

    /// Elevate a command and forward the invoking user's `HOME` and `PATH`.
    pub fn wrap_with_user_env(&self, command: CommandSpec) -> CommandSpec {
        let mut command = command;
        for (key, value) in &self.forwarded {
            command = command.env(key.clone(), value.clone());
        }
        self.wrap(command)
    }
}
