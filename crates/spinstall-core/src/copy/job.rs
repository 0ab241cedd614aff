//! A single artifact transfer.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::exec::{CommandOutput, CommandRunner, CommandSpec};
use crate::source::ArtifactLocation;

/// What to copy and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyJobSpec {
    pub source: ArtifactLocation,
    pub destination_dir: PathBuf,
}

impl CopyJobSpec {
    pub fn new(source: ArtifactLocation, destination_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            destination_dir: destination_dir.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed { exit_code: i32 },
    /// The task never produced an exit status (spawn failure or panic).
    Aborted { message: String },
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, JobStatus::Pending | JobStatus::Running)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, JobStatus::Failed { .. } | JobStatus::Aborted { .. })
    }
}

/// One transfer, run as an independent blocking task.
#[derive(Debug)]
pub struct CopyJob {
    spec: CopyJobSpec,
    command: CommandSpec,
    status: JobStatus,
    output: Option<CommandOutput>,
    handle: Option<JoinHandle<io::Result<CommandOutput>>>,
}

impl CopyJob {
    pub(crate) fn new(spec: CopyJobSpec, command: CommandSpec) -> Self {
        Self {
            spec,
            command,
            status: JobStatus::Pending,
            output: None,
            handle: None,
        }
    }

    /// Launch the transfer on `runtime` and return without waiting.
    pub(crate) fn start(
        &mut self,
        runtime: &tokio::runtime::Runtime,
        runner: Arc<dyn CommandRunner>,
    ) {
        let command = self.command.clone();
        self.handle = Some(runtime.spawn_blocking(move || runner.run(&command)));
        self.status = JobStatus::Running;
    }

    /// Wait for the transfer to finish and record its outcome.
    pub(crate) async fn join(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.status = match handle.await {
            Ok(Ok(output)) => {
                let status = if output.is_success() {
                    JobStatus::Succeeded
                } else {
                    JobStatus::Failed {
                        exit_code: output.exit_code,
                    }
                };
                self.output = Some(output);
                status
            }
            Ok(Err(err)) => JobStatus::Aborted {
                message: format!("failed to run `{}`: {}", self.command, err),
            },
            Err(err) => JobStatus::Aborted {
                message: format!("copy task did not complete: {err}"),
            },
        };
    }

    pub fn spec(&self) -> &CopyJobSpec {
        &self.spec
    }

    pub fn source(&self) -> &ArtifactLocation {
        &self.spec.source
    }

    pub fn destination_dir(&self) -> &Path {
        &self.spec.destination_dir
    }

    pub fn command(&self) -> &CommandSpec {
        &self.command
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    /// Captured output, once the job has finished with an exit status.
    pub fn output(&self) -> Option<&CommandOutput> {
        self.output.as_ref()
    }
}
