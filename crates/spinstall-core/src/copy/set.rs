//! Concurrent fan-out of copy jobs with a single wait-for-all barrier.

use serde::Serialize;
use tracing::{info, warn};

use super::job::{CopyJob, CopyJobSpec, JobStatus};
use crate::error::{InstallError, Result};
use crate::source::Transport;

/// A batch of running transfers.
///
/// Every job is started immediately with no concurrency limit. The set owns
/// the runtime driving the jobs, so it must be used from synchronous code.
#[derive(Debug)]
pub struct CopyJobSet {
    runtime: tokio::runtime::Runtime,
    jobs: Vec<CopyJob>,
}

impl CopyJobSet {
    /// Start one job per spec and return without waiting for any of them.
    pub fn start_all(transport: &Transport, specs: Vec<CopyJobSpec>) -> Result<Self> {
        // One blocking thread per transfer, so no job waits for another.
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .thread_name("spinstall-copy")
            .max_blocking_threads(specs.len().max(1))
            .build()
            .map_err(|e| InstallError::io("Failed to create copy runtime", e))?;

        let mut jobs = Vec::with_capacity(specs.len());
        for spec in specs {
            let command = transport.copy_command(&spec.source, &spec.destination_dir);
            info!(
                source = %spec.source,
                destination = %spec.destination_dir.display(),
                "starting copy"
            );
            let mut job = CopyJob::new(spec, command);
            job.start(&runtime, transport.runner().clone());
            jobs.push(job);
        }

        Ok(Self { runtime, jobs })
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Block until every job has finished.
    ///
    /// Jobs are awaited in submission order and none is cancelled, so a
    /// failure never abandons the transfers still in flight.
    pub fn join_all(self) -> CopyReport {
        let Self { runtime, mut jobs } = self;
        runtime.block_on(async {
            for job in jobs.iter_mut() {
                job.join().await;
            }
        });
        CopyReport { jobs }
    }
}

/// Outcome of a joined [`CopyJobSet`].
#[derive(Debug)]
pub struct CopyReport {
    jobs: Vec<CopyJob>,
}

/// Per-artifact summary suitable for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopiedArtifact {
    pub source: String,
    pub destination: String,
    pub status: JobStatus,
}

impl CopyReport {
    pub fn jobs(&self) -> &[CopyJob] {
        &self.jobs
    }

    pub fn all_finished(&self) -> bool {
        self.jobs.iter().all(|job| job.status().is_finished())
    }

    pub fn failures(&self) -> impl Iterator<Item = &CopyJob> {
        self.jobs.iter().filter(|job| job.status().is_failure())
    }

    pub fn artifacts(&self) -> Vec<CopiedArtifact> {
        self.jobs
            .iter()
            .map(|job| CopiedArtifact {
                source: job.source().to_string(),
                destination: job.destination_dir().display().to_string(),
                status: job.status().clone(),
            })
            .collect()
    }

    /// Succeed when every job succeeded; otherwise report the first failed
    /// job in submission order.
    ///
    /// Every failure is logged. The error embeds only the first job's exit
    /// code and output, plus a count of the others. Files that did land stay
    /// on disk.
    pub fn into_result(self) -> Result<Vec<CopiedArtifact>> {
        let failures: Vec<&CopyJob> = self.failures().collect();
        for job in &failures {
            warn!(
                source = %job.source(),
                status = ?job.status(),
                output = %job.output().map(|o| o.diagnostic()).unwrap_or_default(),
                "copy failed"
            );
        }

        let Some(first) = failures.first() else {
            return Ok(self.artifacts());
        };
        let other_failures = failures.len() - 1;
        let source_path = first.source().to_string();

        Err(match first.status() {
            JobStatus::Failed { exit_code } => InstallError::CopyFailed {
                source_path,
                exit_code: *exit_code,
                output: first.output().map(|o| o.diagnostic()).unwrap_or_default(),
                other_failures,
            },
            JobStatus::Aborted { message } => InstallError::CopyAborted {
                source_path,
                message: message.clone(),
                other_failures,
            },
            status => InstallError::CopyAborted {
                source_path,
                message: format!("job left in state {status:?}"),
                other_failures,
            },
        })
    }
}
