//! Artifact retrieval.
//!
//! A [`CopyJobSet`] starts one [`CopyJob`] per artifact, all at once, and
//! joins them behind one barrier before any failure is reported.

mod job;
mod set;

pub use job::{CopyJob, CopyJobSpec, JobStatus};
pub use set::{CopiedArtifact, CopyJobSet, CopyReport};
