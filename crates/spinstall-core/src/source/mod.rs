//! Release source resolution.
//!
//! Turns the `--release-path` string into an [`ArtifactLocation`] and
//! reaches it through the matching [`Transport`]:
//! - local directories (plain `cp`)
//! - Google Cloud Storage (`gs://`, via `gsutil`)
//! - Amazon S3 (`s3://`, via `aws`, region required)

mod location;
mod transport;

pub use location::{ArtifactLocation, BackendKind};
pub use transport::Transport;

#[cfg(test)]
mod tests;
