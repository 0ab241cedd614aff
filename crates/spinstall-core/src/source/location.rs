//! Release source specifiers.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::error::ConfigError;

/// Where release artifacts are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local filesystem path.
    Local,
    /// Google Cloud Storage (`gs://`), accessed with `gsutil`.
    Gcs,
    /// Amazon S3 (`s3://`), accessed with `aws`. Requires a region.
    S3,
}

impl BackendKind {
    /// Map a URI scheme to a backend.
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "gs" => Some(Self::Gcs),
            "s3" => Some(Self::S3),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            BackendKind::Local => "the local filesystem",
            BackendKind::Gcs => "GCS",
            BackendKind::S3 => "S3",
        }
    }

    /// Client tool used to reach the backend.
    pub fn client_tool(self) -> Option<&'static str> {
        match self {
            BackendKind::Local => None,
            BackendKind::Gcs => Some("gsutil"),
            BackendKind::S3 => Some("aws"),
        }
    }
}

/// A validated release source or a single artifact within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocation {
    raw: String,
    kind: BackendKind,
    bucket: Option<String>,
    region: Option<String>,
}

impl ArtifactLocation {
    /// Parse a source specifier.
    ///
    /// `gs://` and `s3://` select an object store; any other `scheme://`
    /// prefix is rejected; everything else is a local path. The region is
    /// checked here so a missing one is reported before any network call.
    pub fn parse(spec: &str, region: Option<&str>) -> Result<Self, ConfigError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(ConfigError::MissingReleasePath);
        }

        let Some(scheme) = uri_scheme(spec) else {
            return Ok(Self {
                raw: spec.to_string(),
                kind: BackendKind::Local,
                bucket: None,
                region: None,
            });
        };

        let kind =
            BackendKind::from_scheme(&scheme.to_ascii_lowercase()).ok_or_else(|| {
                ConfigError::UnsupportedScheme {
                    scheme: scheme.to_string(),
                    path: spec.to_string(),
                }
            })?;

        let url = url::Url::parse(spec).map_err(|e| ConfigError::InvalidLocation {
            path: spec.to_string(),
            message: e.to_string(),
        })?;
        let bucket = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| ConfigError::InvalidLocation {
                path: spec.to_string(),
                message: "missing bucket name".to_string(),
            })?
            .to_string();

        let region = region.map(str::trim).filter(|r| !r.is_empty());
        if kind == BackendKind::S3 && region.is_none() {
            return Err(ConfigError::MissingRegion {
                path: spec.to_string(),
            });
        }

        Ok(Self {
            raw: spec.to_string(),
            kind,
            bucket: Some(bucket),
            region: region.map(str::to_string),
        })
    }

    /// Location of a named artifact below this one.
    pub fn join(&self, name: &str) -> Self {
        let base = self.raw.trim_end_matches('/');
        let name = name.trim_start_matches('/');
        Self {
            raw: format!("{base}/{name}"),
            ..self.clone()
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn is_remote(&self) -> bool {
        self.kind != BackendKind::Local
    }

    /// Filesystem path for local locations.
    pub fn local_path(&self) -> Option<&Path> {
        match self.kind {
            BackendKind::Local => Some(Path::new(&self.raw)),
            _ => None,
        }
    }
}

impl fmt::Display for ArtifactLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// The `scheme` of `scheme://rest`, if the prefix looks like a URI scheme.
fn uri_scheme(spec: &str) -> Option<&str> {
    let (scheme, _) = spec.split_once("://")?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        Some(scheme)
    } else {
        None
    }
}
