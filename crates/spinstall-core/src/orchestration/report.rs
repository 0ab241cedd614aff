//! What an installation run did, for display and machine consumption.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::stage::Stage;
use crate::copy::CopiedArtifact;
use crate::packages::InstallSummary;
use crate::provision::ProvisionOutcome;
use crate::source::{ArtifactLocation, BackendKind};

/// Prerequisite steps that were run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrerequisiteActions {
    pub install_all: bool,
    pub java: bool,
    pub os_updates: bool,
    pub web_server: bool,
}

/// The release source a run resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSource {
    pub release_path: String,
    pub backend: BackendKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl From<&ArtifactLocation> for ResolvedSource {
    fn from(location: &ArtifactLocation) -> Self {
        Self {
            release_path: location.as_str().to_string(),
            backend: location.kind(),
            bucket: location.bucket().map(str::to_string),
            region: location.region().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub source: Option<ResolvedSource>,
    pub stages: Vec<Stage>,
    pub prerequisites: PrerequisiteActions,
    pub artifacts: Vec<CopiedArtifact>,
    pub executable_scripts: Vec<PathBuf>,
    pub packages: Option<InstallSummary>,
    pub local_config: Option<ProvisionOutcome>,
}

impl InstallReport {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            source: None,
            stages: Vec::new(),
            prerequisites: PrerequisiteActions::default(),
            artifacts: Vec::new(),
            executable_scripts: Vec::new(),
            packages: None,
            local_config: None,
        }
    }

    pub(crate) fn complete(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    pub(crate) fn finish(mut self) -> Self {
        self.stages.push(Stage::Done);
        self.finished_at = Some(Utc::now());
        self
    }

    /// Whether the release itself was copied and installed.
    pub fn release_installed(&self) -> bool {
        self.packages.is_some()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finished_report_ends_with_done() {
        let mut report = InstallReport::start();
        report.complete(Stage::ValidatingOptions);
        let report = report.finish();

        assert_eq!(report.stages, vec![Stage::ValidatingOptions, Stage::Done]);
        assert!(report.finished_at.unwrap() >= report.started_at);
        assert!(!report.release_installed());
    }

    #[test]
    fn json_uses_snake_case_stages() {
        let mut report = InstallReport::start();
        report.source = Some(ResolvedSource::from(
            &ArtifactLocation::parse("gs://releases/1.4", None).unwrap(),
        ));
        report.complete(Stage::CopyingArtifacts);

        let value: serde_json::Value =
            serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["stages"][0], "copying_artifacts");
        assert_eq!(value["source"]["backend"], "gcs");
        assert_eq!(value["source"]["bucket"], "releases");
        assert!(value["source"].get("region").is_none());
    }
}
