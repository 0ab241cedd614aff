use std::io;
use std::path::Path;
use std::sync::Arc;

use super::*;
use crate::error::ConfigError;
use crate::exec::fakes::ScriptedRunner;
use crate::exec::{CommandOutput, Elevation, ElevationMode};

fn transport(runner: ScriptedRunner) -> (Arc<ScriptedRunner>, Transport) {
    let runner = Arc::new(runner);
    let elevation = Elevation::new(ElevationMode::Sudo)
        .with_forwarded("HOME", "/home/ops")
        .with_forwarded("PATH", "/usr/local/bin:/usr/bin");
    (runner.clone(), Transport::new(runner, elevation))
}

// =========================================================================
// Parsing
// =========================================================================

#[test]
fn parse_detects_backends_by_scheme() {
    let gcs = ArtifactLocation::parse("gs://spinnaker-releases/v1.2", None).unwrap();
    assert_eq!(gcs.kind(), BackendKind::Gcs);
    assert_eq!(gcs.bucket(), Some("spinnaker-releases"));

    let s3 = ArtifactLocation::parse("s3://spinnaker-releases/v1.2", Some("us-east-1")).unwrap();
    assert_eq!(s3.kind(), BackendKind::S3);
    assert_eq!(s3.region(), Some("us-east-1"));

    let local = ArtifactLocation::parse("/mnt/releases/v1.2", None).unwrap();
    assert_eq!(local.kind(), BackendKind::Local);
    assert_eq!(local.local_path(), Some(Path::new("/mnt/releases/v1.2")));
    assert!(!local.is_remote());
}

#[test]
fn parse_requires_region_for_s3() {
    let err = ArtifactLocation::parse("s3://spinnaker-releases/v1.2", None).unwrap_err();
    assert!(matches!(err, ConfigError::MissingRegion { .. }));

    let err = ArtifactLocation::parse("s3://spinnaker-releases/v1.2", Some("  ")).unwrap_err();
    assert!(matches!(err, ConfigError::MissingRegion { .. }));
}

#[test]
fn parse_rejects_unknown_schemes() {
    let err = ArtifactLocation::parse("https://example.com/releases", None).unwrap_err();
    match err {
        ConfigError::UnsupportedScheme { scheme, .. } => assert_eq!(scheme, "https"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn parse_rejects_empty_spec() {
    let err = ArtifactLocation::parse("  ", None).unwrap_err();
    assert!(matches!(err, ConfigError::MissingReleasePath));
}

#[test]
fn parse_rejects_missing_bucket() {
    let err = ArtifactLocation::parse("gs:///v1.2", None).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidLocation { .. }));
}

#[test]
fn join_appends_one_separator_and_keeps_backend() {
    let base = ArtifactLocation::parse("s3://bucket/release/", Some("eu-west-1")).unwrap();
    let pkg = base.join("clouddriver_1.0_all.deb");
    assert_eq!(pkg.as_str(), "s3://bucket/release/clouddriver_1.0_all.deb");
    assert_eq!(pkg.kind(), BackendKind::S3);
    assert_eq!(pkg.region(), Some("eu-west-1"));
}

// =========================================================================
// Existence and reachability
// =========================================================================

#[test]
fn missing_local_path_fails_without_running_commands() {
    let (runner, transport) = transport(ScriptedRunner::new());
    let location = ArtifactLocation::parse("/definitely/not/a/release/dir", None).unwrap();

    let err = transport.validate_reachable(&location).unwrap_err();
    assert!(matches!(err, ConfigError::PathNotFound { .. }));
    assert!(err.to_string().contains("does not exist"));
    assert!(runner.calls().is_empty());
}

#[test]
fn existing_local_path_is_reachable() {
    let temp = tempfile::TempDir::new().unwrap();
    let (runner, transport) = transport(ScriptedRunner::new());
    let location = ArtifactLocation::parse(temp.path().to_str().unwrap(), None).unwrap();

    transport.validate_reachable(&location).unwrap();
    assert!(transport.exists(&location).unwrap());
    assert!(runner.calls().is_empty());
}

#[test]
fn remote_exists_uses_listing_exit_code() {
    let (runner, transport) = transport(
        ScriptedRunner::new().on("gsutil ls gs://bucket/missing", CommandOutput::failure(1, "")),
    );
    let present = ArtifactLocation::parse("gs://bucket/present", None).unwrap();
    let missing = ArtifactLocation::parse("gs://bucket/missing", None).unwrap();

    assert!(transport.exists(&present).unwrap());
    assert!(!transport.exists(&missing).unwrap());
    assert_eq!(runner.count("gsutil ls"), 2);
}

#[test]
fn missing_client_tool_asks_for_install() {
    let (_runner, transport) =
        transport(ScriptedRunner::new().spawn_error("gsutil --version", io::ErrorKind::NotFound));
    let location = ArtifactLocation::parse("gs://bucket/release", None).unwrap();

    let err = transport.validate_reachable(&location).unwrap_err();
    assert!(matches!(err, ConfigError::ClientToolMissing { tool: "gsutil", .. }));
    assert!(err.to_string().contains("gsutil is required"));
}

#[test]
fn failed_listing_embeds_tool_output() {
    let (runner, transport) = transport(ScriptedRunner::new().on(
        "aws s3 ls",
        CommandOutput::failure(255, "An error occurred (NoSuchBucket)"),
    ));
    let location = ArtifactLocation::parse("s3://bucket/release", Some("us-east-1")).unwrap();

    let err = transport.validate_reachable(&location).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("does not seem to exist within S3"), "{message}");
    assert!(message.contains("NoSuchBucket"), "{message}");
    assert_eq!(
        runner.command_lines(),
        vec![
            "aws --version",
            "aws s3 ls --region us-east-1 s3://bucket/release"
        ]
    );
}

// =========================================================================
// Copy commands
// =========================================================================

#[test]
fn local_copy_goes_through_shell_for_wildcards() {
    let (_runner, transport) = transport(ScriptedRunner::new());
    let source = ArtifactLocation::parse("/mnt/release", None)
        .unwrap()
        .join("*.deb");

    let cmd = transport.copy_command(&source, Path::new("/opt/spinnaker/install"));
    assert_eq!(
        cmd.args,
        vec![
            "sh",
            "-c",
            "IFS=; cp -- $1 \"$2\"",
            "sh",
            "/mnt/release/*.deb",
            "/opt/spinnaker/install"
        ]
    );
    assert_eq!(cmd.program, "sudo");
}

#[test]
fn gcs_copy_forwards_user_environment() {
    let (_runner, transport) = transport(ScriptedRunner::new());
    let source = ArtifactLocation::parse("gs://bucket/release", None)
        .unwrap()
        .join("echo_1.0_all.deb");

    let cmd = transport.copy_command(&source, Path::new("/opt/spinnaker/install"));
    assert_eq!(
        cmd.to_string(),
        "sudo env HOME=/home/ops PATH=/usr/local/bin:/usr/bin gsutil -m -q cp \
         gs://bucket/release/echo_1.0_all.deb /opt/spinnaker/install"
    );
}

#[test]
fn s3_copy_passes_region() {
    let (_runner, transport) = transport(ScriptedRunner::new());
    let source = ArtifactLocation::parse("s3://bucket/release", Some("us-west-2"))
        .unwrap()
        .join("gate_1.0_all.deb");

    let cmd = transport.copy_command(&source, Path::new("/opt/spinnaker/install"));
    let line = cmd.to_string();
    assert!(
        line.ends_with("aws s3 cp --region us-west-2 s3://bucket/release/gate_1.0_all.deb /opt/spinnaker/install"),
        "{line}"
    );
    assert!(line.contains("HOME=/home/ops"));
}
