//! Patching real launch scripts on disk with real commands.
#![cfg(unix)]

mod support;

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;

use spinstall_core::config::InstallOptions;
use spinstall_core::error::InstallError;
use spinstall_core::exec::SystemRunner;
use spinstall_core::orchestration::{InstallOrchestrator, Stage};
use spinstall_core::patch::PatchOutcome;

use support::{GRADLE_OPTS_LINE, Host, RecordingPrerequisites, write_launch_script};

fn orchestrator(host: &Host) -> InstallOrchestrator {
    let options = InstallOptions {
        skip_patch: vec!["deck".to_string()],
        ..host.options()
    };
    InstallOrchestrator::new(host.context(
        options,
        Arc::new(SystemRunner),
        RecordingPrerequisites::new(),
    ))
}

#[test]
fn patch_rewrites_script_and_keeps_mode() {
    let host = Host::new(&[]);
    let script = write_launch_script(host.paths.components_root(), "clouddriver", GRADLE_OPTS_LINE);
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let outcome = orchestrator(&host).patch_component("clouddriver").unwrap();
    assert!(matches!(outcome, PatchOutcome::Patched { .. }));

    let content = fs::read_to_string(&script).unwrap();
    let expected = format!(
        "DEFAULT_JVM_OPTS='\"-Dspring.config.location={}/,{}/\" \"-Xms512m\" \"-Xmx2g\"'\n",
        host.paths.config_dir().display(),
        host.paths.user_config_dir().display()
    );
    assert!(content.contains(&expected), "{content}");
    assert!(content.starts_with("#!/usr/bin/env bash\nAPP_NAME=\"clouddriver\"\n"));

    let mode = fs::metadata(&script).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o755);
}

#[test]
fn patching_twice_leaves_the_first_result() {
    let host = Host::new(&[]);
    let script = write_launch_script(host.paths.components_root(), "gate", GRADLE_OPTS_LINE);
    let orchestrator = orchestrator(&host);

    orchestrator.patch_component("gate").unwrap();
    let once = fs::read_to_string(&script).unwrap();

    let outcome = orchestrator.patch_component("gate").unwrap();
    match outcome {
        PatchOutcome::AlreadyConfigured { existing_line, .. } => {
            assert!(existing_line.starts_with("DEFAULT_JVM_OPTS='\"-Dspring.config.location="));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(fs::read_to_string(&script).unwrap(), once);
}

#[test]
fn skipped_component_needs_no_script() {
    let host = Host::new(&[]);
    let outcome = orchestrator(&host).patch_component("deck").unwrap();
    assert!(matches!(outcome, PatchOutcome::Skipped { .. }));
}

#[test]
fn ambiguous_script_is_left_untouched() {
    let host = Host::new(&[]);
    let script = write_launch_script(
        host.paths.components_root(),
        "echo",
        "DEFAULT_JVM_OPTS='-Xmx1g'\nDEFAULT_JVM_OPTS='-Xmx2g'",
    );
    let before = fs::read_to_string(&script).unwrap();

    let failure = orchestrator(&host).patch_component("echo").unwrap_err();

    assert_eq!(failure.stage, Stage::PatchingConfigs);
    assert!(matches!(failure.source, InstallError::LaunchScript { .. }));
    assert!(failure.to_string().contains("expected exactly one"));
    assert_eq!(fs::read_to_string(&script).unwrap(), before);
}
