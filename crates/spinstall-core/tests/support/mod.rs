//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use spinstall_core::config::{InstallOptions, InstallPaths};
use spinstall_core::context::InstallContext;
use spinstall_core::error::Result;
use spinstall_core::exec::{CommandRunner, Elevation, ElevationMode};
use spinstall_core::packages::Prerequisites;

pub const PROTOTYPE: &str = "# default local settings\nproviders:\n  google:\n    enabled: false\n";

/// A throwaway host layout: install root, components root, user config dir
/// and a local release directory.
pub struct Host {
    pub temp: TempDir,
    pub paths: InstallPaths,
    pub release_dir: PathBuf,
}

impl Host {
    pub fn new(packages: &[&str]) -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let paths = InstallPaths::new(
            temp.path().join("opt/spinnaker"),
            temp.path().join("root/.spinnaker"),
            temp.path().join("opt"),
        );
        let release_dir = temp.path().join("release");

        fs::create_dir_all(&release_dir).expect("Failed to create release dir");
        fs::create_dir_all(paths.package_dir()).expect("Failed to create package dir");
        fs::create_dir_all(paths.scripts_dir()).expect("Failed to create scripts dir");
        fs::create_dir_all(paths.config_dir()).expect("Failed to create config dir");

        fs::write(
            paths.release_config(),
            format!(
                "RELEASE_NAME=\"test\"\nPACKAGE_LIST=\"{}\"\n",
                packages.join(" ")
            ),
        )
        .expect("Failed to write release config");
        fs::write(paths.scripts_dir().join("start_spinnaker.sh"), "#!/bin/sh\n")
            .expect("Failed to write script");
        fs::write(paths.config_dir().join("default-spinnaker-local.yml"), PROTOTYPE)
            .expect("Failed to write prototype");

        for package in packages {
            let component = spinstall_core::manifest::component_name(package);
            if component != "deck" {
                write_launch_script(paths.components_root(), component, GRADLE_OPTS_LINE);
            }
        }

        Self {
            temp,
            paths,
            release_dir,
        }
    }

    pub fn options(&self) -> InstallOptions {
        InstallOptions {
            release_path: Some(self.release_dir.to_string_lossy().to_string()),
            paths: self.paths.clone(),
            elevation: ElevationMode::None,
            ..InstallOptions::default()
        }
    }

    pub fn context(
        &self,
        options: InstallOptions,
        runner: Arc<dyn CommandRunner>,
        prerequisites: Arc<RecordingPrerequisites>,
    ) -> InstallContext {
        InstallContext::with_elevation(options, runner, Elevation::new(ElevationMode::None))
            .with_prerequisites(prerequisites)
    }

    pub fn local_config(&self) -> PathBuf {
        self.paths.user_config_dir().join("spinnaker-local.yml")
    }
}

pub const GRADLE_OPTS_LINE: &str = "DEFAULT_JVM_OPTS='\"-Xms512m\" \"-Xmx2g\"'";

pub fn write_launch_script(components_root: &Path, component: &str, opts_line: &str) -> PathBuf {
    let dir = components_root.join(component).join("bin");
    fs::create_dir_all(&dir).expect("Failed to create bin dir");
    let script = dir.join(component);
    fs::write(
        &script,
        format!(
            "#!/usr/bin/env bash\nAPP_NAME=\"{component}\"\n{opts_line}\nexec java $DEFAULT_JVM_OPTS -jar /opt/{component}/lib/{component}.jar\n"
        ),
    )
    .expect("Failed to write launch script");
    script
}

/// [`Prerequisites`] that only records what was asked of it.
#[derive(Debug, Default)]
pub struct RecordingPrerequisites {
    java_missing: bool,
    calls: Mutex<Vec<String>>,
}

impl RecordingPrerequisites {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn without_java() -> Arc<Self> {
        Arc::new(Self {
            java_missing: true,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

impl Prerequisites for RecordingPrerequisites {
    fn install_all(&self, update_os: bool) -> Result<()> {
        self.record(if update_os {
            "install_all(update_os)"
        } else {
            "install_all"
        });
        Ok(())
    }

    fn java_available(&self) -> bool {
        self.record("java_available");
        !self.java_missing
    }

    fn install_java(&self) -> Result<()> {
        self.record("install_java");
        Ok(())
    }

    fn install_os_updates(&self) -> Result<()> {
        self.record("install_os_updates");
        Ok(())
    }

    fn install_web_server(&self) -> Result<()> {
        self.record("install_web_server");
        Ok(())
    }
}
