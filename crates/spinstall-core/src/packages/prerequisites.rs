//! Runtime prerequisites of the release: a Java runtime, a web server for
//! the UI, and optionally OS updates.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Result;
use crate::exec::{CommandRunner, CommandSpec, Elevation, run_checked};

pub const JAVA_PACKAGE: &str = "openjdk-8-jre";
pub const WEB_SERVER_PACKAGE: &str = "apache2";

/// Host setup performed before the release is installed.
pub trait Prerequisites: Send + Sync + std::fmt::Debug {
    /// Install everything the release needs. OS updates are applied only
    /// when `update_os` is set.
    fn install_all(&self, update_os: bool) -> Result<()>;

    fn java_available(&self) -> bool;

    fn install_java(&self) -> Result<()>;

    fn install_os_updates(&self) -> Result<()>;

    fn install_web_server(&self) -> Result<()>;
}

/// [`Prerequisites`] for Debian-based hosts.
#[derive(Debug, Clone)]
pub struct AptPrerequisites {
    runner: Arc<dyn CommandRunner>,
    elevation: Elevation,
}

impl AptPrerequisites {
    pub fn new(runner: Arc<dyn CommandRunner>, elevation: Elevation) -> Self {
        Self { runner, elevation }
    }

    fn apt_get<'a>(&self, args: impl IntoIterator<Item = &'a str>) -> Result<()> {
        let command = self.elevation.wrap(
            CommandSpec::new("apt-get")
                .env("DEBIAN_FRONTEND", "noninteractive")
                .args(args),
        );
        run_checked(self.runner.as_ref(), &command)?;
        Ok(())
    }

    fn refresh_index(&self) -> Result<()> {
        self.apt_get(["update"])
    }
}

impl Prerequisites for AptPrerequisites {
    fn install_all(&self, update_os: bool) -> Result<()> {
        self.refresh_index()?;
        if update_os {
            info!("applying OS updates");
            self.apt_get(["upgrade", "-y"])?;
        }
        if !self.java_available() {
            info!(package = JAVA_PACKAGE, "installing Java runtime");
            self.apt_get(["install", "-y", JAVA_PACKAGE])?;
        }
        info!(package = WEB_SERVER_PACKAGE, "installing web server");
        self.apt_get(["install", "-y", WEB_SERVER_PACKAGE])
    }

    fn java_available(&self) -> bool {
        match self.runner.run(&CommandSpec::new("java").arg("-version")) {
            Ok(output) => output.is_success(),
            Err(err) => {
                debug!(error = %err, "java not found");
                false
            }
        }
    }

    fn install_java(&self) -> Result<()> {
        info!(package = JAVA_PACKAGE, "installing Java runtime");
        self.refresh_index()?;
        self.apt_get(["install", "-y", JAVA_PACKAGE])
    }

    fn install_os_updates(&self) -> Result<()> {
        info!("applying OS updates");
        self.refresh_index()?;
        self.apt_get(["upgrade", "-y"])
    }

    fn install_web_server(&self) -> Result<()> {
        info!(package = WEB_SERVER_PACKAGE, "installing web server");
        self.refresh_index()?;
        self.apt_get(["install", "-y", WEB_SERVER_PACKAGE])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InstallError;
    use crate::exec::fakes::ScriptedRunner;
    use crate::exec::{CommandOutput, ElevationMode};

    fn prerequisites(runner: ScriptedRunner) -> (Arc<ScriptedRunner>, AptPrerequisites) {
        let runner = Arc::new(runner);
        (
            runner.clone(),
            AptPrerequisites::new(runner, Elevation::new(ElevationMode::Sudo)),
        )
    }

    #[test]
    fn install_all_skips_java_when_present() {
        let (runner, prereqs) = prerequisites(ScriptedRunner::new());
        prereqs.install_all(false).unwrap();

        assert_eq!(
            runner.command_lines(),
            vec![
                "sudo env DEBIAN_FRONTEND=noninteractive apt-get update",
                "java -version",
                "sudo env DEBIAN_FRONTEND=noninteractive apt-get install -y apache2",
            ]
        );
    }

    #[test]
    fn install_all_with_updates_and_missing_java() {
        let (runner, prereqs) = prerequisites(
            ScriptedRunner::new().spawn_error("java -version", std::io::ErrorKind::NotFound),
        );
        prereqs.install_all(true).unwrap();

        assert_eq!(runner.count("apt-get upgrade -y"), 1);
        assert_eq!(runner.count("apt-get install -y openjdk-8-jre"), 1);
        assert_eq!(runner.count("apt-get install -y apache2"), 1);
    }

    #[test]
    fn failed_apt_command_is_an_error() {
        let (_runner, prereqs) = prerequisites(ScriptedRunner::new().on(
            "apache2",
            CommandOutput::failure(100, "E: Unable to locate package"),
        ));
        let err = prereqs.install_web_server().unwrap_err();
        assert!(matches!(err, InstallError::CommandFailed { exit_code: 100, .. }));
    }

    #[test]
    fn java_probe_is_not_elevated() {
        let (runner, prereqs) = prerequisites(ScriptedRunner::new());
        assert!(prereqs.java_available());
        assert_eq!(runner.calls()[0].program, "java");
    }
}
