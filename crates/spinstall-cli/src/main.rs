//! Spinstall - Spinnaker release installer
//!
//! Usage:
//!   spinstall install --release-path gs://bucket/release   # Install a release
//!   spinstall check --release-path s3://bucket/r --region R  # Validate only
//!   spinstall patch clouddriver                               # Re-patch one component
//!   spinstall config --save ...                               # Show or persist settings

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spinstall_core::config::{ConfigStore, InstallConfig, InstallOptions, to_toml};
use spinstall_core::context::InstallContext;
use spinstall_core::exec::ElevationMode;
use spinstall_core::orchestration::{InstallOrchestrator, InstallReport, StageFailure};
use spinstall_core::packages::InstallSummary;
use spinstall_core::patch::PatchOutcome;
use spinstall_core::provision::ProvisionOutcome;

#[derive(Parser)]
#[command(name = "spinstall")]
#[command(about = "Install a Spinnaker release onto this host", long_about = None)]
struct Cli {
    /// Settings file (default: <config dir>/spinstall/spinstall.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install prerequisites and the release packages
    Install {
        #[command(flatten)]
        flags: InstallFlags,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Validate options and the release source without changing the host
    Check {
        #[command(flatten)]
        flags: InstallFlags,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Point one installed component at the Spinnaker config directories
    Patch {
        /// Component name, e.g. clouddriver
        component: String,

        #[command(flatten)]
        flags: InstallFlags,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show the effective settings, optionally saving the flags given
    Config {
        #[command(flatten)]
        flags: InstallFlags,

        /// Write the merged settings back to the settings file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable summary
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

#[derive(Args, Default)]
struct InstallFlags {
    /// Release location: a local directory, gs://bucket/path or s3://bucket/path
    #[arg(long)]
    release_path: Option<String>,

    /// AWS region (required for s3:// release paths)
    #[arg(long)]
    region: Option<String>,

    /// Installation root
    #[arg(long, value_name = "DIR")]
    install_dir: Option<PathBuf>,

    /// Directory for the operator's override configuration
    #[arg(long, value_name = "DIR")]
    user_config_dir: Option<PathBuf>,

    /// Directory holding installed components
    #[arg(long, value_name = "DIR")]
    components_root: Option<PathBuf>,

    /// Do not install the runtime dependencies
    #[arg(long)]
    no_dependencies: bool,

    /// Do not install the release components
    #[arg(long)]
    no_components: bool,

    /// Apply OS updates before installing
    #[arg(long)]
    update_os: bool,

    /// Run privileged commands without sudo (when already root)
    #[arg(long)]
    no_sudo: bool,
}

impl InstallFlags {
    /// Settings given on the command line; unset flags stay `None`.
    fn to_config(&self) -> InstallConfig {
        InstallConfig {
            release_path: self.release_path.clone(),
            region: self.region.clone(),
            install_root: self.install_dir.clone(),
            user_config_dir: self.user_config_dir.clone(),
            components_root: self.components_root.clone(),
            install_dependencies: self.no_dependencies.then_some(false),
            install_components: self.no_components.then_some(false),
            update_os: self.update_os.then_some(true),
            elevation: self.no_sudo.then_some(ElevationMode::None),
            ..InstallConfig::default()
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spinstall=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let store = match &cli.config {
        Some(path) => ConfigStore::from_path(path),
        None => ConfigStore::from_default_location()?,
    };

    match cli.command {
        Commands::Install { flags, format } => run_install(&store, &flags, format),
        Commands::Check { flags, format } => run_check(&store, &flags, format),
        Commands::Patch {
            component,
            flags,
            format,
        } => run_patch(&store, &flags, &component, format),
        Commands::Config { flags, save } => run_config(&store, &flags, save),
    }
}

/// Merge the settings file with the command-line flags.
fn resolve_config(store: &ConfigStore, flags: &InstallFlags) -> Result<InstallConfig> {
    let config = store
        .load()
        .with_context(|| format!("Failed to load {}", store.config_path().display()))?
        .overlay(flags.to_config());
    config.validate()?;
    Ok(config)
}

fn orchestrator(store: &ConfigStore, flags: &InstallFlags) -> Result<InstallOrchestrator> {
    let options = InstallOptions::from_config(resolve_config(store, flags)?);
    Ok(InstallOrchestrator::new(InstallContext::system(options)))
}

fn stage_error(failure: StageFailure) -> anyhow::Error {
    eprintln!(
        "{} {}",
        style("✗").red().bold(),
        style(format!("Failed while {}", failure.stage)).bold()
    );
    anyhow::Error::new(failure.source)
}

fn run_install(store: &ConfigStore, flags: &InstallFlags, format: OutputFormat) -> Result<()> {
    let report = orchestrator(store, flags)?.run().map_err(stage_error)?;

    match format {
        OutputFormat::Table => print_install_report(&report),
        OutputFormat::Json => println!("{}", report.to_json_pretty()?),
    }
    Ok(())
}

fn print_install_report(report: &InstallReport) {
    let Some(source) = &report.source else {
        println!(
            "{} Nothing to install (dependencies and components both disabled)",
            style("•").dim()
        );
        return;
    };

    println!(
        "{} Installed release from {} ({})",
        style("✓").green().bold(),
        style(&source.release_path).cyan(),
        source.backend.display_name()
    );

    let prereqs = &report.prerequisites;
    let mut steps = Vec::new();
    if prereqs.install_all {
        steps.push("runtime dependencies");
    }
    if prereqs.java {
        steps.push("java");
    }
    if prereqs.os_updates {
        steps.push("os updates");
    }
    if prereqs.web_server {
        steps.push("web server");
    }
    if !steps.is_empty() {
        println!("  Prerequisites: {}", steps.join(", "));
    }

    if !report.artifacts.is_empty() {
        println!("  Artifacts copied: {}", report.artifacts.len());
    }
    if !report.executable_scripts.is_empty() {
        println!("  Scripts marked executable: {}", report.executable_scripts.len());
    }

    if let Some(summary) = &report.packages {
        print_packages(summary);
    }

    match &report.local_config {
        Some(ProvisionOutcome::Created { path, .. }) => {
            println!("  Local config: created {}", style(path.display()).green());
        }
        Some(ProvisionOutcome::AlreadyPresent { path }) => {
            println!("  Local config: kept existing {}", path.display());
        }
        None => {}
    }
}

fn print_packages(summary: &InstallSummary) {
    println!("  {}", style("Packages").bold());
    for package in &summary.packages {
        let note = if package.direct_install_exit == 0 {
            String::new()
        } else {
            format!(" (direct install exited {})", package.direct_install_exit)
        };
        println!(
            "    {} {}{}",
            style(&package.package).green(),
            describe_patch(&package.patch),
            style(note).yellow()
        );
    }
    println!("  Dependency repair passes: {}", summary.repair_passes);
}

fn describe_patch(outcome: &PatchOutcome) -> String {
    match outcome {
        PatchOutcome::Skipped { .. } => "no launch script".to_string(),
        PatchOutcome::AlreadyConfigured { .. } => "config location already set".to_string(),
        PatchOutcome::Patched { script, .. } => format!("patched {}", script.display()),
    }
}

fn run_check(store: &ConfigStore, flags: &InstallFlags, format: OutputFormat) -> Result<()> {
    let orchestrator = orchestrator(store, flags)?;
    let location = orchestrator.validate().map_err(stage_error)?;

    match format {
        OutputFormat::Table => match &location {
            Some(location) => println!(
                "{} Release source {} is reachable via {}",
                style("✓").green().bold(),
                style(location).cyan(),
                location.kind().display_name()
            ),
            None => println!(
                "{} Release install not requested; nothing to check",
                style("•").dim()
            ),
        },
        OutputFormat::Json => {
            let output = match &location {
                Some(location) => serde_json::json!({
                    "ok": true,
                    "release_path": location.as_str(),
                    "backend": location.kind(),
                    "bucket": location.bucket(),
                    "region": location.region(),
                }),
                None => serde_json::json!({ "ok": true, "release_path": null }),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn run_patch(
    store: &ConfigStore,
    flags: &InstallFlags,
    component: &str,
    format: OutputFormat,
) -> Result<()> {
    let outcome = orchestrator(store, flags)?
        .patch_component(component)
        .map_err(stage_error)?;

    match format {
        OutputFormat::Table => match &outcome {
            PatchOutcome::Patched { script, .. } => println!(
                "{} Patched {}",
                style("✓").green().bold(),
                script.display()
            ),
            PatchOutcome::AlreadyConfigured { existing_line, .. } => println!(
                "{} {} already sets the config location:\n  {}",
                style("•").dim(),
                component,
                existing_line
            ),
            PatchOutcome::Skipped { .. } => println!(
                "{} {} has no launch script to patch",
                style("•").dim(),
                component
            ),
        },
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
    }
    Ok(())
}

fn run_config(store: &ConfigStore, flags: &InstallFlags, save: bool) -> Result<()> {
    let config = resolve_config(store, flags)?;
    if save {
        store.save(&config)?;
        println!(
            "{} Saved settings to {}",
            style("✓").green().bold(),
            store.config_path().display()
        );
        return Ok(());
    }

    println!("# {}", store.config_path().display());
    print!("{}", to_toml(&config)?);
    Ok(())
}
