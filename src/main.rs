//! modkit command-line interface.
//!
//! Subcommands:
//! - `validate <manifest>`: check a draft manifest, printing every violation
//! - `package <manifest>`: validate and write a `.modl` artifact
//! - `inspect <artifact>`: verify an artifact and print its descriptor
//! - `list`: discover artifacts in the configured search paths

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use modkit::{
    package, validate, validate_with_warnings, ModuleLoader, ModuleManifest, PackagedArtifact,
    ToolConfig,
};

#[derive(Parser)]
#[command(name = "modkit", version, about = "Plugin module manifest toolkit")]
struct Cli {
    /// Path to the tool configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a module manifest
    Validate {
        /// Path to the manifest file
        manifest: PathBuf,
    },
    /// Validate a manifest and package it as a .modl artifact
    Package {
        /// Path to the manifest file
        manifest: PathBuf,
        /// Output directory (defaults to the configured output-dir)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Verify a packaged artifact and print its descriptor
    Inspect {
        /// Path to the artifact directory
        artifact: PathBuf,
        /// Print the descriptor as JSON
        #[arg(long)]
        json: bool,
    },
    /// List modules discovered in the configured search paths
    List,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ToolConfig::load_from(path)?,
        None => ToolConfig::load()?,
    };

    // Initialize logging; RUST_LOG overrides the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    match cli.command {
        Command::Validate { manifest } => run_validate(&manifest),
        Command::Package { manifest, out } => {
            let out_dir = out.unwrap_or_else(|| config.output_dir.clone());
            run_package(&manifest, &out_dir)
        }
        Command::Inspect { artifact, json } => run_inspect(&artifact, json),
        Command::List => run_list(&config),
    }
}

fn run_validate(manifest_path: &PathBuf) -> anyhow::Result<()> {
    let manifest = ModuleManifest::from_path(manifest_path)
        .with_context(|| format!("cannot read manifest {}", manifest_path.display()))?;

    match validate_with_warnings(&manifest) {
        Ok((descriptor, warnings)) => {
            for warning in warnings {
                eprintln!("warning: {warning}");
            }
            println!(
                "{} {} is valid ({} scope(s), {} hook(s))",
                descriptor.module_id(),
                descriptor.version(),
                descriptor.scopes().len(),
                descriptor.hooks().len()
            );
            Ok(())
        }
        Err(report) => {
            eprint!("{report}");
            anyhow::bail!("validation failed");
        }
    }
}

fn run_package(manifest_path: &PathBuf, out_dir: &PathBuf) -> anyhow::Result<()> {
    let manifest = ModuleManifest::from_path(manifest_path)
        .with_context(|| format!("cannot read manifest {}", manifest_path.display()))?;

    let descriptor = match validate(&manifest) {
        Ok(descriptor) => descriptor,
        Err(report) => {
            eprint!("{report}");
            anyhow::bail!("validation failed");
        }
    };

    let artifact_dir = package(&descriptor, out_dir)?;
    println!("packaged {}", artifact_dir.display());
    Ok(())
}

fn run_inspect(artifact_path: &PathBuf, json: bool) -> anyhow::Result<()> {
    let artifact = PackagedArtifact::open(artifact_path)
        .with_context(|| format!("cannot open artifact {}", artifact_path.display()))?;
    let descriptor = artifact.descriptor();

    if json {
        println!("{}", serde_json::to_string_pretty(descriptor)?);
        return Ok(());
    }

    println!("module:  {} ({})", descriptor.name(), descriptor.module_id());
    println!("group:   {}", descriptor.group());
    println!("version: {}", descriptor.version());
    if !descriptor.license().is_empty() {
        println!("license: {}", descriptor.license());
    }
    if !descriptor.project_url().is_empty() {
        println!("url:     {}", descriptor.project_url());
    }
    for scope in descriptor.scopes() {
        println!("scope:   {} -> {}", scope.name(), scope.capabilities());
    }
    for hook in descriptor.hooks() {
        println!("hook:    {} -> {}", hook.capability(), hook.entry_point());
    }
    Ok(())
}

fn run_list(config: &ToolConfig) -> anyhow::Result<()> {
    let mut loader = ModuleLoader::new();
    for path in &config.search_paths {
        loader.add_search_path(path);
    }

    let discovered = loader.discover()?;
    info!(count = discovered.len(), "discovery complete");

    if loader.list_modules().is_empty() {
        println!("no modules found");
        return Ok(());
    }
    for module in loader.list_modules() {
        let descriptor = module.descriptor();
        println!(
            "{} {} ({})",
            descriptor.module_id(),
            descriptor.version(),
            module.artifact_dir().display()
        );
    }
    Ok(())
}
