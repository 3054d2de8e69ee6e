//! `modreg`: inspect the module registry from the command line.
//!
//! ```text
//! modreg modules
//! modreg --load ./libsparrow.so models calculator
//! modreg has calculator dft --module sparrow
//! modreg --json paths
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use modreg::{discovery, ModuleFilter, ModuleManager, RegistryConfig};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Registry command line arguments.
#[derive(Parser, Debug)]
#[command(name = "modreg")]
#[command(about = "Discover and query runtime-loaded modules")]
#[command(version)]
struct Cli {
    /// Additional module library to load before querying (repeatable)
    #[arg(long, value_name = "PATH", global = true)]
    load: Vec<PathBuf>,

    /// Configuration file to use instead of the default locations
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// List loaded modules in load order
    Modules,
    /// List every interface provided by a loaded module
    Interfaces,
    /// List the models of an interface across all modules
    Models {
        /// Interface identity
        interface: String,
    },
    /// Check whether a model of an interface is available
    Has {
        /// Interface identity
        interface: String,
        /// Model identity
        model: String,
        /// Restrict the check to one module (`any` for all)
        #[arg(long, short)]
        module: Option<String>,
    },
    /// Print the directories discovery searches, in order
    Paths,
}

fn main() -> Result<()> {
    // Initialize tracing with RUST_LOG env var
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RegistryConfig::load_from(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => RegistryConfig::load().context("Failed to load configuration")?,
    };

    match &cli.command {
        Command::Paths => {
            let dirs = discovery::search_directories(&config);
            let dirs: Vec<String> = dirs.iter().map(|dir| dir.display().to_string()).collect();
            print_list(&dirs, cli.json)
        }
        Command::Modules => {
            let registry = build_registry(&config, &cli.load)?;
            print_list(&registry.loaded_module_names(), cli.json)
        }
        Command::Interfaces => {
            let registry = build_registry(&config, &cli.load)?;
            print_list(&registry.loaded_interfaces(), cli.json)
        }
        Command::Models { interface } => {
            let registry = build_registry(&config, &cli.load)?;
            print_list(&registry.loaded_models(interface), cli.json)
        }
        Command::Has {
            interface,
            model,
            module,
        } => {
            let registry = build_registry(&config, &cli.load)?;
            let filter = ModuleFilter::from(module.as_deref());
            let found = registry.has(interface, model, filter.clone());
            if cli.json {
                let report = json!({
                    "interface": interface,
                    "model": model,
                    "module": filter.to_string(),
                    "available": found,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", if found { "yes" } else { "no" });
            }
            if !found {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

/// Run discovery, then load every `--load` library in order.
fn build_registry(config: &RegistryConfig, load: &[PathBuf]) -> Result<ModuleManager> {
    let mut registry = ModuleManager::with_discovery(config);
    for path in load {
        let outcome = registry
            .load_path(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        info!(path = %path.display(), ?outcome, "explicit load");
    }
    Ok(registry)
}

fn print_list(items: &[String], as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else {
        for item in items {
            println!("{item}");
        }
    }
    Ok(())
}
