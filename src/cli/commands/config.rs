//! `tarot-intake config` command - Configuration management
//!
//! Provides commands to view and modify the config file.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::helpers::{load_config, mask_secret};
use crate::cli::GlobalOpts;
use crate::core::config::{KEYS, KEY_ENV, URL_ENV};
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration values
    Show(ShowArgs),

    /// Set a configuration value in the config file
    Set(SetArgs),

    /// Unset (remove) a configuration value from the config file
    Unset(UnsetArgs),

    /// Show the path to the config file
    Path,

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,

    /// Print the anon key unmasked
    #[arg(long)]
    pub reveal: bool,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (e.g., supabase_url, after_submit)
    pub key: String,

    /// Value to set
    pub value: String,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,
}

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Set(args) => run_set(args, global),
        ConfigCommands::Unset(args) => run_unset(args, global),
        ConfigCommands::Path => run_path(global),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;

    let display = |key: &str| -> Option<String> {
        let value = config.get_key(key)?;
        if key == "supabase_anon_key" && !args.reveal {
            Some(mask_secret(&value))
        } else {
            Some(value)
        }
    };

    // If a specific key is requested, show just that value
    if let Some(key) = &args.key {
        if !KEYS.iter().any(|(k, _)| *k == key.as_str()) {
            return Err(miette::miette!("Unknown config key '{}'", key));
        }
        return match display(key) {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();

    for &(key, _) in KEYS {
        print_config_value(key, display(key).as_deref());
    }

    println!();
    println!("  {}: {}", style("resolved table").dim(), config.table());

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Command-line flags (--url, --key, --table)");
    println!(
        "  2. Environment variables ({} / {}, {} / {})",
        URL_ENV[0], URL_ENV[1], KEY_ENV[0], KEY_ENV[1]
    );
    println!("  3. Config file ({})", config_path(global)?.display());

    Ok(())
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    let path = config_path(global)?;
    let mut config = read_file_layer(&path)?;

    config
        .set_key(&args.key, &args.value)
        .map_err(|e| miette::miette!("{}", e))?;
    write_file_layer(&path, &config)?;

    let shown = if args.key == "supabase_anon_key" {
        mask_secret(&args.value)
    } else {
        args.value.clone()
    };
    println!(
        "{} Set {} {} {} in {}",
        style("✓").green(),
        style(&args.key).cyan(),
        style("→").dim(),
        style(shown).yellow(),
        path.display()
    );

    Ok(())
}

fn run_unset(args: UnsetArgs, global: &GlobalOpts) -> Result<()> {
    let path = config_path(global)?;

    if !path.exists() {
        return Err(miette::miette!(
            "Config file does not exist: {}",
            path.display()
        ));
    }

    let mut config = read_file_layer(&path)?;
    let removed = config
        .unset_key(&args.key)
        .map_err(|e| miette::miette!("{}", e))?;

    if !removed {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }

    write_file_layer(&path, &config)?;

    println!(
        "{} Removed {} from {}",
        style("✓").green(),
        style(&args.key).cyan(),
        path.display()
    );

    Ok(())
}

fn run_path(global: &GlobalOpts) -> Result<()> {
    let path = config_path(global)?;
    println!("{}", path.display());
    if !global.quiet {
        if path.exists() {
            eprintln!("{}", style("(exists)").green());
        } else {
            eprintln!("{}", style("(not created)").dim());
        }
    }
    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in KEYS {
        println!("  {:<20} {}", style(key).cyan(), style(description).dim());
    }

    println!();
    println!(
        "{}",
        style("Use 'tarot-intake config set <key> <value>' to set a value.").dim()
    );

    Ok(())
}

// Helper functions

/// `--config` when given, the platform config file otherwise
fn config_path(global: &GlobalOpts) -> Result<PathBuf> {
    match &global.config {
        Some(path) => Ok(path.clone()),
        None => Config::global_config_path()
            .ok_or_else(|| miette::miette!("Could not determine global config directory")),
    }
}

/// Only the file layer, without environment or flags
fn read_file_layer(path: &Path) -> Result<Config> {
    if path.exists() {
        Ok(Config::from_file(path)?)
    } else {
        Ok(Config::default())
    }
}

fn write_file_layer(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    let yaml = serde_yml::to_string(config).into_diagnostic()?;
    fs::write(path, yaml).into_diagnostic()?;
    Ok(())
}

fn print_config_value(key: &str, value: Option<&str>) {
    if let Some(v) = value {
        println!("  {}: {}", style(key).cyan(), style(v).yellow());
    } else {
        println!("  {}: {}", style(key).cyan(), style("(not set)").dim());
    }
}
