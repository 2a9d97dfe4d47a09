//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{
    check::CheckCommands, completions::CompletionsArgs, config::ConfigCommands, run::RunArgs,
    submit::SubmitArgs,
};

#[derive(Parser)]
#[command(name = "tarot-intake")]
#[command(author, version, about = "Lead-capture wizard for spiritual consultations")]
#[command(long_about = "A four-step wizard that collects a consultation lead, validates the e-mail and CPF locally, and stores it in a Supabase table.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct GlobalOpts {
    /// Config file (default: platform config dir)
    #[arg(long, global = true, env = "TAROT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Supabase project URL (overrides config and environment)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Supabase anon key (overrides config and environment)
    #[arg(long, global = true)]
    pub key: Option<String>,

    /// Table receiving the rows
    #[arg(long, global = true)]
    pub table: Option<String>,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fill in the form interactively
    #[command(alias = "new")]
    Run(RunArgs),

    /// Submit a form record read from a YAML or JSON file
    Submit(SubmitArgs),

    /// Check a single e-mail address or CPF
    #[command(subcommand)]
    Check(CheckCommands),

    /// View and modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
