//! Shared helper functions for CLI commands
//!
//! Config resolution, datastore selection, and the terminal alert used by
//! every command that submits.

use console::{style, Term};
use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::{Config, DryRunStore, InsertEndpoint, StoreError, SupabaseStore};
use crate::schema::{FieldErrors, Notifier};

/// Alert shown when the insert fails
pub const SUBMISSION_ALERT: &str = "Ocorreu um erro ao enviar seus dados. Por favor, tente novamente.";

/// Load config and apply the global CLI overrides on top
pub fn load_config(global: &GlobalOpts) -> Result<Config> {
    let mut config = Config::load_from(global.config.as_deref())?;
    config.merge(Config {
        supabase_url: global.url.clone(),
        supabase_anon_key: global.key.clone(),
        table: global.table.clone(),
        ..Default::default()
    });
    Ok(config)
}

/// Pick the insert endpoint: stdout for dry runs, Supabase otherwise
///
/// Fails when the datastore URL or key is missing, so call this before
/// showing any prompt.
pub fn open_store(config: &Config, dry_run: bool, verbose: bool) -> Result<Box<dyn InsertEndpoint>> {
    if dry_run {
        return Ok(Box::new(DryRunStore::new(std::io::stdout(), &config.table())));
    }
    let datastore = config.datastore()?;
    Ok(Box::new(SupabaseStore::new(&datastore).with_verbose(verbose)))
}

/// Mask a secret for display, keeping the last four characters
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(8), tail)
}

/// Print field errors, one per line, to stderr
pub fn print_field_errors(errors: &FieldErrors) {
    for (field, message) in errors.iter() {
        eprintln!(
            "  {} {} {}",
            style("✗").red(),
            style(field.key()).cyan(),
            style(message).red()
        );
    }
}

/// Logs submission failures to stderr and shows the alert
pub struct TerminalNotifier {
    /// Wait for Enter after the alert
    wait_for_ack: bool,
}

impl TerminalNotifier {
    /// Blocking alert for interactive sessions
    pub fn interactive() -> Self {
        Self { wait_for_ack: true }
    }

    /// Alert without waiting, for scripted use
    pub fn batch() -> Self {
        Self { wait_for_ack: false }
    }
}

impl Notifier for TerminalNotifier {
    fn submission_failed(&mut self, error: &StoreError) {
        eprintln!("{} Erro ao enviar dados: {}", style("!").yellow(), style(error).dim());
        eprintln!();
        eprintln!("  {} {}", style("✗").red().bold(), style(SUBMISSION_ALERT).red().bold());
        eprintln!();

        if self.wait_for_ack {
            let term = Term::stderr();
            let _ = term.write_str("  Pressione Enter para continuar...");
            let _ = term.read_line();
        }
    }
}
