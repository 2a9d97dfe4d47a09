//! `tarot-intake submit` - submit a form record from a file
//!
//! The record goes through the same four step validations as the
//! interactive wizard before a single insert is attempted.

use console::style;
use miette::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::helpers::{load_config, open_store, print_field_errors, TerminalNotifier};
use crate::cli::table::review_table;
use crate::cli::GlobalOpts;
use crate::entities::FormRecord;
use crate::schema::{validate_all, SubmitOutcome, Transition, WizardController};

#[derive(clap::Args, Debug)]
pub struct SubmitArgs {
    /// YAML or JSON file with the form answers
    pub file: PathBuf,

    /// Print the row as JSON instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: SubmitArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let store = open_store(&config, args.dry_run, global.verbose)?;

    let record = read_record(&args.file)?;

    let errors = validate_all(&record);
    if !errors.is_empty() {
        eprintln!(
            "{} {} is not submittable:",
            style("✗").red(),
            style(args.file.display()).cyan()
        );
        print_field_errors(&errors);
        return Err(miette::miette!("{} field error(s)", errors.len()));
    }

    if global.verbose && !global.quiet {
        eprintln!("{}", review_table(&record));
    }

    let name = record.full_name.clone();
    let mut wizard = WizardController::with_record(config.completion_policy(), record);
    while let Transition::Moved(_) = wizard.next() {}

    match wizard.submit(store.as_ref(), &mut TerminalNotifier::batch()) {
        SubmitOutcome::Submitted => {
            if !global.quiet && !args.dry_run {
                println!(
                    "{} Submitted lead for {} to {}",
                    style("✓").green(),
                    style(&name).yellow(),
                    style(store.describe()).dim()
                );
            }
            Ok(())
        }
        SubmitOutcome::Failed(err) => Err(miette::miette!("Submission failed: {}", err)),
        SubmitOutcome::Invalid => {
            print_field_errors(wizard.errors());
            Err(miette::miette!("{} field error(s)", wizard.errors().len()))
        }
        SubmitOutcome::NotReady => Err(miette::miette!(
            "Record did not reach the last step (errors: {})",
            wizard.errors()
        )),
    }
}

/// Read a record, choosing the format by extension (`.json` or YAML)
pub fn read_record(path: &Path) -> Result<FormRecord> {
    let content = fs::read_to_string(path)
        .map_err(|e| miette::miette!("Cannot read {}: {}", path.display(), e))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let parsed = if is_json {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    } else {
        serde_yml::from_str(&content).map_err(|e| e.to_string())
    };
    parsed.map_err(|e| miette::miette!("Cannot parse {}: {}", path.display(), e))
}
