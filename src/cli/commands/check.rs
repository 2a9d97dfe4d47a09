//! `tarot-intake check` - run a single field validator

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::GlobalOpts;
use crate::schema::validator::CPF_LEN;
use crate::schema::{format_cpf, is_valid_cpf, is_valid_email, normalize_cpf};

#[derive(Subcommand, Debug)]
pub enum CheckCommands {
    /// Check the shape of an e-mail address
    Email {
        /// Address to check
        value: String,
    },

    /// Check a CPF (punctuation is ignored)
    Cpf {
        /// CPF to check, e.g. 529.982.247-25
        value: String,
    },
}

pub fn run(cmd: CheckCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CheckCommands::Email { value } => check_email(&value, global),
        CheckCommands::Cpf { value } => check_cpf(&value, global),
    }
}

fn check_email(value: &str, global: &GlobalOpts) -> Result<()> {
    if !is_valid_email(value) {
        return Err(miette::miette!("E-mail inválido: '{}'", value));
    }
    if !global.quiet {
        println!("{} {} is a valid e-mail address", style("✓").green(), style(value).cyan());
    }
    Ok(())
}

fn check_cpf(value: &str, global: &GlobalOpts) -> Result<()> {
    if is_valid_cpf(value) {
        if !global.quiet {
            println!("{} {} is a valid CPF", style("✓").green(), style(format_cpf(value)).cyan());
        }
        return Ok(());
    }

    let digits = normalize_cpf(value);
    let reason = if digits.len() != CPF_LEN {
        format!("expected {} digits, found {}", CPF_LEN, digits.len())
    } else if digits.chars().all(|c| digits.starts_with(c)) {
        "all digits are the same".to_string()
    } else {
        "check digits do not match".to_string()
    };
    Err(miette::miette!("CPF inválido: '{}' ({})", value, reason))
}
