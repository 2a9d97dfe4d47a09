//! `tarot-intake run` - interactive four-step wizard
//!
//! Every step redraws the screen, shows the errors of the previous attempt
//! under the header, and asks for the step's fields with the current
//! answers pre-filled. Navigation is explicit: Próximo / Voltar / Enviar.

use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use miette::{IntoDiagnostic, Result};
use std::fmt::Display;

use crate::cli::helpers::{load_config, open_store, TerminalNotifier};
use crate::cli::table::review_table;
use crate::cli::GlobalOpts;
use crate::core::AfterSubmit;
use crate::entities::{FocusArea, PriorFamiliarity, ReferralSource};
use crate::schema::{CompletionPolicy, Field, Step, SubmitOutcome, WizardController};

/// Longest CPF input accepted, punctuation included
const CPF_INPUT_MAX_LEN: usize = 14;

const CONSENT_TEXT: &str = "Li e concordo com o uso dos meus dados para envio do material, consulta e emissão de nota fiscal, conforme a LGPD.";

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Print the row as JSON instead of sending it
    #[arg(long)]
    pub dry_run: bool,

    /// What to do after a successful submission
    #[arg(long, value_enum)]
    pub after_submit: Option<AfterSubmit>,

    /// Seconds the thank-you banner stays before a new form starts
    #[arg(long)]
    pub reset_delay: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nav {
    Next,
    Back,
    Submit,
}

pub fn run(args: RunArgs, global: &GlobalOpts) -> Result<()> {
    let mut config = load_config(global)?;
    if args.after_submit.is_some() {
        config.after_submit = args.after_submit;
    }
    if args.reset_delay.is_some() {
        config.reset_delay_secs = args.reset_delay;
    }

    // Resolve the datastore before the first prompt so a missing URL/key
    // aborts immediately.
    let store = open_store(&config, args.dry_run, global.verbose)?;
    if global.verbose {
        eprintln!("  Datastore: {}", store.describe());
    }

    let mut wizard = WizardController::new(config.completion_policy());
    let mut notifier = TerminalNotifier::interactive();
    let theme = ColorfulTheme::default();
    let term = Term::stdout();

    while let Some(step) = wizard.current_step() {
        render_header(&term, step, global.quiet);
        render_errors(&wizard, step);
        prompt_step(&mut wizard, step, &theme)?;

        if step == Step::Four {
            println!();
            println!("{}", review_table(wizard.record()));
            println!();
        }

        match prompt_navigation(step, &theme)? {
            Nav::Back => {
                wizard.back();
            }
            Nav::Next => {
                // A blocked step keeps its errors; the next redraw shows them
                wizard.next();
            }
            Nav::Submit => {
                println!("{}", style("Enviando...").dim());
                match wizard.submit(store.as_ref(), &mut notifier) {
                    SubmitOutcome::Submitted => {
                        render_thank_you(&term, global.quiet);
                        if let CompletionPolicy::Reset { delay } = wizard.policy() {
                            std::thread::sleep(delay);
                            wizard.acknowledge_completion();
                        }
                    }
                    SubmitOutcome::Failed(_) | SubmitOutcome::Invalid | SubmitOutcome::NotReady => {}
                }
            }
        }
    }

    Ok(())
}

/// Progress indicator, e.g. `● ─ ● ─ ○ ─ ○`
fn progress_bar(step: Step) -> String {
    Step::ALL
        .iter()
        .map(|s| if *s <= step { "●" } else { "○" })
        .collect::<Vec<_>>()
        .join(" ─ ")
}

fn render_header(term: &Term, step: Step, quiet: bool) {
    if term.is_term() {
        let _ = term.clear_screen();
    }

    if !quiet {
        println!(
            "{}",
            style("✨ Receba seu Presente Espiritual + Consulta Gratuita ✨")
                .magenta()
                .bold()
        );
        println!(
            "{}",
            style("Preencha abaixo — é rápido, gratuito e seguro.").dim()
        );
        println!();
    }

    println!("{}  {}", style(progress_bar(step)).magenta(), style(step).dim());
    println!("{}", style("─".repeat(50)).dim());
    println!();
}

fn render_errors(wizard: &WizardController, step: Step) {
    let errors = wizard.errors();
    for field in step.fields() {
        if let Some(message) = errors.get(*field) {
            println!("  {} {}", style(field.label()).cyan(), style(message).red());
        }
    }
    if step.fields().iter().any(|f| errors.get(*f).is_some()) {
        println!();
    }
}

fn render_thank_you(term: &Term, quiet: bool) {
    if term.is_term() {
        let _ = term.clear_screen();
    }
    println!();
    println!(
        "{} {}",
        style("🌙").magenta(),
        style("Obrigado! Seus dados foram enviados com sucesso.").magenta().bold()
    );
    if !quiet {
        println!(
            "   {}",
            style("Seu material será enviado por e-mail e sua leitura gratuita será agendada.").magenta()
        );
        println!();
        println!(
            "{}",
            style("⚖️  Seus dados são protegidos conforme a Lei Geral de Proteção de Dados (LGPD).").dim()
        );
    }
    println!();
}

fn prompt_step(wizard: &mut WizardController, step: Step, theme: &ColorfulTheme) -> Result<()> {
    match step {
        Step::One => {
            let current = wizard.record().prior_familiarity;
            let choice = select_option(theme, step.title(), PriorFamiliarity::ALL, current)?;
            wizard.set_prior_familiarity(Some(choice));
        }
        Step::Two => {
            let current = wizard.record().focus_area;
            let area = select_option(theme, step.title(), FocusArea::ALL, current)?;
            wizard.set_focus_area(Some(area));
            if area.is_other() {
                let current = wizard.record().focus_area_other.clone();
                let text = prompt_text(theme, Field::FocusAreaOther.label(), &current)?;
                wizard.set_focus_area_other(text);
            }
        }
        Step::Three => {
            let current = wizard.record().referral_source;
            let source = select_option(theme, step.title(), ReferralSource::ALL, current)?;
            wizard.set_referral_source(Some(source));
            if source.is_other() {
                let current = wizard.record().referral_source_other.clone();
                let text = prompt_text(theme, Field::ReferralSourceOther.label(), &current)?;
                wizard.set_referral_source_other(text);
            }
        }
        Step::Four => {
            println!("{}", style(step.title()).bold());
            println!();

            let current = wizard.record().full_name.clone();
            let name = prompt_text(theme, "Nome Completo *", &current)?;
            wizard.set_full_name(name);

            let current = wizard.record().email.clone();
            let email = prompt_text(theme, "E-mail * (seu@email.com)", &current)?;
            wizard.set_email(email);

            let current = wizard.record().cpf.clone();
            let cpf: String = Input::with_theme(theme)
                .with_prompt("CPF para emissão da nota fiscal da leitura * (000.000.000-00)")
                .with_initial_text(current)
                .allow_empty(true)
                .validate_with(|input: &String| -> std::result::Result<(), String> {
                    if input.chars().count() > CPF_INPUT_MAX_LEN {
                        Err(format!("Máximo de {} caracteres", CPF_INPUT_MAX_LEN))
                    } else {
                        Ok(())
                    }
                })
                .interact_text()
                .into_diagnostic()?;
            wizard.set_cpf(cpf);

            let consent = Confirm::with_theme(theme)
                .with_prompt(CONSENT_TEXT)
                .default(wizard.record().consent)
                .interact()
                .into_diagnostic()?;
            wizard.set_consent(consent);
        }
    }
    Ok(())
}

fn select_option<T>(theme: &ColorfulTheme, prompt: &str, options: &[T], current: Option<T>) -> Result<T>
where
    T: Copy + PartialEq + Display,
{
    let default = current
        .and_then(|c| options.iter().position(|o| *o == c))
        .unwrap_or(0);

    let selection = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(options)
        .default(default)
        .interact()
        .into_diagnostic()?;

    Ok(options[selection])
}

fn prompt_text(theme: &ColorfulTheme, prompt: &str, current: &str) -> Result<String> {
    Input::with_theme(theme)
        .with_prompt(prompt)
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()
        .into_diagnostic()
}

fn prompt_navigation(step: Step, theme: &ColorfulTheme) -> Result<Nav> {
    let mut choices = Vec::new();
    if step == Step::Four {
        choices.push(("Enviar e Receber Meu Presente", Nav::Submit));
    } else {
        choices.push(("Próximo", Nav::Next));
    }
    if step.prev().is_some() {
        choices.push(("Voltar", Nav::Back));
    }

    let labels: Vec<&str> = choices.iter().map(|(label, _)| *label).collect();
    let selection = Select::with_theme(theme)
        .items(&labels)
        .default(0)
        .interact()
        .into_diagnostic()?;

    Ok(choices[selection].1)
}
