//! Form rules - field validators and the step wizard

pub mod validator;
pub mod wizard;

pub use validator::{format_cpf, is_valid_cpf, is_valid_email, normalize_cpf};
pub use wizard::{
    validate_all, validate_step, CompletionPolicy, Field, FieldErrors, Notifier, Phase, Step,
    SubmitOutcome, Transition, WizardController,
};
