//! Step-gated wizard controller
//!
//! The wizard walks a [`FormRecord`] through four steps. Each step has a
//! fixed set of rules; advancing is only possible when every rule of the
//! current step passes. The last step submits the record to an
//! [`InsertEndpoint`].
//!
//! ```text
//! Step1 -> Step2 -> Step3 -> Step4 -> Submitting -> Completed
//!                              ^           |
//!                              +-- fails --+
//! ```

use std::fmt;
use std::time::Duration;

use crate::core::store::{InsertEndpoint, StoreError};
use crate::entities::{FocusArea, FormRecord, PriorFamiliarity, ReferralSource};
use crate::schema::validator::{is_valid_cpf, is_valid_email};

/// One page of the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    One,
    Two,
    Three,
    Four,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::One, Step::Two, Step::Three, Step::Four];

    /// 1-based step number
    pub fn number(&self) -> u8 {
        match self {
            Step::One => 1,
            Step::Two => 2,
            Step::Three => 3,
            Step::Four => 4,
        }
    }

    pub fn next(&self) -> Option<Step> {
        match self {
            Step::One => Some(Step::Two),
            Step::Two => Some(Step::Three),
            Step::Three => Some(Step::Four),
            Step::Four => None,
        }
    }

    pub fn prev(&self) -> Option<Step> {
        match self {
            Step::One => None,
            Step::Two => Some(Step::One),
            Step::Three => Some(Step::Two),
            Step::Four => Some(Step::Three),
        }
    }

    /// Question shown at the top of the step
    pub fn title(&self) -> &'static str {
        match self {
            Step::One => "Você já conhecia a Mãe Neusa / meu trabalho?",
            Step::Two => "Qual área você quer que eu foque na sua leitura?",
            Step::Three => "Como chegou até nós?",
            Step::Four => "Seus dados para receber o presente",
        }
    }

    /// Fields collected on this step
    pub fn fields(&self) -> &'static [Field] {
        match self {
            Step::One => &[Field::PriorFamiliarity],
            Step::Two => &[Field::FocusArea, Field::FocusAreaOther],
            Step::Three => &[Field::ReferralSource, Field::ReferralSourceOther],
            Step::Four => &[Field::FullName, Field::Email, Field::Cpf, Field::Consent],
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/4", self.number())
    }
}

/// One input of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    PriorFamiliarity,
    FocusArea,
    FocusAreaOther,
    ReferralSource,
    ReferralSourceOther,
    FullName,
    Email,
    Cpf,
    Consent,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::PriorFamiliarity,
        Field::FocusArea,
        Field::FocusAreaOther,
        Field::ReferralSource,
        Field::ReferralSourceOther,
        Field::FullName,
        Field::Email,
        Field::Cpf,
        Field::Consent,
    ];

    /// Key used when reporting errors
    pub fn key(&self) -> &'static str {
        match self {
            Field::PriorFamiliarity => "jaConhecia",
            Field::FocusArea => "areaFoco",
            Field::FocusAreaOther => "areaFocoOutro",
            Field::ReferralSource => "comoConheceu",
            Field::ReferralSourceOther => "comoConheceuOutro",
            Field::FullName => "nomeCompleto",
            Field::Email => "email",
            Field::Cpf => "cpf",
            Field::Consent => "consentimentoLgpd",
        }
    }

    /// Label shown next to the input
    pub fn label(&self) -> &'static str {
        match self {
            Field::PriorFamiliarity => "Já conhecia",
            Field::FocusArea => "Área de foco",
            Field::FocusAreaOther => "Especifique a área",
            Field::ReferralSource => "Como conheceu",
            Field::ReferralSourceOther => "Especifique como conheceu",
            Field::FullName => "Nome Completo",
            Field::Email => "E-mail",
            Field::Cpf => "CPF",
            Field::Consent => "Consentimento LGPD",
        }
    }

    /// Step that collects this field
    pub fn step(&self) -> Step {
        match self {
            Field::PriorFamiliarity => Step::One,
            Field::FocusArea | Field::FocusAreaOther => Step::Two,
            Field::ReferralSource | Field::ReferralSourceOther => Step::Three,
            Field::FullName | Field::Email | Field::Cpf | Field::Consent => Step::Four,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Per-field error messages, at most one per field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    prior_familiarity: Option<String>,
    focus_area: Option<String>,
    focus_area_other: Option<String>,
    referral_source: Option<String>,
    referral_source_other: Option<String>,
    full_name: Option<String>,
    email: Option<String>,
    cpf: Option<String>,
    consent: Option<String>,
}

impl FieldErrors {
    fn slot(&self, field: Field) -> &Option<String> {
        match field {
            Field::PriorFamiliarity => &self.prior_familiarity,
            Field::FocusArea => &self.focus_area,
            Field::FocusAreaOther => &self.focus_area_other,
            Field::ReferralSource => &self.referral_source,
            Field::ReferralSourceOther => &self.referral_source_other,
            Field::FullName => &self.full_name,
            Field::Email => &self.email,
            Field::Cpf => &self.cpf,
            Field::Consent => &self.consent,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::PriorFamiliarity => &mut self.prior_familiarity,
            Field::FocusArea => &mut self.focus_area,
            Field::FocusAreaOther => &mut self.focus_area_other,
            Field::ReferralSource => &mut self.referral_source,
            Field::ReferralSourceOther => &mut self.referral_source_other,
            Field::FullName => &mut self.full_name,
            Field::Email => &mut self.email,
            Field::Cpf => &mut self.cpf,
            Field::Consent => &mut self.consent,
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: Field, message: impl Into<String>) {
        *self.slot_mut(field) = Some(message.into());
    }

    /// Remove the error of one field, returning whether there was one
    pub fn clear(&mut self, field: Field) -> bool {
        self.slot_mut(field).take().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        Field::ALL.iter().filter(|f| self.slot(**f).is_some()).count()
    }

    /// Errors in field order
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        Field::ALL
            .into_iter()
            .filter_map(move |f| self.get(f).map(|msg| (f, msg)))
    }

    /// Take every error from `other`, overwriting ours for the same field
    pub fn extend(&mut self, other: FieldErrors) {
        for field in Field::ALL {
            if let Some(msg) = other.slot(field).clone() {
                *self.slot_mut(field) = Some(msg);
            }
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, msg)) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", field.key(), msg)?;
        }
        Ok(())
    }
}

/// Check every rule of one step
///
/// Rules are independent: every failing field gets exactly one message.
pub fn validate_step(record: &FormRecord, step: Step) -> FieldErrors {
    let mut errors = FieldErrors::default();

    match step {
        Step::One => {
            if record.prior_familiarity.is_none() {
                errors.set(Field::PriorFamiliarity, "Por favor, selecione uma opção");
            }
        }
        Step::Two => {
            match record.focus_area {
                None => errors.set(Field::FocusArea, "Por favor, selecione uma área de foco"),
                Some(area) if area.is_other() && record.focus_area_other.trim().is_empty() => {
                    errors.set(Field::FocusAreaOther, "Por favor, especifique a área")
                }
                Some(_) => {}
            }
        }
        Step::Three => {
            match record.referral_source {
                None => errors.set(Field::ReferralSource, "Por favor, selecione uma opção"),
                Some(source) if source.is_other() && record.referral_source_other.trim().is_empty() => {
                    errors.set(Field::ReferralSourceOther, "Por favor, especifique como conheceu")
                }
                Some(_) => {}
            }
        }
        Step::Four => {
            if record.full_name.trim().is_empty() {
                errors.set(Field::FullName, "Nome completo é obrigatório");
            }

            if record.email.trim().is_empty() {
                errors.set(Field::Email, "E-mail é obrigatório");
            } else if !is_valid_email(&record.email) {
                errors.set(Field::Email, "E-mail inválido");
            }

            if record.cpf.trim().is_empty() {
                errors.set(Field::Cpf, "CPF é obrigatório");
            } else if !is_valid_cpf(&record.cpf) {
                errors.set(Field::Cpf, "CPF inválido");
            }

            if !record.consent {
                errors.set(Field::Consent, "Você precisa concordar com os termos");
            }
        }
    }

    errors
}

/// Check all four steps at once
pub fn validate_all(record: &FormRecord) -> FieldErrors {
    let mut errors = FieldErrors::default();
    for step in Step::ALL {
        errors.extend(validate_step(record, step));
    }
    errors
}

/// Where the wizard currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Step(Step),
    /// The insert call is in flight
    Submitting,
    /// Terminal: the row was stored
    Completed,
}

/// What to do once a submission succeeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionPolicy {
    /// Keep the thank-you view
    #[default]
    Confirm,
    /// Show the thank-you banner for `delay`, then start over
    Reset { delay: Duration },
}

/// Result of a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Now on this step
    Moved(Step),
    /// Validation failed; still on this step
    Blocked(Step),
    /// Step 4 is valid and can be submitted
    ReadyToSubmit,
    /// Nothing to do in the current phase
    Ignored,
}

/// Result of a submission attempt
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Row stored, wizard completed
    Submitted,
    /// Step 4 has field errors; nothing was sent
    Invalid,
    /// The insert failed; the form is back on step 4, intact
    Failed(StoreError),
    /// Not on step 4
    NotReady,
}

/// Receives user-facing submission alerts
pub trait Notifier {
    /// Called exactly once per failed insert
    fn submission_failed(&mut self, error: &StoreError);
}

/// Wizard state: current phase, record, and per-field errors
#[derive(Debug, Clone)]
pub struct WizardController {
    record: FormRecord,
    phase: Phase,
    errors: FieldErrors,
    policy: CompletionPolicy,
}

impl Default for WizardController {
    fn default() -> Self {
        Self::new(CompletionPolicy::default())
    }
}

impl WizardController {
    pub fn new(policy: CompletionPolicy) -> Self {
        Self {
            record: FormRecord::default(),
            phase: Phase::Step(Step::One),
            errors: FieldErrors::default(),
            policy,
        }
    }

    /// Start from an already-filled record, e.g. one loaded from a file
    pub fn with_record(policy: CompletionPolicy, record: FormRecord) -> Self {
        Self {
            record,
            ..Self::new(policy)
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current step, if the wizard is on one
    pub fn current_step(&self) -> Option<Step> {
        match self.phase {
            Phase::Step(step) => Some(step),
            Phase::Submitting | Phase::Completed => None,
        }
    }

    pub fn record(&self) -> &FormRecord {
        &self.record
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn policy(&self) -> CompletionPolicy {
        self.policy
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn is_completed(&self) -> bool {
        self.phase == Phase::Completed
    }

    /// Validate the current step and move forward when it passes
    pub fn next(&mut self) -> Transition {
        let Phase::Step(step) = self.phase else {
            return Transition::Ignored;
        };

        self.errors = validate_step(&self.record, step);
        if !self.errors.is_empty() {
            return Transition::Blocked(step);
        }

        match step.next() {
            Some(next) => {
                self.phase = Phase::Step(next);
                Transition::Moved(next)
            }
            None => Transition::ReadyToSubmit,
        }
    }

    /// Go back one step without validating
    pub fn back(&mut self) -> Transition {
        match self.phase {
            Phase::Step(step) => match step.prev() {
                Some(prev) => {
                    self.phase = Phase::Step(prev);
                    Transition::Moved(prev)
                }
                None => Transition::Ignored,
            },
            Phase::Submitting | Phase::Completed => Transition::Ignored,
        }
    }

    /// Validate step 4 and send the record
    ///
    /// On insert failure the notifier is called once, the wizard returns to
    /// step 4 and the record is left untouched.
    pub fn submit(&mut self, store: &dyn InsertEndpoint, notifier: &mut dyn Notifier) -> SubmitOutcome {
        if self.phase != Phase::Step(Step::Four) {
            return SubmitOutcome::NotReady;
        }

        self.errors = validate_step(&self.record, Step::Four);
        if !self.errors.is_empty() {
            return SubmitOutcome::Invalid;
        }

        self.phase = Phase::Submitting;
        match store.insert(&self.record.to_row()) {
            Ok(()) => {
                self.phase = Phase::Completed;
                SubmitOutcome::Submitted
            }
            Err(err) => {
                notifier.submission_failed(&err);
                self.phase = Phase::Step(Step::Four);
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Back to a fresh step 1 with an empty record
    pub fn reset(&mut self) {
        self.record = FormRecord::default();
        self.errors = FieldErrors::default();
        self.phase = Phase::Step(Step::One);
    }

    /// Apply the completion policy once the thank-you view was shown
    ///
    /// Returns true when the wizard was reset for another entry.
    pub fn acknowledge_completion(&mut self) -> bool {
        match (self.phase, self.policy) {
            (Phase::Completed, CompletionPolicy::Reset { .. }) => {
                self.reset();
                true
            }
            _ => false,
        }
    }

    fn editable(&self) -> bool {
        matches!(self.phase, Phase::Step(_))
    }

    fn edit<F: FnOnce(&mut FormRecord)>(&mut self, field: Field, apply: F) -> bool {
        if !self.editable() {
            return false;
        }
        apply(&mut self.record);
        self.errors.clear(field);
        true
    }

    pub fn set_prior_familiarity(&mut self, value: Option<PriorFamiliarity>) -> bool {
        self.edit(Field::PriorFamiliarity, |r| r.prior_familiarity = value)
    }

    pub fn set_focus_area(&mut self, value: Option<FocusArea>) -> bool {
        self.edit(Field::FocusArea, |r| r.focus_area = value)
    }

    pub fn set_focus_area_other(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        self.edit(Field::FocusAreaOther, |r| r.focus_area_other = value)
    }

    pub fn set_referral_source(&mut self, value: Option<ReferralSource>) -> bool {
        self.edit(Field::ReferralSource, |r| r.referral_source = value)
    }

    pub fn set_referral_source_other(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        self.edit(Field::ReferralSourceOther, |r| r.referral_source_other = value)
    }

    pub fn set_full_name(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        self.edit(Field::FullName, |r| r.full_name = value)
    }

    pub fn set_email(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        self.edit(Field::Email, |r| r.email = value)
    }

    pub fn set_cpf(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        self.edit(Field::Cpf, |r| r.cpf = value)
    }

    pub fn set_consent(&mut self, value: bool) -> bool {
        self.edit(Field::Consent, |r| r.consent = value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::LeadRow;
    use std::cell::RefCell;

    const VALID_CPF: &str = "529.982.247-25";

    /// Records every row it receives; fails when `fail` is set
    #[derive(Default)]
    struct RecordingStore {
        rows: RefCell<Vec<LeadRow>>,
        fail: bool,
    }

    impl InsertEndpoint for RecordingStore {
        fn insert(&self, row: &LeadRow) -> Result<(), StoreError> {
            self.rows.borrow_mut().push(row.clone());
            if self.fail {
                Err(StoreError::Transport("connection refused".into()))
            } else {
                Ok(())
            }
        }

        fn describe(&self) -> String {
            "recording".into()
        }
    }

    #[derive(Default)]
    struct CountingNotifier {
        alerts: usize,
    }

    impl Notifier for CountingNotifier {
        fn submission_failed(&mut self, _error: &StoreError) {
            self.alerts += 1;
        }
    }

    /// Walk the first three steps with valid answers
    fn at_step_four() -> WizardController {
        let mut wizard = WizardController::default();
        wizard.set_prior_familiarity(Some(PriorFamiliarity::NeverUsed));
        assert_eq!(wizard.next(), Transition::Moved(Step::Two));
        wizard.set_focus_area(Some(FocusArea::Love));
        assert_eq!(wizard.next(), Transition::Moved(Step::Three));
        wizard.set_referral_source(Some(ReferralSource::Search));
        assert_eq!(wizard.next(), Transition::Moved(Step::Four));
        wizard
    }

    fn fill_step_four(wizard: &mut WizardController) {
        wizard.set_full_name("Maria Silva");
        wizard.set_email("maria@example.com");
        wizard.set_cpf(VALID_CPF);
        wizard.set_consent(true);
    }

    #[test]
    fn test_starts_on_step_one() {
        let wizard = WizardController::default();
        assert_eq!(wizard.phase(), Phase::Step(Step::One));
        assert!(wizard.errors().is_empty());
        assert!(!wizard.is_submitting());
        assert!(!wizard.is_completed());
    }

    #[test]
    fn test_step_one_blocked_when_empty() {
        let mut wizard = WizardController::default();
        assert_eq!(wizard.next(), Transition::Blocked(Step::One));
        assert_eq!(wizard.current_step(), Some(Step::One));
        assert_eq!(
            wizard.errors().get(Field::PriorFamiliarity),
            Some("Por favor, selecione uma opção")
        );
        assert_eq!(wizard.errors().len(), 1);
    }

    #[test]
    fn test_step_one_accepts_every_option() {
        for option in PriorFamiliarity::ALL {
            let mut wizard = WizardController::default();
            wizard.set_prior_familiarity(Some(*option));
            assert_eq!(wizard.next(), Transition::Moved(Step::Two), "{}", option);
            assert!(wizard.errors().is_empty());
        }
    }

    #[test]
    fn test_step_two_other_requires_text() {
        let mut wizard = WizardController::default();
        wizard.set_prior_familiarity(Some(PriorFamiliarity::UsedOnce));
        wizard.next();

        wizard.set_focus_area(Some("Outra".parse().unwrap()));
        wizard.set_focus_area_other("");
        assert_eq!(wizard.next(), Transition::Blocked(Step::Two));
        assert_eq!(wizard.errors().get(Field::FocusAreaOther), Some("Por favor, especifique a área"));
        assert_eq!(wizard.errors().get(Field::FocusArea), None);

        wizard.set_focus_area_other("Tarot");
        assert_eq!(wizard.next(), Transition::Moved(Step::Three));
    }

    #[test]
    fn test_other_text_is_trimmed() {
        let record = FormRecord {
            referral_source: Some(ReferralSource::Other),
            referral_source_other: "   ".into(),
            ..Default::default()
        };
        let errors = validate_step(&record, Step::Three);
        assert_eq!(
            errors.get(Field::ReferralSourceOther),
            Some("Por favor, especifique como conheceu")
        );
    }

    #[test]
    fn test_step_three_requires_selection() {
        let errors = validate_step(&FormRecord::default(), Step::Three);
        assert_eq!(errors.get(Field::ReferralSource), Some("Por favor, selecione uma opção"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_step_four_reports_every_failure() {
        let errors = validate_step(&FormRecord::default(), Step::Four);
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get(Field::FullName), Some("Nome completo é obrigatório"));
        assert_eq!(errors.get(Field::Email), Some("E-mail é obrigatório"));
        assert_eq!(errors.get(Field::Cpf), Some("CPF é obrigatório"));
        assert_eq!(errors.get(Field::Consent), Some("Você precisa concordar com os termos"));
    }

    #[test]
    fn test_step_four_format_messages() {
        let record = FormRecord {
            full_name: "Maria".into(),
            email: "maria@".into(),
            cpf: "529.982.247-26".into(),
            consent: true,
            ..Default::default()
        };
        let errors = validate_step(&record, Step::Four);
        assert_eq!(errors.get(Field::Email), Some("E-mail inválido"));
        assert_eq!(errors.get(Field::Cpf), Some("CPF inválido"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_editing_clears_only_that_field() {
        let mut wizard = at_step_four();
        assert_eq!(wizard.next(), Transition::Blocked(Step::Four));
        assert_eq!(wizard.errors().len(), 4);

        wizard.set_email("x");
        assert_eq!(wizard.errors().get(Field::Email), None);
        assert!(wizard.errors().get(Field::FullName).is_some());
        assert_eq!(wizard.errors().len(), 3);
    }

    #[test]
    fn test_back_does_not_validate() {
        let mut wizard = at_step_four();
        assert_eq!(wizard.back(), Transition::Moved(Step::Three));
        assert_eq!(wizard.back(), Transition::Moved(Step::Two));
        assert_eq!(wizard.back(), Transition::Moved(Step::One));
        assert_eq!(wizard.back(), Transition::Ignored);
        assert_eq!(wizard.record().focus_area, Some(FocusArea::Love));
    }

    #[test]
    fn test_step_four_next_reports_ready() {
        let mut wizard = at_step_four();
        fill_step_four(&mut wizard);
        assert_eq!(wizard.next(), Transition::ReadyToSubmit);
        assert_eq!(wizard.current_step(), Some(Step::Four));
    }

    #[test]
    fn test_submit_before_step_four_is_not_ready() {
        let store = RecordingStore::default();
        let mut notifier = CountingNotifier::default();
        let mut wizard = WizardController::default();
        assert!(matches!(wizard.submit(&store, &mut notifier), SubmitOutcome::NotReady));
        assert!(store.rows.borrow().is_empty());
    }

    #[test]
    fn test_invalid_submit_sends_nothing() {
        let store = RecordingStore::default();
        let mut notifier = CountingNotifier::default();
        let mut wizard = at_step_four();
        wizard.set_full_name("Maria Silva");
        assert!(matches!(wizard.submit(&store, &mut notifier), SubmitOutcome::Invalid));
        assert_eq!(wizard.current_step(), Some(Step::Four));
        assert_eq!(wizard.errors().len(), 3);
        assert!(store.rows.borrow().is_empty());
        assert_eq!(notifier.alerts, 0);
    }

    #[test]
    fn test_end_to_end_submission() {
        let store = RecordingStore::default();
        let mut notifier = CountingNotifier::default();
        let mut wizard = at_step_four();
        fill_step_four(&mut wizard);

        assert!(matches!(wizard.submit(&store, &mut notifier), SubmitOutcome::Submitted));
        assert!(wizard.is_completed());
        assert_eq!(notifier.alerts, 0);

        let rows = store.rows.borrow();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0],
            LeadRow {
                ja_conhecia: "Não, nunca fiz".into(),
                area_foco: "Amor / Relacionamentos".into(),
                area_foco_outro: None,
                como_conheceu: "Pesquisa no Google".into(),
                como_conheceu_outro: None,
                nome_completo: "Maria Silva".into(),
                email: "maria@example.com".into(),
                cpf: VALID_CPF.into(),
                consentimento_lgpd: true,
            }
        );
    }

    #[test]
    fn test_failed_insert_keeps_form_and_alerts_once() {
        let store = RecordingStore {
            fail: true,
            ..Default::default()
        };
        let mut notifier = CountingNotifier::default();
        let mut wizard = at_step_four();
        fill_step_four(&mut wizard);
        let before = wizard.record().clone();

        let outcome = wizard.submit(&store, &mut notifier);
        assert!(matches!(outcome, SubmitOutcome::Failed(StoreError::Transport(_))));
        assert_eq!(wizard.phase(), Phase::Step(Step::Four));
        assert_eq!(wizard.record(), &before);
        assert!(wizard.errors().is_empty());
        assert_eq!(notifier.alerts, 1);
        assert_eq!(store.rows.borrow().len(), 1);
    }

    #[test]
    fn test_completed_wizard_ignores_edits_and_navigation() {
        let store = RecordingStore::default();
        let mut notifier = CountingNotifier::default();
        let mut wizard = at_step_four();
        fill_step_four(&mut wizard);
        wizard.submit(&store, &mut notifier);

        assert!(!wizard.set_full_name("Outra Pessoa"));
        assert_eq!(wizard.record().full_name, "Maria Silva");
        assert_eq!(wizard.next(), Transition::Ignored);
        assert_eq!(wizard.back(), Transition::Ignored);
        assert!(matches!(wizard.submit(&store, &mut notifier), SubmitOutcome::NotReady));
        assert_eq!(store.rows.borrow().len(), 1);
    }

    #[test]
    fn test_confirm_policy_stays_completed() {
        let store = RecordingStore::default();
        let mut notifier = CountingNotifier::default();
        let mut wizard = at_step_four();
        fill_step_four(&mut wizard);
        wizard.submit(&store, &mut notifier);

        assert!(!wizard.acknowledge_completion());
        assert!(wizard.is_completed());
    }

    #[test]
    fn test_reset_policy_starts_over() {
        let store = RecordingStore::default();
        let mut notifier = CountingNotifier::default();
        let mut wizard = WizardController::new(CompletionPolicy::Reset {
            delay: Duration::from_secs(8),
        });
        wizard.set_prior_familiarity(Some(PriorFamiliarity::UsedMultiple));
        wizard.next();
        wizard.set_focus_area(Some(FocusArea::Career));
        wizard.next();
        wizard.set_referral_source(Some(ReferralSource::Friend));
        wizard.next();
        fill_step_four(&mut wizard);
        assert!(matches!(wizard.submit(&store, &mut notifier), SubmitOutcome::Submitted));

        assert!(wizard.acknowledge_completion());
        assert_eq!(wizard.phase(), Phase::Step(Step::One));
        assert_eq!(wizard.record(), &FormRecord::default());
    }

    #[test]
    fn test_validate_all_merges_steps() {
        let errors = validate_all(&FormRecord::default());
        let keys: Vec<&str> = errors.iter().map(|(f, _)| f.key()).collect();
        assert_eq!(
            keys,
            vec!["jaConhecia", "areaFoco", "comoConheceu", "nomeCompleto", "email", "cpf", "consentimentoLgpd"]
        );
    }

    #[test]
    fn test_field_errors_display() {
        let mut errors = FieldErrors::default();
        errors.set(Field::Cpf, "CPF inválido");
        errors.set(Field::Email, "E-mail inválido");
        assert_eq!(errors.to_string(), "email: E-mail inválido\ncpf: CPF inválido");
        assert!(errors.clear(Field::Cpf));
        assert!(!errors.clear(Field::Cpf));
    }

    #[test]
    fn test_fields_belong_to_their_step() {
        for step in Step::ALL {
            for field in step.fields() {
                assert_eq!(field.step(), step);
            }
        }
    }
}
