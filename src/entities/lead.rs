//! Lead entity - the answer set collected by the wizard

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a label does not name any option of a question
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown option '{value}' for {question}. Valid options: {}", .valid.join(", "))]
pub struct UnknownOption {
    pub question: &'static str,
    pub value: String,
    pub valid: Vec<&'static str>,
}

/// Declares a closed option set whose labels are also the wire values.
macro_rules! option_set {
    (
        $(#[$meta:meta])*
        $name:ident, $question:literal,
        { $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant, )+
        }

        impl $name {
            /// Every option, in presentation order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Label shown to the user and sent on the wire
            pub fn label(&self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }

            /// All labels, in presentation order
            pub fn labels() -> Vec<&'static str> {
                Self::ALL.iter().map(|o| o.label()).collect()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = UnknownOption;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .find(|o| o.label() == wanted)
                    .or_else(|| {
                        let lower = wanted.to_lowercase();
                        Self::ALL.iter().find(|o| o.label().to_lowercase() == lower)
                    })
                    .copied()
                    .ok_or_else(|| UnknownOption {
                        question: $question,
                        value: s.to_string(),
                        valid: Self::labels(),
                    })
            }
        }
    };
}

option_set! {
    /// Whether the lead already knew the service
    PriorFamiliarity, "prior familiarity", {
        UsedMultiple => "Sim, já fiz várias vezes",
        UsedOnce => "Sim, uma vez",
        NeverUsed => "Não, nunca fiz",
    }
}

option_set! {
    /// Area the reading should focus on
    FocusArea, "focus area", {
        Love => "Amor / Relacionamentos",
        Career => "Trabalho / Carreira",
        Finances => "Finanças / Dinheiro",
        Health => "Saúde / Bem-estar",
        Purpose => "Propósito / Vida espiritual",
        Other => "Outra",
    }
}

option_set! {
    /// How the lead found the service
    ReferralSource, "referral source", {
        Friend => "Indicação de amigo/familiar",
        Social => "Instagram / Facebook",
        Community => "Grupo / Comunidade (Telegram/WhatsApp)",
        Search => "Pesquisa no Google",
        Other => "Outro",
    }
}

impl FocusArea {
    /// Whether this option asks for a free-text specification
    pub fn is_other(&self) -> bool {
        matches!(self, FocusArea::Other)
    }
}

impl ReferralSource {
    /// Whether this option asks for a free-text specification
    pub fn is_other(&self) -> bool {
        matches!(self, ReferralSource::Other)
    }
}

/// The accumulated answer set, one per submission attempt
///
/// `None` on an option field means nothing has been selected yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormRecord {
    #[serde(deserialize_with = "selected_option")]
    pub prior_familiarity: Option<PriorFamiliarity>,

    #[serde(deserialize_with = "selected_option")]
    pub focus_area: Option<FocusArea>,

    /// Required only when `focus_area` is the "other" option
    pub focus_area_other: String,

    #[serde(deserialize_with = "selected_option")]
    pub referral_source: Option<ReferralSource>,

    /// Required only when `referral_source` is the "other" option
    pub referral_source_other: String,

    pub full_name: String,

    pub email: String,

    /// CPF as typed, punctuation included
    #[serde(alias = "taxId")]
    pub cpf: String,

    /// LGPD consent
    pub consent: bool,
}

impl FormRecord {
    /// Build the row sent to the datastore
    ///
    /// Empty "other" texts become `null`; everything else is sent as typed.
    pub fn to_row(&self) -> LeadRow {
        LeadRow {
            ja_conhecia: self.prior_familiarity.map(|o| o.label().to_string()).unwrap_or_default(),
            area_foco: self.focus_area.map(|o| o.label().to_string()).unwrap_or_default(),
            area_foco_outro: non_empty(&self.focus_area_other),
            como_conheceu: self.referral_source.map(|o| o.label().to_string()).unwrap_or_default(),
            como_conheceu_outro: non_empty(&self.referral_source_other),
            nome_completo: self.full_name.clone(),
            email: self.email.clone(),
            cpf: self.cpf.clone(),
            consentimento_lgpd: self.consent,
        }
    }
}

/// Read an option label; a missing, null or blank value means nothing selected
fn selected_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = UnknownOption>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(label) if !label.trim().is_empty() => {
            label.parse().map(Some).map_err(serde::de::Error::custom)
        }
        _ => Ok(None),
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// One row of the `tarot_clients` table, snake-case on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRow {
    pub ja_conhecia: String,
    pub area_foco: String,
    pub area_foco_outro: Option<String>,
    pub como_conheceu: String,
    pub como_conheceu_outro: Option<String>,
    pub nome_completo: String,
    pub email: String,
    pub cpf: String,
    pub consentimento_lgpd: bool,
}
