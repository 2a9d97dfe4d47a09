//! Table formatting for the answer review
//!
//! Step 4 and `submit --dry-run` show the collected answers in a two-column
//! table before anything is sent.

use tabled::{builder::Builder, settings::Style};

use crate::entities::FormRecord;
use crate::schema::{format_cpf, Field};

/// Answers in field order, skipping empty "other" texts
pub fn answers(record: &FormRecord) -> Vec<(Field, String)> {
    let mut rows = Vec::new();

    for field in Field::ALL {
        let value = match field {
            Field::PriorFamiliarity => label_or_dash(record.prior_familiarity.map(|o| o.label())),
            Field::FocusArea => label_or_dash(record.focus_area.map(|o| o.label())),
            Field::FocusAreaOther => {
                if record.focus_area_other.is_empty() {
                    continue;
                }
                record.focus_area_other.clone()
            }
            Field::ReferralSource => label_or_dash(record.referral_source.map(|o| o.label())),
            Field::ReferralSourceOther => {
                if record.referral_source_other.is_empty() {
                    continue;
                }
                record.referral_source_other.clone()
            }
            Field::FullName => record.full_name.clone(),
            Field::Email => record.email.clone(),
            Field::Cpf => format_cpf(&record.cpf),
            Field::Consent => (if record.consent { "Sim" } else { "Não" }).to_string(),
        };
        rows.push((field, value));
    }

    rows
}

fn label_or_dash(label: Option<&str>) -> String {
    label.unwrap_or("-").to_string()
}

/// Render the review table
pub fn review_table(record: &FormRecord) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Campo", "Resposta"]);

    for (field, value) in answers(record) {
        builder.push_record([field.label().to_string(), value]);
    }

    builder.build().with(Style::rounded()).to_string()
}
