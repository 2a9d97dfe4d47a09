//! Datastore client for appending lead rows
//!
//! Talks to a Supabase project through its PostgREST endpoint:
//! `POST {url}/rest/v1/{table}` with the anon key in both the `apikey` and
//! `Authorization` headers. Only absence of error is consumed from the
//! response.

use std::cell::RefCell;
use std::io::Write;
use thiserror::Error;

use crate::core::config::DatastoreConfig;
use crate::entities::LeadRow;

/// Errors that can occur while inserting a row
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Datastore rejected the insert with HTTP {code}: {message}")]
    Status { code: u16, message: String },

    #[error("Could not reach the datastore: {0}")]
    Transport(String),

    #[error("Failed to encode row: {0}")]
    Serialize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An operation that appends one row to a fixed collection
///
/// The insert is atomic: it either stores the whole row or fails.
pub trait InsertEndpoint {
    fn insert(&self, row: &LeadRow) -> Result<(), StoreError>;

    /// Human-readable target, for verbose output
    fn describe(&self) -> String;
}

/// Blocking Supabase/PostgREST client
pub struct SupabaseStore {
    agent: ureq::Agent,
    endpoint: String,
    anon_key: String,
    /// If true, print the request target and outcome to stderr
    verbose: bool,
}

impl SupabaseStore {
    /// Create a client from resolved datastore settings
    pub fn new(config: &DatastoreConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(config.timeout)
            .timeout_read(config.timeout)
            .timeout_write(config.timeout)
            .user_agent(concat!("tarot-intake/", env!("CARGO_PKG_VERSION")))
            .build();

        Self {
            agent,
            endpoint: table_endpoint(&config.url, &config.table),
            anon_key: config.anon_key.clone(),
            verbose: false,
        }
    }

    /// Set verbose mode
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// The full insert URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl InsertEndpoint for SupabaseStore {
    fn insert(&self, row: &LeadRow) -> Result<(), StoreError> {
        let body = serde_json::to_value([row]).map_err(|e| StoreError::Serialize(e.to_string()))?;

        if self.verbose {
            eprintln!("  POST {}", self.endpoint);
        }

        let result = self
            .agent
            .post(&self.endpoint)
            .set("apikey", &self.anon_key)
            .set("Authorization", &format!("Bearer {}", self.anon_key))
            .set("Content-Type", "application/json")
            .set("Prefer", "return=minimal")
            .send_json(body);

        match result {
            Ok(resp) => {
                if self.verbose {
                    eprintln!("  -> HTTP {}", resp.status());
                }
                Ok(())
            }
            Err(ureq::Error::Status(code, resp)) => {
                let message = resp
                    .into_string()
                    .ok()
                    .and_then(|body| error_message(&body))
                    .unwrap_or_else(|| "no error detail".to_string());
                Err(StoreError::Status { code, message })
            }
            Err(ureq::Error::Transport(err)) => Err(StoreError::Transport(err.to_string())),
        }
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

/// Build `{url}/rest/v1/{table}`, tolerating a trailing slash on the URL
pub fn table_endpoint(url: &str, table: &str) -> String {
    format!("{}/rest/v1/{}", url.trim_end_matches('/'), table)
}

/// Extract the `message` of a PostgREST error body, or the raw text
fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => json
            .get("message")
            .and_then(|m| m.as_str())
            .map(String::from)
            .or_else(|| Some(body.to_string())),
        Err(_) => Some(body.to_string()),
    }
}

/// Prints the JSON payload instead of sending it
pub struct DryRunStore<W: Write> {
    out: RefCell<W>,
    table: String,
}

impl<W: Write> DryRunStore<W> {
    pub fn new(out: W, table: &str) -> Self {
        Self {
            out: RefCell::new(out),
            table: table.to_string(),
        }
    }

    /// Recover the writer, e.g. to inspect a buffer in tests
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write> InsertEndpoint for DryRunStore<W> {
    fn insert(&self, row: &LeadRow) -> Result<(), StoreError> {
        let json =
            serde_json::to_string_pretty(&[row]).map_err(|e| StoreError::Serialize(e.to_string()))?;
        let mut out = self.out.borrow_mut();
        writeln!(out, "{}", json)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("dry run (table {})", self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::entities::{FocusArea, FormRecord, PriorFamiliarity, ReferralSource};

    fn sample_row() -> LeadRow {
        FormRecord {
            prior_familiarity: Some(PriorFamiliarity::UsedOnce),
            focus_area: Some(FocusArea::Other),
            focus_area_other: "Tarot".into(),
            referral_source: Some(ReferralSource::Friend),
            full_name: "Maria Silva".into(),
            email: "maria@example.com".into(),
            cpf: "529.982.247-25".into(),
            consent: true,
            ..Default::default()
        }
        .to_row()
    }

    #[test]
    fn test_table_endpoint() {
        assert_eq!(
            table_endpoint("https://abc.supabase.co", "tarot_clients"),
            "https://abc.supabase.co/rest/v1/tarot_clients"
        );
        assert_eq!(
            table_endpoint("https://abc.supabase.co/", "leads"),
            "https://abc.supabase.co/rest/v1/leads"
        );
    }

    #[test]
    fn test_error_message_prefers_postgrest_message() {
        assert_eq!(
            error_message(r#"{"code":"42501","message":"permission denied"}"#).as_deref(),
            Some("permission denied")
        );
        assert_eq!(error_message("Bad Gateway").as_deref(), Some("Bad Gateway"));
        assert_eq!(error_message("  "), None);
    }

    #[test]
    fn test_dry_run_writes_single_row_array() {
        let store = DryRunStore::new(Vec::new(), "tarot_clients");
        store.insert(&sample_row()).unwrap();
        let out = String::from_utf8(store.into_inner()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["area_foco_outro"], "Tarot");
        assert!(rows[0]["como_conheceu_outro"].is_null());
        assert_eq!(rows[0]["nome_completo"], "Maria Silva");
    }

    #[test]
    fn test_supabase_store_endpoint_from_config() {
        let config = DatastoreConfig {
            url: "https://abc.supabase.co/".into(),
            anon_key: "anon".into(),
            table: "tarot_clients".into(),
            timeout: Duration::from_secs(30),
        };
        let store = SupabaseStore::new(&config);
        assert_eq!(store.endpoint(), "https://abc.supabase.co/rest/v1/tarot_clients");
        assert_eq!(store.describe(), store.endpoint());
    }

    #[test]
    fn test_unreachable_datastore_is_transport_error() {
        let config = DatastoreConfig {
            url: "http://127.0.0.1:1".into(),
            anon_key: "anon".into(),
            table: "tarot_clients".into(),
            timeout: Duration::from_secs(2),
        };
        let err = SupabaseStore::new(&config).insert(&sample_row()).unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
    }
}
