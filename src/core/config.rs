//! Configuration management with layered hierarchy

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::schema::wizard::CompletionPolicy;

/// Default datastore table
pub const DEFAULT_TABLE: &str = "tarot_clients";

/// Default delay before the form resets under the `reset` policy
pub const DEFAULT_RESET_DELAY_SECS: u64 = 8;

/// Default HTTP timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variables for the datastore URL, in lookup order
pub const URL_ENV: &[&str] = &["TAROT_SUPABASE_URL", "VITE_supabase_url"];

/// Environment variables for the datastore anon key, in lookup order
pub const KEY_ENV: &[&str] = &["TAROT_SUPABASE_ANON_KEY", "VITE_chave_anon_supabase"];

/// What happens after a successful submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AfterSubmit {
    /// Show the thank-you view and stop
    #[default]
    Confirm,
    /// Show a thank-you banner, then start a fresh form
    Reset,
}

impl std::fmt::Display for AfterSubmit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AfterSubmit::Confirm => write!(f, "confirm"),
            AfterSubmit::Reset => write!(f, "reset"),
        }
    }
}

impl std::str::FromStr for AfterSubmit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "confirm" => Ok(AfterSubmit::Confirm),
            "reset" => Ok(AfterSubmit::Reset),
            other => Err(format!("Invalid after_submit value: '{}'. Use confirm or reset", other)),
        }
    }
}

/// Configuration errors; all of them abort startup
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("Missing datastore setting: {setting}")]
    #[diagnostic(
        code(tarot_intake::config::missing),
        help("Set {env} in the environment, pass the matching flag, or add `{setting}` to {path}")
    )]
    MissingSetting {
        setting: &'static str,
        env: &'static str,
        path: String,
    },

    #[error("Invalid value for {name}: {message}")]
    #[diagnostic(code(tarot_intake::config::invalid_env))]
    InvalidEnv { name: &'static str, message: String },

    #[error("Invalid datastore URL: '{0}'")]
    #[diagnostic(
        code(tarot_intake::config::invalid_url),
        help("The URL must start with http:// or https://")
    )]
    InvalidUrl(String),

    #[error("Failed to read config file {path}: {message}")]
    #[diagnostic(code(tarot_intake::config::io))]
    Io { path: PathBuf, message: String },

    #[error("Failed to parse config file {path}: {message}")]
    #[diagnostic(code(tarot_intake::config::parse))]
    Parse { path: PathBuf, message: String },
}

/// Configuration with layered hierarchy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Supabase project URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supabase_url: Option<String>,

    /// Supabase public (anon) API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supabase_anon_key: Option<String>,

    /// Table receiving the rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Post-submission policy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_submit: Option<AfterSubmit>,

    /// Seconds the thank-you banner stays before the form resets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_delay_secs: Option<u64>,

    /// HTTP timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// File this config was read from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Settings needed to reach the datastore, all present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatastoreConfig {
    pub url: String,
    pub anon_key: String,
    pub table: String,
    pub timeout: Duration,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// A config file that exists but cannot be read or parsed is an error.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Like [`Config::load`], reading `explicit` instead of the global file
    ///
    /// An explicit path must exist; the global file is optional.
    pub fn load_from(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match explicit {
            Some(path) => Some(Self::from_file(path)?),
            None => match Self::global_config_path() {
                Some(path) if path.exists() => Some(Self::from_file(&path)?),
                _ => None,
            },
        };
        Self::from_sources(file, |name| std::env::var(name).ok())
    }

    /// Merge built-in defaults, an optional file layer, and the environment
    ///
    /// A set but unparseable `TAROT_AFTER_SUBMIT` is an error, like an
    /// invalid `after_submit` in the file.
    pub fn from_sources<F>(file: Option<Config>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 1. Built-in defaults (applied lazily by the accessors)
        let mut config = Config::default();

        // 2. Global user config
        if let Some(file) = file {
            config.merge(file);
        }

        // 3. Environment variables
        let first_set = |names: &[&str]| names.iter().find_map(|n| env(n).filter(|v| !v.trim().is_empty()));
        if let Some(url) = first_set(URL_ENV) {
            config.supabase_url = Some(url);
        }
        if let Some(key) = first_set(KEY_ENV) {
            config.supabase_anon_key = Some(key);
        }
        if let Some(table) = first_set(&["TAROT_TABLE"][..]) {
            config.table = Some(table);
        }
        if let Some(policy) = first_set(&["TAROT_AFTER_SUBMIT"][..]) {
            let policy = policy
                .parse()
                .map_err(|message| ConfigError::InvalidEnv {
                    name: "TAROT_AFTER_SUBMIT",
                    message,
                })?;
            config.after_submit = Some(policy);
        }

        Ok(config)
    }

    /// Read one YAML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut config: Config = serde_yml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "tarot-intake")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.supabase_url.is_some() {
            self.supabase_url = other.supabase_url;
        }
        if other.supabase_anon_key.is_some() {
            self.supabase_anon_key = other.supabase_anon_key;
        }
        if other.table.is_some() {
            self.table = other.table;
        }
        if other.after_submit.is_some() {
            self.after_submit = other.after_submit;
        }
        if other.reset_delay_secs.is_some() {
            self.reset_delay_secs = other.reset_delay_secs;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.source.is_some() {
            self.source = other.source;
        }
    }

    /// Table name, defaulting to `tarot_clients`
    pub fn table(&self) -> String {
        self.table
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TABLE.to_string())
    }

    /// Post-submission policy with its delay
    pub fn completion_policy(&self) -> CompletionPolicy {
        match self.after_submit.unwrap_or_default() {
            AfterSubmit::Confirm => CompletionPolicy::Confirm,
            AfterSubmit::Reset => CompletionPolicy::Reset {
                delay: Duration::from_secs(self.reset_delay_secs.unwrap_or(DEFAULT_RESET_DELAY_SECS)),
            },
        }
    }

    /// Resolve the datastore settings, failing on anything missing
    pub fn datastore(&self) -> Result<DatastoreConfig, ConfigError> {
        let path = self
            .source
            .clone()
            .or_else(Self::global_config_path)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "the config file".to_string());

        let url = present(&self.supabase_url).ok_or_else(|| ConfigError::MissingSetting {
            setting: "supabase_url",
            env: URL_ENV[0],
            path: path.clone(),
        })?;
        let anon_key = present(&self.supabase_anon_key).ok_or_else(|| ConfigError::MissingSetting {
            setting: "supabase_anon_key",
            env: KEY_ENV[0],
            path,
        })?;

        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidUrl(url));
        }

        Ok(DatastoreConfig {
            url,
            anon_key,
            table: self.table(),
            timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS).max(1)),
        })
    }
}

/// Configuration keys with their descriptions
pub const KEYS: &[(&str, &str)] = &[
    ("supabase_url", "Supabase project URL"),
    ("supabase_anon_key", "Supabase public (anon) API key"),
    ("table", "Table receiving the rows (default: tarot_clients)"),
    ("after_submit", "After a successful submission: confirm or reset"),
    ("reset_delay_secs", "Seconds before the form resets under `reset` (default: 8)"),
    ("timeout_secs", "HTTP timeout in seconds (default: 30)"),
];

impl Config {
    /// Value of one key as text, if set
    pub fn get_key(&self, key: &str) -> Option<String> {
        match key {
            "supabase_url" => self.supabase_url.clone(),
            "supabase_anon_key" => self.supabase_anon_key.clone(),
            "table" => self.table.clone(),
            "after_submit" => self.after_submit.map(|p| p.to_string()),
            "reset_delay_secs" => self.reset_delay_secs.map(|v| v.to_string()),
            "timeout_secs" => self.timeout_secs.map(|v| v.to_string()),
            _ => None,
        }
    }

    /// Set one key from text, checking the value's type
    pub fn set_key(&mut self, key: &str, value: &str) -> Result<(), String> {
        let seconds = |v: &str| {
            v.trim()
                .parse::<u64>()
                .map_err(|_| format!("'{}' expects a whole number of seconds, got '{}'", key, v))
        };
        match key {
            "supabase_url" => self.supabase_url = Some(value.to_string()),
            "supabase_anon_key" => self.supabase_anon_key = Some(value.to_string()),
            "table" => self.table = Some(value.to_string()),
            "after_submit" => self.after_submit = Some(value.parse()?),
            "reset_delay_secs" => self.reset_delay_secs = Some(seconds(value)?),
            "timeout_secs" => self.timeout_secs = Some(seconds(value)?),
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Remove one key, returning whether it was set
    pub fn unset_key(&mut self, key: &str) -> Result<bool, String> {
        let was_set = match key {
            "supabase_url" => self.supabase_url.take().is_some(),
            "supabase_anon_key" => self.supabase_anon_key.take().is_some(),
            "table" => self.table.take().is_some(),
            "after_submit" => self.after_submit.take().is_some(),
            "reset_delay_secs" => self.reset_delay_secs.take().is_some(),
            "timeout_secs" => self.timeout_secs.take().is_some(),
            _ => return Err(unknown_key(key)),
        };
        Ok(was_set)
    }
}

fn unknown_key(key: &str) -> String {
    let valid: Vec<&str> = KEYS.iter().map(|(k, _)| *k).collect();
    format!("Unknown config key '{}'. Valid keys: {}", key, valid.join(", "))
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
