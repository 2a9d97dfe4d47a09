//! Core module - configuration and the datastore client

pub mod config;
pub mod store;

pub use config::{AfterSubmit, Config, ConfigError, DatastoreConfig};
pub use store::{DryRunStore, InsertEndpoint, StoreError, SupabaseStore};
