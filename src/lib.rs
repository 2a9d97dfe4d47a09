//! tarot-intake: lead-capture wizard
//!
//! A four-step terminal wizard that collects a consultation lead, validates
//! it locally (e-mail shape, CPF checksum) and appends one row to a
//! Supabase table.

pub mod cli;
pub mod core;
pub mod entities;
pub mod schema;
