//! Entity type definitions
//!
//! - [`FormRecord`] - the answers collected by the wizard
//! - [`LeadRow`] - the same answers as a datastore row

pub mod lead;

pub use lead::{FocusArea, FormRecord, LeadRow, PriorFamiliarity, ReferralSource, UnknownOption};
