//! Pure domain logic for the TEA techniques catalogue.
//!
//! Everything in this crate is I/O-free: input normalisation, field
//! validation, slug derivation, date parsing, import record types, and the
//! shared error taxonomy. The database and HTTP layers build on top.

pub mod dates;
pub mod error;
pub mod import;
pub mod normalise;
pub mod pagination;
pub mod slug;
pub mod types;
pub mod validate;
