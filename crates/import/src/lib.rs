//! Bulk import/export for the technique catalogue.
//!
//! The binary entrypoint wraps [`Importer`]; integration tests drive it
//! directly against a test database.

pub mod error;
pub mod importer;

pub use error::ImportError;
pub use importer::{read_records, write_records, Importer};
