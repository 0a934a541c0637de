//! The write pipeline for techniques.
//!
//! The HTTP layer and the import CLI both mutate techniques exclusively
//! through [`TechniqueService`], which owns payload validation, reference
//! resolution and transactional ordering. Reads stay on the repositories.

pub mod error;
pub mod payload;
pub mod technique_service;

pub use error::TechniqueError;
pub use payload::{ResourcePayload, TechniquePayload, UseCasePayload};
pub use technique_service::{TechniqueService, UpsertOutcome};
