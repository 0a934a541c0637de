use tea_core::error::{CoreError, FieldErrors};
use thiserror::Error;

/// Failure of a technique write operation.
///
/// Every variant means the enclosing transaction was (or must be) rolled
/// back; callers never observe a partially applied write.
#[derive(Debug, Error)]
pub enum TechniqueError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("technique operation failed: {0}")]
    Database(#[from] sqlx::Error),
}

impl TechniqueError {
    pub fn validation(errors: FieldErrors) -> Self {
        Self::Core(CoreError::Validation(errors))
    }

    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::Core(CoreError::not_found(entity, key))
    }
}
