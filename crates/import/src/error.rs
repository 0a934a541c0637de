use std::path::PathBuf;

use tea_core::error::{CoreError, FieldErrors};
use tea_service::TechniqueError;

/// Errors surfaced by the import CLI.
///
/// `exit_code` partitions these the way operators script against them:
/// bad input (file problems, validation) exits 1, anything unexpected
/// (database, bugs) exits 2.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} must contain a top-level JSON array of records", path.display())]
    NotAnArray { path: PathBuf },

    #[error("record {index} ({name}) failed validation: {errors}")]
    Validation {
        index: usize,
        name: String,
        errors: FieldErrors,
    },

    #[error("record {index} ({name}) failed: {source}")]
    Record {
        index: usize,
        name: String,
        #[source]
        source: TechniqueError,
    },

    #[error("linking related techniques for '{slug}' failed: {source}")]
    Related {
        slug: String,
        #[source]
        source: TechniqueError,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ImportError {
    /// 1 for input problems the operator can fix, 2 for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            ImportError::Read { .. }
            | ImportError::Write { .. }
            | ImportError::Parse { .. }
            | ImportError::NotAnArray { .. }
            | ImportError::Validation { .. } => 1,
            ImportError::Record { source, .. } | ImportError::Related { source, .. } => {
                match source {
                    TechniqueError::Core(CoreError::Validation(_)) => 1,
                    _ => 2,
                }
            }
            ImportError::Database(_) => 2,
        }
    }
}
