//! # Pipeline Error Types
//!
//! Errors surfaced by the import pipeline and reporting.
//!
//! ## Propagation Policy
//! Every error here maps to an operator-facing notification at the caller;
//! nothing fails silently. The one deliberate non-error: re-importing an
//! already-posted file is a soft skip reported through
//! [`crate::guard::CostPosting`], never through this enum.

use thiserror::Error;

use dagang_core::error::CoreError;
use dagang_store::StoreError;

/// Import pipeline errors.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The extraction collaborator produced no usable rows (empty output,
    /// or every row dropped during aggregation).
    #[error("Extraction produced no usable rows")]
    EmptyExtraction,

    /// Completeness gate: materialization refused while unrecognized items
    /// lack a resolution. Callers disable confirmation on this.
    #[error("{count} unrecognized item(s) still need a resolution")]
    UnresolvedItems { count: usize },

    /// A resolution was supplied for a key that is not in the unrecognized
    /// set.
    #[error("'{key}' is not an unrecognized import key")]
    UnknownKey { key: String },

    /// Domain rule violation from dagang-core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Store failure during materialization or reporting.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// CSV rendering failed.
    #[error("CSV export failed: {0}")]
    Csv(String),
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::Csv(err.to_string())
    }
}

/// Result type for pipeline operations.
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ImportError::UnresolvedItems { count: 3 };
        assert_eq!(err.to_string(), "3 unrecognized item(s) still need a resolution");

        let err = ImportError::UnknownKey {
            key: "SKU-X".to_string(),
        };
        assert_eq!(err.to_string(), "'SKU-X' is not an unrecognized import key");
    }
}
