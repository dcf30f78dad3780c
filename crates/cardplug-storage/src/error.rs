use std::path::PathBuf;
use thiserror::Error;

/// Storage-specific error types for the cardplug access controller.
///
/// A failed write is security relevant: an enrollment the operator believes
/// succeeded may not be durable, so callers must never adopt a whitelist whose
/// `save` returned an error.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Writing or replacing a durable file failed
    #[error("Persistence error for {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Durable file exists but cannot be interpreted
    #[error("Corrupt storage file {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
}

impl StorageError {
    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }

    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
