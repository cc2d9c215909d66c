//! Error types for the ticket store.

use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A field failed validation: unknown enum value or empty required text.
    #[error("Invalid {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    /// The referenced record does not exist.
    #[error("{entity} #{id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// The database file could not be opened, read or written.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidField {
            field,
            message: message.into(),
        }
    }

    pub(crate) fn ticket_not_found(id: i64) -> Self {
        Error::NotFound {
            entity: "Ticket",
            id,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    pub fn is_invalid_field(&self) -> bool {
        matches!(self, Error::InvalidField { .. })
    }

    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Error::StorageUnavailable(_))
    }
}
