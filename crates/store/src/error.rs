use common::ReservationId;
use thiserror::Error;

/// Errors that can occur when reading from or committing to the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write targeted, or referenced, a row that does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A delete was refused because other rows still reference the target.
    #[error("{entity} {id} is still referenced by {referenced_by}")]
    StillReferenced {
        entity: &'static str,
        id: String,
        referenced_by: &'static str,
    },

    /// The reservation already has an invoice attached.
    #[error("Reservation {0} has already been invoiced")]
    AlreadyInvoiced(ReservationId),

    /// The store refused the write batch.
    #[error("Write rejected: {0}")]
    Rejected(String),

    /// A stored row could not be decoded into a record.
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn still_referenced(
        entity: &'static str,
        id: impl ToString,
        referenced_by: &'static str,
    ) -> Self {
        StoreError::StillReferenced {
            entity,
            id: id.to_string(),
            referenced_by,
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
