//! Domain error types.

use store::StoreError;
use thiserror::Error;

use crate::orders::OrderError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The requested record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The request was malformed or referenced something that does not exist.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The request conflicts with the current state of stored records.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An error occurred in the order state machine.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// The store failed; nothing from the operation was persisted.
    #[error("Persistence error: {0}")]
    Persistence(StoreError),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        DomainError::Conflict(message.into())
    }

    /// Returns true for failures of the store rather than of the request.
    pub fn is_persistence(&self) -> bool {
        matches!(self, DomainError::Persistence(_))
    }
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { entity, id } => DomainError::NotFound { entity, id },
            StoreError::StillReferenced { .. } | StoreError::AlreadyInvoiced(_) => {
                DomainError::Conflict(e.to_string())
            }
            other => DomainError::Persistence(other),
        }
    }
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;

/// Trims `value`, mapping blank strings to `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trims a required field, failing with a validation error when blank.
pub(crate) fn required(value: &str, field: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ReservationId;

    #[test]
    fn store_errors_are_classified() {
        let e: DomainError = StoreError::NotFound {
            entity: "Table",
            id: "x".to_string(),
        }
        .into();
        assert!(matches!(e, DomainError::NotFound { entity: "Table", .. }));

        let e: DomainError = StoreError::AlreadyInvoiced(ReservationId::new()).into();
        assert!(matches!(e, DomainError::Conflict(_)));

        let e: DomainError = StoreError::Rejected("boom".to_string()).into();
        assert!(e.is_persistence());
    }

    #[test]
    fn blank_optional_fields_normalize_to_none() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(Some(" a@b.c ".to_string())), Some("a@b.c".to_string()));
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn required_rejects_blank() {
        assert!(matches!(required("   ", "name"), Err(DomainError::Validation(_))));
        assert_eq!(required(" Ana ", "name").unwrap(), "Ana");
    }
}
