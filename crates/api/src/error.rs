//! API error types with HTTP response mapping.
//!
//! Every error body is `{"error": <message>, "severity": <level>}`. Request
//! problems (missing rows, validation, conflicts) are `warning`; failures of
//! the store are `danger`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, OrderError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Warning,
    Danger,
}

impl Severity {
    fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, severity, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, Severity::Warning, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message, "severity": severity.as_str() });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, Severity, String) {
    let status = match &err {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Order(order_err) => match order_err {
            OrderError::InvalidStateTransition { .. } => StatusCode::CONFLICT,
            OrderError::LineNotFound { .. } => StatusCode::NOT_FOUND,
            OrderError::InvalidQuantity { .. } | OrderError::NoLines => StatusCode::BAD_REQUEST,
        },
        DomainError::Persistence(store_err) => {
            tracing::error!(error = %store_err, "persistence failure");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Severity::Danger,
                err.to_string(),
            );
        }
    };
    (status, Severity::Warning, err.to_string())
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::StoreError;

    fn status_of(err: DomainError) -> (StatusCode, Severity) {
        let (status, severity, _) = domain_error_to_response(err);
        (status, severity)
    }

    #[test]
    fn request_errors_are_warnings() {
        assert_eq!(
            status_of(DomainError::not_found("Table", "x")),
            (StatusCode::NOT_FOUND, Severity::Warning)
        );
        assert_eq!(
            status_of(DomainError::validation("bad")),
            (StatusCode::BAD_REQUEST, Severity::Warning)
        );
        assert_eq!(
            status_of(DomainError::conflict("taken")),
            (StatusCode::CONFLICT, Severity::Warning)
        );
        assert_eq!(
            status_of(OrderError::NoLines.into()),
            (StatusCode::BAD_REQUEST, Severity::Warning)
        );
    }

    #[test]
    fn persistence_failures_are_danger() {
        let err = DomainError::from(StoreError::Rejected("disk full".to_string()));
        assert_eq!(
            status_of(err),
            (StatusCode::INTERNAL_SERVER_ERROR, Severity::Danger)
        );
    }
}
