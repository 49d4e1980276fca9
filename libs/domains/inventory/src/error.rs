use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, FieldError};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// A single rejected field in an input payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    /// Field name as sent by the client (camelCase)
    pub field: String,
    /// The offending value, `null` when the field was missing
    pub value: serde_json::Value,
    pub reason: String,
}

impl FieldViolation {
    pub fn new(
        field: impl Into<String>,
        value: serde_json::Value,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            value,
            reason: reason.into(),
        }
    }
}

impl From<FieldViolation> for FieldError {
    fn from(v: FieldViolation) -> Self {
        FieldError {
            field: v.field,
            value: v.value,
            message: v.reason,
        }
    }
}

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Validation failed with {} violation(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    #[error("Inventory item not found: {0}")]
    NotFound(Uuid),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type InventoryResult<T> = Result<T, InventoryError>;

impl InventoryError {
    pub fn duplicate_item_id(item_id: &str) -> Self {
        InventoryError::Conflict(format!("Item with itemId '{}' already exists", item_id))
    }
}

/// Convert InventoryError to AppError for standardized error responses
impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::Validation(violations) => {
                AppError::validation(violations.into_iter().map(FieldError::from).collect())
            }
            InventoryError::NotFound(id) => {
                AppError::NotFound(format!("Inventory item {} not found", id))
            }
            InventoryError::Conflict(msg) => AppError::Conflict(msg),
            InventoryError::InvalidArgument(msg) => AppError::BadRequest(msg),
            InventoryError::Database(msg) => AppError::Database(msg),
            InventoryError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for InventoryError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for InventoryError {
    fn from(err: mongodb::error::Error) -> Self {
        InventoryError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (InventoryError::Validation(vec![]), StatusCode::BAD_REQUEST),
            (InventoryError::NotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (InventoryError::duplicate_item_id("IMP-001"), StatusCode::CONFLICT),
            (
                InventoryError::InvalidArgument("quantity cannot be negative".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                InventoryError::Database("socket closed".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                InventoryError::Internal("corrupt _id".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_conflict_message_names_item_id() {
        let err = InventoryError::duplicate_item_id("IMP-001");
        assert_eq!(err.to_string(), "Item with itemId 'IMP-001' already exists");
    }
}
