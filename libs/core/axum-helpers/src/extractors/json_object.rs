//! JSON body extractor that keeps the payload as an untyped object.
//!
//! Typed `Json<T>` rejects on the first bad field. Validation layers that
//! must report every violation at once need the raw key/value map instead.

use crate::errors::{AppError, FieldError};
use axum::{
    extract::{FromRequest, Json, Request},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};

/// Request body parsed as a JSON object.
///
/// Rejects malformed JSON with the framework's status (400/415/422) and any
/// non-object body (array, string, ...) with a `400 VALIDATION_ERROR`.
///
/// # Example
/// ```ignore
/// use axum_helpers::extractors::JsonObject;
///
/// async fn create(JsonObject(payload): JsonObject) -> String {
///     format!("{} fields", payload.len())
/// }
/// ```
pub struct JsonObject(pub Map<String, Value>);

impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        match value {
            Value::Object(map) => Ok(JsonObject(map)),
            other => Err(AppError::validation(vec![FieldError {
                field: "body".to_string(),
                value: other,
                message: "request body must be a JSON object".to_string(),
            }])
            .into_response()),
        }
    }
}
