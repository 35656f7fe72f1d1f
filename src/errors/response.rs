use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::codes::ErrorCode;

/// Structured error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    #[schema(value_type = String, example = "err.validation")]
    pub code: ErrorCode,
    /// Localized human-readable error message
    pub message: String,
    /// HTTP status of the response
    pub status: u16,
    /// Field-level validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
    /// Business rule parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, String>>,
}

/// A single invalid field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub object_name: String,
    pub field: String,
    pub code: String,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(code: ErrorCode, message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            code,
            message: message.into(),
            status: status.as_u16(),
            fields: None,
            params: None,
        }
    }

    /// Append a field error
    pub fn add_field(
        &mut self,
        object_name: impl Into<String>,
        field: impl Into<String>,
        code: impl Into<String>,
    ) {
        self.fields.get_or_insert_with(Vec::new).push(FieldError {
            object_name: object_name.into(),
            field: field.into(),
            code: code.into(),
        });
    }

    pub fn with_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params = Some(params);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 204 may not carry a body
        if status == StatusCode::NO_CONTENT {
            return status.into_response();
        }

        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_response_serialization() {
        let err = ErrorResponse::new(
            ErrorCode::fixed(ErrorCode::NOT_FOUND),
            "Entity not found",
            StatusCode::NOT_FOUND,
        );
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(
            value,
            json!({
                "code": "err.notfound",
                "message": "Entity not found",
                "status": 404
            })
        );
    }

    #[test]
    fn test_field_errors_use_camel_case() {
        let mut err = ErrorResponse::new(
            ErrorCode::fixed(ErrorCode::VALIDATION),
            "Validation failed",
            StatusCode::BAD_REQUEST,
        );
        err.add_field("user", "email", "Email");
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(
            value["fields"],
            json!([{ "objectName": "user", "field": "email", "code": "Email" }])
        );
        assert!(value.get("params").is_none());
    }

    #[test]
    fn test_into_response_status() {
        let err = ErrorResponse::new(
            ErrorCode::fixed(ErrorCode::ACCESS_DENIED),
            "Access denied",
            StatusCode::FORBIDDEN,
        );
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_no_content_has_empty_body() {
        let err = ErrorResponse::new(
            ErrorCode::fixed(ErrorCode::NO_CONTENT),
            "No content",
            StatusCode::NO_CONTENT,
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn test_invalid_status_falls_back_to_internal_error() {
        let mut err = ErrorResponse::new(
            ErrorCode::fixed(ErrorCode::INTERNAL_SERVER_ERROR),
            "Internal server error",
            StatusCode::INTERNAL_SERVER_ERROR,
        );
        err.status = 42;
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
