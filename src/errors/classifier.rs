use axum::http::StatusCode;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::codes::{valid_status, ErrorCode};
use super::failure::{Failure, ValidationErrors};
use super::response::ErrorResponse;
use crate::i18n::{Locale, MessageCatalog};

/// Turns request failures into client-safe, localized error responses.
///
/// Holds no mutable state; one instance is shared by all requests.
#[derive(Clone)]
pub struct ErrorClassifier {
    catalog: Arc<dyn MessageCatalog>,
    default_locale: Locale,
}

impl ErrorClassifier {
    pub fn new(catalog: Arc<dyn MessageCatalog>, default_locale: Locale) -> Self {
        Self {
            catalog,
            default_locale,
        }
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    /// Classify a failure.
    ///
    /// Returns `None` for [`Failure::Skip`], which is answered as an empty
    /// success instead of an error.
    pub fn classify(&self, failure: Failure, locale: Option<&Locale>) -> Option<ErrorResponse> {
        let locale = locale.unwrap_or(&self.default_locale);

        let response = match failure {
            Failure::Concurrency => {
                debug!("Concurrency failure");
                self.simple(ErrorCode::CONCURRENCY_FAILURE, StatusCode::CONFLICT, locale)
            }
            Failure::Skip { permission } => {
                debug!(permission = %permission, "Skip permission");
                return None;
            }
            Failure::NoContent => {
                debug!("No content");
                self.simple(ErrorCode::NO_CONTENT, StatusCode::NO_CONTENT, locale)
            }
            Failure::MissingParameter { param_type, name } => {
                debug!(param_type = %param_type, name = %name, "Missing request parameter");
                let mut response =
                    self.simple(ErrorCode::VALIDATION, StatusCode::BAD_REQUEST, locale);
                let text = format!("Required {} parameter '{}' is not present", param_type, name);
                response.add_field(param_type, name, text);
                response
            }
            Failure::Validation(errors) => {
                debug!(errors = errors.len(), "Validation failed");
                self.validation(errors, locale)
            }
            Failure::UpstreamHttp { status } => {
                warn!(status = ?status, "Upstream HTTP error");
                self.by_status(status, locale)
            }
            Failure::Business {
                code,
                message,
                params,
            } => {
                let code = ErrorCode::new_or(code.as_deref(), ErrorCode::BUSINESS);
                debug!(code = %code, "Business rule violated");
                let message = match message {
                    Some(message) => message,
                    None => self.localize(code.as_str(), locale),
                };
                ErrorResponse::new(code, message, StatusCode::BAD_REQUEST).with_params(params)
            }
            Failure::NotFound => {
                debug!("Entity not found");
                self.simple(ErrorCode::NOT_FOUND, StatusCode::NOT_FOUND, locale)
            }
            Failure::AccessDenied => {
                debug!("Access denied");
                self.simple(ErrorCode::ACCESS_DENIED, StatusCode::FORBIDDEN, locale)
            }
            Failure::MethodNotAllowed => {
                debug!("Method not supported");
                self.simple(
                    ErrorCode::METHOD_NOT_SUPPORTED,
                    StatusCode::METHOD_NOT_ALLOWED,
                    locale,
                )
            }
            Failure::Unexpected { message, status } => {
                error!(declared_status = ?status, "An unexpected error occurred: {}", message);
                self.by_status(status, locale)
            }
        };

        Some(response)
    }

    /// Resolve a message, falling back to the bare code
    pub fn localize(&self, code: &str, locale: &Locale) -> String {
        match self.catalog.lookup(code, locale) {
            Ok(text) => text,
            Err(e) => {
                warn!(code, locale = %locale, "Message lookup failed: {}", e);
                code.to_string()
            }
        }
    }

    fn simple(&self, code: &'static str, status: StatusCode, locale: &Locale) -> ErrorResponse {
        ErrorResponse::new(ErrorCode::fixed(code), self.localize(code, locale), status)
    }

    /// `error.<status>` when the status is usable, internal server error otherwise
    fn by_status(&self, status: Option<u16>, locale: &Locale) -> ErrorResponse {
        let known = valid_status(status).and_then(|s| StatusCode::from_u16(s).ok());
        match known {
            Some(status) => {
                let code = ErrorCode::for_status(status.as_u16());
                let message = self.localize(code.as_str(), locale);
                ErrorResponse::new(code, message, status)
            }
            None => self.simple(
                ErrorCode::INTERNAL_SERVER_ERROR,
                StatusCode::INTERNAL_SERVER_ERROR,
                locale,
            ),
        }
    }

    fn validation(&self, errors: ValidationErrors, locale: &Locale) -> ErrorResponse {
        let mut response = self.simple(ErrorCode::VALIDATION, StatusCode::BAD_REQUEST, locale);
        for violation in errors.field_errors {
            response.add_field(violation.object_name, violation.field, violation.code);
        }
        for violation in errors.object_errors {
            response.add_field(violation.object_name.clone(), violation.object_name, violation.code);
        }
        response
    }
}
