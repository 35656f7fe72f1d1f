use axum::{
    body::HttpBody,
    extract::{Request, State},
    http::{
        header::{ACCEPT_LANGUAGE, ALLOW},
        HeaderMap, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::classifier::ErrorClassifier;
use super::failure::Failure;
use crate::i18n::Locale;
use crate::metrics::registry::API_ERRORS_TOTAL;

/// Locale requested by the caller, if any
pub fn request_locale(headers: &HeaderMap) -> Option<Locale> {
    headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .and_then(Locale::from_accept_language)
}

impl ErrorClassifier {
    /// Classify and render a failure as the final HTTP response
    pub fn respond(&self, failure: Failure, locale: Option<&Locale>) -> Response {
        match self.classify(failure, locale) {
            Some(error) => {
                API_ERRORS_TOTAL
                    .with_label_values(&[error.code.as_str(), &error.status.to_string()])
                    .inc();
                error.into_response()
            }
            None => StatusCode::OK.into_response(),
        }
    }
}

/// Middleware rendering failures returned by handlers into JSON error bodies.
///
/// Must wrap every route that can return a [`Failure`]. A bodiless 405 produced
/// by the router is treated as [`Failure::MethodNotAllowed`], keeping its `Allow` header.
pub async fn error_translation(
    State(classifier): State<Arc<ErrorClassifier>>,
    request: Request,
    next: Next,
) -> Response {
    let locale = request_locale(request.headers());
    let mut response = next.run(request).await;

    if let Some(failure) = response.extensions_mut().remove::<Failure>() {
        return classifier.respond(failure, locale.as_ref());
    }
    if !is_router_method_not_allowed(&response) {
        return response;
    }

    let allow = response.headers().get(ALLOW).cloned();
    let mut translated = classifier.respond(Failure::MethodNotAllowed, locale.as_ref());
    if let Some(allow) = allow {
        translated.headers_mut().insert(ALLOW, allow);
    }
    translated
}

/// Router-generated 405s carry no body; handlers returning 405 themselves are left alone
fn is_router_method_not_allowed(response: &Response) -> bool {
    response.status() == StatusCode::METHOD_NOT_ALLOWED
        && response.body().size_hint().exact() == Some(0)
}

/// Router fallback for unknown routes
pub async fn not_found_fallback() -> Failure {
    Failure::NotFound
}
