use axum::{
    body::{Body, HttpBody},
    extract::{Request, State},
    http::{header::CONTENT_TYPE, HeaderName},
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::logging::{print_rest_result, print_unbuffered_result, LogPrintConfig};

/// Settings for [`logging_middleware`]
#[derive(Debug, Clone)]
pub struct RequestLogging {
    /// Default for printing response bodies when a route sets no [`LogPrintConfig`]
    pub print_body: bool,
    /// Larger bodies are never buffered for printing
    pub body_max_bytes: usize,
    pub tenant_header: HeaderName,
}

/// Middleware to log all HTTP requests and responses with structured data
pub async fn logging_middleware(
    State(settings): State<RequestLogging>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    // Extract request information
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or("").to_string();
    let user_agent = request
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let tenant = request
        .headers()
        .get(&settings.tenant_header)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    // Log incoming request
    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        query = %sanitize_query(&query),
        user_agent = %user_agent,
        tenant = %tenant,
        "Incoming request"
    );

    // Process request
    let response = next.run(request).await;

    // Calculate duration
    let duration = start.elapsed();
    let status = response.status();

    // Log response
    if status.is_success() {
        info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request completed"
        );
    } else if status.is_client_error() {
        warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request failed (client error)"
        );
    } else if status.is_server_error() {
        warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request failed (server error)"
        );
    }

    if tracing::enabled!(tracing::Level::DEBUG) {
        log_result(&request_id, &settings, response).await
    } else {
        response
    }
}

/// Print the response body at debug level, returning the rebuilt response
async fn log_result(request_id: &str, settings: &RequestLogging, response: Response) -> Response {
    let route = response.extensions().get::<LogPrintConfig>().copied();
    let status = response.status();

    let body_len = response.body().size_hint().exact();
    if body_len == Some(0) {
        let result = print_rest_result(Some(status), None, settings.print_body, route.as_ref());
        debug!(request_id = %request_id, result = %result, "Response");
        return response;
    }

    let small_enough = body_len.is_some_and(|len| len as usize <= settings.body_max_bytes);
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    if !small_enough || !is_json {
        let result = print_unbuffered_result(Some(status), settings.print_body, route.as_ref());
        debug!(request_id = %request_id, result = %result, "Response");
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, settings.body_max_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(request_id = %request_id, "Failed to buffer response body for logging: {}", e);
            return Response::from_parts(parts, Body::empty());
        }
    };

    let value: Option<Value> = serde_json::from_slice(&bytes).ok();
    let result = print_rest_result(
        Some(status),
        value.as_ref(),
        settings.print_body,
        route.as_ref(),
    );
    debug!(request_id = %request_id, result = %result, "Response");

    Response::from_parts(parts, Body::from(bytes))
}

/// Sanitize query parameters to hide sensitive data
fn sanitize_query(query: &str) -> String {
    if query.is_empty() {
        return String::new();
    }

    query
        .split('&')
        .map(|pair| {
            let key = pair.split('=').next().unwrap_or("");
            let sensitive = ["api_key", "token", "password", "secret"]
                .iter()
                .any(|s| key.eq_ignore_ascii_case(s));
            if sensitive {
                format!("{}=***", key)
            } else {
                pair.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{Request, StatusCode},
        middleware,
        response::IntoResponse,
        routing::get,
        Json, Router,
    };
    use serde_json::json;
    use tower::ServiceExt;

    #[test]
    fn test_sanitize_query() {
        assert_eq!(sanitize_query(""), "");
        assert_eq!(sanitize_query("version=abc"), "version=abc");
        assert_eq!(sanitize_query("api_key=secret123"), "api_key=***");
        assert_eq!(
            sanitize_query("q=test&token=secret&limit=10"),
            "q=test&token=***&limit=10"
        );
        assert_eq!(
            sanitize_query("password=a&Secret=b"),
            "password=***&Secret=***"
        );
    }

    #[derive(Clone, Default)]
    struct LogCapture(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_unread_body_is_not_logged_as_null() {
        let capture = LogCapture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let settings = RequestLogging {
            print_body: true,
            body_max_bytes: 1024,
            tenant_header: HeaderName::from_static("x-tenant"),
        };
        let app = Router::new()
            .route("/text", get(|| async { "plain text" }))
            .layer(middleware::from_fn_with_state(settings, logging_middleware));

        let response = app
            .oneshot(Request::builder().uri("/text").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"plain text");

        let logs = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("body=#unbuffered#"), "logs: {}", logs);
        assert!(!logs.contains("body=null"), "logs: {}", logs);
    }

    #[tokio::test]
    async fn test_response_body_survives_logging() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let settings = RequestLogging {
            print_body: true,
            body_max_bytes: 1024,
            tenant_header: HeaderName::from_static("x-tenant"),
        };
        let app = Router::new()
            .route("/items", get(|| async { Json(json!([1, 2, 3])) }))
            .route(
                "/secret",
                get(|| async {
                    let mut response = Json(json!({ "token": "abc" })).into_response();
                    response.extensions_mut().insert(LogPrintConfig {
                        result_details: false,
                        result_collection_aware: true,
                    });
                    response
                }),
            )
            .layer(middleware::from_fn_with_state(settings, logging_middleware));

        for (uri, expected) in [("/items", json!([1, 2, 3])), ("/secret", json!({ "token": "abc" }))] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let value: Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(value, expected);
        }
    }
}
