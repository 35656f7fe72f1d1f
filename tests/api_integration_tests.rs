use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderName, Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::Service;

use service_commons::api::{self, handlers::AppStateInner, middleware::RequestLogging};
use service_commons::config::RemoteConfigConfig;
use service_commons::errors::ErrorClassifier;
use service_commons::i18n::{InMemoryCatalog, Locale};
use service_commons::models::{ConfigMap, Configuration};
use service_commons::remote_config::{ConfigClient, ConfigClientError, ConfigRepository};
use service_commons::tenant::TenantHeader;

/// Config service stand-in keyed by version
struct FakeConfigRepository;

#[async_trait]
impl ConfigRepository for FakeConfigRepository {
    async fn get_config(&self, version: &str) -> Result<ConfigMap, ConfigClientError> {
        match version {
            "v1" => {
                let mut map = ConfigMap::new();
                map.insert(
                    "/config/a.yml".to_string(),
                    Configuration::new("/config/a.yml", "a: 1"),
                );
                Ok(map)
            }
            "teapot" => Err(ConfigClientError::Status {
                status: 418,
                body: "short and stout".to_string(),
            }),
            _ => Ok(ConfigMap::new()),
        }
    }

    async fn get_config_paths(
        &self,
        version: &str,
        paths: &[String],
    ) -> Result<ConfigMap, ConfigClientError> {
        let all = self.get_config(version).await?;
        Ok(all
            .into_iter()
            .filter(|(path, _)| paths.contains(path))
            .collect())
    }
}

// Helper to create test app
fn create_test_app(repository: Arc<dyn ConfigRepository>) -> axum::Router {
    let en: Locale = "en".parse().unwrap();
    let mut catalog = InMemoryCatalog::with_defaults(en.clone());
    catalog.insert("uk".parse().unwrap(), "err.notfound", "Не знайдено");

    let tenant_header = HeaderName::from_static("x-tenant");
    let state = Arc::new(AppStateInner {
        config_repository: repository,
        classifier: Arc::new(ErrorClassifier::new(Arc::new(catalog), en)),
        request_logging: RequestLogging {
            print_body: true,
            body_max_bytes: 65536,
            tenant_header: tenant_header.clone(),
        },
        tenant_header: TenantHeader(tenant_header),
        instance_id: "test-instance".to_string(),
    });

    api::routes::create_router(state)
}

fn fake_app() -> axum::Router {
    create_test_app(Arc::new(FakeConfigRepository))
}

// Helper to send request and parse JSON response
async fn send(app: &mut axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.call(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!({}));

    (status, json)
}

async fn send_json_request(app: &mut axum::Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn send_json_body_request(
    app: &mut axum::Router,
    method: &str,
    uri: &str,
    body: Value,
) -> (StatusCode, Value) {
    let bytes = serde_json::to_vec(&body).unwrap();
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(bytes))
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn test_health_endpoint() {
    let mut app = fake_app();
    let (status, body) = send_json_request(&mut app, "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "service-commons");
    assert_eq!(body["instance_id"], "test-instance");
}

#[tokio::test]
async fn test_unknown_route_is_localized_not_found() {
    let mut app = fake_app();
    let (status, body) = send_json_request(&mut app, "GET", "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "err.notfound");
    assert_eq!(body["message"], "Entity not found");
    assert_eq!(body["status"], 404);

    let request = Request::builder()
        .uri("/nope")
        .header("accept-language", "uk-UA,uk;q=0.9,en;q=0.5")
        .body(Body::empty())
        .unwrap();
    let (_, body) = send(&mut app, request).await;
    assert_eq!(body["message"], "Не знайдено");
}

#[tokio::test]
async fn test_wrong_method() {
    let mut app = fake_app();
    let (status, body) = send_json_request(&mut app, "DELETE", "/api/config").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["code"], "err.method-not-supported");
}

#[tokio::test]
async fn test_tenant_from_header() {
    let mut app = fake_app();
    let request = Request::builder()
        .uri("/api/tenant")
        .header("x-tenant", "xm")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tenant"], "XM");
}

#[tokio::test]
async fn test_tenant_missing() {
    let mut app = fake_app();
    let (status, body) = send_json_request(&mut app, "GET", "/api/tenant").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "err.validation");
    assert_eq!(body["fields"][0]["objectName"], "TenantKey");
    assert_eq!(body["fields"][0]["field"], "x-tenant");
}

#[tokio::test]
async fn test_tenant_invalid_header() {
    let mut app = fake_app();
    let request = Request::builder()
        .uri("/api/tenant")
        .header("x-tenant", "bad/tenant")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["fields"],
        json!([{ "objectName": "tenant", "field": "x-tenant", "code": "InvalidTenantKey" }])
    );
}

#[tokio::test]
async fn test_config_requires_version() {
    let mut app = fake_app();
    let (status, body) = send_json_request(&mut app, "GET", "/api/config").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "err.validation");
    assert_eq!(body["fields"][0]["field"], "version");
    assert_eq!(
        body["fields"][0]["code"],
        "Required String parameter 'version' is not present"
    );
}

#[tokio::test]
async fn test_config_by_version() {
    let mut app = fake_app();
    let (status, body) = send_json_request(&mut app, "GET", "/api/config?version=v1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["/config/a.yml"]["content"], "a: 1");
}

#[tokio::test]
async fn test_config_empty_is_no_content() {
    let mut app = fake_app();
    let (status, _) = send_json_request(&mut app, "GET", "/api/config?version=v0").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_upstream_status_is_mirrored() {
    let mut app = fake_app();
    let (status, body) = send_json_request(&mut app, "GET", "/api/config?version=teapot").await;
    assert_eq!(status, StatusCode::IM_A_TEAPOT);
    assert_eq!(body["code"], "error.418");
    assert!(!body.to_string().contains("short and stout"));
}

#[tokio::test]
async fn test_config_paths() {
    let mut app = fake_app();
    let (status, body) = send_json_body_request(
        &mut app,
        "POST",
        "/api/config",
        json!({ "version": "v1", "paths": ["/config/a.yml"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["/config/a.yml"]["path"], "/config/a.yml");
}

#[tokio::test]
async fn test_config_paths_validation() {
    let mut app = fake_app();
    let (status, body) = send_json_body_request(
        &mut app,
        "POST",
        "/api/config",
        json!({ "version": "", "paths": ["no-slash.yml"] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "err.validation");
    assert_eq!(
        body["fields"],
        json!([
            { "objectName": "configPathsRequest", "field": "version", "code": "NotBlank" },
            { "objectName": "configPathsRequest", "field": "paths[0]", "code": "Pattern" }
        ])
    );
}

#[tokio::test]
async fn test_malformed_body_uses_declared_status() {
    let mut app = fake_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/config")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let (status, body) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "error.400");
    assert_eq!(body["message"], "Bad request");
}

#[tokio::test]
async fn test_real_client_against_failing_config_service() {
    let server = httpmock::MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(httpmock::Method::GET)
                .path("/api/private/config_map");
            then.status(503).body("maintenance");
        })
        .await;

    let client = ConfigClient::new(&RemoteConfigConfig {
        url: server.base_url(),
        timeout_ms: 2000,
        token: None,
    })
    .unwrap();
    let mut app = create_test_app(Arc::new(client));

    let (status, body) = send_json_request(&mut app, "GET", "/api/config?version=v1").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "error.503");
    assert_eq!(body["message"], "Service unavailable");
}
