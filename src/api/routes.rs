use axum::{
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{get_config, get_config_paths, get_tenant, health, AppState};
use super::middleware::logging_middleware;
use super::openapi::ApiDoc;
use crate::errors::{error_translation, not_found_fallback};
use crate::metrics;
use crate::tenant::tenant_middleware;

pub fn create_router(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let tenant_header = state.tenant_header.clone();
    let classifier = state.classifier.clone();
    let request_logging = state.request_logging.clone();

    Router::new()
        // Health check
        .route("/health", get(health))
        // Metrics endpoint (Prometheus)
        .route("/metrics", get(metrics::metrics_handler))
        // Tenant context
        .route("/api/tenant", get(get_tenant))
        // Configuration service proxy
        .route("/api/config", get(get_config).post(get_config_paths))
        // OpenAPI documentation
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found_fallback)
        // Middleware, innermost first: tenant -> error translation -> logging -> metrics
        // -> compression -> cors -> trace. Translation wraps the tenant layer so a
        // rejected tenant header is rendered like any other failure.
        .layer(middleware::from_fn_with_state(tenant_header, tenant_middleware))
        .layer(middleware::from_fn_with_state(classifier, error_translation))
        .layer(middleware::from_fn_with_state(request_logging, logging_middleware))
        .layer(middleware::from_fn(metrics::middleware::track_metrics))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // Add shared state
        .with_state(state)
}
