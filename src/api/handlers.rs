use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use utoipa::ToSchema;

use super::middleware::RequestLogging;
use crate::errors::{ErrorClassifier, Failure, ValidationErrors};
use crate::logging::LogPrintConfig;
use crate::models::{ConfigMap, ConfigPathsRequest};
use crate::remote_config::ConfigRepository;
use crate::tenant::{TenantContext, TenantHeader};

lazy_static::lazy_static! {
    static ref START_TIME: Instant = Instant::now();
}

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub config_repository: Arc<dyn ConfigRepository>,
    pub classifier: Arc<ErrorClassifier>,
    pub request_logging: RequestLogging,
    pub tenant_header: TenantHeader,
    pub instance_id: String,
}

/// Config map query parameters
#[derive(Debug, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
pub struct VersionParams {
    /// Configuration version (commit) to read
    pub version: Option<String>,
}

/// Current tenant response
#[derive(Debug, Serialize, ToSchema)]
pub struct TenantResponse {
    /// Tenant key bound to the request
    pub tenant: String,
}

/// Config contents are never printed to the request log
const CONFIG_LOGGING: LogPrintConfig = LogPrintConfig {
    result_details: false,
    result_collection_aware: true,
};

fn config_response(configs: ConfigMap) -> Result<Response, Failure> {
    if configs.is_empty() {
        return Err(Failure::NoContent);
    }
    let mut response = Json(configs).into_response();
    response.extensions_mut().insert(CONFIG_LOGGING);
    Ok(response)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = serde_json::Value)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "service-commons",
        "version": env!("CARGO_PKG_VERSION"),
        "instance_id": state.instance_id,
        "uptime_seconds": START_TIME.elapsed().as_secs(),
    }))
}

/// Tenant bound to the current request
#[utoipa::path(
    get,
    path = "/api/tenant",
    tag = "tenant",
    responses(
        (status = 200, description = "Current tenant", body = TenantResponse),
        (status = 400, description = "No tenant header", body = crate::errors::ErrorResponse)
    )
)]
pub async fn get_tenant(State(state): State<AppState>) -> Result<Json<TenantResponse>, Failure> {
    let key = TenantContext::get_required_tenant_key()
        .map_err(|_| Failure::missing_parameter("TenantKey", state.tenant_header.0.as_str()))?;

    Ok(Json(TenantResponse {
        tenant: key.to_string(),
    }))
}

/// Every configuration at a version
#[utoipa::path(
    get,
    path = "/api/config",
    tag = "config",
    params(VersionParams),
    responses(
        (status = 200, description = "Configurations keyed by path", body = HashMap<String, crate::models::Configuration>),
        (status = 204, description = "No configurations at this version"),
        (status = 400, description = "Missing version", body = crate::errors::ErrorResponse),
        (status = 502, description = "Config service error", body = crate::errors::ErrorResponse)
    )
)]
pub async fn get_config(
    State(state): State<AppState>,
    params: Result<Query<VersionParams>, QueryRejection>,
) -> Result<Response, Failure> {
    let Query(params) = params?;
    let version = params
        .version
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Failure::missing_parameter("String", "version"))?;

    let configs = state.config_repository.get_config(&version).await?;
    info!("Fetched {} configurations at version {}", configs.len(), version);

    config_response(configs)
}

/// Configurations at a version, restricted to the given paths
#[utoipa::path(
    post,
    path = "/api/config",
    tag = "config",
    request_body = ConfigPathsRequest,
    responses(
        (status = 200, description = "Configurations keyed by path", body = HashMap<String, crate::models::Configuration>),
        (status = 204, description = "None of the paths exist"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 502, description = "Config service error", body = crate::errors::ErrorResponse)
    )
)]
pub async fn get_config_paths(
    State(state): State<AppState>,
    payload: Result<Json<ConfigPathsRequest>, JsonRejection>,
) -> Result<Response, Failure> {
    let Json(request) = payload?;
    validate_paths_request(&request)?;

    let configs = state
        .config_repository
        .get_config_paths(&request.version, &request.paths)
        .await?;
    info!(
        "Fetched {} of {} requested configurations at version {}",
        configs.len(),
        request.paths.len(),
        request.version
    );

    config_response(configs)
}

fn validate_paths_request(request: &ConfigPathsRequest) -> Result<(), Failure> {
    const OBJECT: &str = "configPathsRequest";

    let mut errors = ValidationErrors::new();
    if request.version.trim().is_empty() {
        errors = errors.field(OBJECT, "version", "NotBlank");
    }
    if request.paths.is_empty() {
        errors = errors.field(OBJECT, "paths", "NotEmpty");
    }
    for (i, path) in request.paths.iter().enumerate() {
        if !path.starts_with('/') {
            errors = errors.field(OBJECT, format!("paths[{}]", i), "Pattern");
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(Failure::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(version: &str, paths: &[&str]) -> ConfigPathsRequest {
        ConfigPathsRequest {
            version: version.to_string(),
            paths: paths.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_valid_paths_request() {
        assert!(validate_paths_request(&request("v1", &["/config/a.yml"])).is_ok());
    }

    #[test]
    fn test_invalid_paths_request_collects_all_errors() {
        let err = validate_paths_request(&request(" ", &["/ok.yml", "relative.yml"])).unwrap_err();
        match err {
            Failure::Validation(errors) => {
                let fields: Vec<_> = errors.field_errors.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(fields, vec!["version", "paths[1]"]);
            }
            other => panic!("unexpected failure: {:?}", other),
        }
    }

    #[test]
    fn test_empty_paths() {
        let err = validate_paths_request(&request("v1", &[])).unwrap_err();
        assert!(matches!(err, Failure::Validation(errors) if errors.len() == 1));
    }

    #[test]
    fn test_empty_config_map_is_no_content() {
        assert_eq!(config_response(ConfigMap::new()).unwrap_err(), Failure::NoContent);
    }
}
