use utoipa::OpenApi;

use crate::api::handlers::{TenantResponse, VersionParams};
use crate::errors::{ErrorResponse, FieldError};
use crate::models::{ConfigPathsRequest, Configuration};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Service Commons",
        version = "0.1.0",
        description = "Shared service plumbing: localized error responses, tenant-scoped requests, request logging and a configuration service proxy.",
    ),
    paths(
        crate::api::handlers::health,
        crate::api::handlers::get_tenant,
        crate::api::handlers::get_config,
        crate::api::handlers::get_config_paths,
    ),
    components(
        schemas(
            ErrorResponse,
            FieldError,
            Configuration,
            ConfigPathsRequest,
            TenantResponse,
            VersionParams,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "tenant", description = "Tenant context"),
        (name = "config", description = "Configuration service proxy"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_paths_and_error_schema() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/config"));
        assert!(doc.paths.paths.contains_key("/api/tenant"));
        let components = doc.components.expect("components");
        assert!(components.schemas.contains_key("ErrorResponse"));
    }
}
