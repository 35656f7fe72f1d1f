use axum::{
    extract::{Request, State},
    http::HeaderName,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::context::{Tenant, TenantContext};
use crate::errors::{Failure, ValidationErrors};

/// Header carrying the tenant key
#[derive(Debug, Clone)]
pub struct TenantHeader(pub HeaderName);

/// Middleware binding the request's tenant for the rest of the handler chain.
///
/// Requests without the header run with an empty tenant context; handlers
/// that need a tenant fail through [`TenantContext::get_required_tenant_key`].
pub async fn tenant_middleware(
    State(TenantHeader(header)): State<TenantHeader>,
    request: Request,
    next: Next,
) -> Response {
    let raw = request
        .headers()
        .get(&header)
        .map(|v| v.to_str().unwrap_or_default().to_string());

    let tenant = match raw {
        Some(value) => match Tenant::from_key_value(&value) {
            Ok(tenant) => Some(tenant),
            Err(e) => {
                debug!(header = %header, "Rejecting request: {}", e);
                let errors = ValidationErrors::new().field("tenant", header.as_str(), "InvalidTenantKey");
                return Failure::Validation(errors).into_response();
            }
        },
        None => None,
    };

    if let Some(tenant) = &tenant {
        debug!(tenant = %tenant.key(), "Tenant bound to request");
    }

    TenantContext::scope(tenant, next.run(request)).await
}
