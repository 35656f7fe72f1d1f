//! Tenant identity scoped to the current request

pub mod context;
pub mod middleware;

pub use context::{Tenant, TenantContext, TenantError, TenantKey};
pub use middleware::{tenant_middleware, TenantHeader};
