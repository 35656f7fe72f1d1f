//! Request-scoped tenant identity.
//!
//! The current tenant lives in tokio task-local storage for the duration of
//! [`TenantContext::scope`]. Task-locals are not inherited by spawned tasks:
//! wrap spawned work in its own `scope` to carry the tenant across.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use thiserror::Error;
use tokio::task_local;

use crate::errors::Failure;

task_local! {
    static TENANT: RefCell<Option<Tenant>>;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TenantError {
    #[error("Tenant context doesn't have tenant key")]
    MissingTenant,

    #[error("no tenant context in scope")]
    NoContext,

    #[error("invalid tenant key: {0:?}")]
    InvalidKey(String),
}

impl From<TenantError> for Failure {
    fn from(err: TenantError) -> Self {
        Failure::unexpected(err)
    }
}

/// Tenant identifier, trimmed and upper-cased (`xm` and ` XM ` are the same tenant)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantKey(String);

impl TenantKey {
    pub fn new(value: &str) -> Result<Self, TenantError> {
        let key = value.trim();
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if valid {
            Ok(Self(key.to_ascii_uppercase()))
        } else {
            Err(TenantError::InvalidKey(value.to_string()))
        }
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl FromStr for TenantKey {
    type Err = TenantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for TenantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    key: TenantKey,
}

impl Tenant {
    pub fn new(key: TenantKey) -> Self {
        Self { key }
    }

    pub fn from_key_value(value: &str) -> Result<Self, TenantError> {
        Ok(Self::new(TenantKey::new(value)?))
    }

    pub fn key(&self) -> &TenantKey {
        &self.key
    }
}

/// Accessors for the tenant bound to the current task
pub struct TenantContext;

impl TenantContext {
    /// Run `fut` with `tenant` as the current tenant
    pub async fn scope<F>(tenant: Option<Tenant>, fut: F) -> F::Output
    where
        F: Future,
    {
        TENANT.scope(RefCell::new(tenant), fut).await
    }

    pub fn get_tenant() -> Option<Tenant> {
        TENANT.try_with(|t| t.borrow().clone()).ok().flatten()
    }

    pub fn get_tenant_key() -> Option<TenantKey> {
        Self::get_tenant().map(|t| t.key)
    }

    /// Current tenant key, failing when none is set
    pub fn get_required_tenant_key() -> Result<TenantKey, TenantError> {
        Self::get_tenant_key().ok_or(TenantError::MissingTenant)
    }

    pub fn get_required_tenant_key_value() -> Result<String, TenantError> {
        Self::get_required_tenant_key().map(|key| key.0)
    }

    /// Replace the tenant for the rest of the enclosing scope
    pub fn set_tenant(key: TenantKey) -> Result<(), TenantError> {
        TENANT
            .try_with(|t| {
                t.replace(Some(Tenant::new(key)));
            })
            .map_err(|_| TenantError::NoContext)
    }

    pub fn clear() -> Result<(), TenantError> {
        TENANT
            .try_with(|t| {
                t.replace(None);
            })
            .map_err(|_| TenantError::NoContext)
    }
}
