use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Prefix for codes derived from a bare HTTP status (`error.404`, `error.418`, ...)
pub const STATUS_CODE_PREFIX: &str = "error.";

/// Machine-stable error codes for structured API responses
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ErrorCode(String);

impl ErrorCode {
    pub const CONCURRENCY_FAILURE: &'static str = "err.concurrency-failure";
    pub const NO_CONTENT: &'static str = "err.nocontent";
    pub const VALIDATION: &'static str = "err.validation";
    pub const BUSINESS: &'static str = "err.business";
    pub const NOT_FOUND: &'static str = "err.notfound";
    pub const ACCESS_DENIED: &'static str = "err.access-denied";
    pub const METHOD_NOT_SUPPORTED: &'static str = "err.method-not-supported";
    pub const INTERNAL_SERVER_ERROR: &'static str = "err.internal-server-error";

    /// Wrap a caller-supplied code verbatim, falling back to `fallback` when absent or empty
    pub fn new_or(code: Option<&str>, fallback: &'static str) -> Self {
        match code {
            Some(code) if !code.is_empty() => Self(code.to_string()),
            _ => Self(fallback.to_string()),
        }
    }

    /// Code for one of the constants above
    pub fn fixed(code: &'static str) -> Self {
        Self(code.to_string())
    }

    /// `error.<status>` for a status mirrored from elsewhere
    pub fn for_status(status: u16) -> Self {
        Self(format!("{}{}", STATUS_CODE_PREFIX, status))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ErrorCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Returns the status if it is a usable HTTP status code
pub fn valid_status(status: Option<u16>) -> Option<u16> {
    status.filter(|s| (100..=599).contains(s))
}
