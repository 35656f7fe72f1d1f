use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::collections::BTreeMap;
use thiserror::Error;

/// A field-level validation violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub object_name: String,
    pub field: String,
    pub code: String,
}

/// A cross-field (object-level) validation violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectViolation {
    pub object_name: String,
    pub code: String,
}

/// Validation result collected while binding a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub field_errors: Vec<FieldViolation>,
    pub object_errors: Vec<ObjectViolation>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(
        mut self,
        object_name: impl Into<String>,
        field: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        self.field_errors.push(FieldViolation {
            object_name: object_name.into(),
            field: field.into(),
            code: code.into(),
        });
        self
    }

    pub fn object(mut self, object_name: impl Into<String>, code: impl Into<String>) -> Self {
        self.object_errors.push(ObjectViolation {
            object_name: object_name.into(),
            code: code.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty() && self.object_errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.field_errors.len() + self.object_errors.len()
    }
}

/// Failures raised while handling a request.
///
/// Every variant is terminal for the request: the error translation layer
/// turns it into exactly one response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Failure {
    #[error("entity not found")]
    NotFound,

    #[error("no content")]
    NoContent,

    #[error("required {param_type} parameter '{name}' is not present")]
    MissingParameter { param_type: String, name: String },

    #[error("validation failed with {} error(s)", .0.len())]
    Validation(ValidationErrors),

    #[error("business rule violated: {}", .code.as_deref().unwrap_or("<no code>"))]
    Business {
        code: Option<String>,
        message: Option<String>,
        params: BTreeMap<String, String>,
    },

    #[error("access denied")]
    AccessDenied,

    #[error("concurrent modification")]
    Concurrency,

    #[error("request method not supported")]
    MethodNotAllowed,

    #[error("upstream HTTP error (status {status:?})")]
    UpstreamHttp { status: Option<u16> },

    /// Caller lacks an optional permission; answered as an empty success
    #[error("skipped for permission {permission}")]
    Skip { permission: String },

    /// Anything else. `message` is for the log only.
    #[error("unexpected error: {message}")]
    Unexpected {
        message: String,
        status: Option<u16>,
    },
}

impl Failure {
    pub fn missing_parameter(param_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::MissingParameter {
            param_type: param_type.into(),
            name: name.into(),
        }
    }

    pub fn business(code: impl Into<String>) -> Self {
        Self::Business {
            code: Some(code.into()),
            message: None,
            params: BTreeMap::new(),
        }
    }

    /// Attach an already rendered message to a business failure
    pub fn with_message(self, text: impl Into<String>) -> Self {
        match self {
            Self::Business { code, params, .. } => Self::Business {
                code,
                message: Some(text.into()),
                params,
            },
            other => other,
        }
    }

    /// Attach an interpolation parameter to a business failure
    pub fn with_param(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match self {
            Self::Business {
                code,
                message,
                mut params,
            } => {
                params.insert(key.into(), value.into());
                Self::Business {
                    code,
                    message,
                    params,
                }
            }
            other => other,
        }
    }

    pub fn skip(permission: impl Into<String>) -> Self {
        Self::Skip {
            permission: permission.into(),
        }
    }

    /// Wrap any error; the full cause chain is kept for logging
    pub fn unexpected(err: impl Into<anyhow::Error>) -> Self {
        Self::Unexpected {
            message: format!("{:#}", err.into()),
            status: None,
        }
    }

    /// Wrap an error that declares the status it should be answered with
    pub fn unexpected_with_status(err: impl Into<anyhow::Error>, status: StatusCode) -> Self {
        Self::Unexpected {
            message: format!("{:#}", err.into()),
            status: Some(status.as_u16()),
        }
    }

    /// Short label used for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::NoContent => "no_content",
            Self::MissingParameter { .. } => "missing_parameter",
            Self::Validation(_) => "validation",
            Self::Business { .. } => "business",
            Self::AccessDenied => "access_denied",
            Self::Concurrency => "concurrency",
            Self::MethodNotAllowed => "method_not_allowed",
            Self::UpstreamHttp { .. } => "upstream_http",
            Self::Skip { .. } => "skip",
            Self::Unexpected { .. } => "unexpected",
        }
    }
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err)
    }
}

impl From<JsonRejection> for Failure {
    fn from(rejection: JsonRejection) -> Self {
        Self::Unexpected {
            status: Some(rejection.status().as_u16()),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for Failure {
    fn from(rejection: QueryRejection) -> Self {
        Self::Unexpected {
            status: Some(rejection.status().as_u16()),
            message: rejection.body_text(),
        }
    }
}

/// Handlers return `Result<_, Failure>`. The failure rides in the response
/// extensions until the error translation middleware renders it.
impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(self);
        response
    }
}
