//! Compact one-line renderings of handler results for the request log

use axum::http::StatusCode;
use serde_json::Value;
use std::fmt;

/// Placeholder for bodies that must not be logged
pub const HIDDEN: &str = "#hidden#";

/// Placeholder for bodies that were sent without being read for the log
pub const UNBUFFERED: &str = "#unbuffered#";

/// Per-route logging options, attached to a response as an extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogPrintConfig {
    /// Print the body at all
    pub result_details: bool,
    /// Print arrays as their size instead of their elements
    pub result_collection_aware: bool,
}

impl Default for LogPrintConfig {
    fn default() -> Self {
        Self {
            result_details: true,
            result_collection_aware: true,
        }
    }
}

/// A printed `status=..., body=...` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestResult {
    status: String,
    body: String,
}

impl fmt::Display for RestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status={}, body={}", self.status, self.body)
    }
}

/// Render a handler result.
///
/// `status` is `None` when the handler produced a bare value; it prints as
/// `OK`. A route config, when present, takes precedence over `print_body`.
pub fn print_rest_result(
    status: Option<StatusCode>,
    body: Option<&Value>,
    print_body: bool,
    route: Option<&LogPrintConfig>,
) -> RestResult {
    let details = route.map_or(print_body, |c| c.result_details);
    let collection_aware = route.map_or(true, |c| c.result_collection_aware);

    let body = if !details {
        HIDDEN.to_string()
    } else {
        match body {
            None | Some(Value::Null) => "null".to_string(),
            Some(Value::Array(items)) if collection_aware => {
                format!("[<array> size = {}]", items.len())
            }
            Some(value) => render(value),
        }
    };

    RestResult {
        status: print_status(status),
        body,
    }
}

/// Render a result whose body is present but was not read (streamed, too large or not JSON)
pub fn print_unbuffered_result(
    status: Option<StatusCode>,
    print_body: bool,
    route: Option<&LogPrintConfig>,
) -> RestResult {
    let details = route.map_or(print_body, |c| c.result_details);
    RestResult {
        status: print_status(status),
        body: if details { UNBUFFERED } else { HIDDEN }.to_string(),
    }
}

fn print_status(status: Option<StatusCode>) -> String {
    match status {
        Some(status) => status.as_u16().to_string(),
        None => "OK".to_string(),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(render).collect();
            format!("[{}]", parts.join(", "))
        }
        other => other.to_string(),
    }
}
