use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// A configuration file served by the configuration service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Configuration {
    /// Repository path, e.g. `/config/tenants/XM/settings.yml`
    pub path: String,
    /// Raw file content
    #[serde(default)]
    pub content: String,
}

impl Configuration {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Configurations keyed by path
pub type ConfigMap = HashMap<String, Configuration>;

/// Body of the path-filtered config request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConfigPathsRequest {
    /// Configuration version (commit) to read
    pub version: String,
    /// Paths to return
    pub paths: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_map_deserializes() {
        let map: ConfigMap = serde_json::from_value(json!({
            "/config/a.yml": { "path": "/config/a.yml", "content": "a: 1" },
            "/config/empty.yml": { "path": "/config/empty.yml" }
        }))
        .unwrap();

        assert_eq!(map["/config/a.yml"], Configuration::new("/config/a.yml", "a: 1"));
        assert_eq!(map["/config/empty.yml"].content, "");
    }
}
