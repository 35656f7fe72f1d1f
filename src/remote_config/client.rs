use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::RemoteConfigConfig;
use crate::errors::Failure;
use crate::metrics::registry::{CONFIG_CLIENT_CALLS_TOTAL, CONFIG_CLIENT_ERRORS_TOTAL};
use crate::models::{ConfigMap, ConfigPathsRequest};

const CONFIG_MAP_PATH: &str = "/api/private/config_map";
const VERSION_PARAM: &str = "version";

#[derive(Debug, Error)]
pub enum ConfigClientError {
    #[error("failed to build config service client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("config service request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("config service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse config service response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl From<ConfigClientError> for Failure {
    fn from(err: ConfigClientError) -> Self {
        match err {
            ConfigClientError::Status { status, .. } => Failure::UpstreamHttp {
                status: Some(status),
            },
            ConfigClientError::Transport(e) => Failure::UpstreamHttp {
                status: e.status().map(|s| s.as_u16()),
            },
            other => Failure::unexpected(other),
        }
    }
}

/// Source of configuration files
#[async_trait]
pub trait ConfigRepository: Send + Sync {
    /// Every configuration at `version`
    async fn get_config(&self, version: &str) -> Result<ConfigMap, ConfigClientError>;

    /// Configurations at `version` restricted to `paths`
    async fn get_config_paths(
        &self,
        version: &str,
        paths: &[String],
    ) -> Result<ConfigMap, ConfigClientError>;
}

/// HTTP client for the configuration service's private config map endpoint
#[derive(Clone)]
pub struct ConfigClient {
    http_client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ConfigClient {
    pub fn new(config: &RemoteConfigConfig) -> Result<Self, ConfigClientError> {
        // Build HTTP client with required headers
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("service-commons/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()
            .map_err(ConfigClientError::Build)?;

        info!(
            "Initialized config service client for {} (timeout {} ms)",
            config.url, config.timeout_ms
        );

        Ok(Self {
            http_client,
            base_url: config.url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn config_map_url(&self) -> String {
        format!("{}{}", self.base_url, CONFIG_MAP_PATH)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and decode the config map from a successful response
    async fn execute(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<ConfigMap, ConfigClientError> {
        CONFIG_CLIENT_CALLS_TOTAL.with_label_values(&[operation]).inc();

        let response = self.authorize(request).send().await.map_err(|e| {
            CONFIG_CLIENT_ERRORS_TOTAL
                .with_label_values(&["transport"])
                .inc();
            warn!("Config service unreachable: {}", e);
            ConfigClientError::Transport(e)
        })?;

        if !response.status().is_success() {
            let status = response.status();
            CONFIG_CLIENT_ERRORS_TOTAL
                .with_label_values(&[&status.as_u16().to_string()])
                .inc();
            let body = response.text().await.unwrap_or_default();
            warn!(
                operation = operation,
                status = status.as_u16(),
                body = %body,
                "Config service returned an error"
            );
            return Err(ConfigClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let configs: ConfigMap = response.json().await.map_err(ConfigClientError::Decode)?;
        debug!("Received {} configurations ({})", configs.len(), operation);
        Ok(configs)
    }
}

#[async_trait]
impl ConfigRepository for ConfigClient {
    async fn get_config(&self, version: &str) -> Result<ConfigMap, ConfigClientError> {
        debug!("Fetching config map for version {}", version);

        let request = self
            .http_client
            .get(self.config_map_url())
            .query(&[(VERSION_PARAM, version)]);

        self.execute("get_config", request).await
    }

    async fn get_config_paths(
        &self,
        version: &str,
        paths: &[String],
    ) -> Result<ConfigMap, ConfigClientError> {
        debug!(
            "Fetching {} config paths for version {}",
            paths.len(),
            version
        );

        let body = ConfigPathsRequest {
            version: version.to_string(),
            paths: paths.to_vec(),
        };
        let request = self.http_client.post(self.config_map_url()).json(&body);

        self.execute("get_config_paths", request).await
    }
}
