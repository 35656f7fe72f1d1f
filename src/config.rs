use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::i18n::Locale;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub i18n: I18nConfig,
    pub remote_config: RemoteConfigConfig,
    pub tenant: TenantConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub instance_id: String,
}

#[derive(Debug, Clone)]
pub struct I18nConfig {
    pub default_locale: Locale,
    pub messages_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RemoteConfigConfig {
    pub url: String,
    pub timeout_ms: u64,
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TenantConfig {
    pub header: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub result_details: bool,
    pub body_max_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("API_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .context("API_PORT must be a valid port number")?,
                // Used only for debugging/observability. If unset, fall back to HOSTNAME if
                // present (e.g. Docker/Kubernetes), otherwise "unknown".
                instance_id: env::var("INSTANCE_ID")
                    .or_else(|_| env::var("HOSTNAME"))
                    .unwrap_or_else(|_| "unknown".to_string()),
            },
            i18n: I18nConfig {
                default_locale: env::var("DEFAULT_LOCALE")
                    .unwrap_or_else(|_| "en".to_string())
                    .parse()
                    .context("DEFAULT_LOCALE must be a valid language tag")?,
                messages_path: env::var("MESSAGES_PATH").ok().map(PathBuf::from),
            },
            remote_config: RemoteConfigConfig {
                url: env::var("CONFIG_SERVICE_URL")
                    .unwrap_or_else(|_| "http://localhost:8084".to_string()),
                timeout_ms: env::var("CONFIG_SERVICE_TIMEOUT_MS")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()
                    .context("CONFIG_SERVICE_TIMEOUT_MS must be a valid number")?,
                token: env::var("CONFIG_SERVICE_TOKEN").ok().filter(|t| !t.is_empty()),
            },
            tenant: TenantConfig {
                header: env::var("TENANT_HEADER").unwrap_or_else(|_| "x-tenant".to_string()),
            },
            logging: LoggingConfig {
                result_details: env::var("LOG_RESULT_DETAILS")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()
                    .context("LOG_RESULT_DETAILS must be true or false")?,
                body_max_bytes: env::var("LOG_BODY_MAX_BYTES")
                    .unwrap_or_else(|_| "65536".to_string())
                    .parse()
                    .context("LOG_BODY_MAX_BYTES must be a valid number")?,
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
