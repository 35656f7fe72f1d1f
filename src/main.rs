use anyhow::{Context, Result};
use axum::http::HeaderName;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use service_commons::api::handlers::AppStateInner;
use service_commons::api::middleware::RequestLogging;
use service_commons::api::routes::create_router;
use service_commons::config::Config;
use service_commons::errors::ErrorClassifier;
use service_commons::i18n::InMemoryCatalog;
use service_commons::metrics;
use service_commons::remote_config::ConfigClient;
use service_commons::tenant::TenantHeader;

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Starting graceful shutdown...");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,service_commons=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Service Commons v{}", env!("CARGO_PKG_VERSION"));

    // Initialize metrics
    metrics::registry::init_metrics();
    info!("Metrics registry initialized");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Configuration loaded successfully");

    // Message catalog: built-in messages, overridden by the optional message file
    let mut catalog = InMemoryCatalog::with_defaults(config.i18n.default_locale.clone());
    if let Some(path) = &config.i18n.messages_path {
        catalog
            .load_file(path)
            .with_context(|| format!("Failed to load messages from {}", path.display()))?;
    }
    let classifier = Arc::new(ErrorClassifier::new(
        Arc::new(catalog),
        config.i18n.default_locale.clone(),
    ));
    info!("Error messages default to locale {}", config.i18n.default_locale);

    // Initialize config service client
    let config_client =
        ConfigClient::new(&config.remote_config).context("Failed to build config service client")?;

    let tenant_header: HeaderName = config
        .tenant
        .header
        .parse()
        .context("TENANT_HEADER must be a valid header name")?;

    // Create application state
    let state = Arc::new(AppStateInner {
        config_repository: Arc::new(config_client),
        classifier,
        request_logging: RequestLogging {
            print_body: config.logging.result_details,
            body_max_bytes: config.logging.body_max_bytes,
            tenant_header: tenant_header.clone(),
        },
        tenant_header: TenantHeader(tenant_header),
        instance_id: config.server.instance_id.clone(),
    });

    // Create router
    let app = create_router(state);

    // Start server
    let addr = config.server_address();
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind server")?;

    info!("Server listening on {}", addr);

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");

    Ok(())
}
