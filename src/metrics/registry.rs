use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Error translation
    pub static ref API_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "api_errors_total",
        "Total error responses rendered by the error translator",
        &["code", "status"]
    )
    .unwrap();

    // Remote config client
    pub static ref CONFIG_CLIENT_CALLS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "config_client_calls_total",
        "Total calls to the configuration service",
        &["operation"]  // operation: get_config, get_config_paths
    )
    .unwrap();

    pub static ref CONFIG_CLIENT_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "config_client_errors_total",
        "Total configuration service errors",
        &["status_code"]  // "transport" when no response was received
    )
    .unwrap();
}

/// Initialize all metrics (called on startup)
pub fn init_metrics() {
    // Force lazy_static initialization
    lazy_static::initialize(&HTTP_REQUESTS_TOTAL);
    lazy_static::initialize(&HTTP_REQUEST_DURATION_SECONDS);
    lazy_static::initialize(&API_ERRORS_TOTAL);
    lazy_static::initialize(&CONFIG_CLIENT_CALLS_TOTAL);
    lazy_static::initialize(&CONFIG_CLIENT_ERRORS_TOTAL);
}
