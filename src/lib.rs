// Library exports for testing
pub mod api;
pub mod config;
pub mod errors;
pub mod i18n;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod remote_config;
pub mod tenant;
