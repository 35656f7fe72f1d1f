pub mod configuration;

pub use configuration::{ConfigMap, ConfigPathsRequest, Configuration};
