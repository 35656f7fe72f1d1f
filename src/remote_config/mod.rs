//! Client for the configuration service

pub mod client;

pub use client::{ConfigClient, ConfigClientError, ConfigRepository};
