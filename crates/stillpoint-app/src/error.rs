//! Error types for Stillpoint app services
//!
//! Centralized error handling using thiserror. Network failures are
//! rendered through `friendly_network_error` so chat status lines never
//! show raw reqwest debug output.

use stillpoint::error::AudioError;
use thiserror::Error;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error("{}", friendly_network_error(.0))]
    Network(#[from] reqwest::Error),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for Stillpoint app services
pub type Result<T> = std::result::Result<T, AppError>;

fn friendly_network_error(e: &reqwest::Error) -> String {
    if e.is_builder() {
        if let Some(url) = e.url() {
            return format!("Invalid URL: {url}");
        }
        return "Invalid URL".to_string();
    }
    if e.is_connect() {
        if let Some(url) = e.url() {
            return format!("Could not connect to {}", url.host_str().unwrap_or("server"));
        }
        return "Could not connect to server".to_string();
    }
    if e.is_timeout() {
        return "Connection timed out".to_string();
    }
    if e.is_status() {
        if let Some(status) = e.status() {
            return format!("Service returned HTTP {}", status.as_u16());
        }
        return "Service returned an error".to_string();
    }
    if e.is_decode() {
        return "Invalid response from service".to_string();
    }
    format!("Network error: {e}")
}
