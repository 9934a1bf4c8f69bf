use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Server root, e.g. `http://localhost:8080`. A trailing slash is ignored.
    pub base_url: String,
    /// Sent as `Authorization: Bearer <token>` when present.
    pub token: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            token: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("could not build http client: {0}")]
    Http(#[from] reqwest::Error),
    #[error("could not start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}
