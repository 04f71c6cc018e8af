//! Uniform error shape for remote calls.

use serde::Deserialize;
use thiserror::Error;

/// Failure of a remote call: network error, non-2xx response, or an
/// undecodable body. `status` is absent when no response was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RemoteError {
    pub message: String,
    pub status: Option<u16>,
}

/// Error body the catalog server sends with non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub path: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    /// No response was received.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(message, None)
    }

    /// Builds the error for a non-2xx response, preferring the server's message.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<ErrorPayload>(body)
            .ok()
            .map(|payload| payload.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| format!("Request failed with status {}", status));
        Self::new(message, Some(status))
    }

    /// Network failures, 408, 429 and 5xx are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self.status {
            None => true,
            Some(status) => status == 408 || status == 429 || (500..600).contains(&status),
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        if err.is_timeout() {
            return Self::new("Request timed out", status);
        }
        if err.is_decode() {
            return Self::new(format!("Failed to decode response: {}", err), status);
        }
        Self::new(err.to_string(), status)
    }
}
