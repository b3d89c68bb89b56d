use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the remote client.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Missing or malformed client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The response body did not match the expected shape.
    #[error("serialization error: {0}")]
    Serde(String),
}

impl RemoteError {
    /// Rate limits, timeouts, conflicts and server errors are worth another try.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api { status, .. } => super::retry::is_retryable_status(*status),
            Self::Reqwest(e) => e.is_timeout() || e.is_connect(),
            Self::Config(_) | Self::Serde(_) => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

/// Error envelope: `{"error": {"code": "...", "message": "..."}}`.
#[derive(Debug, Deserialize, Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize, Serialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

/// Longest body excerpt carried in an error message.
const SNIPPET_LEN: usize = 400;

fn snippet(body: &[u8]) -> String {
    String::from_utf8_lossy(&body[..body.len().min(SNIPPET_LEN)]).into_owned()
}

pub(crate) fn map_deser(e: &serde_json::Error, body: &[u8]) -> RemoteError {
    RemoteError::Serde(format!("{e}: {}", snippet(body)))
}

/// Build an [`RemoteError::Api`] from a failed response, falling back to
/// the raw body when it is not the usual JSON envelope.
pub(crate) fn api_error(status: StatusCode, body: &[u8]) -> RemoteError {
    let status = status.as_u16();
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => RemoteError::Api {
            status,
            code: envelope.error.code,
            message: envelope.error.message,
        },
        Err(_) => RemoteError::Api {
            status,
            code: None,
            message: snippet(body),
        },
    }
}
