/*
[INPUT]:  Error sources (config, transport, decoding, API envelope, URL)
[OUTPUT]: Structured error type shared by the whole crate
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

use crate::types::ApiError;

/// Main error type for the OANDA adapter
#[derive(Error, Debug)]
pub enum OandaError {
    /// Missing or invalid client configuration, raised before any network call
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not decode into the expected shape
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Server reported a nonzero code in the response body
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Non-success HTTP status without an error code in the body
    #[error("Unexpected HTTP status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Request could not be formed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Request was cancelled while in flight
    #[error("Request cancelled")]
    Cancelled,
}

impl OandaError {
    /// Check if the server rejected the call with an error code
    pub fn is_api_error(&self) -> bool {
        matches!(self, OandaError::Api(_))
    }

    /// Envelope details of a business error
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            OandaError::Api(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_config_error(&self) -> bool {
        matches!(self, OandaError::Config(_))
    }

    /// Check if the failure happened before a response was received
    pub fn is_transport_error(&self) -> bool {
        matches!(self, OandaError::Http(_) | OandaError::Cancelled)
    }
}

/// Result type alias for OANDA operations
pub type Result<T> = std::result::Result<T, OandaError>;
