//! # Remote Error Types
//!
//! Error types for catalog, auth and row store requests.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Remote Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     HTTP Status         │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Connection     │  │  Unauthorized (401)     │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  RateLimited (429)      │ │
//! │  │  ConfigLoad/Save│  │  RequestFailed  │  │  Api { status, msg }    │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────────────────────────────────┐  │
//! │  │     Decode      │  │                 Auth                        │  │
//! │  │                 │  │                                             │  │
//! │  │  DecodeFailed   │  │  InvalidCredentials  EmailNotConfirmed      │  │
//! │  │  EmptyResponse  │  │  SessionExpired      InvalidToken           │  │
//! │  └─────────────────┘  └─────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors raised by the network clients.
#[derive(Debug, Error)]
pub enum RemoteError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid remote configuration.
    #[error("Invalid remote configuration: {0}")]
    InvalidConfig(String),

    /// A configured or constructed URL is not usable.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Could not reach the service.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The service did not answer in time.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Any other failure while sending the request.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    // =========================================================================
    // HTTP Status Errors
    // =========================================================================
    /// 401 from the service.
    #[error("Unauthorized")]
    Unauthorized,

    /// 429 from the service.
    #[error("Rate limited, try again later")]
    RateLimited,

    /// Any other non-success status.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    // =========================================================================
    // Decode Errors
    // =========================================================================
    /// The response body is not what we expected.
    #[error("Failed to decode response: {0}")]
    DecodeFailed(String),

    /// A `return=representation` insert came back with no rows.
    #[error("{table} insert returned no rows")]
    EmptyResponse { table: String },

    // =========================================================================
    // Auth Errors
    // =========================================================================
    /// Wrong email or password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The account exists but the email address is not confirmed yet.
    #[error("Please confirm your email address before signing in")]
    EmailNotConfirmed,

    /// The session can no longer be refreshed.
    #[error("Your session has expired, please sign in again")]
    SessionExpired,

    /// An access token could not be read.
    #[error("Invalid access token: {0}")]
    InvalidToken(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout(err.to_string())
        } else if err.is_connect() {
            RemoteError::ConnectionFailed(err.to_string())
        } else if err.is_decode() {
            RemoteError::DecodeFailed(err.to_string())
        } else if err.is_builder() {
            RemoteError::InvalidConfig(err.to_string())
        } else {
            RemoteError::RequestFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::DecodeFailed(err.to_string())
    }
}

impl From<url::ParseError> for RemoteError {
    fn from(err: url::ParseError) -> Self {
        RemoteError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for RemoteError {
    fn from(err: std::io::Error) -> Self {
        RemoteError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for RemoteError {
    fn from(err: toml::de::Error) -> Self {
        RemoteError::ConfigLoadFailed(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for RemoteError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        RemoteError::InvalidToken(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RemoteError::Api {
            status: 409,
            message: "duplicate key".into(),
        };
        assert_eq!(err.to_string(), "API error 409: duplicate key");

        let err = RemoteError::EmptyResponse {
            table: "orders".into(),
        };
        assert_eq!(err.to_string(), "orders insert returned no rows");
    }
}
