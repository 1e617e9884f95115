//! # Page Error Type
//!
//! Unified error type for storefront pages.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in ReadNest                               │
//! │                                                                         │
//! │  readnest cart add <id>                                                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Page Function                                                   │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Local store?  ──── DbError::QueryFailed("...") ────┐           │  │
//! │  │         │                                           │           │  │
//! │  │         ▼                                           ▼           │  │
//! │  │  Catalog/BaaS? ──── RemoteError::Api{..} ─────── ApiError ─────►│  │
//! │  │         │                                           ▲           │  │
//! │  │         ▼                                           │           │  │
//! │  │  Rules?        ──── CoreError::EmptyCart ───────────┘           │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  text mode:  ✗ [CartError] Your cart is empty                           │
//! │  --json:     {"code":"CART_ERROR","message":"Your cart is empty"}       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use readnest_core::{CoreError, ValidationError};
use readnest_db::DbError;
use readnest_remote::RemoteError;
use serde::Serialize;

/// Error returned from a page.
///
/// ## Serialization
/// This is what `--json` prints when a page fails:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Book not found: zyTCAlFPjgYC"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for page responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Local store operation failed
    DatabaseError,

    /// A rule of the storefront was broken (status transitions, permissions)
    BusinessLogic,

    /// Internal error
    Internal,

    /// Cart operation failed
    CartError,

    /// The page needs a signed-in user
    NotAuthenticated,

    /// Sign-in, sign-up or token refresh was refused
    AuthError,

    /// The catalog or the BaaS failed
    RemoteError,

    /// Configuration is missing or invalid
    ConfigError,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates a cart error.
    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }
}

/// Converts local store errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::CheckViolation { message } => {
                tracing::error!("Check constraint violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Value out of range")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Local store connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Local store migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Local store operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Local store transaction failed")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Local store pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Local store operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::BookNotFound(id) => ApiError::not_found("Book", &id),
            CoreError::CartTooLarge { .. }
            | CoreError::NotInCart(_)
            | CoreError::EmptyCart => ApiError::cart(err.to_string()),
            CoreError::QuantityTooLarge { .. } => ApiError::validation(err.to_string()),
            CoreError::NotAuthenticated { .. } => {
                ApiError::new(ErrorCode::NotAuthenticated, err.to_string())
            }
            CoreError::InvalidStatusTransition { .. } | CoreError::Forbidden(_) => {
                ApiError::new(ErrorCode::BusinessLogic, err.to_string())
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts catalog and BaaS errors to API errors.
impl From<RemoteError> for ApiError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::InvalidConfig(_)
            | RemoteError::InvalidUrl(_)
            | RemoteError::ConfigLoadFailed(_) => {
                ApiError::new(ErrorCode::ConfigError, err.to_string())
            }
            RemoteError::InvalidCredentials | RemoteError::EmailNotConfirmed => {
                ApiError::new(ErrorCode::AuthError, err.to_string())
            }
            RemoteError::Unauthorized | RemoteError::SessionExpired => ApiError::new(
                ErrorCode::NotAuthenticated,
                "Your session has expired, please log in again",
            ),
            RemoteError::InvalidToken(e) => {
                tracing::error!("Invalid access token: {}", e);
                ApiError::new(ErrorCode::AuthError, "Received an invalid access token")
            }
            RemoteError::RateLimited => {
                ApiError::new(ErrorCode::RemoteError, "Too many requests, try again shortly")
            }
            RemoteError::Api { status: 404, message } => {
                ApiError::new(ErrorCode::NotFound, message)
            }
            RemoteError::Api { status, message } => {
                tracing::error!(status, "Remote request failed: {}", message);
                ApiError::new(ErrorCode::RemoteError, format!("Request failed ({})", status))
            }
            RemoteError::ConnectionFailed(e) | RemoteError::Timeout(e) | RemoteError::RequestFailed(e) => {
                tracing::error!("Remote service unreachable: {}", e);
                ApiError::new(ErrorCode::RemoteError, "Service is unreachable, try again later")
            }
            RemoteError::DecodeFailed(e) => {
                tracing::error!("Remote response could not be decoded: {}", e);
                ApiError::new(ErrorCode::RemoteError, "Unexpected response from service")
            }
            RemoteError::EmptyResponse { table } => {
                tracing::error!(table = %table, "Row store returned no rows");
                ApiError::new(ErrorCode::RemoteError, "Unexpected response from service")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
