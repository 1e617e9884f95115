//! # Error Types
//!
//! Domain-specific error types for readnest-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  readnest-core errors (this file)                                      │
//! │  ├── CoreError        - Storefront rule violations                     │
//! │  └── ValidationError  - Form input failures                            │
//! │                                                                         │
//! │  readnest-db errors                                                     │
//! │  └── DbError          - Local store failures                           │
//! │                                                                         │
//! │  readnest-remote errors                                                 │
//! │  └── RemoteError      - Catalog / auth / row store failures            │
//! │                                                                         │
//! │  storefront app                                                        │
//! │  └── ApiError         - What the page renders                          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                  │
//! │                 DbError, RemoteError ┴─► ApiError → Page               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core storefront errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Book cannot be found in the catalog.
    #[error("Book not found: {0}")]
    BookNotFound(String),

    /// Cart has reached the maximum number of distinct books.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds the maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Book is not in the cart.
    #[error("Book {0} is not in the cart")]
    NotInCart(String),

    /// Checkout was attempted with an empty cart.
    #[error("Your cart is empty")]
    EmptyCart,

    /// The page requires a signed-in user.
    ///
    /// ## When This Occurs
    /// - No stored session
    /// - Stored session expired and could not be refreshed
    #[error("You must be logged in to {action}")]
    NotAuthenticated { action: String },

    /// A status change that the entity's lifecycle does not allow.
    #[error("{entity} {id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        entity: String,
        id: String,
        from: String,
        to: String,
    },

    /// The user is not allowed to act on this record.
    #[error("Not permitted: {0}")]
    Forbidden(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotAuthenticated error for the given action.
    pub fn not_authenticated(action: impl Into<String>) -> Self {
        CoreError::NotAuthenticated {
            action: action.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by the form validators before any request leaves the process.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid email, invalid expiry date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Two fields that must match do not.
    #[error("{field} does not match")]
    Mismatch { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::QuantityTooLarge {
            requested: 1200,
            max: 999,
        };
        assert_eq!(err.to_string(), "Quantity 1200 exceeds maximum allowed (999)");

        let err = CoreError::not_authenticated("checkout");
        assert_eq!(err.to_string(), "You must be logged in to checkout");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "title".to_string(),
        };
        assert_eq!(err.to_string(), "title is required");

        let err = ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        };
        assert_eq!(err.to_string(), "password must be at least 6 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Mismatch {
            field: "password confirmation".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
