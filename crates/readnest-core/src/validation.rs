//! # Validation Module
//!
//! Input validation for every form in the storefront.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI arguments (clap)                                         │
//! │  └── Types and required flags                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Emails, passwords, card details                                   │
//! │  └── Listing and manuscript rules                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Storage                                                       │
//! │  ├── SQLite CHECK / NOT NULL constraints (local store)                 │
//! │  └── Row store table constraints (remote)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use readnest_core::validation::{validate_email, validate_quantity};
//!
//! validate_email("reader@example.com").unwrap();
//! validate_quantity(2).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::ShippingAddress;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Maximum display name length.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum search query length.
pub const MAX_QUERY_LEN: usize = 100;

fn required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn invalid(field: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

// =============================================================================
// Account Validators
// =============================================================================

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty
/// - Exactly one `@`, with a non-empty local part
/// - Domain contains a dot that is neither first nor last
///
/// ## Example
/// ```rust
/// use readnest_core::validation::validate_email;
///
/// assert!(validate_email("jane@example.com").is_ok());
/// assert!(validate_email("jane@localhost").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    required("email", email)?;

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("email", "must contain @"))?;

    if local.is_empty() || domain.contains('@') || email.contains(char::is_whitespace) {
        return Err(invalid("email", "must be a single address"));
    }

    let has_dot = domain
        .find('.')
        .map(|i| i > 0 && i < domain.len() - 1 && !domain.ends_with('.'))
        .unwrap_or(false);
    if !has_dot {
        return Err(invalid("email", "domain must contain a dot"));
    }

    Ok(())
}

/// Validates a password at sign-up.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

/// Checks that the confirmation matches the password.
pub fn validate_password_confirmation(password: &str, confirmation: &str) -> ValidationResult<()> {
    if password != confirmation {
        return Err(ValidationError::Mismatch {
            field: "password confirmation".to_string(),
        });
    }
    Ok(())
}

/// Validates a display name.
///
/// ## Returns
/// The trimmed name.
pub fn validate_display_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();
    required("name", name)?;

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart quantity.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  readnest cart update <book-id> 5                                      │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0?  → Error: "quantity must be positive"              │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       └── OK → update line                                             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates the asking price of a listing. Must be above zero.
pub fn validate_listing_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Validates a stored amount in cents. Zero is allowed.
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a row id issued by the row store.
///
/// ## Example
/// ```rust
/// use readnest_core::validation::validate_uuid;
///
/// assert!(validate_uuid("request id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("request id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    required(field, id)?;
    uuid::Uuid::parse_str(id.trim()).map_err(|_| invalid(field, "must be a valid UUID"))?;
    Ok(())
}

/// Validates a star rating (1 - 5).
pub fn validate_rating(rating: i64) -> ValidationResult<u8> {
    if !(1..=5).contains(&rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: 1,
            max: 5,
        });
    }
    Ok(rating as u8)
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (no search)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Checkout Validators
// =============================================================================

/// Validates every field of the shipping form.
pub fn validate_shipping_address(address: &ShippingAddress) -> ValidationResult<()> {
    required("first name", &address.first_name)?;
    required("last name", &address.last_name)?;
    validate_email(&address.email)?;
    required("address", &address.address)?;
    required("city", &address.city)?;
    required("zip code", &address.zip_code)?;
    Ok(())
}

/// Card details entered on the payment step.
///
/// Never stored or transmitted; only checked for shape.
#[derive(Debug, Clone)]
pub struct CardDetails {
    pub number: String,
    pub name: String,
    /// `MM/YY`.
    pub expiry: String,
    pub cvv: String,
}

/// Validates the payment form.
///
/// ## Rules
/// ```text
/// number   13 - 19 digits (spaces and dashes ignored)
/// name     not empty
/// expiry   MM/YY, month 01 - 12
/// cvv      3 or 4 digits
/// ```
pub fn validate_card(card: &CardDetails) -> ValidationResult<()> {
    let digits: String = card
        .number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    required("card number", &digits)?;
    if !digits.chars().all(|c| c.is_ascii_digit()) || !(13..=19).contains(&digits.len()) {
        return Err(invalid("card number", "must be 13 to 19 digits"));
    }

    required("name on card", &card.name)?;

    let expiry = card.expiry.trim();
    required("expiry date", expiry)?;
    let month = expiry
        .split_once('/')
        .filter(|(mm, yy)| {
            mm.len() == 2
                && yy.len() == 2
                && mm.chars().all(|c| c.is_ascii_digit())
                && yy.chars().all(|c| c.is_ascii_digit())
        })
        .and_then(|(mm, _)| mm.parse::<u32>().ok())
        .ok_or_else(|| invalid("expiry date", "must be MM/YY"))?;
    if !(1..=12).contains(&month) {
        return Err(invalid("expiry date", "month must be 01 to 12"));
    }

    let cvv = card.cvv.trim();
    required("cvv", cvv)?;
    if !cvv.chars().all(|c| c.is_ascii_digit()) || !(3..=4).contains(&cvv.len()) {
        return Err(invalid("cvv", "must be 3 or 4 digits"));
    }

    Ok(())
}

// =============================================================================
// Listing Validators
// =============================================================================

/// Validates a used-book listing before it is sent to the row store.
pub fn validate_used_book_listing(title: &str, author: &str, price: Money) -> ValidationResult<()> {
    required("title", title)?;
    required("author", author)?;
    validate_listing_price(price)
}

/// Validates an ISBN-10 or ISBN-13.
///
/// Hyphens and spaces are ignored. A trailing `X` is allowed on ISBN-10.
/// Check digits are not verified.
pub fn validate_isbn(isbn: &str) -> ValidationResult<String> {
    let cleaned: String = isbn
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_uppercase();

    let valid = cleaned.is_ascii()
        && match cleaned.len() {
            10 => {
                let (body, last) = cleaned.split_at(9);
                body.chars().all(|c| c.is_ascii_digit())
                    && last.chars().all(|c| c.is_ascii_digit() || c == 'X')
            }
            13 => cleaned.chars().all(|c| c.is_ascii_digit()),
            _ => false,
        };

    if !valid {
        return Err(invalid("isbn", "must be 10 or 13 digits"));
    }

    Ok(cleaned)
}

/// Validates a manuscript submission.
pub fn validate_manuscript(
    title: &str,
    author: &str,
    description: &str,
    category: &str,
    price: Money,
    isbn: Option<&str>,
    pages: Option<u32>,
) -> ValidationResult<()> {
    required("title", title)?;
    required("author", author)?;
    required("description", description)?;
    required("category", category)?;
    validate_listing_price(price)?;

    if let Some(isbn) = isbn.filter(|s| !s.trim().is_empty()) {
        validate_isbn(isbn)?;
    }

    if pages == Some(0) {
        return Err(ValidationError::MustBePositive {
            field: "pages".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
