//! # readnest-core: Pure Storefront Logic for ReadNest
//!
//! This crate holds every rule of the storefront that can be expressed
//! without touching the network or the disk.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ReadNest Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 readnest CLI (apps/storefront)                  │   │
//! │  │   browse ──► cart ──► checkout ──► orders ──► recommendations   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ readnest-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │  ┌────────┐ ┌────────┐ ┌─────────┐ ┌──────────┐ ┌───────────┐  │   │
//! │  │  │ types  │ │ money  │ │ browse  │ │recommend │ │ catalog   │  │   │
//! │  │  │ Book   │ │ Money  │ │ filter  │ │ cosine   │ │ fallbacks │  │   │
//! │  │  │ Order  │ │ TaxRate│ │ sort    │ │ recency  │ │ pricing   │  │   │
//! │  │  └────────┘ └────────┘ └─────────┘ └──────────┘ └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                 │                                   │                   │
//! │  ┌──────────────▼──────────────┐   ┌────────────────▼───────────────┐  │
//! │  │ readnest-db (local store)   │   │ readnest-remote (HTTP clients) │  │
//! │  └─────────────────────────────┘   └────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Book, Order, UsedBook, ExchangeRequest, etc.)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Form and business rule validation
//! - [`catalog`] - Rules applied to public catalog data (defaults, pricing, fallbacks)
//! - [`browse`] - Client-side filtering, sorting and grouping
//! - [`recommend`] - Content-based recommendation scorer
//!
//! ## Example Usage
//!
//! ```rust
//! use readnest_core::money::Money;
//! use readnest_core::types::TaxRate;
//!
//! let subtotal = Money::from_cents(2598); // two books at $12.99
//! let tax = subtotal.calculate_tax(TaxRate::from_bps(800)); // 8%
//! assert_eq!(tax.cents(), 208);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod browse;
pub mod catalog;
pub mod error;
pub mod money;
pub mod recommend;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct books allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single book in the cart.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Number of purchase log entries kept for recommendations.
pub const PURCHASE_LOG_CAPACITY: usize = 50;

/// Rating given to a purchase until the reader leaves feedback.
pub const DEFAULT_PURCHASE_RATING: u8 = 4;

/// Flat shipping fee charged on non-empty carts ($4.99).
pub const DEFAULT_SHIPPING_CENTS: i64 = 499;

/// Sales tax applied to the cart subtotal (8%).
pub const DEFAULT_TAX_RATE_BPS: u32 = 800;

/// Length of the human-facing order reference (`Order #1a2b3c4d`).
pub const ORDER_REFERENCE_LEN: usize = 8;
