//! # Repository Module
//!
//! One repository per local table.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Storefront state                                                       │
//! │       │                                                                 │
//! │       │  db.cart().replace(&lines)                                      │
//! │       ▼                                                                 │
//! │  CartRepository        cart_items                                      │
//! │  SessionRepository     session (single row)                            │
//! │  PurchaseRepository    purchase_history (capped)                       │
//! │  FeedbackRepository    feedback                                        │
//! │  ManuscriptRepository  manuscript_submissions                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each repository maps its table through a private `#[derive(FromRow)]`
//! row struct and converts it into the domain type from `readnest-core`.

pub mod cart;
pub mod feedback;
pub mod manuscript;
pub mod purchase;
pub mod session;
