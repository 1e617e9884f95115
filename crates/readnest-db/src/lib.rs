//! # readnest-db: Local Store for ReadNest
//!
//! This crate keeps the device-local half of the storefront in SQLite:
//! the cart, the signed-in session, the purchase log that feeds
//! recommendations, feedback and manuscript drafts.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ReadNest Data Flow                               │
//! │                                                                         │
//! │  readnest cart add <id>                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   readnest-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐  │   │
//! │  │   │   Database    │    │   Repositories     │  │ Migrations │  │   │
//! │  │   │   (pool.rs)   │    │                    │  │ (embedded) │  │   │
//! │  │   │               │    │ CartRepository     │  │            │  │   │
//! │  │   │ SqlitePool    │◄───│ SessionRepository  │  │ 001_init   │  │   │
//! │  │   │               │    │ PurchaseRepository │  │            │  │   │
//! │  │   │               │    │ FeedbackRepository │  │            │  │   │
//! │  │   │               │    │ ManuscriptRepo...  │  │            │  │   │
//! │  │   └───────────────┘    └────────────────────┘  └────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SQLite: <platform data dir>/readnest.db                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per local table
//!
//! ## Usage
//!
//! ```rust,ignore
//! use readnest_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("readnest.db")).await?;
//! let lines = db.cart().load().await?;
//! let log = db.purchases().recent("user-1", 50).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::cart::{CartLine, CartRepository};
pub use repository::feedback::FeedbackRepository;
pub use repository::manuscript::ManuscriptRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::session::{SessionRepository, StoredSession};
