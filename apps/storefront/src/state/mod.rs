//! # State Module
//!
//! Application state for the storefront, one type per concern.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      AppContext (lib.rs)                        │   │
//! │  │  built once in main, borrowed by every page                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │     ┌──────────────┬─────────┴────────┬──────────────────┐             │
//! │     ▼              ▼                  ▼                  ▼              │
//! │  ┌──────────┐ ┌──────────────┐ ┌───────────────┐ ┌──────────────┐     │
//! │  │ DbState  │ │  CartState   │ │ SessionState  │ │ ConfigState  │     │
//! │  │          │ │              │ │               │ │              │     │
//! │  │ Database │ │ Arc<Mutex<   │ │ Arc<RwLock<   │ │ tax, fee,    │     │
//! │  │ (SQLite  │ │   Cart       │ │  Option<      │ │ page sizes   │     │
//! │  │  pool)   │ │ >>           │ │  AuthSession  │ │              │     │
//! │  └──────────┘ └──────────────┘ │ >>>           │ └──────────────┘     │
//! │                                └───────────────┘                       │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: Database has an internal connection pool                   │
//! │  • CartState: std Mutex, never held across an await                    │
//! │  • SessionState: tokio RwLock, held across the token refresh           │
//! │  • ConfigState: read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;
mod db;
mod session;

pub use cart::{Cart, CartItem, CartState, CartTotals};
pub use config::ConfigState;
pub use db::DbState;
pub use session::{Registration, SessionState};
