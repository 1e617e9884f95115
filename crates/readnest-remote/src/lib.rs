//! # readnest-remote: Network Clients for ReadNest
//!
//! HTTP clients for the two external services the storefront composes:
//!
//! - the public book catalog (volumes API), read-only and unauthenticated;
//! - the backend-as-a-service (BaaS): GoTrue-style auth under `/auth/v1`
//!   and PostgREST-style tables under `/rest/v1`.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  storefront page                                                        │
//! │       │                                                                 │
//! │       ├──► CatalogClient ──► GET {catalog}/volumes?q=...                │
//! │       │        └─ failure ──► fallback books (never an error)           │
//! │       │                                                                 │
//! │       ├──► AuthClient ─────► POST {backend}/auth/v1/token               │
//! │       │        └─ AuthSession { access_token, refresh_token, ... }      │
//! │       │                                                                 │
//! │       └──► RowStoreClient ─► {backend}/rest/v1/{table}                  │
//! │                └─ apikey + Bearer access_token                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`config`] - `RemoteConfig` (TOML file + `READNEST_*` environment)
//! - [`error`] - `RemoteError` and `RemoteResult`
//! - [`catalog`] - Public catalog client and volume mapping
//! - [`auth`] - BaaS auth client and `AuthSession`
//! - [`store`] - BaaS row store client

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
mod http;
pub mod store;

pub use auth::{AuthClient, AuthSession, SignUpOutcome};
pub use catalog::CatalogClient;
pub use config::{BackendSettings, CatalogSettings, RemoteConfig};
pub use error::{RemoteError, RemoteResult};
pub use store::RowStoreClient;
