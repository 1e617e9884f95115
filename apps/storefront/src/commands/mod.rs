//! # Page Commands
//!
//! One module per storefront page. Every page is an async function taking
//! the `AppContext` and returning a serializable response or an `ApiError`.
//!
//! ## Page Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Page              Needs login   Talks to                               │
//! │  ────              ───────────   ────────                               │
//! │  home              no            catalog                                │
//! │  browse            no            catalog (10 queries, concurrent)       │
//! │  book              no            catalog                                │
//! │  cart              no            catalog, local store                   │
//! │  checkout          yes           row store, local store                 │
//! │  orders            yes           row store                              │
//! │  account           login/logout  auth, row store, local store           │
//! │  exchange, sell    yes           row store                              │
//! │  publish           yes           local store                            │
//! │  recommendations   no            catalog, local store                   │
//! │  feedback          yes           local store                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod account;
pub mod book;
pub mod browse;
pub mod cart;
pub mod checkout;
pub mod exchange;
pub mod feedback;
pub mod home;
pub mod orders;
pub mod publish;
pub mod recommendations;
pub mod sell;

#[cfg(test)]
pub(crate) mod test_support;
