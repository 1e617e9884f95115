//! # Browse Page
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  --search given?                                                        │
//! │     ├── yes ──► search_books(term, 20)                                  │
//! │     └── no  ──► by_category × 10, joined ──► dedupe by id               │
//! │                         │                                               │
//! │                         ▼                                               │
//! │  BrowseFilter: search / category / price range ──► sort ──► shelves    │
//! │     search given      → one "Search Results" shelf                     │
//! │     category given    → one shelf named after it                        │
//! │     neither           → one shelf per category, in fetch order          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use clap::Args;
use futures::future::join_all;
use readnest_core::browse::{available_categories, BookGroup, BrowseFilter, SortOrder, ALL_CATEGORIES};
use readnest_core::catalog::BROWSE_CATEGORIES;
use readnest_core::validation::validate_search_query;
use readnest_core::{Book, Money, ValidationError};
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::AppContext;

/// Filter controls of the browse page.
#[derive(Debug, Clone, Args)]
pub struct BrowseArgs {
    /// Title or author to search for
    #[arg(short, long)]
    pub search: Option<String>,

    /// Category to show, or "all"
    #[arg(short, long, default_value = ALL_CATEGORIES)]
    pub category: String,

    /// Lowest price, in dollars
    #[arg(long, default_value_t = 0.0)]
    pub min_price: f64,

    /// Highest price, in dollars
    #[arg(long, default_value_t = 100.0)]
    pub max_price: f64,

    /// popular, price-low, price-high, rating or newest
    #[arg(long, default_value_t = SortOrder::Popular)]
    pub sort: SortOrder,
}

impl Default for BrowseArgs {
    fn default() -> Self {
        BrowseArgs {
            search: None,
            category: ALL_CATEGORIES.to_string(),
            min_price: 0.0,
            max_price: 100.0,
            sort: SortOrder::Popular,
        }
    }
}

impl BrowseArgs {
    /// Validates the controls and turns them into a filter.
    pub fn filter(&self) -> Result<BrowseFilter, ApiError> {
        let search = match &self.search {
            Some(raw) => Some(validate_search_query(raw)?).filter(|s| !s.is_empty()),
            None => None,
        };

        if self.min_price < 0.0 || self.max_price < 0.0 {
            return Err(ValidationError::MustBePositive {
                field: "price range".to_string(),
            }
            .into());
        }

        let min_price = Money::from_major_f64(self.min_price);
        let max_price = Money::from_major_f64(self.max_price);
        if min_price > max_price {
            return Err(ApiError::validation("min price must not exceed max price"));
        }

        Ok(BrowseFilter {
            search,
            category: self.category.clone(),
            min_price,
            max_price,
            sort: self.sort,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BrowsePage {
    pub filter: BrowseFilter,
    /// "all" followed by the categories present in the fetched books.
    pub categories: Vec<String>,
    pub shelves: Vec<BookGroup>,
    pub total: usize,
}

pub async fn run(ctx: &AppContext, args: &BrowseArgs) -> Result<BrowsePage, ApiError> {
    let filter = args.filter()?;

    let books = match filter.search_term() {
        Some(term) => ctx.catalog.search_books(term, ctx.config.search_results).await,
        None => fetch_all_categories(ctx).await,
    };
    debug!(fetched = books.len(), "Browse books loaded");

    let categories = available_categories(&books);
    let shelves = filter.shelves(&books);
    let total = shelves.iter().map(|g| g.books.len()).sum();

    Ok(BrowsePage {
        filter,
        categories,
        shelves,
        total,
    })
}

/// Runs one catalog query per browse category concurrently.
///
/// Failed queries answer with the same fallback books, so results are
/// de-duplicated by id, keeping the first occurrence.
async fn fetch_all_categories(ctx: &AppContext) -> Vec<Book> {
    let per_category = ctx.config.browse_per_category;
    let results = join_all(
        BROWSE_CATEGORIES
            .iter()
            .map(|category| ctx.catalog.by_category(category, per_category)),
    )
    .await;

    let mut seen = HashSet::new();
    results
        .into_iter()
        .flatten()
        .filter(|book| seen.insert(book.id.clone()))
        .collect()
}
