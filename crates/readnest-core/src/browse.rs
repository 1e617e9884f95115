//! # Browse
//!
//! Client-side filtering, sorting and grouping of catalog results.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  fetched books                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  filter: search (title/author) ∧ category ∧ min ≤ price ≤ max          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  sort:   popular | price-low | price-high | rating | newest            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  group:  category = all, no search → one shelf per category            │
//! │          search                    → "Search Results"                  │
//! │          category = x              → "x"                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Book;

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// Group name used when a search term is active.
pub const SEARCH_RESULTS_GROUP: &str = "Search Results";

/// Upper bound of the default price slider ($100).
pub const DEFAULT_MAX_PRICE_CENTS: i64 = 10_000;

// =============================================================================
// Sort Order
// =============================================================================

/// How the browse page orders books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Most reviewed first.
    #[default]
    Popular,
    PriceLow,
    PriceHigh,
    /// Highest rated first.
    Rating,
    /// Most recently published first; undated books last.
    Newest,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortOrder::Popular => "popular",
            SortOrder::PriceLow => "price-low",
            SortOrder::PriceHigh => "price-high",
            SortOrder::Rating => "rating",
            SortOrder::Newest => "newest",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "popular" => Ok(SortOrder::Popular),
            "price-low" => Ok(SortOrder::PriceLow),
            "price-high" => Ok(SortOrder::PriceHigh),
            "rating" => Ok(SortOrder::Rating),
            "newest" => Ok(SortOrder::Newest),
            _ => Err(ValidationError::NotAllowed {
                field: "sort".to_string(),
                allowed: ["popular", "price-low", "price-high", "rating", "newest"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
        }
    }
}

impl SortOrder {
    fn compare(&self, a: &Book, b: &Book) -> Ordering {
        match self {
            SortOrder::Popular => b.review_count.cmp(&a.review_count),
            SortOrder::PriceLow => a.price.cmp(&b.price),
            SortOrder::PriceHigh => b.price.cmp(&a.price),
            SortOrder::Rating => b.rating.total_cmp(&a.rating),
            // None sorts below Some, so reversing puts undated books last
            SortOrder::Newest => b.published_on().cmp(&a.published_on()),
        }
    }
}

// =============================================================================
// Filter
// =============================================================================

/// The browse page's filter controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowseFilter {
    /// Case-insensitive substring of title or author.
    pub search: Option<String>,
    /// `all` or a category name (case-insensitive).
    pub category: String,
    pub min_price: Money,
    pub max_price: Money,
    pub sort: SortOrder,
}

impl Default for BrowseFilter {
    fn default() -> Self {
        BrowseFilter {
            search: None,
            category: ALL_CATEGORIES.to_string(),
            min_price: Money::zero(),
            max_price: Money::from_cents(DEFAULT_MAX_PRICE_CENTS),
            sort: SortOrder::Popular,
        }
    }
}

/// A named shelf of books.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookGroup {
    pub name: String,
    pub books: Vec<Book>,
}

impl BrowseFilter {
    /// Returns the trimmed search term, if any.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// True when no category filter is applied.
    pub fn is_all_categories(&self) -> bool {
        self.category.trim().eq_ignore_ascii_case(ALL_CATEGORIES)
    }

    /// Checks a single book against every filter control.
    pub fn matches(&self, book: &Book) -> bool {
        let matches_search = match self.search_term() {
            None => true,
            Some(term) => {
                let term = term.to_lowercase();
                book.title.to_lowercase().contains(&term)
                    || book.author.to_lowercase().contains(&term)
            }
        };

        let matches_category = self.is_all_categories()
            || book.category.to_lowercase() == self.category.trim().to_lowercase();

        let matches_price = book.price >= self.min_price && book.price <= self.max_price;

        matches_search && matches_category && matches_price
    }

    /// Filters and sorts. The sort is stable, so ties keep fetch order.
    pub fn apply(&self, books: &[Book]) -> Vec<Book> {
        let mut result: Vec<Book> = books.iter().filter(|b| self.matches(b)).cloned().collect();
        result.sort_by(|a, b| self.sort.compare(a, b));
        result
    }

    /// Groups already-filtered books into shelves.
    pub fn group(&self, books: Vec<Book>) -> Vec<BookGroup> {
        if self.search_term().is_some() {
            return vec![BookGroup {
                name: SEARCH_RESULTS_GROUP.to_string(),
                books,
            }];
        }

        if !self.is_all_categories() {
            return vec![BookGroup {
                name: self.category.trim().to_string(),
                books,
            }];
        }

        let mut groups: Vec<BookGroup> = Vec::new();
        for book in books {
            match groups.iter_mut().find(|g| g.name == book.category) {
                Some(group) => group.books.push(book),
                None => groups.push(BookGroup {
                    name: book.category.clone(),
                    books: vec![book],
                }),
            }
        }
        groups
    }

    /// Filter, sort and group in one call.
    pub fn shelves(&self, books: &[Book]) -> Vec<BookGroup> {
        self.group(self.apply(books))
    }
}

/// Lists `all` followed by every distinct category, in first-seen order.
pub fn available_categories(books: &[Book]) -> Vec<String> {
    let mut categories = vec![ALL_CATEGORIES.to_string()];
    for book in books {
        if !categories.iter().any(|c| c == &book.category) {
            categories.push(book.category.clone());
        }
    }
    categories
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: &str, title: &str, category: &str, price: i64, rating: f64, reviews: u32, date: &str) -> Book {
        Book {
            id: id.to_string(),
            title: title.to_string(),
            author: format!("Author {}", id),
            description: String::new(),
            price: Money::from_cents(price),
            image: String::new(),
            category: category.to_string(),
            publisher: "Pub".to_string(),
            published_date: date.to_string(),
            in_stock: true,
            rating,
            review_count: reviews,
        }
    }

    fn shelf() -> Vec<Book> {
        vec![
            book("1", "Dune", "Fiction", 1299, 4.6, 900, "1965"),
            book("2", "Cosmos", "Science", 1899, 4.8, 500, "1980-10"),
            book("3", "Neuromancer", "Fiction", 999, 4.1, 300, "Unknown"),
            book("4", "Sapiens", "History", 12_999, 4.4, 1200, "2014-09-04"),
        ]
    }

    #[test]
    fn test_default_filter_sorts_by_popularity_and_caps_price() {
        let result = BrowseFilter::default().apply(&shelf());
        let ids: Vec<_> = result.iter().map(|b| b.id.as_str()).collect();
        // Sapiens is over $100 and filtered out
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_search_matches_title_or_author_case_insensitively() {
        let filter = BrowseFilter {
            search: Some("DUNE".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&shelf()).len(), 1);

        let filter = BrowseFilter {
            search: Some("author 3".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&shelf())[0].title, "Neuromancer");
    }

    #[test]
    fn test_category_filter_is_case_insensitive() {
        let filter = BrowseFilter {
            category: "fiction".to_string(),
            ..Default::default()
        };
        assert_eq!(filter.apply(&shelf()).len(), 2);
    }

    #[test]
    fn test_category_filter_folds_non_ascii_case() {
        let books = vec![
            book("1", "Les Misérables", "Ÿoung Adult", 1299, 4.6, 900, "1862"),
            book("2", "Faust", "Ästhetik", 999, 4.1, 300, "1808"),
        ];
        let filter = BrowseFilter {
            category: "ÿOUNG ADULT".to_string(),
            ..Default::default()
        };
        let result = filter.apply(&books);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "1");

        let filter = BrowseFilter {
            category: "ästhetik".to_string(),
            ..Default::default()
        };
        assert_eq!(filter.apply(&books)[0].id, "2");
    }

    #[test]
    fn test_price_sorts() {
        let filter = BrowseFilter {
            sort: SortOrder::PriceLow,
            ..Default::default()
        };
        let prices: Vec<_> = filter.apply(&shelf()).iter().map(|b| b.price.cents()).collect();
        assert_eq!(prices, vec![999, 1299, 1899]);

        let filter = BrowseFilter {
            sort: SortOrder::PriceHigh,
            ..Default::default()
        };
        let prices: Vec<_> = filter.apply(&shelf()).iter().map(|b| b.price.cents()).collect();
        assert_eq!(prices, vec![1899, 1299, 999]);
    }

    #[test]
    fn test_newest_puts_undated_books_last() {
        let filter = BrowseFilter {
            sort: SortOrder::Newest,
            max_price: Money::from_cents(100_000),
            ..Default::default()
        };
        let ids: Vec<_> = filter.apply(&shelf()).into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["4", "2", "1", "3"]);
    }

    #[test]
    fn test_grouping_modes() {
        let all = BrowseFilter::default();
        let groups = all.shelves(&shelf());
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Fiction", "Science"]);
        assert_eq!(groups[0].books.len(), 2);

        let searching = BrowseFilter {
            search: Some("o".to_string()),
            ..Default::default()
        };
        let groups = searching.shelves(&shelf());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, SEARCH_RESULTS_GROUP);

        let by_category = BrowseFilter {
            category: "science".to_string(),
            ..Default::default()
        };
        assert_eq!(by_category.shelves(&shelf())[0].name, "science");
    }

    #[test]
    fn test_available_categories() {
        assert_eq!(
            available_categories(&shelf()),
            vec!["all", "Fiction", "Science", "History"]
        );
    }

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!("price-high".parse::<SortOrder>().unwrap(), SortOrder::PriceHigh);
        assert_eq!(SortOrder::Newest.to_string(), "newest");
        assert!("cheapest".parse::<SortOrder>().is_err());
    }
}
