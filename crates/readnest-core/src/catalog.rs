//! # Catalog Rules
//!
//! Pure rules applied to data coming from the public book catalog.
//!
//! The catalog is an external collaborator: volumes can be missing a price,
//! a rating, a cover, sometimes even a title, and the whole service can be
//! unreachable. Everything the storefront does to paper over that lives
//! here so it can be tested without a network.
//!
//! ## Missing Price Resolution
//! ```text
//! saleInfo.retailPrice ──► saleInfo.listPrice ──► realistic_price()
//!                                                   │
//!                                   category base ──┤
//!                                   age factor ─────┘
//! ```

use chrono::{Datelike, NaiveDate};

use crate::money::Money;
use crate::types::{parse_catalog_date, Book};

// =============================================================================
// Field Defaults
// =============================================================================

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
pub const NO_DESCRIPTION: &str = "No description available";
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";
pub const GENERAL_CATEGORY: &str = "General";
pub const UNKNOWN_PUBLISHER: &str = "Unknown Publisher";
pub const UNKNOWN_DATE: &str = "Unknown";

/// Categories fetched by the browse page, in display order.
pub const BROWSE_CATEGORIES: [&str; 10] = [
    "fiction",
    "science",
    "history",
    "biography",
    "fantasy",
    "mystery",
    "romance",
    "technology",
    "health",
    "business",
];

/// Themes rotated through on the home page's featured shelf.
pub const FEATURED_THEMES: [&str; 3] = ["bestsellers", "popular", "trending"];

/// Base prices (in cents) by catalog category.
const CATEGORY_BASE_PRICES: [(&str, i64); 20] = [
    ("fiction", 1299),
    ("science", 1899),
    ("history", 1699),
    ("biography", 1499),
    ("romance", 1199),
    ("fantasy", 1399),
    ("mystery", 1299),
    ("thriller", 1399),
    ("self-help", 1599),
    ("business", 1999),
    ("technology", 2299),
    ("health", 1799),
    ("travel", 1699),
    ("cooking", 1599),
    ("art", 2499),
    ("religion", 1499),
    ("philosophy", 1799),
    ("education", 1999),
    ("children", 999),
    ("young adult", 1199),
];

const DEFAULT_BASE_PRICE_CENTS: i64 = 1499;

// =============================================================================
// Query Builders
// =============================================================================

/// Catalog query for a subject shelf.
pub fn category_query(category: &str) -> String {
    format!("subject:{}", category.trim())
}

/// Catalog query matching a term in either the title or the authors.
pub fn title_or_author_query(term: &str) -> String {
    let term = term.trim();
    format!("intitle:{} OR inauthor:{}", term, term)
}

/// Catalog query for a featured theme.
pub fn featured_query(theme: &str) -> String {
    format!("{}+orderBy:relevance", theme)
}

/// Catalog query for books published in `year`.
pub fn new_releases_query(year: i32) -> String {
    format!("publishedDate:{}", year)
}

/// Picks today's featured theme. Rotates daily.
pub fn featured_theme(today: NaiveDate) -> &'static str {
    let idx = today.ordinal0() as usize % FEATURED_THEMES.len();
    FEATURED_THEMES[idx]
}

// =============================================================================
// Price Generation
// =============================================================================

/// Base price for a catalog category.
///
/// Exact (case-insensitive) match first; otherwise the longest known name
/// contained in the category text, so "Juvenile Fiction" prices as fiction
/// and "Young Adult Fiction" as young adult.
pub fn category_base_price(category: &str) -> Money {
    let category = category.trim().to_lowercase();

    if let Some((_, cents)) = CATEGORY_BASE_PRICES.iter().find(|(name, _)| *name == category) {
        return Money::from_cents(*cents);
    }

    CATEGORY_BASE_PRICES
        .iter()
        .filter(|(name, _)| category.contains(name))
        .max_by_key(|(name, _)| name.len())
        .map(|(_, cents)| Money::from_cents(*cents))
        .unwrap_or(Money::from_cents(DEFAULT_BASE_PRICE_CENTS))
}

/// Generates a plausible price for a volume the catalog does not price.
///
/// ## Age Adjustment
/// ```text
/// age ≤ 1 year   ×1.2   (new release)
/// age ≤ 3 years  ×1.1
/// age > 10 years ×0.8   (backlist)
/// otherwise      ×1.0
/// ```
///
/// A volume whose year cannot be read (missing, "Unknown") counts as a
/// new release.
pub fn realistic_price(category: &str, published_date: Option<&str>, current_year: i32) -> Money {
    let base = category_base_price(category);

    let age = published_date
        .and_then(publication_year)
        .map(|year| current_year - year)
        .unwrap_or(0);

    let factor = if age <= 1 {
        1.2
    } else if age <= 3 {
        1.1
    } else if age > 10 {
        0.8
    } else {
        1.0
    };

    base.scale(factor)
}

/// Reads the year from catalog date text: a full date first, otherwise
/// the leading four digits.
fn publication_year(raw: &str) -> Option<i32> {
    parse_catalog_date(raw)
        .map(|d| d.year())
        .or_else(|| raw.trim().get(..4)?.parse().ok())
}

// =============================================================================
// Placeholder Metrics
// =============================================================================

/// Stable 64-bit FNV-1a hash of a volume id.
fn volume_hash(id: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;

    id.bytes()
        .fold(OFFSET, |hash, byte| (hash ^ byte as u64).wrapping_mul(PRIME))
}

/// Rating shown when the catalog has none: 3.5 - 4.5, one decimal.
///
/// Derived from the volume id so the same book always shows the same value.
pub fn placeholder_rating(volume_id: &str) -> f64 {
    let step = (volume_hash(volume_id) % 11) as f64;
    (35.0 + step) / 10.0
}

/// Review count shown when the catalog has none: 10 - 209.
pub fn placeholder_review_count(volume_id: &str) -> u32 {
    10 + ((volume_hash(volume_id) >> 16) % 200) as u32
}

// =============================================================================
// Fallback Data
// =============================================================================

/// Placeholder books returned when a catalog listing fails.
pub fn fallback_books() -> Vec<Book> {
    vec![
        Book {
            id: "fallback-1".to_string(),
            title: "Sample Book 1".to_string(),
            author: "Sample Author".to_string(),
            description: "This is a sample book while we fetch real data.".to_string(),
            price: Money::from_cents(1299),
            image: PLACEHOLDER_IMAGE.to_string(),
            category: "Fiction".to_string(),
            publisher: "Sample Publisher".to_string(),
            published_date: "2024".to_string(),
            in_stock: true,
            rating: 4.5,
            review_count: 123,
        },
        Book {
            id: "fallback-2".to_string(),
            title: "Sample Book 2".to_string(),
            author: "Another Author".to_string(),
            description: "Another sample book.".to_string(),
            price: Money::from_cents(1599),
            image: PLACEHOLDER_IMAGE.to_string(),
            category: "Non-Fiction".to_string(),
            publisher: "Sample Publisher".to_string(),
            published_date: "2024".to_string(),
            in_stock: true,
            rating: 4.2,
            review_count: 87,
        },
    ]
}

/// True for books produced by [`fallback_books`].
pub fn is_fallback(book: &Book) -> bool {
    book.id.starts_with("fallback-")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_base_price() {
        assert_eq!(category_base_price("Fiction").cents(), 1299);
        assert_eq!(category_base_price("TECHNOLOGY").cents(), 2299);
        assert_eq!(category_base_price("Juvenile Fiction").cents(), 1299);
        assert_eq!(category_base_price("Young Adult Fiction").cents(), 1199);
        assert_eq!(category_base_price("Poetry").cents(), 1499);
    }

    #[test]
    fn test_realistic_price_age_adjustment() {
        // New release: 12.99 × 1.2 = 15.588 → 15.59
        assert_eq!(realistic_price("Fiction", Some("2024-03-01"), 2024).cents(), 1559);
        // Two years old: 18.99 × 1.1 = 20.889 → 20.89
        assert_eq!(realistic_price("Science", Some("2022"), 2024).cents(), 2089);
        // Middle-aged: unchanged
        assert_eq!(realistic_price("History", Some("2018"), 2024).cents(), 1699);
        // Backlist: 19.99 × 0.8 = 15.992 → 15.99
        assert_eq!(realistic_price("Business", Some("1999-05"), 2024).cents(), 1599);
    }

    #[test]
    fn test_realistic_price_missing_and_unknown_dates() {
        assert_eq!(realistic_price("Fiction", None, 2024).cents(), 1559);
        assert_eq!(realistic_price("Fiction", Some("Unknown"), 2024).cents(), 1559);
        // Year prefix of an odd date is still honoured
        assert_eq!(realistic_price("Fiction", Some("2015-13-45"), 2024).cents(), 1299);
    }

    #[test]
    fn test_placeholder_metrics_are_stable_and_bounded() {
        for id in ["abc", "zyx123", "", "fallback-1", "a much longer volume id"] {
            let rating = placeholder_rating(id);
            assert!((3.5..=4.5).contains(&rating), "rating {} for {}", rating, id);
            assert_eq!(rating, placeholder_rating(id));

            let reviews = placeholder_review_count(id);
            assert!((10..=209).contains(&reviews));
        }
    }

    #[test]
    fn test_query_builders() {
        assert_eq!(category_query("fiction"), "subject:fiction");
        assert_eq!(
            title_or_author_query(" dune "),
            "intitle:dune OR inauthor:dune"
        );
        assert_eq!(featured_query("trending"), "trending+orderBy:relevance");
        assert_eq!(new_releases_query(2024), "publishedDate:2024");
    }

    #[test]
    fn test_featured_theme_rotates() {
        let jan1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let jan2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let jan4 = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        assert_eq!(featured_theme(jan1), "bestsellers");
        assert_eq!(featured_theme(jan2), "popular");
        assert_eq!(featured_theme(jan4), "bestsellers");
    }

    #[test]
    fn test_fallback_books() {
        let books = fallback_books();
        assert_eq!(books.len(), 2);
        assert!(books.iter().all(is_fallback));
        assert_eq!(books[0].price.cents(), 1299);
        assert_eq!(books[1].category, "Non-Fiction");
    }
}
