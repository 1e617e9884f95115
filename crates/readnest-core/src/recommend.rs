//! # Recommendation Scorer
//!
//! Content-based recommendations from the reader's purchase log.
//!
//! ## Scoring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  feature_vector(ref, book)                                              │
//! │    [ same category   1 | 0                                              │
//! │      price closeness 1 - |Δp| / max(p_ref, p)                           │
//! │      rating closeness 1 - |Δr| / 5                                      │
//! │      same publisher  1 | 0 ]                                            │
//! │                                                                         │
//! │  similarity(a, b) = cos( fv(a, a), fv(a, b) )      fv(a, a) = [1,1,1,1] │
//! │                                                                         │
//! │  score(candidate) = Σ  similarity(p, candidate)                         │
//! │                     p ∈ log, p.id ≠ candidate.id                        │
//! │                       × p.rating                                        │
//! │                       × exp(-days_since(p) / 30)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::money::Money;
use crate::types::{Book, PurchaseRecord};

/// Personalized list length.
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 8;

/// Neighbours returned by [`k_nearest`] when no k is given.
pub const DEFAULT_NEIGHBOURS: usize = 5;

/// Recency decay constant in days.
pub const RECENCY_HALF_LIFE_DAYS: f64 = 30.0;

/// Highest value on the rating scale.
const MAX_RATING: f64 = 5.0;

// =============================================================================
// Features
// =============================================================================

/// Metadata the scorer compares.
///
/// Implemented by catalog books and by purchase log entries, so a log entry
/// can be scored without re-fetching its book.
pub trait BookFeatures {
    fn book_id(&self) -> &str;
    fn category(&self) -> &str;
    fn publisher(&self) -> &str;
    fn price(&self) -> Money;
    /// Average catalog rating, 0.0 - 5.0.
    fn rating(&self) -> f64;
}

impl BookFeatures for Book {
    fn book_id(&self) -> &str {
        &self.id
    }
    fn category(&self) -> &str {
        &self.category
    }
    fn publisher(&self) -> &str {
        &self.publisher
    }
    fn price(&self) -> Money {
        self.price
    }
    fn rating(&self) -> f64 {
        self.rating
    }
}

impl BookFeatures for PurchaseRecord {
    fn book_id(&self) -> &str {
        &self.book_id
    }
    fn category(&self) -> &str {
        &self.category
    }
    fn publisher(&self) -> &str {
        &self.publisher
    }
    fn price(&self) -> Money {
        self.price
    }
    fn rating(&self) -> f64 {
        self.book_rating
    }
}

/// Builds the feature vector of `book` relative to `reference`.
pub fn feature_vector<R, B>(reference: &R, book: &B) -> [f64; 4]
where
    R: BookFeatures + ?Sized,
    B: BookFeatures + ?Sized,
{
    let same_category = if reference.category() == book.category() {
        1.0
    } else {
        0.0
    };

    let p_ref = reference.price().cents() as f64;
    let p = book.price().cents() as f64;
    let max_price = p_ref.max(p);
    let price_closeness = if max_price <= 0.0 {
        1.0
    } else {
        1.0 - (p_ref - p).abs() / max_price
    };

    let rating_closeness = 1.0 - (reference.rating() - book.rating()).abs() / MAX_RATING;

    let same_publisher = if reference.publisher() == book.publisher() {
        1.0
    } else {
        0.0
    };

    [same_category, price_closeness, rating_closeness, same_publisher]
}

/// Cosine of the angle between two vectors; 0 if either is all zeros.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let mag_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}

/// Similarity of two books in [0, 1].
pub fn similarity<A, B>(a: &A, b: &B) -> f64
where
    A: BookFeatures + ?Sized,
    B: BookFeatures + ?Sized,
{
    cosine_similarity(&feature_vector(a, a), &feature_vector(a, b))
}

/// Decay weight for a purchase made `days` whole days ago.
pub fn recency_weight(days: i64) -> f64 {
    (-(days.max(0) as f64) / RECENCY_HALF_LIFE_DAYS).exp()
}

// =============================================================================
// Recommenders
// =============================================================================

/// Ranks `catalog` for a reader with the given purchase log.
///
/// An empty log returns the head of the catalog unchanged. Books already
/// in the log are never recommended.
pub fn personalized(
    catalog: &[Book],
    history: &[PurchaseRecord],
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<Book> {
    if history.is_empty() {
        return catalog.iter().take(limit).cloned().collect();
    }

    let purchased: HashSet<&str> = history.iter().map(|p| p.book_id.as_str()).collect();

    let weights: Vec<f64> = history
        .iter()
        .map(|p| recency_weight((now - p.purchased_at).num_days()))
        .collect();

    let mut scored: Vec<(f64, &Book)> = catalog
        .iter()
        .filter(|book| !purchased.contains(book.id.as_str()))
        .map(|book| {
            let score = history
                .iter()
                .zip(&weights)
                .filter(|(p, _)| p.book_id != book.id)
                .map(|(p, weight)| similarity(p, book) * f64::from(p.rating) * weight)
                .sum::<f64>();
            (score, book)
        })
        .filter(|(score, _)| *score > 0.0)
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    scored
        .into_iter()
        .take(limit)
        .map(|(_, book)| book.clone())
        .collect()
}

/// The `k` books most similar to `target`, excluding the target itself.
pub fn k_nearest(target: &Book, books: &[Book], k: usize) -> Vec<Book> {
    let mut scored: Vec<(f64, &Book)> = books
        .iter()
        .filter(|b| b.id != target.id)
        .map(|b| (similarity(target, b), b))
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    scored
        .into_iter()
        .take(k)
        .map(|(_, book)| book.clone())
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
