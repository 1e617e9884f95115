//! # Domain Types
//!
//! Core domain types used throughout ReadNest.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog (read-only, public API)      Account (BaaS auth)              │
//! │  ┌─────────────────┐ ┌─────────────┐  ┌─────────────────┐              │
//! │  │      Book       │ │  Publisher  │  │      User       │              │
//! │  │  id, title      │ │  partners   │  │  id, name       │              │
//! │  │  price (Money)  │ └─────────────┘  │  email          │              │
//! │  │  rating, count  │                  └─────────────────┘              │
//! │  └─────────────────┘                                                   │
//! │                                                                         │
//! │  Row store tables (BaaS)                                               │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐  ┌───────────────┐  │
//! │  │   Order     │─►│  OrderItem  │  │  UsedBook   │◄─│ExchangeRequest│  │
//! │  │  status     │  │  snapshot   │  │  condition  │  │  pending/...  │  │
//! │  └─────────────┘  └─────────────┘  └─────────────┘  └───────────────┘  │
//! │                                                                         │
//! │  Local only (SQLite)                                                   │
//! │  PurchaseRecord • Feedback • ManuscriptSubmission                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Row store types use the column names of the remote tables as field
//! names so they serialize straight into insert payloads.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{self, Money};
use crate::ORDER_REFERENCE_LEN;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 800 bps = 8%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Book
// =============================================================================

/// A book as presented by the storefront.
///
/// Built from a public catalog volume; every field is filled in, using the
/// defaults in [`crate::catalog`] when the catalog omits something.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    /// Comma-separated author list.
    pub author: String,
    pub description: String,
    pub price: Money,
    /// Cover image URL, or `/placeholder.svg`.
    pub image: String,
    pub category: String,
    pub publisher: String,
    /// Free-form date text from the catalog ("2023", "2023-06-12", "Unknown").
    pub published_date: String,
    pub in_stock: bool,
    /// Average rating, 0.0 - 5.0.
    pub rating: f64,
    pub review_count: u32,
}

impl Book {
    /// Parses `published_date` into a calendar date.
    ///
    /// Accepts `YYYY`, `YYYY-MM` and `YYYY-MM-DD`; partial dates resolve to
    /// the first day of the period.
    pub fn published_on(&self) -> Option<NaiveDate> {
        parse_catalog_date(&self.published_date)
    }
}

/// Parses the loose date formats the public catalog returns.
pub fn parse_catalog_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let mut parts = raw.splitn(3, '-');

    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = match parts.next() {
        Some(m) => m.parse().ok()?,
        None => 1,
    };
    let day: u32 = match parts.next() {
        Some(d) => d.get(..2).unwrap_or(d).parse().ok()?,
        None => 1,
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

// =============================================================================
// Publisher
// =============================================================================

/// A partner publisher shown on the publish page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publisher {
    pub id: String,
    pub name: String,
    pub logo: String,
    pub description: String,
    pub founded_year: i32,
    pub book_count: u32,
    pub website: String,
}

/// Returns the partner publishers accepting submissions.
pub fn partner_publishers() -> Vec<Publisher> {
    let publisher = |id: &str,
                     name: &str,
                     logo: &str,
                     description: &str,
                     founded_year: i32,
                     book_count: u32,
                     website: &str| Publisher {
        id: id.to_string(),
        name: name.to_string(),
        logo: logo.to_string(),
        description: description.to_string(),
        founded_year,
        book_count,
        website: website.to_string(),
    };

    vec![
        publisher(
            "1",
            "Moonlight Press",
            "https://images.unsplash.com/photo-1572044162444-ad60f128bdea",
            "An independent publisher focused on literary fiction and poetry.",
            2010,
            45,
            "www.moonlightpress.com",
        ),
        publisher(
            "2",
            "Enlighten Publishing",
            "https://images.unsplash.com/photo-1507842217343-583bb7270b66",
            "Dedicated to publishing cutting-edge science and philosophy books.",
            2005,
            78,
            "www.enlightenpublishing.com",
        ),
        publisher(
            "3",
            "Flavor House",
            "https://images.unsplash.com/photo-1476275466078-4007374efbbe",
            "Specializing in cookbooks and culinary literature from diverse cultures.",
            2012,
            35,
            "www.flavorhouse.com",
        ),
        publisher(
            "4",
            "Serenity Publications",
            "https://images.unsplash.com/photo-1531988042231-d39a9cc12a9a",
            "Publishers of mindfulness, wellness, and personal development books.",
            2008,
            62,
            "www.serenitypub.com",
        ),
    ]
}

// =============================================================================
// User
// =============================================================================

/// The signed-in reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub is_publisher: bool,
}

impl User {
    /// Builds a user from the auth provider's account record.
    ///
    /// ## Name Resolution
    /// ```text
    /// metadata.name ──► email local part ──► "User"
    /// ```
    pub fn from_account(id: &str, email: Option<&str>, metadata_name: Option<&str>) -> Self {
        let email = email.unwrap_or_default().to_string();

        let name = metadata_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .or_else(|| {
                email
                    .split('@')
                    .next()
                    .filter(|local| !local.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "User".to_string());

        User {
            id: id.to_string(),
            name,
            email,
            is_publisher: false,
        }
    }

    /// Up to two uppercase initials for the profile avatar.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

// =============================================================================
// Checkout Types
// =============================================================================

/// Where an order ships. Stored as a JSON column with camelCase keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
}

/// How an order was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "Credit Card")]
    CreditCard,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::CreditCard => write!(f, "Credit Card"),
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", s)
    }
}

/// An order row, with its items embedded when fetched for the orders page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    #[serde(with = "money::as_major_units")]
    pub total_amount: Money,
    pub payment_method: String,
    pub shipping_address: ShippingAddress,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
}

impl Order {
    /// Short human-facing reference: the first 8 characters of the id.
    pub fn short_reference(&self) -> &str {
        let end = self
            .id
            .char_indices()
            .nth(ORDER_REFERENCE_LEN)
            .map(|(i, _)| i)
            .unwrap_or(self.id.len());
        &self.id[..end]
    }

    /// Total number of copies across all items.
    pub fn total_quantity(&self) -> i64 {
        self.order_items.iter().map(|i| i.quantity).sum()
    }
}

/// A line of an order. Title, author and price are frozen at purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub book_id: String,
    pub title: String,
    pub author: String,
    pub image_url: Option<String>,
    pub quantity: i64,
    #[serde(with = "money::as_major_units")]
    pub price_at_purchase: Money,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns price × quantity.
    pub fn line_total(&self) -> Money {
        self.price_at_purchase * self.quantity
    }
}

/// Insert payload for the `orders` table.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    pub user_id: String,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    #[serde(with = "money::as_major_units")]
    pub total_amount: Money,
    pub payment_method: String,
    pub shipping_address: ShippingAddress,
}

/// Insert payload for the `order_items` table.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrderItem {
    pub order_id: String,
    pub book_id: String,
    pub title: String,
    pub author: String,
    pub image_url: Option<String>,
    pub quantity: i64,
    #[serde(with = "money::as_major_units")]
    pub price_at_purchase: Money,
}

// =============================================================================
// Used Books
// =============================================================================

/// Physical condition of a listed used book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookCondition {
    #[default]
    New,
    LikeNew,
    Good,
    Fair,
    Poor,
}

impl fmt::Display for BookCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookCondition::New => "new",
            BookCondition::LikeNew => "like-new",
            BookCondition::Good => "good",
            BookCondition::Fair => "fair",
            BookCondition::Poor => "poor",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for BookCondition {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(BookCondition::New),
            "like-new" | "like new" | "likenew" => Ok(BookCondition::LikeNew),
            "good" => Ok(BookCondition::Good),
            "fair" => Ok(BookCondition::Fair),
            "poor" => Ok(BookCondition::Poor),
            _ => Err(ValidationError::NotAllowed {
                field: "condition".to_string(),
                allowed: ["new", "like-new", "good", "fair", "poor"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
        }
    }
}

/// Listing status of a used book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsedBookStatus {
    #[default]
    Available,
    Sold,
    Exchanged,
}

impl fmt::Display for UsedBookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UsedBookStatus::Available => "available",
            UsedBookStatus::Sold => "sold",
            UsedBookStatus::Exchanged => "exchanged",
        };
        write!(f, "{}", s)
    }
}

/// A reader's own copy offered for sale or exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsedBook {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    #[serde(with = "money::as_major_units")]
    pub price: Money,
    #[serde(default)]
    pub condition: BookCondition,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status: UsedBookStatus,
}

/// Insert payload for the `used_books` table.
#[derive(Debug, Clone, Serialize)]
pub struct NewUsedBook {
    pub user_id: String,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    #[serde(with = "money::as_major_units")]
    pub price: Money,
    pub condition: BookCondition,
    pub image_url: Option<String>,
    pub status: UsedBookStatus,
}

// =============================================================================
// Exchange Requests
// =============================================================================

/// Lifecycle of an exchange request.
///
/// ```text
///            ┌──► Accepted
///  Pending ──┤
///            └──► Rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl fmt::Display for ExchangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExchangeStatus::Pending => "pending",
            ExchangeStatus::Accepted => "accepted",
            ExchangeStatus::Rejected => "rejected",
        };
        write!(f, "{}", s)
    }
}

/// A request to swap one of my books for someone else's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRequest {
    pub id: String,
    pub requester_id: String,
    pub owner_id: String,
    pub requested_book_id: String,
    pub offered_book_id: String,
    pub status: ExchangeStatus,
    pub created_at: DateTime<Utc>,
}

impl ExchangeRequest {
    /// Decides the next status when `actor_id` answers the request.
    ///
    /// ## Rules
    /// - Only the owner of the requested book may answer
    /// - Only pending requests can be answered
    pub fn respond(&self, actor_id: &str, accept: bool) -> CoreResult<ExchangeStatus> {
        if self.owner_id != actor_id {
            return Err(CoreError::Forbidden(format!(
                "only the owner can answer exchange request {}",
                self.id
            )));
        }

        let next = if accept {
            ExchangeStatus::Accepted
        } else {
            ExchangeStatus::Rejected
        };

        if self.status != ExchangeStatus::Pending {
            return Err(CoreError::InvalidStatusTransition {
                entity: "Exchange request".to_string(),
                id: self.id.clone(),
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }

        Ok(next)
    }

    /// True when `user_id` is on either side of the request.
    pub fn involves(&self, user_id: &str) -> bool {
        self.requester_id == user_id || self.owner_id == user_id
    }
}

/// Insert payload for the `exchange_requests` table.
#[derive(Debug, Clone, Serialize)]
pub struct NewExchangeRequest {
    pub requester_id: String,
    pub owner_id: String,
    pub requested_book_id: String,
    pub offered_book_id: String,
    pub status: ExchangeStatus,
}

// =============================================================================
// Local Records
// =============================================================================

/// A reader's rating and comment for a book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: String,
    pub user_id: String,
    pub book_id: String,
    /// 1 - 5 stars.
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// A manuscript offered to the partner publishers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManuscriptSubmission {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub price: Money,
    pub category: String,
    pub isbn: Option<String>,
    pub pages: Option<u32>,
    pub publish_date: Option<NaiveDate>,
    pub submitted_at: DateTime<Utc>,
}

/// One purchased book in the recommendation purchase log.
///
/// Carries the book metadata the scorer needs so the log is usable
/// without re-fetching the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub book_id: String,
    pub title: String,
    pub category: String,
    pub publisher: String,
    pub price: Money,
    /// The catalog's average rating at purchase time.
    pub book_rating: f64,
    /// The buyer's own rating, 1 - 5.
    pub rating: u8,
    pub purchased_at: DateTime<Utc>,
}

impl PurchaseRecord {
    /// Snapshots a book into the purchase log.
    pub fn from_book(book: &Book, rating: u8, purchased_at: DateTime<Utc>) -> Self {
        PurchaseRecord {
            book_id: book.id.clone(),
            title: book.title.clone(),
            category: book.category.clone(),
            publisher: book.publisher.clone(),
            price: book.price,
            book_rating: book.rating,
            rating,
            purchased_at,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request(status: ExchangeStatus) -> ExchangeRequest {
        ExchangeRequest {
            id: "req-1".to_string(),
            requester_id: "alice".to_string(),
            owner_id: "bob".to_string(),
            requested_book_id: "bob-book".to_string(),
            offered_book_id: "alice-book".to_string(),
            status,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        let rate = TaxRate::from_percentage(8.0);
        assert_eq!(rate.bps(), 800);
        assert!((rate.percentage() - 8.0).abs() < 0.001);
    }

    #[test]
    fn test_parse_catalog_date() {
        assert_eq!(
            parse_catalog_date("2023-06-12"),
            NaiveDate::from_ymd_opt(2023, 6, 12)
        );
        assert_eq!(parse_catalog_date("2023-06"), NaiveDate::from_ymd_opt(2023, 6, 1));
        assert_eq!(parse_catalog_date("2019"), NaiveDate::from_ymd_opt(2019, 1, 1));
        assert_eq!(parse_catalog_date("Unknown"), None);
        assert_eq!(parse_catalog_date(""), None);
    }

    #[test]
    fn test_user_name_resolution() {
        let named = User::from_account("u1", Some("jane@example.com"), Some("Jane Doe"));
        assert_eq!(named.name, "Jane Doe");
        assert_eq!(named.initials(), "JD");

        let from_email = User::from_account("u2", Some("reader42@example.com"), None);
        assert_eq!(from_email.name, "reader42");

        let anonymous = User::from_account("u3", None, Some("  "));
        assert_eq!(anonymous.name, "User");
        assert!(!anonymous.is_publisher);
    }

    #[test]
    fn test_order_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Processing).unwrap(),
            r#""Processing""#
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CreditCard).unwrap(),
            r#""Credit Card""#
        );
        assert_eq!(
            serde_json::to_string(&BookCondition::LikeNew).unwrap(),
            r#""like-new""#
        );
    }

    #[test]
    fn test_order_short_reference() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "id": "1a2b3c4d-0000-4000-8000-000000000000",
            "user_id": "u1",
            "order_date": "2024-05-01T12:00:00+00:00",
            "status": "Shipped",
            "total_amount": 31.05,
            "payment_method": "Credit Card",
            "shipping_address": {
                "firstName": "Jane", "lastName": "Doe", "email": "jane@example.com",
                "address": "1 Main St", "city": "Springfield", "zipCode": "12345"
            },
            "created_at": "2024-05-01T12:00:00+00:00"
        }))
        .unwrap();

        assert_eq!(order.short_reference(), "1a2b3c4d");
        assert_eq!(order.total_amount.cents(), 3105);
        assert_eq!(order.status, OrderStatus::Shipped);
        assert!(order.order_items.is_empty());
    }

    #[test]
    fn test_book_condition_parsing() {
        assert_eq!("Like New".parse::<BookCondition>().unwrap(), BookCondition::LikeNew);
        assert_eq!("poor".parse::<BookCondition>().unwrap(), BookCondition::Poor);
        assert!("mint".parse::<BookCondition>().is_err());
    }

    #[test]
    fn test_exchange_owner_can_accept_pending() {
        let req = request(ExchangeStatus::Pending);
        assert_eq!(req.respond("bob", true).unwrap(), ExchangeStatus::Accepted);
        assert_eq!(req.respond("bob", false).unwrap(), ExchangeStatus::Rejected);
    }

    #[test]
    fn test_exchange_requester_cannot_answer() {
        let req = request(ExchangeStatus::Pending);
        assert!(matches!(req.respond("alice", true), Err(CoreError::Forbidden(_))));
    }

    #[test]
    fn test_exchange_answered_request_is_final() {
        let req = request(ExchangeStatus::Rejected);
        assert!(matches!(
            req.respond("bob", true),
            Err(CoreError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_partner_publishers() {
        let publishers = partner_publishers();
        assert_eq!(publishers.len(), 4);
        assert_eq!(publishers[0].name, "Moonlight Press");
    }
}
