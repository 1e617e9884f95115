//! # Purchase Log Repository
//!
//! The purchase log is the scorer's only input about the reader. Each
//! reader has their own log; every query is scoped by `user_id`.
//!
//! ## Capacity
//! ```text
//! record(user, p51)
//!   INSERT p51
//!   DELETE the user's rows older than their newest PURCHASE_LOG_CAPACITY
//!
//!   [p1 p2 ... p50] + p51  ──►  [p2 ... p50 p51]
//! ```

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use readnest_core::{Money, PurchaseRecord, PURCHASE_LOG_CAPACITY};

use crate::error::{DbError, DbResult};

#[derive(Debug, FromRow)]
struct PurchaseRow {
    book_id: String,
    title: String,
    category: String,
    publisher: String,
    price_cents: i64,
    book_rating: f64,
    rating: i64,
    purchased_at: DateTime<Utc>,
}

impl From<PurchaseRow> for PurchaseRecord {
    fn from(row: PurchaseRow) -> Self {
        PurchaseRecord {
            book_id: row.book_id,
            title: row.title,
            category: row.category,
            publisher: row.publisher,
            price: Money::from_cents(row.price_cents),
            book_rating: row.book_rating,
            rating: row.rating.clamp(1, 5) as u8,
            purchased_at: row.purchased_at,
        }
    }
}

/// Repository for the `purchase_history` table.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Appends purchases to a reader's log and trims it to capacity.
    ///
    /// All entries land in one transaction.
    pub async fn record(&self, user_id: &str, purchases: &[PurchaseRecord]) -> DbResult<()> {
        if purchases.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for purchase in purchases {
            sqlx::query(
                r#"
                INSERT INTO purchase_history (
                    user_id, book_id, title, category, publisher, price_cents,
                    book_rating, rating, purchased_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(user_id)
            .bind(&purchase.book_id)
            .bind(&purchase.title)
            .bind(&purchase.category)
            .bind(&purchase.publisher)
            .bind(purchase.price.cents())
            .bind(purchase.book_rating)
            .bind(i64::from(purchase.rating))
            .bind(purchase.purchased_at)
            .execute(&mut *tx)
            .await?;
        }

        let trimmed = sqlx::query(
            r#"
            DELETE FROM purchase_history
            WHERE user_id = ?1
              AND id NOT IN (
                SELECT id FROM purchase_history
                WHERE user_id = ?1
                ORDER BY id DESC
                LIMIT ?2
              )
            "#,
        )
        .bind(user_id)
        .bind(PURCHASE_LOG_CAPACITY as i64)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(user_id, recorded = purchases.len(), trimmed, "Recorded purchases");
        Ok(())
    }

    /// Returns up to `limit` of the reader's entries, newest first.
    pub async fn recent(&self, user_id: &str, limit: usize) -> DbResult<Vec<PurchaseRecord>> {
        let rows: Vec<PurchaseRow> = sqlx::query_as(
            r#"
            SELECT book_id, title, category, publisher, price_cents,
                   book_rating, rating, purchased_at
            FROM purchase_history
            WHERE user_id = ?1
            ORDER BY id DESC
            LIMIT ?2
            "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PurchaseRecord::from).collect())
    }

    /// Sets the reader's rating on their latest purchase of `book_id`.
    ///
    /// ## Returns
    /// `true` if the book is in the reader's log.
    pub async fn rate(&self, user_id: &str, book_id: &str, rating: u8) -> DbResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE purchase_history SET rating = ?3
            WHERE id = (
                SELECT id FROM purchase_history
                WHERE user_id = ?1 AND book_id = ?2
                ORDER BY id DESC
                LIMIT 1
            )
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(i64::from(rating))
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    /// Number of entries in the reader's log.
    pub async fn count(&self, user_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM purchase_history WHERE user_id = ?1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
