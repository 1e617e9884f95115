//! # Cart Repository
//!
//! Persists the cart between runs.
//!
//! The cart is small (at most 100 lines) and always written as a whole, so
//! `replace` swaps the table contents inside one transaction instead of
//! diffing line by line.
//!
//! ```text
//! BEGIN
//!   DELETE FROM cart_items
//!   INSERT line 0, line 1, ... (position keeps display order)
//! COMMIT
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use readnest_core::{Book, Money};

use crate::error::{DbError, DbResult};

/// A cart line as stored: a frozen book snapshot plus a quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    pub book: Book,
    pub quantity: i64,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct CartRow {
    book_id: String,
    title: String,
    author: String,
    description: String,
    price_cents: i64,
    image: String,
    category: String,
    publisher: String,
    published_date: String,
    in_stock: bool,
    rating: f64,
    review_count: i64,
    quantity: i64,
    added_at: DateTime<Utc>,
}

impl From<CartRow> for CartLine {
    fn from(row: CartRow) -> Self {
        CartLine {
            book: Book {
                id: row.book_id,
                title: row.title,
                author: row.author,
                description: row.description,
                price: Money::from_cents(row.price_cents),
                image: row.image,
                category: row.category,
                publisher: row.publisher,
                published_date: row.published_date,
                in_stock: row.in_stock,
                rating: row.rating,
                review_count: u32::try_from(row.review_count).unwrap_or(0),
            },
            quantity: row.quantity,
            added_at: row.added_at,
        }
    }
}

/// Repository for the `cart_items` table.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Loads the saved cart in display order.
    pub async fn load(&self) -> DbResult<Vec<CartLine>> {
        let rows: Vec<CartRow> = sqlx::query_as(
            r#"
            SELECT book_id, title, author, description, price_cents, image,
                   category, publisher, published_date, in_stock, rating,
                   review_count, quantity, added_at
            FROM cart_items
            ORDER BY position ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(lines = rows.len(), "Loaded cart");
        Ok(rows.into_iter().map(CartLine::from).collect())
    }

    /// Replaces the saved cart with `lines`.
    pub async fn replace(&self, lines: &[CartLine]) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query("DELETE FROM cart_items")
            .execute(&mut *tx)
            .await?;

        for (position, line) in lines.iter().enumerate() {
            let book = &line.book;
            sqlx::query(
                r#"
                INSERT INTO cart_items (
                    book_id, title, author, description, price_cents, image,
                    category, publisher, published_date, in_stock, rating,
                    review_count, quantity, position, added_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                "#,
            )
            .bind(&book.id)
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.description)
            .bind(book.price.cents())
            .bind(&book.image)
            .bind(&book.category)
            .bind(&book.publisher)
            .bind(&book.published_date)
            .bind(book.in_stock)
            .bind(book.rating)
            .bind(i64::from(book.review_count))
            .bind(line.quantity)
            .bind(position as i64)
            .bind(line.added_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(lines = lines.len(), "Saved cart");
        Ok(())
    }

    /// Empties the saved cart.
    pub async fn clear(&self) -> DbResult<()> {
        sqlx::query("DELETE FROM cart_items")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
