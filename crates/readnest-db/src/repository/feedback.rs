//! # Feedback Repository

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use readnest_core::Feedback;

use crate::error::DbResult;

#[derive(Debug, FromRow)]
struct FeedbackRow {
    id: String,
    user_id: String,
    book_id: String,
    rating: i64,
    comment: String,
    created_at: DateTime<Utc>,
}

impl From<FeedbackRow> for Feedback {
    fn from(row: FeedbackRow) -> Self {
        Feedback {
            id: row.id,
            user_id: row.user_id,
            book_id: row.book_id,
            rating: row.rating.clamp(1, 5) as u8,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

/// Repository for the `feedback` table.
#[derive(Debug, Clone)]
pub struct FeedbackRepository {
    pool: SqlitePool,
}

impl FeedbackRepository {
    /// Creates a new FeedbackRepository.
    pub fn new(pool: SqlitePool) -> Self {
        FeedbackRepository { pool }
    }

    /// Stores a feedback entry.
    pub async fn insert(&self, feedback: &Feedback) -> DbResult<()> {
        debug!(book_id = %feedback.book_id, rating = feedback.rating, "Saving feedback");

        sqlx::query(
            r#"
            INSERT INTO feedback (id, user_id, book_id, rating, comment, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&feedback.id)
        .bind(&feedback.user_id)
        .bind(&feedback.book_id)
        .bind(i64::from(feedback.rating))
        .bind(&feedback.comment)
        .bind(feedback.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists a user's feedback, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Feedback>> {
        let rows: Vec<FeedbackRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, book_id, rating, comment, created_at
            FROM feedback
            WHERE user_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Feedback::from).collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
