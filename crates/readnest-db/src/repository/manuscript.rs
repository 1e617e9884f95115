//! # Manuscript Repository
//!
//! Submissions made through the publish page, kept on the device.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::info;

use readnest_core::{ManuscriptSubmission, Money};

use crate::error::DbResult;

#[derive(Debug, FromRow)]
struct ManuscriptRow {
    id: String,
    title: String,
    author: String,
    description: String,
    price_cents: i64,
    category: String,
    isbn: Option<String>,
    pages: Option<i64>,
    publish_date: Option<NaiveDate>,
    submitted_at: DateTime<Utc>,
}

impl From<ManuscriptRow> for ManuscriptSubmission {
    fn from(row: ManuscriptRow) -> Self {
        ManuscriptSubmission {
            id: row.id,
            title: row.title,
            author: row.author,
            description: row.description,
            price: Money::from_cents(row.price_cents),
            category: row.category,
            isbn: row.isbn,
            pages: row.pages.and_then(|p| u32::try_from(p).ok()),
            publish_date: row.publish_date,
            submitted_at: row.submitted_at,
        }
    }
}

/// Repository for the `manuscript_submissions` table.
#[derive(Debug, Clone)]
pub struct ManuscriptRepository {
    pool: SqlitePool,
}

impl ManuscriptRepository {
    /// Creates a new ManuscriptRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ManuscriptRepository { pool }
    }

    /// Stores a submission.
    pub async fn insert(&self, submission: &ManuscriptSubmission) -> DbResult<()> {
        info!(id = %submission.id, title = %submission.title, "Saving manuscript submission");

        sqlx::query(
            r#"
            INSERT INTO manuscript_submissions (
                id, title, author, description, price_cents, category,
                isbn, pages, publish_date, submitted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&submission.id)
        .bind(&submission.title)
        .bind(&submission.author)
        .bind(&submission.description)
        .bind(submission.price.cents())
        .bind(&submission.category)
        .bind(&submission.isbn)
        .bind(submission.pages.map(i64::from))
        .bind(submission.publish_date)
        .bind(submission.submitted_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists all submissions, newest first.
    pub async fn list(&self) -> DbResult<Vec<ManuscriptSubmission>> {
        let rows: Vec<ManuscriptRow> = sqlx::query_as(
            r#"
            SELECT id, title, author, description, price_cents, category,
                   isbn, pages, publish_date, submitted_at
            FROM manuscript_submissions
            ORDER BY submitted_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ManuscriptSubmission::from).collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::memory_db;
    use chrono::TimeZone;

    fn submission(id: &str, day: u32) -> ManuscriptSubmission {
        ManuscriptSubmission {
            id: id.to_string(),
            title: "The Quiet Shelf".to_string(),
            author: "A. Writer".to_string(),
            description: "A novel about a bookshop".to_string(),
            price: Money::from_cents(1999),
            category: "Fiction".to_string(),
            isbn: Some("0306406152".to_string()),
            pages: Some(320),
            publish_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            submitted_at: Utc.with_ymd_and_hms(2024, 6, day, 10, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let db = memory_db().await;
        db.manuscripts().insert(&submission("m1", 1)).await.unwrap();
        db.manuscripts().insert(&submission("m2", 2)).await.unwrap();

        let list = db.manuscripts().list().await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, "m2");
        assert_eq!(list[0].pages, Some(320));
        assert_eq!(list[0].publish_date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(list[0].price.cents(), 1999);
    }

    #[tokio::test]
    async fn test_optional_fields() {
        let db = memory_db().await;
        let mut draft = submission("m1", 1);
        draft.isbn = None;
        draft.pages = None;
        draft.publish_date = None;
        db.manuscripts().insert(&draft).await.unwrap();

        let list = db.manuscripts().list().await.unwrap();
        assert!(list[0].isbn.is_none());
        assert!(list[0].pages.is_none());
        assert!(list[0].publish_date.is_none());
    }
}
