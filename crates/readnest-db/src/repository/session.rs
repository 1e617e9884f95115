//! # Session Repository
//!
//! Keeps the signed-in user and their tokens across runs.
//!
//! The `session` table has at most one row (`id = 1`); `save` upserts it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use readnest_core::User;

use crate::error::DbResult;

/// A persisted sign-in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredSession {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct SessionRow {
    user_id: String,
    name: String,
    email: String,
    is_publisher: bool,
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl From<SessionRow> for StoredSession {
    fn from(row: SessionRow) -> Self {
        StoredSession {
            user: User {
                id: row.user_id,
                name: row.name,
                email: row.email,
                is_publisher: row.is_publisher,
            },
            access_token: row.access_token,
            refresh_token: row.refresh_token,
            expires_at: row.expires_at,
        }
    }
}

/// Repository for the single-row `session` table.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Creates a new SessionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Returns the stored session, if any.
    pub async fn load(&self) -> DbResult<Option<StoredSession>> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT user_id, name, email, is_publisher,
                   access_token, refresh_token, expires_at
            FROM session
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(StoredSession::from))
    }

    /// Stores `session`, replacing any previous one.
    pub async fn save(&self, session: &StoredSession) -> DbResult<()> {
        debug!(user_id = %session.user.id, "Saving session");

        sqlx::query(
            r#"
            INSERT INTO session (
                id, user_id, name, email, is_publisher,
                access_token, refresh_token, expires_at, saved_at
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT (id) DO UPDATE SET
                user_id = excluded.user_id,
                name = excluded.name,
                email = excluded.email,
                is_publisher = excluded.is_publisher,
                access_token = excluded.access_token,
                refresh_token = excluded.refresh_token,
                expires_at = excluded.expires_at,
                saved_at = excluded.saved_at
            "#,
        )
        .bind(&session.user.id)
        .bind(&session.user.name)
        .bind(&session.user.email)
        .bind(session.user.is_publisher)
        .bind(&session.access_token)
        .bind(&session.refresh_token)
        .bind(session.expires_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Removes the stored session.
    pub async fn clear(&self) -> DbResult<()> {
        sqlx::query("DELETE FROM session")
            .execute(&self.pool)
            .await?;
        Ok(())
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

    fn session(user_id: &str, token: &str) -> StoredSession {
        StoredSession {
            user: User {
                id: user_id.to_string(),
                name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
                is_publisher: false,
            },
            access_token: token.to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_no_session_by_default() {
        let db = memory_db().await;
        assert!(db.session().load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let db = memory_db().await;
        let saved = session("u1", "token-1");
        db.session().save(&saved).await.unwrap();

        let loaded = db.session().load().await.unwrap().unwrap();
        assert_eq!(loaded, saved);
    }

    #[tokio::test]
    async fn test_save_replaces_existing_session() {
        let db = memory_db().await;
        db.session().save(&session("u1", "token-1")).await.unwrap();
        db.session().save(&session("u2", "token-2")).await.unwrap();

        let loaded = db.session().load().await.unwrap().unwrap();
        assert_eq!(loaded.user.id, "u2");
        assert_eq!(loaded.access_token, "token-2");
    }

    #[tokio::test]
    async fn test_clear() {
        let db = memory_db().await;
        db.session().save(&session("u1", "token-1")).await.unwrap();
        db.session().clear().await.unwrap();
        assert!(db.session().load().await.unwrap().is_none());
    }
}
