//! # Database State
//!
//! Wraps the local `Database` for use in pages.
//!
//! ## Thread Safety
//! The `Database` from `readnest-db` holds a `SqlitePool`, which is
//! thread-safe on its own; pages query it without extra locking.
//!
//! ## Usage in Pages
//! ```rust,ignore
//! pub async fn profile(ctx: &AppContext) -> Result<ProfilePage, ApiError> {
//!     let user = ctx.session.require_user("view your profile").await?;
//!     let purchases = ctx.db.inner().purchases().recent(&user.id, 5).await?;
//!     ...
//! }
//! ```

use readnest_db::Database;

/// Wrapper around `Database` for page state.
#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    /// Creates a new DbState wrapping the database connection.
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
