//! Home page: the featured strip and this year's new releases.

use chrono::{Datelike, Utc};
use readnest_core::catalog::featured_theme;
use readnest_core::{Book, User};
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::AppContext;

#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub store_name: String,
    pub user: Option<User>,
    /// Today's rotating theme ("bestsellers", "popular" or "trending").
    pub theme: String,
    pub featured: Vec<Book>,
    pub year: i32,
    pub new_releases: Vec<Book>,
}

/// Loads both strips concurrently.
pub async fn run(ctx: &AppContext) -> Result<HomePage, ApiError> {
    let today = Utc::now().date_naive();
    let year = today.year();
    let theme = featured_theme(today);
    debug!(theme, year, "Loading home page");

    let (featured, new_releases) = tokio::join!(
        ctx.catalog.featured(today),
        ctx.catalog.new_releases(year)
    );

    Ok(HomePage {
        store_name: ctx.config.store_name.clone(),
        user: ctx.session.current_user().await,
        theme: theme.to_string(),
        featured,
        year,
        new_releases,
    })
}
