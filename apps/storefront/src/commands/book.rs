//! Book page: one catalog volume plus "Readers also liked".

use readnest_core::recommend::k_nearest;
use readnest_core::{Book, CoreError};
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::AppContext;

#[derive(Debug, Clone, Serialize)]
pub struct BookPage {
    pub book: Book,
    pub similar: Vec<Book>,
}

pub async fn run(ctx: &AppContext, id: &str) -> Result<BookPage, ApiError> {
    let book = ctx
        .catalog
        .by_id(id)
        .await
        .ok_or_else(|| CoreError::BookNotFound(id.to_string()))?;

    let similar = similar_books(ctx, &book).await;
    Ok(BookPage { book, similar })
}

/// The books of the same category closest to `book`.
pub async fn similar_books(ctx: &AppContext, book: &Book) -> Vec<Book> {
    let candidates = ctx
        .catalog
        .by_category(&book.category, ctx.config.browse_per_category)
        .await;
    let similar = k_nearest(book, &candidates, ctx.config.similar_books_k);
    debug!(book_id = %book.id, candidates = candidates.len(), found = similar.len(), "Similar books");
    similar
}
