//! Feedback page: rate a book.
//!
//! The rating also corrects the purchase log entry for that book, which
//! the recommendation scorer reads.

use chrono::Utc;
use clap::Args;
use readnest_core::validation::validate_rating;
use readnest_core::Feedback;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppContext;

#[derive(Debug, Clone, Args)]
pub struct FeedbackArgs {
    pub book_id: String,

    /// 1 to 5 stars
    #[arg(long)]
    pub rating: i64,

    #[arg(long, default_value = "")]
    pub comment: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackReceipt {
    pub feedback: Feedback,
    /// True when the book was in the purchase log and its rating changed.
    pub purchase_rating_updated: bool,
}

pub async fn run(ctx: &AppContext, args: &FeedbackArgs) -> Result<FeedbackReceipt, ApiError> {
    let user = ctx.session.require_user("leave feedback").await?;
    let rating = validate_rating(args.rating)?;

    let feedback = Feedback {
        id: Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        book_id: args.book_id.trim().to_string(),
        rating,
        comment: args.comment.trim().to_string(),
        created_at: Utc::now(),
    };

    let db = ctx.db.inner();
    db.feedback().insert(&feedback).await?;
    let purchase_rating_updated = db
        .purchases()
        .rate(&user.id, &feedback.book_id, rating)
        .await?;

    info!(book_id = %feedback.book_id, rating, purchase_rating_updated, "Feedback saved");
    Ok(FeedbackReceipt {
        feedback,
        purchase_rating_updated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context, sign_in_as};
    use crate::error::ErrorCode;
    use readnest_core::{Money, PurchaseRecord};
    use wiremock::MockServer;

    fn args(book_id: &str, rating: i64) -> FeedbackArgs {
        FeedbackArgs {
            book_id: book_id.to_string(),
            rating,
            comment: "  Loved it ".to_string(),
        }
    }

    fn purchase(book_id: &str) -> PurchaseRecord {
        PurchaseRecord {
            book_id: book_id.to_string(),
            title: "Dune".to_string(),
            category: "Fiction".to_string(),
            publisher: "Ace".to_string(),
            price: Money::from_cents(999),
            book_rating: 4.5,
            rating: 4,
            purchased_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_feedback_rewrites_purchase_rating() {
        let server = MockServer::start().await;
        let ctx = context(&server, true).await;
        let db = ctx.db.inner();
        db.purchases().record("user-1", &[purchase("dune")]).await.unwrap();

        let receipt = run(&ctx, &args("dune", 1)).await.unwrap();
        assert!(receipt.purchase_rating_updated);
        assert_eq!(receipt.feedback.comment, "Loved it");

        let log = db.purchases().recent("user-1", 10).await.unwrap();
        assert_eq!(log[0].rating, 1);
        assert_eq!(db.feedback().list_for_user("user-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_feedback_on_unbought_book_is_still_saved() {
        let server = MockServer::start().await;
        let ctx = context(&server, true).await;

        let receipt = run(&ctx, &args("neuromancer", 5)).await.unwrap();
        assert!(!receipt.purchase_rating_updated);
        assert_eq!(receipt.feedback.rating, 5);
    }

    #[tokio::test]
    async fn test_feedback_does_not_touch_other_readers_log() {
        let server = MockServer::start().await;
        let ctx = context(&server, true).await;
        let db = ctx.db.inner();
        db.purchases().record("user-1", &[purchase("dune")]).await.unwrap();

        sign_in_as(&ctx, "user-2", "sam@example.com", "Sam Reader").await;
        let receipt = run(&ctx, &args("dune", 1)).await.unwrap();
        assert!(!receipt.purchase_rating_updated);

        let log = db.purchases().recent("user-1", 10).await.unwrap();
        assert_eq!(log[0].rating, 4);
    }

    #[tokio::test]
    async fn test_feedback_validates_rating_and_login() {
        let server = MockServer::start().await;
        let ctx = context(&server, true).await;
        let err = run(&ctx, &args("dune", 6)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let signed_out = context(&server, false).await;
        let err = run(&signed_out, &args("dune", 3)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);
    }
}
