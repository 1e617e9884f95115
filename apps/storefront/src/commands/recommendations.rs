//! Recommendations page: personalized picks from the signed-in reader's
//! purchase log. Signed-out readers get popular picks.

use chrono::Utc;
use readnest_core::recommend::personalized;
use readnest_core::{Book, PURCHASE_LOG_CAPACITY};
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::AppContext;

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationsPage {
    /// Purchase log entries the picks are based on; 0 means "popular picks".
    pub based_on: usize,
    pub books: Vec<Book>,
}

pub async fn run(ctx: &AppContext) -> Result<RecommendationsPage, ApiError> {
    let history = match ctx.session.current_user().await {
        Some(user) => {
            ctx.db
                .inner()
                .purchases()
                .recent(&user.id, PURCHASE_LOG_CAPACITY)
                .await?
        }
        None => Vec::new(),
    };
    let pool = ctx.catalog.recommendation_pool().await;

    let books = personalized(&pool, &history, Utc::now(), ctx.config.recommendation_limit);
    debug!(history = history.len(), pool = pool.len(), picks = books.len(), "Recommendations scored");

    Ok(RecommendationsPage {
        based_on: history.len(),
        books,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::account;
    use crate::commands::test_support::{context, dune_volume, sign_in_as};
    use readnest_core::{Money, PurchaseRecord};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_pool(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/volumes"))
            .and(query_param("q", "fiction"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [dune_volume()]
            })))
            .mount(server)
            .await;
    }

    fn dune_purchase() -> PurchaseRecord {
        PurchaseRecord {
            book_id: "dune".to_string(),
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
    async fn test_signed_out_reader_gets_popular_picks() {
        let server = MockServer::start().await;
        mount_pool(&server).await;
        let ctx = context(&server, false).await;

        let page = run(&ctx).await.unwrap();
        assert_eq!(page.based_on, 0);
        assert_eq!(page.books.len(), 1);
        assert_eq!(page.books[0].id, "dune");
    }

    #[tokio::test]
    async fn test_purchases_are_excluded_from_picks() {
        let server = MockServer::start().await;
        mount_pool(&server).await;
        let ctx = context(&server, true).await;
        ctx.db
            .inner()
            .purchases()
            .record("user-1", &[dune_purchase()])
            .await
            .unwrap();

        let page = run(&ctx).await.unwrap();
        assert_eq!(page.based_on, 1);
        assert!(page.books.iter().all(|b| b.id != "dune"));
    }

    #[tokio::test]
    async fn test_purchase_log_does_not_follow_account_switch() {
        let server = MockServer::start().await;
        mount_pool(&server).await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let ctx = context(&server, true).await;
        ctx.db
            .inner()
            .purchases()
            .record("user-1", &[dune_purchase()])
            .await
            .unwrap();
        assert_eq!(run(&ctx).await.unwrap().based_on, 1);

        account::logout(&ctx).await.unwrap();
        sign_in_as(&ctx, "user-2", "sam@example.com", "Sam Reader").await;

        let page = run(&ctx).await.unwrap();
        assert_eq!(page.based_on, 0);
        assert_eq!(page.books[0].id, "dune");

        sign_in_as(&ctx, "user-1", "jane@example.com", "Jane Doe").await;
        assert_eq!(run(&ctx).await.unwrap().based_on, 1);
    }
}
