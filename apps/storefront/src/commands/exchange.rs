//! # Exchange Page
//!
//! Readers swap used books with each other.
//!
//! ## Request Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  requester                              owner                           │
//! │  ─────────                              ─────                           │
//! │  exchange request <their-book>                                          │
//! │           --offer <my-book>                                             │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  ExchangeRequest { pending } ─────────► exchange respond <id> accept    │
//! │                                            │                            │
//! │                         ┌──────────────────┴─────────────┐              │
//! │                         ▼                                ▼              │
//! │                 accepted: both books              rejected: books      │
//! │                 marked "exchanged"                stay available       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use clap::{Subcommand, ValueEnum};
use readnest_core::validation::validate_uuid;
use readnest_core::{ExchangeRequest, ExchangeStatus, NewExchangeRequest, UsedBook, UsedBookStatus};
use serde::Serialize;
use tracing::info;

use crate::error::ApiError;
use crate::AppContext;

#[derive(Debug, Clone, Subcommand)]
pub enum ExchangeCommand {
    /// Show books available for exchange and your requests
    List,

    /// Ask another reader to swap one of their books for one of yours
    Request {
        /// The listing you want
        requested_book_id: String,

        /// Your listing to give in return
        #[arg(long)]
        offer: String,
    },

    /// Accept or reject a request for one of your books
    Respond {
        request_id: String,
        decision: Decision,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Decision {
    Accept,
    Reject,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExchangePage {
    /// Other readers' available listings.
    pub available: Vec<UsedBook>,
    /// My available listings (what I can offer).
    pub mine: Vec<UsedBook>,
    /// Requests where I am the requester or the owner.
    pub requests: Vec<ExchangeRequest>,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExchangeOutcome {
    pub request: ExchangeRequest,
    /// Listings whose status changed as a result.
    pub updated_books: Vec<UsedBook>,
}

pub async fn list(ctx: &AppContext) -> Result<ExchangePage, ApiError> {
    let (user, token) = ctx.signed_in("exchange books").await?;
    let store = ctx.store()?;

    let (available, mine, requests) = tokio::try_join!(
        store.available_used_books(&token, &user.id),
        store.my_available_books(&token, &user.id),
        store.exchange_requests_for_user(&token, &user.id),
    )?;

    Ok(ExchangePage {
        available,
        mine,
        requests,
        user_id: user.id,
    })
}

/// Creates a pending request. The owner is read from the listing.
pub async fn request(
    ctx: &AppContext,
    requested_book_id: &str,
    offered_book_id: &str,
) -> Result<ExchangeOutcome, ApiError> {
    let (user, token) = ctx.signed_in("exchange books").await?;
    let store = ctx.store()?;

    let (available, mine) = tokio::try_join!(
        store.available_used_books(&token, &user.id),
        store.my_available_books(&token, &user.id),
    )?;

    let requested = available
        .iter()
        .find(|b| b.id == requested_book_id)
        .ok_or_else(|| ApiError::not_found("Available book", requested_book_id))?;

    if !mine.iter().any(|b| b.id == offered_book_id) {
        return Err(ApiError::not_found("Your available book", offered_book_id));
    }

    let request = store
        .insert_exchange_request(
            &token,
            &NewExchangeRequest {
                requester_id: user.id.clone(),
                owner_id: requested.user_id.clone(),
                requested_book_id: requested.id.clone(),
                offered_book_id: offered_book_id.to_string(),
                status: ExchangeStatus::Pending,
            },
        )
        .await?;

    Ok(ExchangeOutcome {
        request,
        updated_books: Vec::new(),
    })
}

/// Answers a pending request. Only the owner of the requested book may.
pub async fn respond(
    ctx: &AppContext,
    request_id: &str,
    decision: Decision,
) -> Result<ExchangeOutcome, ApiError> {
    const ACTION: &str = "answer exchange requests";

    ctx.session.require_user(ACTION).await?;
    validate_uuid("request id", request_id)?;

    let (user, token) = ctx.signed_in(ACTION).await?;
    let store = ctx.store()?;

    let request_id = request_id.trim();
    let request = store
        .exchange_requests_for_user(&token, &user.id)
        .await?
        .into_iter()
        .find(|r| r.id == request_id)
        .ok_or_else(|| ApiError::not_found("Exchange request", request_id))?;

    let next = request.respond(&user.id, decision == Decision::Accept)?;
    let request = store.update_exchange_status(&token, &request.id, next).await?;

    let mut updated_books = Vec::new();
    if next == ExchangeStatus::Accepted {
        for book_id in [&request.requested_book_id, &request.offered_book_id] {
            let book = store
                .update_used_book_status(&token, book_id, UsedBookStatus::Exchanged)
                .await?;
            updated_books.push(book);
        }
    }

    info!(request_id = %request.id, status = %request.status, "Exchange request answered");
    Ok(ExchangeOutcome {
        request,
        updated_books,
    })
}

/// Which side of a request the reader is on.
pub fn role(request: &ExchangeRequest, user_id: &str) -> &'static str {
    if request.owner_id == user_id {
        "incoming"
    } else if request.requester_id == user_id {
        "outgoing"
    } else {
        "other"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context;
    use crate::error::ErrorCode;
    use serde_json::{json, Value};
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const REQUEST_ID: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";

    fn used_book_row(id: &str, user_id: &str, status: &str) -> Value {
        json!({
            "id": id,
            "user_id": user_id,
            "title": "Dune",
            "author": "Frank Herbert",
            "description": null,
            "price": 6.5,
            "condition": "good",
            "image_url": null,
            "created_at": "2024-05-01T12:00:00+00:00",
            "status": status
        })
    }

    /// user-2 wants user-1's `mine-book` and offers `their-book`.
    fn request_row(owner_id: &str, status: &str) -> Value {
        json!({
            "id": REQUEST_ID,
            "requester_id": "user-2",
            "owner_id": owner_id,
            "requested_book_id": "mine-book",
            "offered_book_id": "their-book",
            "status": status,
            "created_at": "2024-05-02T08:00:00+00:00"
        })
    }

    async fn mount_listings(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/used_books"))
            .and(query_param("user_id", "neq.user-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                used_book_row("their-book", "user-2", "available")
            ])))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/used_books"))
            .and(query_param("user_id", "eq.user-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                used_book_row("mine-book", "user-1", "available")
            ])))
            .mount(server)
            .await;
    }

    async fn mount_requests(server: &MockServer, row: Value) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/exchange_requests"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_request_reads_owner_from_listing() {
        let server = MockServer::start().await;
        mount_listings(&server).await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/exchange_requests"))
            .and(body_partial_json(json!({
                "requester_id": "user-1",
                "owner_id": "user-2",
                "requested_book_id": "their-book",
                "offered_book_id": "mine-book",
                "status": "pending"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
                "id": REQUEST_ID,
                "requester_id": "user-1",
                "owner_id": "user-2",
                "requested_book_id": "their-book",
                "offered_book_id": "mine-book",
                "status": "pending",
                "created_at": "2024-05-02T08:00:00+00:00"
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context(&server, true).await;
        let outcome = request(&ctx, "their-book", "mine-book").await.unwrap();

        assert_eq!(outcome.request.status, ExchangeStatus::Pending);
        assert_eq!(outcome.request.owner_id, "user-2");
        assert_eq!(role(&outcome.request, "user-1"), "outgoing");
        assert!(outcome.updated_books.is_empty());
    }

    #[tokio::test]
    async fn test_request_with_unknown_offered_book_is_not_found() {
        let server = MockServer::start().await;
        mount_listings(&server).await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/exchange_requests"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let ctx = context(&server, true).await;
        let err = request(&ctx, "their-book", "not-mine").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_accept_marks_both_books_exchanged() {
        let server = MockServer::start().await;
        mount_requests(&server, request_row("user-1", "pending")).await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/exchange_requests"))
            .and(query_param("id", format!("eq.{}", REQUEST_ID)))
            .and(body_partial_json(json!({ "status": "accepted" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([request_row("user-1", "accepted")])),
            )
            .expect(1)
            .mount(&server)
            .await;
        for (id, owner) in [("mine-book", "user-1"), ("their-book", "user-2")] {
            Mock::given(method("PATCH"))
                .and(path("/rest/v1/used_books"))
                .and(query_param("id", format!("eq.{}", id)))
                .and(body_partial_json(json!({ "status": "exchanged" })))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!([used_book_row(id, owner, "exchanged")])),
                )
                .expect(1)
                .mount(&server)
                .await;
        }

        let ctx = context(&server, true).await;
        let outcome = respond(&ctx, REQUEST_ID, Decision::Accept).await.unwrap();

        assert_eq!(outcome.request.status, ExchangeStatus::Accepted);
        assert_eq!(role(&outcome.request, "user-1"), "incoming");
        let ids: Vec<_> = outcome.updated_books.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["mine-book", "their-book"]);
        assert!(outcome
            .updated_books
            .iter()
            .all(|b| b.status == UsedBookStatus::Exchanged));
    }

    #[tokio::test]
    async fn test_reject_leaves_books_alone() {
        let server = MockServer::start().await;
        mount_requests(&server, request_row("user-1", "pending")).await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/exchange_requests"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([request_row("user-1", "rejected")])),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/used_books"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let ctx = context(&server, true).await;
        let outcome = respond(&ctx, REQUEST_ID, Decision::Reject).await.unwrap();
        assert_eq!(outcome.request.status, ExchangeStatus::Rejected);
        assert!(outcome.updated_books.is_empty());
    }

    #[tokio::test]
    async fn test_only_owner_can_respond() {
        let server = MockServer::start().await;
        mount_requests(&server, request_row("user-3", "pending")).await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let ctx = context(&server, true).await;
        let err = respond(&ctx, REQUEST_ID, Decision::Accept).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[tokio::test]
    async fn test_malformed_request_id_is_rejected_before_any_request() {
        let server = MockServer::start().await;
        let ctx = context(&server, true).await;

        let err = respond(&ctx, "req-1", Decision::Accept).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
