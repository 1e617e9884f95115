//! # Row Store Client
//!
//! Typed access to the BaaS tables (PostgREST-style REST under `/rest/v1`).
//!
//! ## Tables
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  orders ─────────────┐                                                  │
//! │    user_id, status,  │ 1:N                                              │
//! │    total_amount      ▼                                                  │
//! │                 order_items (title/author/price frozen at purchase)    │
//! │                                                                         │
//! │  used_books ◄───────── exchange_requests                                │
//! │    status: available    requested_book_id / offered_book_id             │
//! │            | sold       status: pending | accepted | rejected           │
//! │            | exchanged                                                  │
//! │                                                                         │
//! │  login_attempts (write-only, anon key)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every request carries the `apikey` header and the reader's access token
//! as `Authorization: Bearer`; row-level security on the BaaS decides what
//! the reader may see. Inserts and updates ask for
//! `Prefer: return=representation` so the stored row comes back.

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};
use url::Url;

use readnest_core::{
    ExchangeRequest, ExchangeStatus, NewExchangeRequest, NewOrder, NewOrderItem, NewUsedBook,
    Order, OrderItem, UsedBook, UsedBookStatus,
};

use crate::config::BackendSettings;
use crate::error::{RemoteError, RemoteResult};
use crate::http::{build_client, check_status, decode_json};

const ORDERS: &str = "orders";
const ORDER_ITEMS: &str = "order_items";
const USED_BOOKS: &str = "used_books";
const EXCHANGE_REQUESTS: &str = "exchange_requests";
const LOGIN_ATTEMPTS: &str = "login_attempts";

const RETURN_REPRESENTATION: &str = "return=representation";
const RETURN_MINIMAL: &str = "return=minimal";

/// Client for the BaaS row store.
#[derive(Debug, Clone)]
pub struct RowStoreClient {
    client: Client,
    rest_url: String,
    anon_key: String,
}

impl RowStoreClient {
    /// Creates a client; fails if the anon key is not configured.
    pub fn new(settings: &BackendSettings) -> RemoteResult<Self> {
        settings.validate()?;

        Ok(RowStoreClient {
            client: build_client(settings.timeout_secs)?,
            rest_url: format!("{}/rest/v1", settings.base_url()),
            anon_key: settings.anon_key.clone(),
        })
    }

    // =========================================================================
    // Request Helpers
    // =========================================================================

    fn table_url(&self, table: &str, filters: &[(&str, String)]) -> RemoteResult<Url> {
        let mut url = Url::parse(&format!("{}/{}", self.rest_url, table))?;
        if !filters.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in filters {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, token: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    async fn insert_rows<B, R>(&self, token: &str, table: &str, body: &B) -> RemoteResult<Vec<R>>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.table_url(table, &[])?;
        let response = self
            .request(Method::POST, url, token)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(body)
            .send()
            .await?;

        decode_json(check_status(response).await?).await
    }

    async fn insert_one<B, R>(&self, token: &str, table: &str, body: &B) -> RemoteResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.insert_rows(token, table, body)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::EmptyResponse {
                table: table.to_string(),
            })
    }

    async fn select<R>(&self, token: &str, table: &str, filters: &[(&str, String)]) -> RemoteResult<Vec<R>>
    where
        R: DeserializeOwned,
    {
        let url = self.table_url(table, filters)?;
        let response = self.request(Method::GET, url, token).send().await?;
        decode_json(check_status(response).await?).await
    }

    /// PATCHes the row with `id` and returns it. No row back means the id is
    /// unknown or not visible to the reader.
    async fn update_by_id<R>(&self, token: &str, table: &str, id: &str, patch: serde_json::Value) -> RemoteResult<R>
    where
        R: DeserializeOwned,
    {
        let url = self.table_url(table, &[("id", format!("eq.{}", id))])?;
        let response = self
            .request(Method::PATCH, url, token)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&patch)
            .send()
            .await?;

        let rows: Vec<R> = decode_json(check_status(response).await?).await?;
        rows.into_iter().next().ok_or_else(|| RemoteError::EmptyResponse {
            table: table.to_string(),
        })
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Inserts an order header and returns the stored row (with its id).
    pub async fn insert_order(&self, token: &str, order: &NewOrder) -> RemoteResult<Order> {
        let stored: Order = self.insert_one(token, ORDERS, order).await?;
        info!(order_id = %stored.id, total = %stored.total_amount, "Order created");
        Ok(stored)
    }

    /// Inserts the lines of an order in one request.
    pub async fn insert_order_items(&self, token: &str, items: &[NewOrderItem]) -> RemoteResult<Vec<OrderItem>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let stored: Vec<OrderItem> = self.insert_rows(token, ORDER_ITEMS, items).await?;
        debug!(count = stored.len(), "Order items created");
        Ok(stored)
    }

    /// A reader's orders with their items, newest first.
    pub async fn orders_for_user(&self, token: &str, user_id: &str) -> RemoteResult<Vec<Order>> {
        self.select(
            token,
            ORDERS,
            &[
                ("select", "*,order_items(*)".to_string()),
                ("user_id", format!("eq.{}", user_id)),
                ("order", "order_date.desc".to_string()),
            ],
        )
        .await
    }

    // =========================================================================
    // Used Books
    // =========================================================================

    /// Lists a book for sale or exchange.
    pub async fn insert_used_book(&self, token: &str, book: &NewUsedBook) -> RemoteResult<UsedBook> {
        let stored: UsedBook = self.insert_one(token, USED_BOOKS, book).await?;
        info!(book_id = %stored.id, title = %stored.title, "Used book listed");
        Ok(stored)
    }

    /// Available listings from everyone except `exclude_user`.
    pub async fn available_used_books(&self, token: &str, exclude_user: &str) -> RemoteResult<Vec<UsedBook>> {
        self.select(
            token,
            USED_BOOKS,
            &[
                ("select", "*".to_string()),
                ("status", format!("eq.{}", UsedBookStatus::Available)),
                ("user_id", format!("neq.{}", exclude_user)),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    /// The reader's own available listings.
    pub async fn my_available_books(&self, token: &str, user_id: &str) -> RemoteResult<Vec<UsedBook>> {
        self.select(
            token,
            USED_BOOKS,
            &[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{}", user_id)),
                ("status", format!("eq.{}", UsedBookStatus::Available)),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    pub async fn update_used_book_status(
        &self,
        token: &str,
        id: &str,
        status: UsedBookStatus,
    ) -> RemoteResult<UsedBook> {
        debug!(book_id = id, %status, "Updating used book status");
        self.update_by_id(token, USED_BOOKS, id, json!({ "status": status }))
            .await
    }

    // =========================================================================
    // Exchange Requests
    // =========================================================================

    pub async fn insert_exchange_request(
        &self,
        token: &str,
        request: &NewExchangeRequest,
    ) -> RemoteResult<ExchangeRequest> {
        let stored: ExchangeRequest = self.insert_one(token, EXCHANGE_REQUESTS, request).await?;
        info!(
            request_id = %stored.id,
            requested = %stored.requested_book_id,
            offered = %stored.offered_book_id,
            "Exchange requested"
        );
        Ok(stored)
    }

    /// Requests where the reader is either the requester or the owner.
    pub async fn exchange_requests_for_user(
        &self,
        token: &str,
        user_id: &str,
    ) -> RemoteResult<Vec<ExchangeRequest>> {
        self.select(
            token,
            EXCHANGE_REQUESTS,
            &[
                ("select", "*".to_string()),
                (
                    "or",
                    format!("(requester_id.eq.{id},owner_id.eq.{id})", id = user_id),
                ),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    pub async fn update_exchange_status(
        &self,
        token: &str,
        id: &str,
        status: ExchangeStatus,
    ) -> RemoteResult<ExchangeRequest> {
        debug!(request_id = id, %status, "Updating exchange request status");
        self.update_by_id(token, EXCHANGE_REQUESTS, id, json!({ "status": status }))
            .await
    }

    // =========================================================================
    // Login Attempts
    // =========================================================================

    /// Records a sign-in attempt. Sent with the anon key; the password is
    /// never part of the row.
    pub async fn record_login_attempt(&self, email: &str, successful: bool) -> RemoteResult<()> {
        let url = self.table_url(LOGIN_ATTEMPTS, &[])?;
        let response = self
            .request(Method::POST, url, &self.anon_key)
            .header("Prefer", RETURN_MINIMAL)
            .json(&json!({ "email": email, "successful": successful }))
            .send()
            .await?;

        check_status(response).await?;
        debug!(email, successful, "Login attempt recorded");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use readnest_core::{BookCondition, Money, OrderStatus, ShippingAddress};
    use serde_json::Value;
    use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> RowStoreClient {
        RowStoreClient::new(&BackendSettings {
            url: server.uri(),
            anon_key: "anon".to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@example.com".into(),
            address: "1 Main St".into(),
            city: "Springfield".into(),
            zip_code: "12345".into(),
        }
    }

    fn order_row() -> Value {
        json!({
            "id": "0a1b2c3d-0000-4000-8000-000000000001",
            "user_id": "user-1",
            "order_date": "2024-05-01T12:00:00+00:00",
            "status": "Processing",
            "total_amount": 31.03,
            "payment_method": "Credit Card",
            "shipping_address": {
                "firstName": "Jane", "lastName": "Doe", "email": "jane@example.com",
                "address": "1 Main St", "city": "Springfield", "zipCode": "12345"
            },
            "created_at": "2024-05-01T12:00:00.123456+00:00"
        })
    }

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

    fn exchange_row(status: &str) -> Value {
        json!({
            "id": "ex-1",
            "requester_id": "alice",
            "owner_id": "bob",
            "requested_book_id": "bob-book",
            "offered_book_id": "alice-book",
            "status": status,
            "created_at": "2024-05-02T08:00:00+00:00"
        })
    }

    #[tokio::test]
    async fn test_insert_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/orders"))
            .and(header("apikey", "anon"))
            .and(header("authorization", "Bearer access-1"))
            .and(header("prefer", "return=representation"))
            .and(body_partial_json(json!({
                "user_id": "user-1",
                "status": "Processing",
                "total_amount": 31.03,
                "payment_method": "Credit Card",
                "shipping_address": { "firstName": "Jane", "zipCode": "12345" }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([order_row()])))
            .expect(1)
            .mount(&server)
            .await;

        let order = client_for(&server)
            .insert_order(
                "access-1",
                &NewOrder {
                    user_id: "user-1".into(),
                    order_date: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
                    status: OrderStatus::Processing,
                    total_amount: Money::from_cents(3103),
                    payment_method: "Credit Card".into(),
                    shipping_address: address(),
                },
            )
            .await
            .unwrap();

        assert_eq!(order.short_reference(), "0a1b2c3d");
        assert_eq!(order.total_amount.cents(), 3103);
        assert!(order.order_items.is_empty());
    }

    #[tokio::test]
    async fn test_insert_returning_no_rows_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/used_books"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .insert_used_book(
                "access-1",
                &NewUsedBook {
                    user_id: "user-1".into(),
                    title: "Dune".into(),
                    author: "Frank Herbert".into(),
                    description: None,
                    price: Money::from_cents(650),
                    condition: BookCondition::Good,
                    image_url: None,
                    status: UsedBookStatus::Available,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::EmptyResponse { ref table } if table == "used_books"));
    }

    #[tokio::test]
    async fn test_insert_order_items_sends_array() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/order_items"))
            .and(body_json(json!([{
                "order_id": "order-1",
                "book_id": "dune",
                "title": "Dune",
                "author": "Frank Herbert",
                "image_url": null,
                "quantity": 2,
                "price_at_purchase": 9.99
            }])))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
                "id": "item-1",
                "order_id": "order-1",
                "book_id": "dune",
                "title": "Dune",
                "author": "Frank Herbert",
                "image_url": null,
                "quantity": 2,
                "price_at_purchase": 9.99,
                "created_at": "2024-05-01T12:00:00+00:00"
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let items = client
            .insert_order_items(
                "access-1",
                &[NewOrderItem {
                    order_id: "order-1".into(),
                    book_id: "dune".into(),
                    title: "Dune".into(),
                    author: "Frank Herbert".into(),
                    image_url: None,
                    quantity: 2,
                    price_at_purchase: Money::from_cents(999),
                }],
            )
            .await
            .unwrap();
        assert_eq!(items[0].line_total().cents(), 1998);

        assert!(client.insert_order_items("access-1", &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_orders_for_user_embeds_items() {
        let server = MockServer::start().await;
        let mut row = order_row();
        row["order_items"] = json!([{
            "id": "item-1",
            "order_id": "0a1b2c3d-0000-4000-8000-000000000001",
            "book_id": "dune",
            "title": "Dune",
            "author": "Frank Herbert",
            "image_url": "http://img/dune.jpg",
            "quantity": 3,
            "price_at_purchase": 9.99,
            "created_at": "2024-05-01T12:00:00+00:00"
        }]);

        Mock::given(method("GET"))
            .and(path("/rest/v1/orders"))
            .and(query_param("select", "*,order_items(*)"))
            .and(query_param("user_id", "eq.user-1"))
            .and(query_param("order", "order_date.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
            .mount(&server)
            .await;

        let orders = client_for(&server)
            .orders_for_user("access-1", "user-1")
            .await
            .unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].total_quantity(), 3);
        assert_eq!(orders[0].shipping_address.city, "Springfield");
    }

    #[tokio::test]
    async fn test_used_book_queries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/used_books"))
            .and(query_param("status", "eq.available"))
            .and(query_param("user_id", "neq.alice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                used_book_row("bob-book", "bob", "available")
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/used_books"))
            .and(query_param("status", "eq.available"))
            .and(query_param("user_id", "eq.alice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                used_book_row("alice-book", "alice", "available")
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let others = client.available_used_books("access-1", "alice").await.unwrap();
        assert_eq!(others[0].id, "bob-book");
        assert_eq!(others[0].condition, BookCondition::Good);
        assert_eq!(others[0].price.cents(), 650);

        let mine = client.my_available_books("access-1", "alice").await.unwrap();
        assert_eq!(mine[0].id, "alice-book");
    }

    #[tokio::test]
    async fn test_status_updates() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/used_books"))
            .and(query_param("id", "eq.bob-book"))
            .and(body_json(json!({ "status": "exchanged" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                used_book_row("bob-book", "bob", "exchanged")
            ])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/exchange_requests"))
            .and(query_param("id", "eq.ex-1"))
            .and(body_json(json!({ "status": "accepted" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([exchange_row("accepted")])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let book = client
            .update_used_book_status("access-1", "bob-book", UsedBookStatus::Exchanged)
            .await
            .unwrap();
        assert_eq!(book.status, UsedBookStatus::Exchanged);

        let request = client
            .update_exchange_status("access-1", "ex-1", ExchangeStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(request.status, ExchangeStatus::Accepted);
    }

    #[tokio::test]
    async fn test_exchange_requests_for_user_uses_or_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/exchange_requests"))
            .and(query_param("or", "(requester_id.eq.bob,owner_id.eq.bob)"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([exchange_row("pending")])))
            .mount(&server)
            .await;

        let requests = client_for(&server)
            .exchange_requests_for_user("access-1", "bob")
            .await
            .unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].involves("bob"));
    }

    #[tokio::test]
    async fn test_record_login_attempt_uses_anon_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/login_attempts"))
            .and(header("authorization", "Bearer anon"))
            .and(body_json(json!({ "email": "jane@example.com", "successful": false })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .record_login_attempt("jane@example.com", false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/orders"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "JWT expired" })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .orders_for_user("stale", "user-1")
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Unauthorized));
    }
}
