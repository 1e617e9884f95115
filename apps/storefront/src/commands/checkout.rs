//! # Checkout Page
//!
//! Turns the cart into an order.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Checkout Flow                                        │
//! │                                                                         │
//! │  1. Signed in? ─────────────── no ──► NotAuthenticated                  │
//! │  2. Cart empty? ────────────── yes ─► EmptyCart                         │
//! │  3. Shipping + card valid? ─── no ──► ValidationError                   │
//! │     (card details are checked only, never stored or sent)               │
//! │  4. INSERT orders        (Processing, grand total, "Credit Card")       │
//! │  5. INSERT order_items   (price frozen from the cart snapshot)          │
//! │  6. purchase log += one entry per copy, rating 4                        │
//! │  7. clear cart ─────────────────────► "Order #xxxxxxxx placed"          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The amount charged is the total the cart shows: subtotal + shipping + tax.

use chrono::{DateTime, Utc};
use clap::Args;
use readnest_core::catalog::PLACEHOLDER_IMAGE;
use readnest_core::validation::{validate_card, validate_shipping_address, CardDetails};
use readnest_core::{
    CoreError, Money, NewOrder, NewOrderItem, OrderItem, OrderStatus, PaymentMethod,
    PurchaseRecord, ShippingAddress, DEFAULT_PURCHASE_RATING,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::state::{Cart, CartItem};
use crate::AppContext;

/// Shipping and payment form.
#[derive(Debug, Clone, Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub zip_code: String,

    #[arg(long)]
    pub card_number: String,
    /// Name on card
    #[arg(long)]
    pub card_name: String,
    /// MM/YY
    #[arg(long)]
    pub expiry: String,
    #[arg(long)]
    pub cvv: String,
}

impl CheckoutArgs {
    pub fn shipping_address(&self) -> ShippingAddress {
        ShippingAddress {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            zip_code: self.zip_code.trim().to_string(),
        }
    }

    pub fn card(&self) -> CardDetails {
        CardDetails {
            number: self.card_number.clone(),
            name: self.card_name.clone(),
            expiry: self.expiry.clone(),
            cvv: self.cvv.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderConfirmation {
    pub order_id: String,
    /// First 8 characters of the order id.
    pub reference: String,
    pub status: OrderStatus,
    pub total: Money,
    pub items: Vec<OrderItem>,
}

pub async fn run(ctx: &AppContext, args: &CheckoutArgs) -> Result<OrderConfirmation, ApiError> {
    const ACTION: &str = "check out";

    let user = ctx.session.require_user(ACTION).await?;

    let (lines, totals) = ctx
        .cart
        .with_cart(|c| (c.items.clone(), c.totals(&ctx.config)));
    if lines.is_empty() {
        return Err(CoreError::EmptyCart.into());
    }

    let shipping_address = args.shipping_address();
    validate_shipping_address(&shipping_address)?;
    validate_card(&args.card())?;

    let (_, token) = ctx.signed_in(ACTION).await?;
    let store = ctx.store()?;

    let order = store
        .insert_order(
            &token,
            &NewOrder {
                user_id: user.id.clone(),
                order_date: Utc::now(),
                status: OrderStatus::Processing,
                total_amount: totals.total,
                payment_method: PaymentMethod::CreditCard.to_string(),
                shipping_address,
            },
        )
        .await?;

    let new_items: Vec<NewOrderItem> = lines
        .iter()
        .map(|line| order_item(&order.id, line))
        .collect();
    let items = match store.insert_order_items(&token, &new_items).await {
        Ok(items) => items,
        Err(e) => {
            error!(
                order_id = %order.id,
                user_id = %user.id,
                error = %e,
                "Order saved without items, needs reconciliation"
            );
            return Err(e.into());
        }
    };

    let purchased_at = Utc::now();
    let records = purchase_records(&lines, purchased_at);
    if let Err(e) = ctx.db.inner().purchases().record(&user.id, &records).await {
        warn!(order_id = %order.id, error = %e, "Could not record purchases");
    }

    ctx.cart.with_cart_mut(Cart::clear);
    ctx.cart.persist(ctx.db.inner()).await?;

    let reference = order.short_reference().to_string();
    info!(
        order_id = %order.id,
        reference = %reference,
        lines = lines.len(),
        total = %order.total_amount,
        "Order placed"
    );

    Ok(OrderConfirmation {
        order_id: order.id.clone(),
        reference,
        status: order.status,
        total: order.total_amount,
        items,
    })
}

/// One purchase log entry per copy bought.
fn purchase_records(lines: &[CartItem], purchased_at: DateTime<Utc>) -> Vec<PurchaseRecord> {
    lines
        .iter()
        .flat_map(|line| {
            let record =
                PurchaseRecord::from_book(&line.book, DEFAULT_PURCHASE_RATING, purchased_at);
            std::iter::repeat(record).take(line.quantity as usize)
        })
        .collect()
}

fn order_item(order_id: &str, line: &CartItem) -> NewOrderItem {
    let book = &line.book;
    NewOrderItem {
        order_id: order_id.to_string(),
        book_id: book.id.clone(),
        title: book.title.clone(),
        author: book.author.clone(),
        image_url: Some(book.image.clone()).filter(|url| url != PLACEHOLDER_IMAGE),
        quantity: line.quantity,
        price_at_purchase: book.price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context, mount_dune};
    use crate::error::ErrorCode;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn form() -> CheckoutArgs {
        CheckoutArgs {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            zip_code: "12345".to_string(),
            card_number: "4242 4242 4242 4242".to_string(),
            card_name: "Jane Doe".to_string(),
            expiry: "12/30".to_string(),
            cvv: "123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_checkout_places_order_and_clears_cart() {
        let server = MockServer::start().await;
        mount_dune(&server).await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/orders"))
            .and(header("authorization", "Bearer access-1"))
            .and(body_partial_json(json!({
                "user_id": "user-1",
                "status": "Processing",
                "total_amount": 26.57,
                "payment_method": "Credit Card"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
                "id": "0a1b2c3d-0000-4000-8000-000000000001",
                "user_id": "user-1",
                "order_date": "2024-05-01T12:00:00+00:00",
                "status": "Processing",
                "total_amount": 26.57,
                "payment_method": "Credit Card",
                "shipping_address": {
                    "firstName": "Jane", "lastName": "Doe", "email": "jane@example.com",
                    "address": "1 Main St", "city": "Springfield", "zipCode": "12345"
                },
                "created_at": "2024-05-01T12:00:00+00:00"
            }])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/order_items"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
                "id": "item-1",
                "order_id": "0a1b2c3d-0000-4000-8000-000000000001",
                "book_id": "dune",
                "title": "Dune",
                "author": "Frank Herbert",
                "image_url": "http://img/dune.jpg",
                "quantity": 2,
                "price_at_purchase": 9.99,
                "created_at": "2024-05-01T12:00:00+00:00"
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context(&server, true).await;
        crate::commands::cart::add(&ctx, "dune", 2).await.unwrap();

        let confirmation = run(&ctx, &form()).await.unwrap();
        assert_eq!(confirmation.reference, "0a1b2c3d");
        assert_eq!(confirmation.status, OrderStatus::Processing);
        assert_eq!(confirmation.items.len(), 1);

        assert!(ctx.cart.with_cart(|c| c.is_empty()));
        let db = ctx.db.inner();
        assert!(db.cart().load().await.unwrap().is_empty());

        let purchases = db.purchases().recent("user-1", 10).await.unwrap();
        assert_eq!(purchases.len(), 2);
        assert!(purchases.iter().all(|p| p.book_id == "dune"));
        assert!(purchases.iter().all(|p| p.rating == DEFAULT_PURCHASE_RATING));
    }

    #[tokio::test]
    async fn test_failed_item_insert_keeps_cart() {
        let server = MockServer::start().await;
        mount_dune(&server).await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/orders"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
                "id": "0a1b2c3d-0000-4000-8000-000000000001",
                "user_id": "user-1",
                "order_date": "2024-05-01T12:00:00+00:00",
                "status": "Processing",
                "total_amount": 15.78,
                "payment_method": "Credit Card",
                "shipping_address": {
                    "firstName": "Jane", "lastName": "Doe", "email": "jane@example.com",
                    "address": "1 Main St", "city": "Springfield", "zipCode": "12345"
                },
                "created_at": "2024-05-01T12:00:00+00:00"
            }])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/order_items"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "message": "insert failed"
            })))
            .mount(&server)
            .await;

        let ctx = context(&server, true).await;
        crate::commands::cart::add(&ctx, "dune", 1).await.unwrap();

        assert!(run(&ctx, &form()).await.is_err());
        assert_eq!(ctx.cart.with_cart(|c| c.total_items()), 1);
        let db = ctx.db.inner();
        assert_eq!(db.purchases().count("user-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_checkout_requires_login() {
        let server = MockServer::start().await;
        mount_dune(&server).await;
        let ctx = context(&server, false).await;
        crate::commands::cart::add(&ctx, "dune", 1).await.unwrap();

        let err = run(&ctx, &form()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);
        assert!(!ctx.cart.with_cart(|c| c.is_empty()));
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected_before_any_request() {
        let server = MockServer::start().await;
        let ctx = context(&server, true).await;

        let err = run(&ctx, &form()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_card_is_rejected() {
        let server = MockServer::start().await;
        mount_dune(&server).await;
        let ctx = context(&server, true).await;
        crate::commands::cart::add(&ctx, "dune", 1).await.unwrap();

        let mut args = form();
        args.expiry = "13/30".to_string();
        let err = run(&ctx, &args).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(ctx.cart.with_cart(|c| c.total_items()), 1);
    }
}
