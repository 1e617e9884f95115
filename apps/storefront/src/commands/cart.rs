//! # Cart Page
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│  Order   │       │
//! │  │  Cart    │     │          │     │  Form    │     │  Placed  │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                 │              │
//! │                   cart add                          cart cleared       │
//! │                   cart update                       (checkout.rs)      │
//! │                   cart remove                                           │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   cart clear ───────────────────────► (back to empty)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every change is written to the local store before the page returns.

use clap::Subcommand;
use readnest_core::{Book, CoreError};
use serde::Serialize;
use tracing::{debug, info};

use crate::commands::book::similar_books;
use crate::error::ApiError;
use crate::state::{Cart, CartItem, CartTotals};
use crate::AppContext;

#[derive(Debug, Clone, Subcommand)]
pub enum CartCommand {
    /// Show the cart with totals and suggestions
    Show,

    /// Add a book by catalog id
    Add {
        book_id: String,
        #[arg(short, long, default_value_t = 1)]
        qty: i64,
    },

    /// Set the quantity of a line (0 removes it)
    Update {
        book_id: String,
        #[arg(allow_negative_numbers = true)]
        qty: i64,
    },

    /// Remove a line
    Remove { book_id: String },

    /// Empty the cart
    Clear,
}

/// Cart response including items and totals.
#[derive(Debug, Clone, Serialize)]
pub struct CartPage {
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
    /// Books similar to the first line (`cart show` only).
    pub suggestions: Vec<Book>,
}

pub async fn run(ctx: &AppContext, command: &CartCommand) -> Result<CartPage, ApiError> {
    match command {
        CartCommand::Show => show(ctx).await,
        CartCommand::Add { book_id, qty } => add(ctx, book_id, *qty).await,
        CartCommand::Update { book_id, qty } => update(ctx, book_id, *qty).await,
        CartCommand::Remove { book_id } => remove(ctx, book_id).await,
        CartCommand::Clear => clear(ctx).await,
    }
}

/// Current cart plus up to `similar_books_k` suggestions.
pub async fn show(ctx: &AppContext) -> Result<CartPage, ApiError> {
    let first = ctx.cart.with_cart(|c| c.items.first().map(|i| i.book.clone()));

    let suggestions = match first {
        Some(book) => {
            let in_cart: Vec<String> = ctx
                .cart
                .with_cart(|c| c.items.iter().map(|i| i.book.id.clone()).collect());
            similar_books(ctx, &book)
                .await
                .into_iter()
                .filter(|b| !in_cart.contains(&b.id))
                .collect()
        }
        None => Vec::new(),
    };

    Ok(CartPage {
        suggestions,
        ..snapshot(ctx)
    })
}

/// Looks the book up in the catalog and adds it.
pub async fn add(ctx: &AppContext, book_id: &str, qty: i64) -> Result<CartPage, ApiError> {
    debug!(book_id, qty, "add_to_cart");

    let book = ctx
        .catalog
        .by_id(book_id)
        .await
        .ok_or_else(|| CoreError::BookNotFound(book_id.to_string()))?;

    ctx.cart.with_cart_mut(|c| c.add_book(&book, qty))?;
    ctx.cart.persist(ctx.db.inner()).await?;

    info!(book_id, title = %book.title, qty, "Added to cart");
    Ok(snapshot(ctx))
}

pub async fn update(ctx: &AppContext, book_id: &str, qty: i64) -> Result<CartPage, ApiError> {
    debug!(book_id, qty, "update_cart_item");
    ctx.cart.with_cart_mut(|c| c.update_quantity(book_id, qty))?;
    ctx.cart.persist(ctx.db.inner()).await?;
    Ok(snapshot(ctx))
}

pub async fn remove(ctx: &AppContext, book_id: &str) -> Result<CartPage, ApiError> {
    debug!(book_id, "remove_from_cart");
    ctx.cart.with_cart_mut(|c| c.remove(book_id))?;
    ctx.cart.persist(ctx.db.inner()).await?;
    Ok(snapshot(ctx))
}

pub async fn clear(ctx: &AppContext) -> Result<CartPage, ApiError> {
    debug!("clear_cart");
    ctx.cart.with_cart_mut(Cart::clear);
    ctx.cart.persist(ctx.db.inner()).await?;
    Ok(snapshot(ctx))
}

fn snapshot(ctx: &AppContext) -> CartPage {
    ctx.cart.with_cart(|c| CartPage {
        items: c.items.clone(),
        totals: c.totals(&ctx.config),
        suggestions: Vec::new(),
    })
}
