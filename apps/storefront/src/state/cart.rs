//! # Cart State
//!
//! The reader's shopping cart, kept in memory and mirrored to the local store.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Page                       Cart Method             Cart State Change   │
//! │  ────                       ───────────             ─────────────────   │
//! │                                                                         │
//! │  cart add <id> ───────────► add_book() ───────────► merge or push      │
//! │                                                                         │
//! │  cart update <id> <n> ────► update_quantity() ────► items[i].qty = n   │
//! │                                                     (n ≤ 0 removes)     │
//! │                                                                         │
//! │  cart remove <id> ────────► remove() ─────────────► items.remove(i)    │
//! │                                                                         │
//! │  cart clear / checkout ───► clear() ──────────────► items.clear()      │
//! │                                                                         │
//! │  cart show ───────────────► totals() ─────────────► (read only)        │
//! │                                                                         │
//! │  After every write the page calls CartState::persist(), which          │
//! │  replaces the `cart_items` table with the in-memory lines.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use readnest_core::{Book, CoreError, CoreResult, Money, MAX_CART_ITEMS, MAX_ITEM_QUANTITY};
use readnest_db::{CartLine, Database, DbResult};
use serde::Serialize;
use tracing::debug;

use super::ConfigState;

/// A line of the cart.
///
/// The book is a frozen snapshot taken when it was added: the cart keeps
/// showing (and checkout charges) that price even if the catalog changes.
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub book: Book,
    pub quantity: i64,
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Creates a new cart line, freezing the book as it is now.
    pub fn new(book: &Book, quantity: i64) -> Self {
        CartItem {
            book: book.clone(),
            quantity,
            added_at: Utc::now(),
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.book.price * self.quantity
    }
}

impl From<CartLine> for CartItem {
    fn from(line: CartLine) -> Self {
        CartItem {
            book: line.book,
            quantity: line.quantity,
            added_at: line.added_at,
        }
    }
}

impl From<&CartItem> for CartLine {
    fn from(item: &CartItem) -> Self {
        CartLine {
            book: item.book.clone(),
            quantity: item.quantity,
            added_at: item.added_at,
        }
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by book id (adding the same book increases quantity)
/// - Every quantity is between 1 and 999
/// - At most 100 lines
#[derive(Debug, Clone, Default, Serialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Adds `quantity` copies of a book, merging with an existing line.
    pub fn add_book(&mut self, book: &Book, quantity: i64) -> CoreResult<()> {
        readnest_core::validation::validate_quantity(quantity)?;

        if let Some(item) = self.items.iter_mut().find(|i| i.book.id == book.id) {
            let new_qty = item.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            item.quantity = new_qty;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge { max: MAX_CART_ITEMS });
        }

        self.items.push(CartItem::new(book, quantity));
        Ok(())
    }

    /// Sets the quantity of a line; zero or less removes it.
    pub fn update_quantity(&mut self, book_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            return self.remove(book_id);
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        let item = self
            .items
            .iter_mut()
            .find(|i| i.book.id == book_id)
            .ok_or_else(|| CoreError::NotInCart(book_id.to_string()))?;
        item.quantity = quantity;
        Ok(())
    }

    /// Removes a line by book id.
    pub fn remove(&mut self, book_id: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.book.id != book_id);

        if self.items.len() == initial_len {
            Err(CoreError::NotInCart(book_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Removes every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of distinct books.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Total number of copies across all lines.
    pub fn total_items(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Sum of the line totals, before shipping and tax.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Computes the totals shown in the cart and charged at checkout.
    pub fn totals(&self, config: &ConfigState) -> CartTotals {
        let subtotal = self.subtotal();
        let shipping = if self.is_empty() {
            Money::zero()
        } else {
            config.shipping_fee()
        };
        let tax = subtotal.calculate_tax(config.tax_rate());

        CartTotals {
            item_count: self.item_count(),
            total_quantity: self.total_items(),
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }
}

/// Cart totals summary.
///
/// ```text
/// subtotal = Σ price × quantity
/// shipping = flat fee (0 when the cart is empty)
/// tax      = subtotal × rate
/// total    = subtotal + shipping + tax
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
}

/// Shared cart state.
///
/// Uses `Arc<Mutex<Cart>>`: every page that touches the cart changes it,
/// and the lock is never held across an await.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    /// Creates a new empty cart state.
    pub fn new() -> Self {
        CartState {
            cart: Arc::new(Mutex::new(Cart::new())),
        }
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = cart_state.with_cart(|cart| cart.totals(&config));
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// cart_state.with_cart_mut(|cart| cart.add_book(&book, 1))?;
    /// ```
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut cart)
    }

    /// Replaces the in-memory cart with the one saved in the local store.
    pub async fn load(&self, db: &Database) -> DbResult<()> {
        let lines = db.cart().load().await?;
        debug!(lines = lines.len(), "Restored cart");
        self.with_cart_mut(|cart| {
            cart.items = lines.into_iter().map(CartItem::from).collect();
        });
        Ok(())
    }

    /// Writes the in-memory cart to the local store.
    pub async fn persist(&self, db: &Database) -> DbResult<()> {
        let lines: Vec<CartLine> = self.with_cart(|cart| cart.items.iter().map(CartLine::from).collect());
        db.cart().replace(&lines).await
    }
}
