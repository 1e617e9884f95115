//! Orders page: the reader's past orders with their items.

use readnest_core::Order;
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::AppContext;

#[derive(Debug, Clone, Serialize)]
pub struct OrdersPage {
    pub orders: Vec<Order>,
}

pub async fn run(ctx: &AppContext) -> Result<OrdersPage, ApiError> {
    let (user, token) = ctx.signed_in("view your orders").await?;

    let mut orders = ctx.store()?.orders_for_user(&token, &user.id).await?;
    // Newest first, even if the row store ignored the order parameter
    orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));

    debug!(user_id = %user.id, count = orders.len(), "Loaded orders");
    Ok(OrdersPage { orders })
}
