//! Cart, checkout and order history.

use super::{shelf, table, Render};
use crate::commands::cart::CartPage;
use crate::commands::checkout::OrderConfirmation;
use crate::commands::orders::OrdersPage;
use crate::output::{status_badge, Output};
use crate::state::{CartTotals, ConfigState};

fn totals(totals: &CartTotals, config: &ConfigState, out: &Output) {
    out.kv("Subtotal", &config.format_money(totals.subtotal));
    out.kv("Shipping", &config.format_money(totals.shipping));
    out.kv("Tax", &config.format_money(totals.tax));
    out.kv("Total", &config.format_money(totals.total));
}

impl Render for CartPage {
    fn render(&self, config: &ConfigState, out: &Output) {
        out.header(&format!(
            "Cart ({} items, {} copies)",
            self.totals.item_count, self.totals.total_quantity
        ));

        if self.items.is_empty() {
            out.info("Your cart is empty. Browse with `readnest browse`");
            return;
        }

        let mut t = table(out, vec!["ID", "Title", "Price", "Qty", "Line total"]);
        for item in &self.items {
            t.add_row(vec![
                item.book.id.clone(),
                item.book.title.clone(),
                config.format_money(item.book.price),
                item.quantity.to_string(),
                config.format_money(item.line_total()),
            ]);
        }
        out.block(&t.to_string());
        totals(&self.totals, config, out);

        if !self.suggestions.is_empty() {
            shelf("Readers also bought", &self.suggestions, "", config, out);
        }
    }
}

impl Render for OrderConfirmation {
    fn render(&self, config: &ConfigState, out: &Output) {
        out.success(&format!("Order #{} placed", self.reference));
        out.kv("Status", &status_badge(&self.status.to_string()));
        out.kv("Total charged", &config.format_money(self.total));
        for item in &self.items {
            out.list_item(&format!("{} × {}", item.quantity, item.title));
        }
    }
}

impl Render for OrdersPage {
    fn render(&self, config: &ConfigState, out: &Output) {
        out.header("My orders");
        if self.orders.is_empty() {
            out.info("No orders yet");
            return;
        }

        let mut t = table(out, vec!["Order", "Date", "Status", "Copies", "Total"]);
        for order in &self.orders {
            t.add_row(vec![
                format!("#{}", order.short_reference()),
                order.order_date.format("%Y-%m-%d").to_string(),
                status_badge(&order.status.to_string()),
                order.total_quantity().to_string(),
                config.format_money(order.total_amount),
            ]);
        }
        out.block(&t.to_string());

        for order in &self.orders {
            out.header(&format!("Order #{}", order.short_reference()));
            let address = &order.shipping_address;
            out.kv(
                "Ship to",
                &format!(
                    "{} {}, {}, {} {}",
                    address.first_name, address.last_name, address.address, address.city, address.zip_code
                ),
            );
            out.kv("Payment", &order.payment_method);
            for item in &order.order_items {
                out.list_item(&format!(
                    "{} × {} by {} ({})",
                    item.quantity,
                    item.title,
                    item.author,
                    config.format_money(item.line_total())
                ));
            }
        }
    }
}
