//! Account pages and feedback.

use super::{table, Render};
use crate::commands::account::{ProfilePage, SignedIn, SignedOut};
use crate::commands::feedback::FeedbackReceipt;
use crate::output::{stars, Output};
use crate::state::{ConfigState, Registration};

impl Render for SignedIn {
    fn render(&self, _config: &ConfigState, out: &Output) {
        out.success(&format!("Welcome back, {}", self.user.name));
    }
}

impl Render for SignedOut {
    fn render(&self, _config: &ConfigState, out: &Output) {
        match &self.email {
            Some(email) => out.success(&format!("Signed out {}", email)),
            None => out.info("Not signed in"),
        }
    }
}

impl Render for Registration {
    fn render(&self, _config: &ConfigState, out: &Output) {
        match self {
            Registration::SignedIn { user } => {
                out.success(&format!("Account created. Welcome, {}", user.name))
            }
            Registration::ConfirmationRequired { email } => {
                out.success("Account created");
                out.info(&format!(
                    "Check {} for a confirmation link, then run `readnest login`",
                    email
                ));
            }
        }
    }
}

impl Render for ProfilePage {
    fn render(&self, config: &ConfigState, out: &Output) {
        out.header(&format!("[{}] {}", self.initials, self.user.name));
        out.kv("Email", &self.user.email);
        if self.user.is_publisher {
            out.kv("Role", "publisher");
        }
        out.kv("Books purchased", &self.purchase_count.to_string());

        if !self.recent_purchases.is_empty() {
            out.header("Recent purchases");
            let mut t = table(out, vec!["Title", "Category", "Price", "Your rating", "Date"]);
            for purchase in &self.recent_purchases {
                t.add_row(vec![
                    purchase.title.clone(),
                    purchase.category.clone(),
                    config.format_money(purchase.price),
                    stars(f64::from(purchase.rating)),
                    purchase.purchased_at.format("%Y-%m-%d").to_string(),
                ]);
            }
            out.block(&t.to_string());
        }

        if !self.feedback.is_empty() {
            out.header("Your feedback");
            for feedback in &self.feedback {
                out.list_item(&format!(
                    "{} {} {}",
                    feedback.book_id,
                    stars(f64::from(feedback.rating)),
                    feedback.comment
                ));
            }
        }
    }
}

impl Render for FeedbackReceipt {
    fn render(&self, _config: &ConfigState, out: &Output) {
        out.success(&format!(
            "Thanks! You rated {} {}",
            self.feedback.book_id,
            stars(f64::from(self.feedback.rating))
        ));
        if self.purchase_rating_updated {
            out.info("Your recommendations will reflect this rating");
        }
    }
}
