//! Used book listings, exchanges and manuscript submissions.

use readnest_core::UsedBook;

use super::{table, Render};
use crate::commands::exchange::{role, ExchangeOutcome, ExchangePage};
use crate::commands::publish::PublishPage;
use crate::output::{status_badge, Output};
use crate::state::ConfigState;

fn listings(title: &str, books: &[UsedBook], empty: &str, config: &ConfigState, out: &Output) {
    out.header(title);
    if books.is_empty() {
        out.info(empty);
        return;
    }

    let mut t = table(out, vec!["ID", "Title", "Author", "Condition", "Price", "Status"]);
    for book in books {
        t.add_row(vec![
            book.id.clone(),
            book.title.clone(),
            book.author.clone(),
            book.condition.to_string(),
            config.format_money(book.price),
            status_badge(&book.status.to_string()),
        ]);
    }
    out.block(&t.to_string());
}

impl Render for ExchangePage {
    fn render(&self, config: &ConfigState, out: &Output) {
        listings(
            "Available for exchange",
            &self.available,
            "No books from other readers right now",
            config,
            out,
        );
        listings(
            "Your books",
            &self.mine,
            "List a book with `readnest sell` to start exchanging",
            config,
            out,
        );

        out.header("Requests");
        if self.requests.is_empty() {
            out.info("No exchange requests");
            return;
        }
        let mut t = table(out, vec!["ID", "Direction", "Wanted", "Offered", "Status"]);
        for request in &self.requests {
            t.add_row(vec![
                request.id.clone(),
                role(request, &self.user_id).to_string(),
                request.requested_book_id.clone(),
                request.offered_book_id.clone(),
                status_badge(&request.status.to_string()),
            ]);
        }
        out.block(&t.to_string());
    }
}

impl Render for ExchangeOutcome {
    fn render(&self, _config: &ConfigState, out: &Output) {
        out.success(&format!(
            "Exchange request {} is {}",
            self.request.id,
            status_badge(&self.request.status.to_string())
        ));
        for book in &self.updated_books {
            out.list_item(&format!("{} is now {}", book.title, status_badge(&book.status.to_string())));
        }
    }
}

impl Render for UsedBook {
    fn render(&self, config: &ConfigState, out: &Output) {
        out.success(&format!("Listed \"{}\"", self.title));
        out.kv("ID", &self.id);
        out.kv("Price", &config.format_money(self.price));
        out.kv("Condition", &self.condition.to_string());
        out.kv("Status", &status_badge(&self.status.to_string()));
    }
}

impl Render for PublishPage {
    fn render(&self, config: &ConfigState, out: &Output) {
        match self {
            PublishPage::Submitted { submission } => {
                out.success(&format!("Submitted \"{}\"", submission.title));
                out.kv("ID", &submission.id);
                out.kv("Author", &submission.author);
                out.kv("Price", &config.format_money(submission.price));
                out.info("Partner publishers will review your manuscript");
            }
            PublishPage::Publishers { publishers } => {
                out.header("Partner publishers");
                let mut t = table(out, vec!["Name", "Founded", "Books", "Website"]);
                for publisher in publishers {
                    t.add_row(vec![
                        publisher.name.clone(),
                        publisher.founded_year.to_string(),
                        publisher.book_count.to_string(),
                        publisher.website.clone(),
                    ]);
                }
                out.block(&t.to_string());
            }
            PublishPage::Submissions { submissions } => {
                out.header("Your submissions");
                if submissions.is_empty() {
                    out.info("Nothing submitted yet");
                    return;
                }
                let mut t = table(out, vec!["Submitted", "Title", "Author", "Category", "Price"]);
                for s in submissions {
                    t.add_row(vec![
                        s.submitted_at.format("%Y-%m-%d").to_string(),
                        s.title.clone(),
                        s.author.clone(),
                        s.category.clone(),
                        config.format_money(s.price),
                    ]);
                }
                out.block(&t.to_string());
            }
        }
    }
}
