//! Catalog pages: home, browse, book details and recommendations.

use readnest_core::browse::ALL_CATEGORIES;

use super::{shelf, Render};
use crate::commands::book::BookPage;
use crate::commands::browse::BrowsePage;
use crate::commands::home::HomePage;
use crate::commands::recommendations::RecommendationsPage;
use crate::output::{stars, Output};
use crate::state::ConfigState;

impl Render for HomePage {
    fn render(&self, config: &ConfigState, out: &Output) {
        out.header(&format!("Welcome to {}", self.store_name));
        match &self.user {
            Some(user) => out.info(&format!("Signed in as {}", user.name)),
            None => out.info("Sign in with `readnest login` to check out and track orders"),
        }

        shelf(
            &format!("Featured: {}", self.theme),
            &self.featured,
            "No featured books right now",
            config,
            out,
        );
        shelf(
            &format!("New releases {}", self.year),
            &self.new_releases,
            "No new releases found",
            config,
            out,
        );
    }
}

impl Render for BrowsePage {
    fn render(&self, config: &ConfigState, out: &Output) {
        let filter = &self.filter;
        if let Some(term) = filter.search_term() {
            out.debug(&format!("search: {}", term));
        }
        if filter.category != ALL_CATEGORIES {
            out.debug(&format!("category: {}", filter.category));
        }
        out.debug(&format!(
            "price: {} - {}, sort: {:?}",
            config.format_money(filter.min_price),
            config.format_money(filter.max_price),
            filter.sort
        ));

        if self.shelves.is_empty() {
            out.warn("No books match these filters");
            if !self.categories.is_empty() {
                out.info(&format!("Categories: {}", self.categories.join(", ")));
            }
            return;
        }

        for group in &self.shelves {
            shelf(&group.name, &group.books, "", config, out);
        }
        out.info(&format!(
            "{} books across {} shelves",
            self.total,
            self.shelves.len()
        ));
    }
}

impl Render for BookPage {
    fn render(&self, config: &ConfigState, out: &Output) {
        let book = &self.book;
        out.header(&book.title);
        out.kv("Author", &book.author);
        out.kv("Price", &config.format_money(book.price));
        out.kv("Rating", &format!("{} ({} reviews)", stars(book.rating), book.review_count));
        out.kv("Category", &book.category);
        out.kv("Publisher", &book.publisher);
        out.kv("Published", &book.published_date);
        out.kv("In stock", if book.in_stock { "yes" } else { "no" });
        out.kv("ID", &book.id);
        out.block("");
        out.block(&book.description);

        if !self.similar.is_empty() {
            shelf("You might also like", &self.similar, "", config, out);
        }
    }
}

impl Render for RecommendationsPage {
    fn render(&self, config: &ConfigState, out: &Output) {
        let title = if self.based_on == 0 {
            "Popular picks".to_string()
        } else {
            format!("Recommended for you (from {} purchases)", self.based_on)
        };
        shelf(&title, &self.books, "No recommendations yet", config, out);
    }
}
