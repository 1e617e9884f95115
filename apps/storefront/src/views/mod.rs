//! # Views
//!
//! Text rendering of page responses. Pages return plain data; `show` picks
//! JSON (`--json`) or the page's [`Render`] implementation.
//!
//! ```text
//! commands::<page>::run ──► response ──► show ──┬── --json ──► Output::json
//!                                               └── text ────► Render::render
//! ```

mod account;
mod catalog;
mod market;
mod shopping;

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use readnest_core::Book;
use serde::Serialize;

use crate::output::{stars, Output};
use crate::state::ConfigState;
use crate::AppContext;

/// Renders a page response as text.
pub trait Render {
    fn render(&self, config: &ConfigState, out: &Output);
}

/// Prints a page response in the format the reader asked for.
pub fn show<T: Serialize + Render>(ctx: &AppContext, page: &T) {
    if ctx.output.is_json() {
        ctx.output.json(page);
    } else {
        page.render(&ctx.config, &ctx.output);
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// A UTF-8 table sized to the terminal.
pub(crate) fn table(out: &Output, header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(out.term_width())
        .set_header(header);
    table
}

/// The standard book listing: id, title, author, price, rating.
pub(crate) fn book_table(books: &[Book], config: &ConfigState, out: &Output) -> Table {
    let mut t = table(out, vec!["ID", "Title", "Author", "Price", "Rating"]);
    for book in books {
        let price = if book.in_stock {
            config.format_money(book.price)
        } else {
            format!("{} (out of stock)", config.format_money(book.price))
        };
        t.add_row(vec![
            book.id.clone(),
            book.title.clone(),
            book.author.clone(),
            price,
            format!("{} ({})", stars(book.rating), book.review_count),
        ]);
    }
    t
}

/// Prints a titled book shelf, or `empty` when there are no books.
pub(crate) fn shelf(title: &str, books: &[Book], empty: &str, config: &ConfigState, out: &Output) {
    out.header(title);
    if books.is_empty() {
        out.info(empty);
    } else {
        out.block(&book_table(books, config, out).to_string());
    }
}
