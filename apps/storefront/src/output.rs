//! Terminal output for pages: styled messages on a console, or JSON with `--json`.

use console::{style, Term};
use serde::Serialize;

use crate::error::ApiError;

/// Output handler for page messages.
#[derive(Debug, Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
    term: Term,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self {
            verbose,
            json,
            term: Term::stdout(),
        }
    }

    /// Output that prints nothing but JSON; used by tests.
    pub fn quiet() -> Self {
        Self::new(false, true)
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print a page error.
    pub fn error(&self, err: &ApiError) {
        if self.json {
            if let Ok(json) = serde_json::to_string(err) {
                eprintln!("{}", json);
            }
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(&err.message).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(&self, item: &str) {
        if self.json {
            return;
        }
        println!("  {} {}", style("•").dim(), item);
    }

    /// Print a pre-rendered block (tables).
    pub fn block(&self, text: &str) {
        if self.json {
            return;
        }
        println!("{}", text);
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Terminal width, used to cap table width.
    pub fn term_width(&self) -> u16 {
        self.term.size().1
    }
}

/// Colours an order, listing or exchange status.
pub fn status_badge(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "delivered" | "available" | "accepted" => style(status).green().to_string(),
        "processing" | "shipped" | "pending" => style(status).yellow().to_string(),
        "cancelled" | "rejected" => style(status).red().to_string(),
        "sold" | "exchanged" => style(status).dim().to_string(),
        _ => status.to_string(),
    }
}

/// Renders a 0-5 rating as stars, e.g. `★★★★☆ 4.2`.
pub fn stars(rating: f64) -> String {
    let full = rating.round().clamp(0.0, 5.0) as usize;
    format!("{}{} {:.1}", "★".repeat(full), "☆".repeat(5 - full), rating)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stars() {
        assert_eq!(stars(4.2), "★★★★☆ 4.2");
        assert_eq!(stars(0.0), "☆☆☆☆☆ 0.0");
        assert_eq!(stars(7.0), "★★★★★ 7.0");
    }

    #[test]
    fn test_status_badge_unknown_is_plain() {
        assert_eq!(status_badge("mystery"), "mystery");
    }
}
