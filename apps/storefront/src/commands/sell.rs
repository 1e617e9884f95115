//! Sell page: list one of my books for sale or exchange.

use clap::Args;
use readnest_core::validation::validate_used_book_listing;
use readnest_core::{BookCondition, Money, NewUsedBook, UsedBook, UsedBookStatus};
use tracing::debug;

use crate::error::ApiError;
use crate::AppContext;

#[derive(Debug, Clone, Args)]
pub struct SellArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub author: String,

    #[arg(long)]
    pub description: Option<String>,

    /// Asking price, in dollars
    #[arg(long)]
    pub price: f64,

    /// new, like-new, good, fair or poor
    #[arg(long, default_value = "new")]
    pub condition: BookCondition,

    #[arg(long)]
    pub image_url: Option<String>,
}

impl SellArgs {
    fn listing(&self, user_id: &str) -> NewUsedBook {
        let non_empty = |s: &Option<String>| {
            s.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        NewUsedBook {
            user_id: user_id.to_string(),
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            description: non_empty(&self.description),
            price: Money::from_major_f64(self.price),
            condition: self.condition,
            image_url: non_empty(&self.image_url),
            status: UsedBookStatus::Available,
        }
    }
}

pub async fn run(ctx: &AppContext, args: &SellArgs) -> Result<UsedBook, ApiError> {
    let user = ctx.session.require_user("sell books").await?;

    let listing = args.listing(&user.id);
    validate_used_book_listing(&listing.title, &listing.author, listing.price)?;
    debug!(title = %listing.title, price = %listing.price, "Listing used book");

    let (_, token) = ctx.signed_in("sell books").await?;
    Ok(ctx.store()?.insert_used_book(&token, &listing).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_trims_and_drops_blank_optionals() {
        let args = SellArgs {
            title: "  Dune ".to_string(),
            author: "Frank Herbert".to_string(),
            description: Some("   ".to_string()),
            price: 7.5,
            condition: BookCondition::Good,
            image_url: None,
        };

        let listing = args.listing("user-1");
        assert_eq!(listing.title, "Dune");
        assert_eq!(listing.description, None);
        assert_eq!(listing.price, Money::from_cents(750));
        assert_eq!(listing.status, UsedBookStatus::Available);
    }
}
