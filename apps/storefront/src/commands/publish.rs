//! # Publish Page
//!
//! Authors submit manuscripts to the partner publishers.
//!
//! Submissions are kept in the local store; the partner list is static.

use chrono::{NaiveDate, Utc};
use clap::{Args, Subcommand};
use readnest_core::validation::{validate_isbn, validate_manuscript};
use readnest_core::{partner_publishers, ManuscriptSubmission, Money, Publisher, ValidationError};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppContext;

#[derive(Debug, Clone, Subcommand)]
pub enum PublishCommand {
    /// Submit a manuscript
    Submit(SubmitArgs),

    /// List the partner publishers
    Publishers,

    /// List manuscripts submitted from this device
    Submissions,
}

#[derive(Debug, Clone, Args)]
pub struct SubmitArgs {
    #[arg(long)]
    pub title: String,

    /// Defaults to your display name
    #[arg(long)]
    pub author: Option<String>,

    #[arg(long)]
    pub description: String,

    #[arg(long)]
    pub category: String,

    /// Suggested retail price, in dollars
    #[arg(long)]
    pub price: f64,

    #[arg(long)]
    pub isbn: Option<String>,

    #[arg(long)]
    pub pages: Option<u32>,

    /// YYYY-MM-DD
    #[arg(long)]
    pub publish_date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum PublishPage {
    Submitted { submission: ManuscriptSubmission },
    Publishers { publishers: Vec<Publisher> },
    Submissions { submissions: Vec<ManuscriptSubmission> },
}

pub async fn run(ctx: &AppContext, command: &PublishCommand) -> Result<PublishPage, ApiError> {
    match command {
        PublishCommand::Submit(args) => {
            let submission = submit(ctx, args).await?;
            Ok(PublishPage::Submitted { submission })
        }
        PublishCommand::Publishers => Ok(PublishPage::Publishers {
            publishers: partner_publishers(),
        }),
        PublishCommand::Submissions => Ok(PublishPage::Submissions {
            submissions: ctx.db.inner().manuscripts().list().await?,
        }),
    }
}

pub async fn submit(ctx: &AppContext, args: &SubmitArgs) -> Result<ManuscriptSubmission, ApiError> {
    let user = ctx.session.require_user("submit a manuscript").await?;
    let submission = args.submission(&user.name)?;

    ctx.db.inner().manuscripts().insert(&submission).await?;

    info!(id = %submission.id, title = %submission.title, "Manuscript submitted");
    Ok(submission)
}

impl SubmitArgs {
    fn submission(&self, default_author: &str) -> Result<ManuscriptSubmission, ValidationError> {
        let author = self
            .author
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(default_author);
        let price = Money::from_major_f64(self.price);
        let isbn = self
            .isbn
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        validate_manuscript(
            &self.title,
            author,
            &self.description,
            &self.category,
            price,
            isbn,
            self.pages,
        )?;

        let publish_date = match self.publish_date.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ValidationError::InvalidFormat {
                    field: "publish_date".to_string(),
                    reason: "expected YYYY-MM-DD".to_string(),
                })?,
            ),
            _ => None,
        };

        Ok(ManuscriptSubmission {
            id: Uuid::new_v4().to_string(),
            title: self.title.trim().to_string(),
            author: author.to_string(),
            description: self.description.trim().to_string(),
            price,
            category: self.category.trim().to_string(),
            isbn: isbn.map(validate_isbn).transpose()?,
            pages: self.pages,
            publish_date,
            submitted_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> SubmitArgs {
        SubmitArgs {
            title: "The Quiet Shelf".to_string(),
            author: None,
            description: "A novel about a bookshop.".to_string(),
            category: "Fiction".to_string(),
            price: 14.99,
            isbn: None,
            pages: Some(320),
            publish_date: Some("2026-03-01".to_string()),
        }
    }

    #[test]
    fn test_author_defaults_to_reader_name() {
        let submission = args().submission("Ada Reader").unwrap();
        assert_eq!(submission.author, "Ada Reader");
        assert_eq!(submission.price, Money::from_cents(1499));
        assert_eq!(
            submission.publish_date,
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );
    }

    #[test]
    fn test_bad_publish_date_is_rejected() {
        let mut args = args();
        args.publish_date = Some("March 2026".to_string());
        assert!(args.submission("Ada Reader").is_err());
    }

    #[test]
    fn test_zero_pages_is_rejected() {
        let mut args = args();
        args.pages = Some(0);
        assert!(args.submission("Ada Reader").is_err());
    }
}
