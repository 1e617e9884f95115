//! # Account Pages
//!
//! Login, registration, logout and the profile page.
//!
//! Passwords are prompted on the terminal when not passed as flags.

use clap::Args;
use dialoguer::Password;
use readnest_core::validation::{
    validate_display_name, validate_email, validate_password, validate_password_confirmation,
};
use readnest_core::{Feedback, PurchaseRecord, User, ValidationError};
use serde::Serialize;
use tracing::warn;

use crate::error::{ApiError, ErrorCode};
use crate::state::Registration;
use crate::AppContext;

/// Purchases listed on the profile page.
const PROFILE_RECENT_PURCHASES: usize = 5;

#[derive(Debug, Clone, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    /// Prompted when omitted
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct RegisterArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    /// Prompted (with confirmation) when omitted
    #[arg(long)]
    pub password: Option<String>,

    /// Defaults to --password when that is given
    #[arg(long)]
    pub confirm_password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignedIn {
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignedOut {
    /// Email of the account that was signed out, if one was signed in.
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfilePage {
    pub user: User,
    pub initials: String,
    pub purchase_count: i64,
    pub recent_purchases: Vec<PurchaseRecord>,
    pub feedback: Vec<Feedback>,
}

fn prompt_password(prompt: &str) -> Result<String, ApiError> {
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| ApiError::internal(format!("Could not read password: {}", e)))
}

pub async fn login(ctx: &AppContext, args: &LoginArgs) -> Result<SignedIn, ApiError> {
    let email = args.email.trim();
    validate_email(email)?;

    let password = match &args.password {
        Some(password) => password.clone(),
        None => prompt_password("Password")?,
    };
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        }
        .into());
    }

    let user = ctx
        .session
        .login(&ctx.auth()?, &ctx.store()?, ctx.db.inner(), email, &password)
        .await?;
    Ok(SignedIn { user })
}

pub async fn register(ctx: &AppContext, args: &RegisterArgs) -> Result<Registration, ApiError> {
    let name = validate_display_name(&args.name)?;
    let email = args.email.trim();
    validate_email(email)?;

    let (password, confirmation) = match (&args.password, &args.confirm_password) {
        (Some(password), Some(confirmation)) => (password.clone(), confirmation.clone()),
        (Some(password), None) => (password.clone(), password.clone()),
        (None, _) => {
            let password = prompt_password("Password")?;
            let confirmation = prompt_password("Confirm password")?;
            (password, confirmation)
        }
    };
    validate_password(&password)?;
    validate_password_confirmation(&password, &confirmation)?;

    ctx.session
        .register(&ctx.auth()?, ctx.db.inner(), &name, email, &password)
        .await
}

pub async fn logout(ctx: &AppContext) -> Result<SignedOut, ApiError> {
    let email = ctx.session.current_user().await.map(|u| u.email);
    if email.is_some() {
        ctx.session.logout(&ctx.auth()?, ctx.db.inner()).await?;
    }
    Ok(SignedOut { email })
}

/// Profile page. The account is re-read from the BaaS when reachable.
pub async fn profile(ctx: &AppContext) -> Result<ProfilePage, ApiError> {
    let cached = ctx.session.require_user("view your profile").await?;

    let user = match refresh_account(ctx).await {
        Ok(user) => user,
        Err(e) if e.code == ErrorCode::NotAuthenticated => return Err(e),
        Err(e) => {
            warn!(error = %e, "Could not refresh account, showing cached details");
            cached
        }
    };

    let db = ctx.db.inner();
    let purchase_count = db.purchases().count(&user.id).await?;
    let recent_purchases = db
        .purchases()
        .recent(&user.id, PROFILE_RECENT_PURCHASES)
        .await?;
    let feedback = db.feedback().list_for_user(&user.id).await?;

    Ok(ProfilePage {
        initials: user.initials(),
        user,
        purchase_count,
        recent_purchases,
        feedback,
    })
}

async fn refresh_account(ctx: &AppContext) -> Result<User, ApiError> {
    let (_, token) = ctx.signed_in("view your profile").await?;
    let user = ctx.auth()?.current_user(&token).await?;
    ctx.session.update_user(ctx.db.inner(), user.clone()).await?;
    Ok(user)
}
