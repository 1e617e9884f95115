//! ReadNest - a bookstore in the terminal.
//!
//! Commands:
//! - `readnest home` - Featured books and new releases
//! - `readnest browse` - Search and filter the catalog
//! - `readnest book <id>` - Book details and similar books
//! - `readnest cart` - Show and edit the cart
//! - `readnest checkout` - Place an order
//! - `readnest orders` - Order history
//! - `readnest login | register | logout | profile` - Account
//! - `readnest sell | exchange` - Used books
//! - `readnest publish` - Manuscript submissions
//! - `readnest recommendations | feedback` - Personalized picks

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;

use readnest_storefront_lib::commands::{
    self,
    account::{LoginArgs, RegisterArgs},
    browse::BrowseArgs,
    cart::CartCommand,
    checkout::CheckoutArgs,
    exchange::ExchangeCommand,
    feedback::FeedbackArgs,
    publish::PublishCommand,
    sell::SellArgs,
};
use readnest_storefront_lib::error::ApiError;
use readnest_storefront_lib::output::Output;
use readnest_storefront_lib::views::{show, Render};
use readnest_storefront_lib::{init_tracing, AppContext};

/// ReadNest - browse, buy, swap and publish books
#[derive(Parser)]
#[command(name = "readnest")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(long, global = true, env = "READNEST_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Featured books and this year's releases
    Home,

    /// Browse the catalog by category, or search it
    Browse(BrowseArgs),

    /// Show one book
    Book { id: String },

    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        command: Option<CartCommand>,
    },

    /// Place an order for the cart
    Checkout(CheckoutArgs),

    /// Show past orders
    Orders,

    /// Show your profile
    Profile,

    /// Sign in
    Login(LoginArgs),

    /// Create an account
    Register(RegisterArgs),

    /// Sign out
    Logout,

    /// Swap used books with other readers
    Exchange {
        #[command(subcommand)]
        command: Option<ExchangeCommand>,
    },

    /// List a used book for sale or exchange
    Sell(SellArgs),

    /// Submit manuscripts to partner publishers
    Publish {
        #[command(subcommand)]
        command: PublishCommand,
    },

    /// Books picked for you from your purchases
    Recommendations,

    /// Rate a book
    Feedback(FeedbackArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = Output::new(cli.verbose, cli.json);
    let ctx = AppContext::init(cli.config, output).await?;

    if let Err(e) = dispatch(&ctx, cli.command).await {
        ctx.output.error(&e);
        ctx.db.inner().close().await;
        std::process::exit(1);
    }

    ctx.db.inner().close().await;
    Ok(())
}

async fn dispatch(ctx: &AppContext, command: Commands) -> Result<(), ApiError> {
    match command {
        Commands::Home => render(ctx, commands::home::run(ctx).await),
        Commands::Browse(args) => render(ctx, commands::browse::run(ctx, &args).await),
        Commands::Book { id } => render(ctx, commands::book::run(ctx, &id).await),
        Commands::Cart { command } => {
            let command = command.unwrap_or(CartCommand::Show);
            render(ctx, commands::cart::run(ctx, &command).await)
        }
        Commands::Checkout(args) => render(ctx, commands::checkout::run(ctx, &args).await),
        Commands::Orders => render(ctx, commands::orders::run(ctx).await),
        Commands::Profile => render(ctx, commands::account::profile(ctx).await),
        Commands::Login(args) => render(ctx, commands::account::login(ctx, &args).await),
        Commands::Register(args) => render(ctx, commands::account::register(ctx, &args).await),
        Commands::Logout => render(ctx, commands::account::logout(ctx).await),
        Commands::Exchange { command } => match command.unwrap_or(ExchangeCommand::List) {
            ExchangeCommand::List => render(ctx, commands::exchange::list(ctx).await),
            ExchangeCommand::Request {
                requested_book_id,
                offer,
            } => render(
                ctx,
                commands::exchange::request(ctx, &requested_book_id, &offer).await,
            ),
            ExchangeCommand::Respond {
                request_id,
                decision,
            } => render(
                ctx,
                commands::exchange::respond(ctx, &request_id, decision).await,
            ),
        },
        Commands::Sell(args) => render(ctx, commands::sell::run(ctx, &args).await),
        Commands::Publish { command } => render(ctx, commands::publish::run(ctx, &command).await),
        Commands::Recommendations => render(ctx, commands::recommendations::run(ctx).await),
        Commands::Feedback(args) => render(ctx, commands::feedback::run(ctx, &args).await),
    }
}

fn render<T: Serialize + Render>(ctx: &AppContext, page: Result<T, ApiError>) -> Result<(), ApiError> {
    show(ctx, &page?);
    Ok(())
}
