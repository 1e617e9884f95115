//! # ReadNest Storefront Library
//!
//! Pages, state and views of the `readnest` command line storefront.
//!
//! ## Module Organization
//! ```text
//! readnest_storefront_lib/
//! ├── lib.rs          ◄─── You are here (AppContext, logging, paths)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── db.rs       ◄─── Local store wrapper
//! │   ├── cart.rs     ◄─── Cart state
//! │   ├── session.rs  ◄─── Signed-in reader and tokens
//! │   └── config.rs   ◄─── Tax, shipping and page sizes
//! ├── commands/       ◄─── One module per page
//! ├── views/          ◄─── Text rendering of page responses
//! ├── output.rs       ◄─── Console / JSON output
//! └── error.rs        ◄─── ApiError returned by pages
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing ─── stderr, RUST_LOG or "warn,readnest=info"           │
//! │  2. RemoteConfig ─── TOML file + READNEST_* overrides                   │
//! │  3. Database ─────── READNEST_DB_PATH or the platform data dir          │
//! │  4. State ────────── restore cart and session from the local store      │
//! │  5. Page ─────────── run the subcommand, render text or JSON            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod output;
pub mod state;
pub mod views;

use std::path::PathBuf;

use anyhow::Context;
use directories::ProjectDirs;
use readnest_core::User;
use readnest_db::{Database, DbConfig};
use readnest_remote::{AuthClient, CatalogClient, RemoteConfig, RowStoreClient};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use error::ApiError;
use output::Output;
use state::{CartState, ConfigState, DbState, SessionState};

/// Everything a page needs, built once in `main`.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub db: DbState,
    pub cart: CartState,
    pub session: SessionState,
    pub config: ConfigState,
    pub remote: RemoteConfig,
    pub catalog: CatalogClient,
    pub output: Output,
}

impl AppContext {
    /// Loads configuration, opens the local store and restores state.
    ///
    /// An explicit `config_path` must load; the default location falls back
    /// to defaults with a warning.
    pub async fn init(config_path: Option<PathBuf>, output: Output) -> anyhow::Result<Self> {
        let remote = match config_path {
            Some(path) => RemoteConfig::load(Some(path)).context("Failed to load config file")?,
            None => RemoteConfig::load_or_default(None),
        };

        let db_path = get_database_path()?;
        info!(?db_path, "Database path determined");

        let db = Database::new(DbConfig::new(db_path))
            .await
            .context("Failed to open local store")?;
        if !db.health_check().await {
            anyhow::bail!("Local store is not answering queries");
        }
        let (total, applied) = db.migration_status().await?;
        debug!(total, applied, "Local store migrations");

        let ctx = Self::from_parts(db, remote, ConfigState::from_env(), output).await?;
        Ok(ctx)
    }

    /// Builds the context around an open database and restores cart and session.
    pub async fn from_parts(
        db: Database,
        remote: RemoteConfig,
        config: ConfigState,
        output: Output,
    ) -> Result<Self, ApiError> {
        let catalog = CatalogClient::new(&remote.catalog)?;

        let cart = CartState::new();
        cart.load(&db).await?;

        let session = SessionState::new();
        session.restore(&db).await?;

        Ok(AppContext {
            db: DbState::new(db),
            cart,
            session,
            config,
            remote,
            catalog,
            output,
        })
    }

    /// Client for the BaaS auth endpoints; needs the anon key.
    pub fn auth(&self) -> Result<AuthClient, ApiError> {
        Ok(AuthClient::new(&self.remote.backend)?)
    }

    /// Client for the BaaS tables; needs the anon key.
    pub fn store(&self) -> Result<RowStoreClient, ApiError> {
        Ok(RowStoreClient::new(&self.remote.backend)?)
    }

    /// The signed-in reader plus a fresh access token, or `NotAuthenticated`.
    pub async fn signed_in(&self, action: &str) -> Result<(User, String), ApiError> {
        let user = self.session.require_user(action).await?;
        let token = self
            .session
            .access_token(&self.auth()?, self.db.inner(), action)
            .await?;
        Ok((user, token))
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `-v` - Same as `RUST_LOG=debug` when `RUST_LOG` is unset
/// - Default: warnings, plus info from the readnest crates
///
/// Logs go to stderr so page output on stdout stays clean.
pub fn init_tracing(verbose: bool) {
    let default = if verbose {
        "debug,sqlx=warn,hyper=info,reqwest=info"
    } else {
        "warn,readnest=info,sqlx=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Determines the local database file path.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.readnest.storefront/readnest.db`
/// - **Windows**: `%APPDATA%\readnest\storefront\data\readnest.db`
/// - **Linux**: `~/.local/share/storefront/readnest.db`
///
/// ## Override
/// Set `READNEST_DB_PATH` to use a custom path.
pub fn get_database_path() -> anyhow::Result<PathBuf> {
    if let Ok(path) = std::env::var("READNEST_DB_PATH") {
        return Ok(PathBuf::from(path));
    }

    let proj_dirs = ProjectDirs::from("com", "readnest", "storefront")
        .context("Could not determine app data directory")?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Could not create {}", data_dir.display()))?;

    Ok(data_dir.join("readnest.db"))
}
