//! # Remote Configuration
//!
//! Where the catalog and the BaaS live, and how long to wait for them.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     READNEST_BACKEND_URL=https://xyz.supabase.co                       │
//! │     READNEST_ANON_KEY=eyJhbGci...                                      │
//! │     READNEST_CATALOG_URL / READNEST_CATALOG_API_KEY                    │
//! │     READNEST_HTTP_TIMEOUT=15                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/storefront/readnest.toml (Linux)                         │
//! │     ~/Library/Application Support/com.readnest.storefront/ (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     local BaaS on :54321, public volumes API                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # readnest.toml
//! [backend]
//! url = "https://xyz.supabase.co"
//! anon_key = "eyJhbGci..."
//! timeout_secs = 15
//!
//! [catalog]
//! base_url = "https://www.googleapis.com/books/v1"
//! timeout_secs = 10
//! default_max_results = 12
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{RemoteError, RemoteResult};

// =============================================================================
// Backend Settings
// =============================================================================

/// Connection settings for the backend-as-a-service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Project URL; auth lives under `/auth/v1`, tables under `/rest/v1`.
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// Public (anon) API key sent as the `apikey` header.
    #[serde(default)]
    pub anon_key: String,

    /// Request timeout (seconds).
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,
}

fn default_backend_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_backend_timeout() -> u64 {
    15
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings {
            url: default_backend_url(),
            anon_key: String::new(),
            timeout_secs: default_backend_timeout(),
        }
    }
}

impl BackendSettings {
    /// Checks the settings needed to build an auth or row store client.
    pub fn validate(&self) -> RemoteResult<()> {
        validate_http_url("backend.url", &self.url)?;

        if self.anon_key.trim().is_empty() {
            return Err(RemoteError::InvalidConfig(
                "backend.anon_key is not set (READNEST_ANON_KEY)".into(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(RemoteError::InvalidConfig(
                "backend.timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

// =============================================================================
// Catalog Settings
// =============================================================================

/// Settings for the public book catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// API root; volumes are under `{base_url}/volumes`.
    #[serde(default = "default_catalog_url")]
    pub base_url: String,

    /// Optional API key, appended as `key=`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout (seconds).
    #[serde(default = "default_catalog_timeout")]
    pub timeout_secs: u64,

    /// `maxResults` used when a caller does not ask for a specific count.
    #[serde(default = "default_max_results")]
    pub default_max_results: u32,
}

fn default_catalog_url() -> String {
    "https://www.googleapis.com/books/v1".to_string()
}

fn default_catalog_timeout() -> u64 {
    10
}

fn default_max_results() -> u32 {
    12
}

impl Default for CatalogSettings {
    fn default() -> Self {
        CatalogSettings {
            base_url: default_catalog_url(),
            api_key: None,
            timeout_secs: default_catalog_timeout(),
            default_max_results: default_max_results(),
        }
    }
}

// =============================================================================
// Main Remote Configuration
// =============================================================================

/// Complete configuration for the network clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// BaaS settings (auth + row store).
    #[serde(default)]
    pub backend: BackendSettings,

    /// Public catalog settings.
    #[serde(default)]
    pub catalog: CatalogSettings,
}

impl RemoteConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (readnest.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> RemoteResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading remote config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load remote config: {}. Using defaults.", e);
            let mut config = Self::default();
            config.apply_env_overrides();
            config
        })
    }

    /// Validates URLs and timeouts.
    ///
    /// The anon key is left to [`BackendSettings::validate`] so that the
    /// catalog pages work without backend credentials.
    pub fn validate(&self) -> RemoteResult<()> {
        validate_http_url("backend.url", &self.backend.url)?;
        validate_http_url("catalog.base_url", &self.catalog.base_url)?;

        if self.backend.timeout_secs == 0 || self.catalog.timeout_secs == 0 {
            return Err(RemoteError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.catalog.default_max_results == 0 {
            return Err(RemoteError::InvalidConfig(
                "catalog.default_max_results must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("READNEST_BACKEND_URL") {
            debug!(url = %url, "Overriding backend URL from environment");
            self.backend.url = url;
        }

        if let Ok(key) = std::env::var("READNEST_ANON_KEY") {
            self.backend.anon_key = key;
        }

        if let Ok(url) = std::env::var("READNEST_CATALOG_URL") {
            debug!(url = %url, "Overriding catalog URL from environment");
            self.catalog.base_url = url;
        }

        if let Ok(key) = std::env::var("READNEST_CATALOG_API_KEY") {
            self.catalog.api_key = Some(key).filter(|k| !k.is_empty());
        }

        // One timeout for both services
        if let Ok(timeout) = std::env::var("READNEST_HTTP_TIMEOUT") {
            match timeout.parse::<u64>() {
                Ok(secs) => {
                    self.backend.timeout_secs = secs;
                    self.catalog.timeout_secs = secs;
                }
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric READNEST_HTTP_TIMEOUT"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "readnest", "storefront")
            .map(|dirs| dirs.config_dir().join("readnest.toml"))
    }
}

fn validate_http_url(field: &str, raw: &str) -> RemoteResult<()> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| RemoteError::InvalidUrl(format!("{} '{}': {}", field, raw, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(RemoteError::InvalidUrl(format!(
            "{} must use http:// or https://, got {}://",
            field, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RemoteConfig::default();
        assert_eq!(config.backend.url, "http://localhost:54321");
        assert!(config.backend.anon_key.is_empty());
        assert_eq!(config.catalog.default_max_results, 12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = RemoteConfig::default();

        config.backend.url = "ftp://example.com".to_string();
        assert!(matches!(config.validate(), Err(RemoteError::InvalidUrl(_))));

        config.backend.url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(RemoteError::InvalidUrl(_))));

        config.backend.url = "https://xyz.supabase.co".to_string();
        config.catalog.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(RemoteError::InvalidConfig(_))));
    }

    #[test]
    fn test_backend_requires_anon_key() {
        let mut backend = BackendSettings::default();
        assert!(matches!(backend.validate(), Err(RemoteError::InvalidConfig(_))));

        backend.anon_key = "anon".to_string();
        assert!(backend.validate().is_ok());
    }

    #[test]
    fn test_base_url_trims_slash() {
        let backend = BackendSettings {
            url: "https://xyz.supabase.co/".to_string(),
            ..BackendSettings::default()
        };
        assert_eq!(backend.base_url(), "https://xyz.supabase.co");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
            [backend]
            url = "https://xyz.supabase.co"
            anon_key = "anon"
        "#;

        let config: RemoteConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.url, "https://xyz.supabase.co");
        assert_eq!(config.backend.timeout_secs, 15);
        assert_eq!(config.catalog.base_url, "https://www.googleapis.com/books/v1");
        assert!(config.catalog.api_key.is_none());
    }
}
