//! # Catalog Client
//!
//! Read-only client for the public book catalog's volumes API.
//!
//! ## Volume → Book
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  volume.id                         ──► id                               │
//! │  volumeInfo.title                  ──► title        | "Unknown Title"   │
//! │  volumeInfo.authors.join(", ")     ──► author       | "Unknown Author"  │
//! │  saleInfo.retailPrice.amount                                            │
//! │    | saleInfo.listPrice.amount                                          │
//! │    | realistic_price(category, publishedDate)  ──► price                │
//! │  imageLinks.thumbnail | smallThumbnail ──► image    | placeholder       │
//! │  volumeInfo.categories[0]          ──► category     | "General"         │
//! │  averageRating / ratingsCount      ──► rating, review_count             │
//! │                                        | placeholder metrics            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Policy
//! Listing pages never show an error: a failed list request is logged and
//! answered with [`fallback_books`]. `by_id` answers `None`. Callers that
//! need the error use [`CatalogClient::try_search`].

use chrono::{Datelike, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use readnest_core::catalog::{
    self, fallback_books, placeholder_rating, placeholder_review_count, realistic_price,
};
use readnest_core::{Book, Money};

use crate::config::CatalogSettings;
use crate::error::{RemoteError, RemoteResult};
use crate::http::{build_client, check_status, decode_json};

/// Results per home page strip (featured, new releases).
pub const HOME_STRIP_SIZE: u32 = 4;

/// Volumes fetched as the candidate pool for personalized recommendations.
pub const RECOMMENDATION_POOL_SIZE: u32 = 40;

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct VolumeList {
    #[serde(default)]
    items: Vec<Volume>,
}

/// A catalog volume as returned by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub id: String,
    #[serde(default)]
    pub volume_info: VolumeInfo,
    #[serde(default)]
    pub sale_info: SaleInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub average_rating: Option<f64>,
    pub ratings_count: Option<u32>,
    #[serde(default)]
    pub image_links: ImageLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    pub thumbnail: Option<String>,
    pub small_thumbnail: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleInfo {
    pub retail_price: Option<Price>,
    pub list_price: Option<Price>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Price {
    pub amount: Option<f64>,
}

impl SaleInfo {
    /// Retail price, then list price; zero and missing amounts are skipped.
    fn catalog_price(&self) -> Option<Money> {
        [&self.retail_price, &self.list_price]
            .into_iter()
            .flatten()
            .filter_map(|p| p.amount)
            .find(|amount| *amount > 0.0)
            .map(Money::from_major_f64)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Maps a catalog volume to a storefront [`Book`].
pub fn map_volume(volume: Volume, current_year: i32) -> Book {
    let Volume {
        id,
        volume_info: info,
        sale_info,
    } = volume;

    let category = info
        .categories
        .into_iter()
        .next()
        .unwrap_or_else(|| catalog::GENERAL_CATEGORY.to_string());

    let price = sale_info.catalog_price().unwrap_or_else(|| {
        realistic_price(&category, info.published_date.as_deref(), current_year)
    });

    let author = if info.authors.is_empty() {
        catalog::UNKNOWN_AUTHOR.to_string()
    } else {
        info.authors.join(", ")
    };

    let image = non_empty(info.image_links.thumbnail)
        .or_else(|| non_empty(info.image_links.small_thumbnail))
        .unwrap_or_else(|| catalog::PLACEHOLDER_IMAGE.to_string());

    let rating = info
        .average_rating
        .filter(|r| *r > 0.0)
        .unwrap_or_else(|| placeholder_rating(&id));

    let review_count = info
        .ratings_count
        .filter(|c| *c > 0)
        .unwrap_or_else(|| placeholder_review_count(&id));

    Book {
        title: non_empty(info.title).unwrap_or_else(|| catalog::UNKNOWN_TITLE.to_string()),
        author,
        description: non_empty(info.description)
            .unwrap_or_else(|| catalog::NO_DESCRIPTION.to_string()),
        price,
        image,
        category,
        publisher: non_empty(info.publisher)
            .unwrap_or_else(|| catalog::UNKNOWN_PUBLISHER.to_string()),
        published_date: non_empty(info.published_date)
            .unwrap_or_else(|| catalog::UNKNOWN_DATE.to_string()),
        in_stock: true,
        rating,
        review_count,
        id,
    }
}

// =============================================================================
// Client
// =============================================================================

/// Client for `{base_url}/volumes`.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    volumes_url: Url,
    api_key: Option<String>,
    default_max_results: u32,
}

impl CatalogClient {
    /// Creates a client from the catalog settings.
    pub fn new(settings: &CatalogSettings) -> RemoteResult<Self> {
        let volumes_url = Url::parse(&format!(
            "{}/volumes",
            settings.base_url.trim_end_matches('/')
        ))?;

        Ok(CatalogClient {
            client: build_client(settings.timeout_secs)?,
            volumes_url,
            api_key: settings.api_key.clone().filter(|k| !k.is_empty()),
            default_max_results: settings.default_max_results,
        })
    }

    /// The `maxResults` used for shelves when the caller has no preference.
    pub fn default_max_results(&self) -> u32 {
        self.default_max_results
    }

    // =========================================================================
    // Raw Requests
    // =========================================================================

    async fn list_volumes(
        &self,
        query: &str,
        max_results: u32,
        extra: &[(&str, &str)],
    ) -> RemoteResult<Vec<Volume>> {
        let mut url = self.volumes_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", query)
                .append_pair("maxResults", &max_results.to_string());
            for (key, value) in extra {
                pairs.append_pair(key, value);
            }
            if let Some(key) = &self.api_key {
                pairs.append_pair("key", key);
            }
        }

        debug!(query, max_results, "Fetching catalog volumes");

        let response = check_status(self.client.get(url).send().await?).await?;
        let list: VolumeList = decode_json(response).await?;
        Ok(list.items)
    }

    fn map_all(volumes: Vec<Volume>) -> Vec<Book> {
        let year = Utc::now().year();
        volumes.into_iter().map(|v| map_volume(v, year)).collect()
    }

    fn or_fallback(query: &str, result: RemoteResult<Vec<Book>>) -> Vec<Book> {
        result.unwrap_or_else(|e| {
            warn!(query, error = %e, "Catalog request failed, serving fallback books");
            fallback_books()
        })
    }

    // =========================================================================
    // Listing Operations
    // =========================================================================

    /// Runs a raw catalog query and surfaces any failure.
    pub async fn try_search(&self, query: &str, max_results: u32) -> RemoteResult<Vec<Book>> {
        let volumes = self.list_volumes(query, max_results, &[]).await?;
        Ok(Self::map_all(volumes))
    }

    /// Runs a raw catalog query; failures yield the fallback books.
    pub async fn search(&self, query: &str, max_results: u32) -> Vec<Book> {
        Self::or_fallback(query, self.try_search(query, max_results).await)
    }

    /// Books filed under a subject.
    pub async fn by_category(&self, category: &str, max_results: u32) -> Vec<Book> {
        self.search(&catalog::category_query(category), max_results)
            .await
    }

    /// Books whose title or authors match `term`.
    pub async fn search_books(&self, term: &str, max_results: u32) -> Vec<Book> {
        self.search(&catalog::title_or_author_query(term), max_results)
            .await
    }

    /// The home page's featured strip for `today`'s theme.
    pub async fn featured(&self, today: NaiveDate) -> Vec<Book> {
        let theme = catalog::featured_theme(today);
        self.search(&catalog::featured_query(theme), HOME_STRIP_SIZE)
            .await
    }

    /// Books published in `year`.
    pub async fn new_releases(&self, year: i32) -> Vec<Book> {
        self.search(&catalog::new_releases_query(year), HOME_STRIP_SIZE)
            .await
    }

    /// Candidate pool for the recommendations page.
    ///
    /// English fiction print books; volumes without a title or authors are
    /// dropped before mapping.
    pub async fn recommendation_pool(&self) -> Vec<Book> {
        let query = "fiction";
        let result = self
            .list_volumes(
                query,
                RECOMMENDATION_POOL_SIZE,
                &[("printType", "books"), ("langRestrict", "en")],
            )
            .await
            .map(|volumes| {
                Self::map_all(
                    volumes
                        .into_iter()
                        .filter(|v| {
                            non_empty(v.volume_info.title.clone()).is_some()
                                && !v.volume_info.authors.is_empty()
                        })
                        .collect(),
                )
            });

        Self::or_fallback(query, result)
    }

    // =========================================================================
    // Single Volume
    // =========================================================================

    /// Fetches one volume; `Err` for transport, status and decode failures.
    pub async fn try_by_id(&self, id: &str) -> RemoteResult<Book> {
        let mut url = self.volumes_url.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::InvalidUrl(self.volumes_url.to_string()))?
            .push(id);
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }

        debug!(id, "Fetching catalog volume");

        let response = check_status(self.client.get(url).send().await?).await?;
        let volume: Volume = decode_json(response).await?;
        Ok(map_volume(volume, Utc::now().year()))
    }

    /// Fetches one volume; `None` when it cannot be loaded.
    pub async fn by_id(&self, id: &str) -> Option<Book> {
        match self.try_by_id(id).await {
            Ok(book) => Some(book),
            Err(e) => {
                warn!(id, error = %e, "Catalog lookup failed");
                None
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
