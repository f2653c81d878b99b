//! The three scrape operations exposed to the server and CLI.

use mlscrape_core::{NormalizedProduct, ProductDetail};

use crate::client::{FetcherConfig, PageFetcher};
use crate::error::{ExtractionError, ScraperError};
use crate::json_path::JsonPath;
use crate::normalize::{normalize_product_detail, offers_from_state, search_results_from_state};
use crate::pagination::{next_page_url, paginate, PageBatch};
use crate::site::MarketplaceSite;

const INITIAL_STATE_PATH: &str = "pageState.initialState";

/// Offers, search and product-detail scraping over one shared fetcher.
#[derive(Debug, Clone)]
pub struct Marketplace {
    fetcher: PageFetcher,
    site: MarketplaceSite,
}

impl Marketplace {
    #[must_use]
    pub fn new(fetcher: PageFetcher, site: MarketplaceSite) -> Self {
        Self { fetcher, site }
    }

    /// Builds a fetcher from `config` for the default site.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::ClientBuild`] if the HTTP client cannot be built.
    pub fn from_config(config: FetcherConfig) -> Result<Self, ScraperError> {
        Ok(Self::new(PageFetcher::new(config)?, MarketplaceSite::default()))
    }

    /// Scrapes the daily offers listing, following "next" links for up to
    /// `max_pages` pages (`0` = until the last page).
    ///
    /// # Errors
    ///
    /// Any fetch or extraction failure aborts the whole listing.
    pub async fn list_offers(&self, max_pages: u32) -> Result<Vec<NormalizedProduct>, ScraperError> {
        tracing::info!(max_pages, "scraping offers");
        let products = paginate(&self.site.offers_url, max_pages, |url| async move {
            let page = self.fetcher.fetch_page(&url).await?;
            Ok(PageBatch {
                items: offers_from_state(page.state(), &self.site),
                next_url: next_page_url(&page),
            })
        })
        .await?;
        tracing::info!(count = products.len(), "offers scraped");
        Ok(products)
    }

    /// Scrapes search results for `query`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Validation`] for a blank query, before any request.
    /// - Any fetch or extraction failure aborts the search.
    pub async fn search(
        &self,
        query: &str,
        max_pages: u32,
    ) -> Result<Vec<NormalizedProduct>, ScraperError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ScraperError::Validation(
                "Query parameter \"q\" is required.".to_owned(),
            ));
        }

        tracing::info!(query, max_pages, "scraping search results");
        let seed = self.site.search_url(query);
        let products = paginate(&seed, max_pages, |url| async move {
            let page = self.fetcher.fetch_page(&url).await?;
            Ok(PageBatch {
                items: search_results_from_state(page.state(), &self.site),
                next_url: next_page_url(&page),
            })
        })
        .await?;
        tracing::info!(query, count = products.len(), "search scraped");
        Ok(products)
    }

    /// Scrapes one product page.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Validation`] when `url` is blank or not an absolute
    ///   http(s) URL.
    /// - [`ExtractionError::MissingPath`] when the page has no
    ///   `pageState.initialState`.
    /// - Fetch failures as returned by [`PageFetcher::fetch_page`].
    pub async fn get_product(&self, url: &str) -> Result<ProductDetail, ScraperError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ScraperError::Validation("Product URL is required.".to_owned()));
        }
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| ScraperError::Validation(format!("Invalid product URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ScraperError::Validation(format!(
                "Invalid product URL: unsupported scheme {}",
                parsed.scheme()
            )));
        }

        tracing::info!(url, "scraping product detail");
        let page = self.fetcher.fetch_page(url).await?;
        let initial_state = page
            .state()
            .at(INITIAL_STATE_PATH)
            .ok_or(ExtractionError::MissingPath {
                path: INITIAL_STATE_PATH,
            })?;
        Ok(normalize_product_detail(initial_state, &self.site))
    }
}
