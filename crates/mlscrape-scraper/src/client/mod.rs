//! Proxied, identity-rotating HTTP fetcher for marketplace pages.

mod page;

use std::time::Duration;

use mlscrape_core::{AppConfig, ProxyConfig};
use reqwest::Client;

use crate::error::{FetchError, ScraperError};
use crate::extract::extract_state;
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::user_agent::random_user_agent;

pub use page::FetchedPage;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml";

/// Transport settings for [`PageFetcher`].
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Forward proxy; `None` connects directly.
    pub proxy: Option<ProxyConfig>,
    /// Timeout for a single attempt, connect through body.
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout: Duration::from_secs(25),
            retry: RetryPolicy::default(),
        }
    }
}

impl FetcherConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            proxy: config.proxy.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
            retry: RetryPolicy {
                max_attempts: config.max_attempts,
                base_delay: Duration::from_millis(config.retry_base_ms),
                max_delay: Duration::from_millis(config.retry_max_delay_ms),
                max_jitter: Duration::from_millis(config.retry_jitter_ms),
            },
        }
    }
}

/// Fetches marketplace pages and extracts their embedded state.
///
/// One `reqwest::Client` is shared by all calls; everything else (attempt
/// budget, identity, backoff) is local to each [`Self::fetch_page`] call.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl PageFetcher {
    /// Builds the HTTP client with the per-attempt timeout and proxy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::ClientBuild`] if the proxy URL is invalid or
    /// the TLS backend cannot be initialized.
    pub fn new(config: FetcherConfig) -> Result<Self, ScraperError> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout.min(Duration::from_secs(10)));

        builder = match &config.proxy {
            Some(proxy) => {
                let mut forward =
                    reqwest::Proxy::all(proxy.url()).map_err(ScraperError::ClientBuild)?;
                if let Some(username) = &proxy.username {
                    forward =
                        forward.basic_auth(username, proxy.password.as_deref().unwrap_or_default());
                }
                builder.proxy(forward)
            }
            None => builder.no_proxy(),
        };

        let client = builder.build().map_err(ScraperError::ClientBuild)?;
        Ok(Self {
            client,
            retry: config.retry,
        })
    }

    /// Fetches `url` and extracts its embedded state.
    ///
    /// Each attempt is a full fetch-and-extract cycle with a fresh random
    /// `User-Agent`. Any status >= 400 counts as a failed attempt. A 2xx
    /// page without embedded state (captcha, interstitial) is retried too.
    /// Malformed state is not.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Fetch`] with [`FetchError::Failed`] once the attempt
    ///   budget is spent on HTTP failures or a permanent status (404, 410)
    ///   is returned.
    /// - [`ScraperError::Extraction`] when the last attempt's page had no
    ///   usable state.
    pub async fn fetch_page(&self, url: &str) -> Result<FetchedPage, ScraperError> {
        let label = format!("scrape {url}");
        let (html, state) = retry_with_backoff(&self.retry, &label, || async move {
            let html = self.fetch_html(url).await?;
            let state = extract_state(&html)?;
            Ok::<_, FetchError>((html, state))
        })
        .await
        .map_err(surface_extraction_error)?;
        tracing::debug!(url, bytes = html.len(), "fetched page state");
        Ok(FetchedPage::new(url.to_owned(), state, html))
    }

    /// One attempt: GET with a fresh identity, reject error statuses, read the body.
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, random_user_agent())
            .header(reqwest::header::ACCEPT, ACCEPT_HTML)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Reports an extraction failure as such instead of as a fetch failure.
fn surface_extraction_error(err: FetchError) -> ScraperError {
    match err {
        FetchError::Failed {
            label,
            attempts,
            source,
        } => match *source {
            FetchError::Extraction(extraction) => {
                tracing::warn!(label, attempts, error = %extraction, "no usable page state");
                ScraperError::Extraction(extraction)
            }
            other => ScraperError::Fetch(FetchError::Failed {
                label,
                attempts,
                source: Box::new(other),
            }),
        },
        other => ScraperError::Fetch(other),
    }
}
