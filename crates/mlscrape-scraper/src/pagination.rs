//! Sequential "next link" pagination over rendered listing pages.
//!
//! Listing and search pages render an Andes pagination control; the
//! enabled "next" button carries the URL of the following page. There is no
//! page count or cursor in the embedded state, so the DOM is the only
//! source of the cursor.

use std::collections::HashSet;
use std::future::Future;
use std::sync::LazyLock;

use scraper::Selector;

use crate::client::FetchedPage;
use crate::error::ScraperError;

const NEXT_LINK_SELECTOR: &str = ".andes-pagination__button--next:not(.andes-pagination__button--disabled) .andes-pagination__link";

static NEXT_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(NEXT_LINK_SELECTOR).expect("valid pagination selector"));

/// Items normalized from one page plus the cursor to the next one.
#[derive(Debug)]
pub struct PageBatch<T> {
    pub items: Vec<T>,
    pub next_url: Option<String>,
}

/// Returns the enabled "next page" link of `page`, resolved against the
/// page URL, or `None` on the last page.
#[must_use]
pub fn next_page_url(page: &FetchedPage) -> Option<String> {
    let document = page.document();
    let href = document
        .select(&NEXT_LINK)
        .next()?
        .value()
        .attr("href")?
        .trim();
    if href.is_empty() {
        return None;
    }
    Some(resolve_href(page.url(), href))
}

/// Resolves a possibly relative `href`; falls back to the raw value when
/// the base is not an absolute URL.
fn resolve_href(base: &str, href: &str) -> String {
    reqwest::Url::parse(base)
        .and_then(|b| b.join(href))
        .map_or_else(|_| href.to_owned(), String::from)
}

/// Page identity for the revisit guard; fragments never reach the server.
fn visit_key(url: &str) -> &str {
    url.split('#').next().unwrap_or(url)
}

/// Drives `fetch_one` from `seed_url` until there is no next link or
/// `max_pages` pages were fetched (`0` means no limit).
///
/// Pages are fetched strictly one after another. Items are appended in page
/// order without deduplication. A next link pointing at a page already
/// fetched in this run ends the loop.
///
/// # Errors
///
/// The first error returned by `fetch_one` aborts pagination; items from
/// earlier pages are discarded.
pub async fn paginate<T, F, Fut>(
    seed_url: &str,
    max_pages: u32,
    mut fetch_one: F,
) -> Result<Vec<T>, ScraperError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<PageBatch<T>, ScraperError>>,
{
    let mut all_items = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut next = Some(seed_url.to_owned());
    let mut pages = 0u32;

    while let Some(url) = next.take() {
        if max_pages != 0 && pages >= max_pages {
            break;
        }
        if !visited.insert(visit_key(&url).to_owned()) {
            tracing::warn!(url, pages, "next page link revisits a fetched page; stopping");
            break;
        }

        let batch = fetch_one(url.clone()).await?;
        pages += 1;
        tracing::debug!(url, page = pages, items = batch.items.len(), "page collected");

        all_items.extend(batch.items);
        next = batch.next_url;
    }

    Ok(all_items)
}
