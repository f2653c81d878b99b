pub mod client;
pub mod error;
pub mod extract;
pub mod json_path;
pub mod marketplace;
pub mod normalize;
pub mod pagination;
pub mod retry;
pub mod site;
pub mod user_agent;

pub use client::{FetchedPage, FetcherConfig, PageFetcher};
pub use error::{ExtractionError, FetchError, ScraperError};
pub use extract::extract_state;
pub use marketplace::Marketplace;
pub use normalize::{
    normalize_offer, normalize_product_detail, normalize_search, offers_from_state,
    search_results_from_state,
};
pub use pagination::{next_page_url, paginate, PageBatch};
pub use retry::RetryPolicy;
pub use site::MarketplaceSite;
