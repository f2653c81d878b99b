use thiserror::Error;

/// Network or HTTP failure while fetching a page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} on {url}")]
    Status { status: u16, url: String },

    /// The page came back but its body did not yield usable state.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Terminal outcome of a retried fetch, wrapping the last attempt's error.
    #[error("failed after {attempts} attempt(s): {label}: {source}")]
    Failed {
        label: String,
        attempts: u32,
        #[source]
        source: Box<FetchError>,
    },
}

impl FetchError {
    /// HTTP status of the underlying failure, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http(e) => e.status().map(|s| s.as_u16()),
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Extraction(_) => None,
            FetchError::Failed { source, .. } => source.status(),
        }
    }
}

/// The page was fetched but carries no usable embedded state.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no __PRELOADED_STATE__ found in page")]
    NotFound,

    #[error("embedded state from {strategy} is not valid JSON: {source}")]
    InvalidJson {
        strategy: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("embedded state is missing `{path}`")]
    MissingPath { path: &'static str },
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Caller input was rejected before any network traffic.
    #[error("{0}")]
    Validation(String),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl ScraperError {
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, ScraperError::Validation(_))
    }
}
