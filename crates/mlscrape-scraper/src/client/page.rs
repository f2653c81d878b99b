use scraper::Html;
use serde_json::Value;

/// Output of one successful fetch-and-extract cycle.
///
/// The parsed DOM is rebuilt on demand by [`Self::document`] because
/// `scraper::Html` is not `Send` and must not live across an await point.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    url: String,
    state: Value,
    html: String,
}

impl FetchedPage {
    #[must_use]
    pub fn new(url: String, state: Value, html: String) -> Self {
        Self { url, state, html }
    }

    /// URL the page was requested from.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Embedded client application state.
    #[must_use]
    pub fn state(&self) -> &Value {
        &self.state
    }

    /// Queryable DOM of the page body.
    #[must_use]
    pub fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }
}
