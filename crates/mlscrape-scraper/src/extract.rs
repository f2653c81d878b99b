//! Locates the embedded client application state in server-rendered HTML.
//!
//! The marketplace ships its initial state in one of two ways:
//!
//! 1. a `<script id="__PRELOADED_STATE__">` element whose body is plain JSON;
//! 2. an inline script assigning `window.__PRELOADED_STATE__ = {...};`.
//!
//! Each convention is a strategy that either yields a result or reports
//! "not applicable"; they are tried in order and the first applicable one
//! wins.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::error::ExtractionError;

const STATE_MARKER: &str = "window.__PRELOADED_STATE__";

static ASSIGNMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"window\.__PRELOADED_STATE__\s*=\s*(\{.+\});").expect("valid state assignment regex")
});

static STATE_SCRIPT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script#__PRELOADED_STATE__").expect("valid state selector")
});

static SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("valid script selector"));

type Strategy = fn(&Html) -> Option<Result<Value, ExtractionError>>;

const STRATEGIES: &[Strategy] = &[from_state_script, from_window_assignment];

/// Parses `html` and returns its embedded state.
///
/// # Errors
///
/// - [`ExtractionError::NotFound`] when neither convention is present.
/// - [`ExtractionError::InvalidJson`] when the located blob does not parse.
pub fn extract_state(html: &str) -> Result<Value, ExtractionError> {
    let document = Html::parse_document(html);
    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(&document))
        .unwrap_or(Err(ExtractionError::NotFound))
}

fn from_state_script(document: &Html) -> Option<Result<Value, ExtractionError>> {
    let script = document.select(&STATE_SCRIPT).next()?;
    let raw: String = script.text().collect();
    Some(
        serde_json::from_str(raw.trim()).map_err(|source| ExtractionError::InvalidJson {
            strategy: "state script",
            source,
        }),
    )
}

fn from_window_assignment(document: &Html) -> Option<Result<Value, ExtractionError>> {
    document
        .select(&SCRIPT)
        .map(|script| script.text().collect::<String>())
        .filter(|text| text.contains(STATE_MARKER))
        .find_map(|text| {
            let captured = ASSIGNMENT_RE.captures(&text)?.get(1)?.as_str().to_owned();
            Some(
                serde_json::from_str(&captured).map_err(|source| ExtractionError::InvalidJson {
                    strategy: "window assignment",
                    source,
                }),
            )
        })
}
