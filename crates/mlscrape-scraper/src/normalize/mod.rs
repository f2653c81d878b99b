//! Mapping from raw embedded page state to the stable output shapes in
//! [`mlscrape_core::products`].
//!
//! Normalizers are pure and infallible: every lookup into the page state
//! goes through [`crate::json_path::JsonPath`], so a missing section only
//! blanks the fields that depend on it.

mod offer;
mod product;
mod search;

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Number, Value};

use crate::json_path::{find_component, JsonPath};
use crate::site::MarketplaceSite;

pub use offer::{normalize_offer, offers_from_state};
pub use product::normalize_product_detail;
pub use search::{normalize_search, search_results_from_state};

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Wrapper keys under which listing items carry their card, in lookup order.
const OFFER_CARD_KEYS: &[&str] = &["card", "polycard"];
const SEARCH_CARD_KEYS: &[&str] = &["polycard"];

/// Returns the first card wrapper present on `item`, trying `keys` in order.
fn find_card<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| item.get(*key).filter(|card| card.is_object()))
}

/// Read-only view over a listing card and its named components.
struct CardView<'a> {
    card: &'a Value,
    components: &'a [Value],
}

impl<'a> CardView<'a> {
    fn new(card: &'a Value) -> Self {
        Self {
            card,
            components: card.array_at("components"),
        }
    }

    fn component(&self, kind: &str) -> Option<&'a Value> {
        find_component(self.components, kind)
    }

    fn has_component(&self, kind: &str) -> bool {
        self.component(kind).is_some()
    }

    fn id(&self) -> Option<String> {
        self.card.string_at("metadata.id")
    }

    fn catalog_product_id(&self) -> Option<String> {
        self.card.string_at("metadata.product_id")
    }

    fn title(&self) -> Option<String> {
        self.component("title")?.string_at("title.text")
    }

    fn brand(&self) -> Option<String> {
        self.component("brand")?.string_at("brand.text")
    }

    fn price(&self) -> Option<Number> {
        self.component("price")?.number_at("price.current_price.value")
    }

    fn previous_price(&self) -> Option<Number> {
        self.component("price")?
            .nonzero_number_at("price.previous_price.value")
    }

    fn discount(&self) -> Option<Number> {
        self.component("price")?.nonzero_number_at("price.discount.value")
    }

    fn rating(&self) -> Option<Number> {
        self.component("reviews")?
            .nonzero_number_at("reviews.rating_average")
    }

    fn votes(&self) -> Option<u64> {
        self.component("reviews")?.nonzero_u64_at("reviews.total")
    }

    fn shipping_text(&self) -> Option<String> {
        self.component("shipping")?.string_at("shipping.text")
    }

    fn image_url(&self, site: &MarketplaceSite) -> Option<String> {
        self.card
            .str_at("pictures.pictures.0.id")
            .filter(|id| !id.is_empty())
            .map(|id| site.image_url(id))
    }
}

/// Lowercased title with each whitespace run replaced by `-`, truncated to
/// 50 chars. Leading and trailing runs are kept, as the site's own URLs do.
fn slugify_title(title: &str) -> String {
    WHITESPACE_RUN
        .replace_all(&title.to_lowercase(), "-")
        .chars()
        .take(50)
        .collect()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
