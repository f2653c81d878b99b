use serde_json::Value;

use mlscrape_core::{NormalizedProduct, Shipping};

use super::{find_card, slugify_title, CardView, SEARCH_CARD_KEYS};
use crate::json_path::JsonPath;
use crate::site::MarketplaceSite;

/// Item type the search grid uses for sponsored placements.
const PROMOTED_ITEM_TYPE: &str = "PERSO";

/// Normalizes every result on a search page, dropping results that are not
/// product cards (ads banners, related-search blocks, ...).
#[must_use]
pub fn search_results_from_state(state: &Value, site: &MarketplaceSite) -> Vec<NormalizedProduct> {
    state
        .array_at("pageStoreState.search.results")
        .iter()
        .filter_map(|item| normalize_search(item, site))
        .collect()
}

/// Normalizes one search result; `None` when it has no `polycard`.
#[must_use]
pub fn normalize_search(item: &Value, site: &MarketplaceSite) -> Option<NormalizedProduct> {
    let view = CardView::new(find_card(item, SEARCH_CARD_KEYS)?);
    let id = view.id();
    let title = view.title();

    let url = match view.catalog_product_id() {
        Some(product_id) => Some(site.catalog_product_url(&product_id)),
        None => id
            .as_deref()
            .map(|id| article_url(site, id, title.as_deref().unwrap_or_default())),
    };

    let tag = if item.str_at("type") == Some(PROMOTED_ITEM_TYPE) {
        "promoted"
    } else {
        "organic"
    };

    Some(NormalizedProduct {
        brand: view.brand(),
        url,
        image_url: view.image_url(site),
        price: view.price(),
        previous_price: view.previous_price(),
        discount: view.discount(),
        currency: site.currency.clone(),
        rating: view.rating(),
        votes: view.votes(),
        shipping: Shipping {
            text: view.shipping_text(),
            is_full: view.has_component("shipped_from"),
        },
        tags: vec![tag.to_owned()],
        id,
        title,
    })
}

/// Listing URL synthesized from the item id and title, e.g.
/// `MLM123` + `"Laptop Gamer"` → `{article_base}/MLM-123-laptop-gamer`.
fn article_url(site: &MarketplaceSite, id: &str, title: &str) -> String {
    let lowered = id.to_lowercase();
    let id_part = match lowered.strip_prefix("mlm") {
        Some(rest) => format!("MLM-{rest}"),
        None => lowered,
    };
    format!(
        "{}/{id_part}-{}",
        site.article_base_url,
        slugify_title(title)
    )
}
