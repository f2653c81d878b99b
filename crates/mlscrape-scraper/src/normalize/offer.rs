use serde_json::Value;

use mlscrape_core::{NormalizedProduct, Shipping};

use super::{find_card, CardView, OFFER_CARD_KEYS};
use crate::json_path::JsonPath;
use crate::site::MarketplaceSite;

/// Icon key the offers grid uses for marketplace-fulfilled shipping.
const FULL_SHIPPING_ICON: &str = "vpp_full_icon";

/// Normalizes every card on an offers page.
///
/// Reads `data.items` and the `data.trackingAdditionalData` side table;
/// either may be absent. Items without a card wrapper are skipped.
#[must_use]
pub fn offers_from_state(state: &Value, site: &MarketplaceSite) -> Vec<NormalizedProduct> {
    let empty = Value::Null;
    let tracking = state.at("data.trackingAdditionalData").unwrap_or(&empty);
    let items = state.array_at("data.items");

    let products: Vec<NormalizedProduct> = items
        .iter()
        .filter_map(|item| normalize_offer(item, tracking, site))
        .collect();

    if products.len() < items.len() {
        tracing::debug!(
            items = items.len(),
            normalized = products.len(),
            "skipped offer items without a card"
        );
    }
    products
}

/// Normalizes one offers-grid item.
///
/// `tracking` is the page's tracking side table keyed by item id; its
/// `tags` feed [`NormalizedProduct::tags`]. Returns `None` only when the
/// item carries no card at all.
#[must_use]
pub fn normalize_offer(
    item: &Value,
    tracking: &Value,
    site: &MarketplaceSite,
) -> Option<NormalizedProduct> {
    let view = CardView::new(find_card(item, OFFER_CARD_KEYS)?);
    let id = view.id();

    let tags: Vec<String> = id
        .as_deref()
        .and_then(|id| tracking.get(id))
        .map(|entry| {
            entry
                .array_at("tags")
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    let url = view
        .catalog_product_id()
        .map(|product_id| site.catalog_product_url(&product_id))
        .or_else(|| raw_listing_url(view.card));

    let is_full = view
        .component("shipping")
        .and_then(|c| c.str_at("shipping.icon.key"))
        == Some(FULL_SHIPPING_ICON);

    Some(NormalizedProduct {
        title: view.title(),
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
            is_full,
        },
        tags,
        id,
    })
}

/// `metadata.url` is scheme-less and may carry a tracking fragment.
fn raw_listing_url(card: &Value) -> Option<String> {
    let raw = card.str_at("metadata.url")?;
    let without_fragment = raw.split('#').next().unwrap_or(raw);
    if without_fragment.is_empty() {
        return None;
    }
    if without_fragment.starts_with("http://") || without_fragment.starts_with("https://") {
        Some(without_fragment.to_owned())
    } else {
        Some(format!("https://{without_fragment}"))
    }
}
