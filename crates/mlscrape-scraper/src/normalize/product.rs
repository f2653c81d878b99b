use std::collections::BTreeMap;

use serde_json::Value;

use mlscrape_core::{
    ProductDetail, ProductImage, RatingSummary, Review, SellerInfo, StockInfo, Variation,
    VariationOption,
};

use crate::json_path::JsonPath;
use crate::site::MarketplaceSite;

const TECHNICAL_SPECS_ID: &str = "technical_specifications";
const OUT_OF_STOCK_TEXT: &str = "Sin stock";

/// Normalizes the `pageState.initialState` object of a product page.
///
/// Sections the page omits come back as `None` or empty containers.
#[must_use]
pub fn normalize_product_detail(initial_state: &Value, site: &MarketplaceSite) -> ProductDetail {
    let empty = Value::Null;
    let components = initial_state.at("components").unwrap_or(&empty);
    let reviews = components.at("reviews_capability_v3").unwrap_or(&empty);

    ProductDetail {
        id: initial_state
            .string_at("id")
            .or_else(|| components.string_at("track.event_data.item_id")),
        title: components.string_at("header.title"),
        price: components.number_at("price.price.value"),
        previous_price: components.nonzero_number_at("price.price.original_value"),
        currency: site.currency.clone(),
        description: components.string_at("description.content"),
        highlight_tag: components.string_at("highlights.tag_action.label.text"),
        rating: RatingSummary {
            rating_value: reviews.nonzero_number_at("rating.average"),
            rating_count: reviews.nonzero_u64_at("rating.amount"),
            review_count: reviews
                .str_at("total_opinions")
                .and_then(first_digit_run)
                .unwrap_or(0),
        },
        reviews: reviews
            .array_at("reviews")
            .iter()
            .map(|review| Review {
                text: review.string_at("comment.content.text"),
                rating: review.number_at("rating"),
                date: review.string_at("comment.date"),
            })
            .collect(),
        images: gallery_images(components),
        stock: StockInfo {
            status: components.string_at("stock_information.title.text"),
            available_quantity: components
                .str_at("available_quantity.picker.description")
                .map(|d| d.replace(['(', ')'], ""))
                .filter(|d| !d.is_empty()),
        },
        seller_info: seller_info(components),
        variations: variations(components),
        features: technical_features(components),
    }
}

/// First run of ASCII digits in `text`, e.g. `"(1.234 opiniones)"` → `1`.
fn first_digit_run(text: &str) -> Option<u64> {
    text.split(|c: char| !c.is_ascii_digit())
        .find(|run| !run.is_empty())?
        .parse()
        .ok()
}

/// Gallery URLs built from the page's two templates. `None` unless both the
/// template config and the picture list exist.
fn gallery_images(components: &Value) -> Option<Vec<ProductImage>> {
    let config = components.at("gallery.picture_config")?;
    let pictures = components.at("gallery.pictures")?.as_array()?;

    let render = |template_key: &str, picture: &Value| -> Option<String> {
        let template = config.str_at(template_key)?;
        let id = picture.str_at("id").unwrap_or_default();
        let title = picture.str_at("sanitized_title").unwrap_or_default();
        Some(
            template
                .replacen("{id}", id, 1)
                .replacen("{sanitizedTitle}", title, 1),
        )
    };

    Some(
        pictures
            .iter()
            .map(|picture| ProductImage {
                standard: render("template", picture),
                high_res: render("template_2x", picture),
            })
            .collect(),
    )
}

/// Seller block; the experiment layout wins over the classic `seller_data`.
fn seller_info(components: &Value) -> SellerInfo {
    let Some(seller) = components
        .at("seller_experiment.seller_info")
        .or_else(|| components.at("seller_data"))
    else {
        return SellerInfo::default();
    };

    SellerInfo {
        name: seller
            .string_at("title")
            .or_else(|| components.string_at("seller_experiment.seller_link.label.text")),
        reputation_level: seller.string_at("power_seller_status.title"),
        sales_count: components
            .string_at("seller_experiment.subtitles.0.text")
            .or_else(|| components.string_at("seller_experiment.subtitles.0.values.bold_amount.text")),
    }
}

fn variations(components: &Value) -> Vec<Variation> {
    components
        .array_at("outside_variations.pickers")
        .iter()
        .map(|picker| Variation {
            name: picker
                .str_at("label.text")
                .map(|label| label.replacen(':', "", 1)),
            selected_value: picker.string_at("selected_option.text"),
            options: picker
                .array_at("products")
                .iter()
                .map(|option| VariationOption {
                    value: option.string_at("label.text"),
                    available: !option
                        .str_at("stock.text")
                        .is_some_and(|stock| stock.contains(OUT_OF_STOCK_TEXT)),
                })
                .collect(),
        })
        .collect()
}

/// Flattens technical attribute groups into `attribute id → text`.
fn technical_features(components: &Value) -> BTreeMap<String, String> {
    let container = components
        .at("highlighted_specs_attrs_swap")
        .or_else(|| components.at("highlighted_specs_attrs"));

    let Some(specs) = container.and_then(|c| {
        c.array_at("components")
            .iter()
            .find(|component| component.str_at("id") == Some(TECHNICAL_SPECS_ID))
    }) else {
        return BTreeMap::new();
    };

    specs
        .array_at("specs")
        .iter()
        .flat_map(|group| group.array_at("attributes"))
        .filter_map(|attribute| {
            Some((
                attribute.str_at("id")?.to_owned(),
                attribute.str_at("text")?.to_owned(),
            ))
        })
        .collect()
}
