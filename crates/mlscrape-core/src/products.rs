//! Stable output shapes produced by the page normalizers.
//!
//! Every field that the marketplace may omit is an `Option` and serializes
//! as `null`. Container fields (`tags`, `reviews`, `variations`, `features`)
//! are always present, possibly empty.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A product card from an offer listing or a search result page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedProduct {
    /// Marketplace item id, e.g. `"MLM1234567890"`.
    pub id: Option<String>,
    pub title: Option<String>,
    pub brand: Option<String>,
    /// Canonical product URL, or the raw listing URL when no catalog id exists.
    pub url: Option<String>,
    pub image_url: Option<String>,
    /// Current price exactly as the page reports it (integer or decimal).
    pub price: Option<Number>,
    pub previous_price: Option<Number>,
    /// Discount percentage.
    pub discount: Option<Number>,
    /// ISO 4217 code fixed per site, e.g. `"MXN"`.
    pub currency: String,
    /// Average star rating.
    pub rating: Option<Number>,
    /// Number of ratings behind `rating`.
    pub votes: Option<u64>,
    pub shipping: Shipping,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipping {
    pub text: Option<String>,
    /// Fulfilled by the marketplace's own logistics network.
    pub is_full: bool,
}

/// Everything scraped from a single product page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub id: Option<String>,
    pub title: Option<String>,
    pub price: Option<Number>,
    pub previous_price: Option<Number>,
    pub currency: String,
    pub description: Option<String>,
    /// Badge text such as `"MÁS VENDIDO"`.
    pub highlight_tag: Option<String>,
    pub rating: RatingSummary,
    pub reviews: Vec<Review>,
    /// `None` when the page has no gallery section at all.
    pub images: Option<Vec<ProductImage>>,
    pub stock: StockInfo,
    pub seller_info: SellerInfo,
    pub variations: Vec<Variation>,
    /// Technical specifications keyed by attribute id.
    pub features: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub rating_value: Option<Number>,
    pub rating_count: Option<u64>,
    /// Parsed from free text like `"128 opiniones"`; `0` when absent.
    pub review_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub text: Option<String>,
    pub rating: Option<Number>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub standard: Option<String>,
    pub high_res: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockInfo {
    pub status: Option<String>,
    pub available_quantity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerInfo {
    pub name: Option<String>,
    pub reputation_level: Option<String>,
    pub sales_count: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    pub name: Option<String>,
    pub selected_value: Option<String>,
    pub options: Vec<VariationOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationOption {
    pub value: Option<String>,
    pub available: bool,
}

impl NormalizedProduct {
    /// Returns `true` if the listing carries a previous price above the current one.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        match (
            self.previous_price.as_ref().and_then(Number::as_f64),
            self.price.as_ref().and_then(Number::as_f64),
        ) {
            (Some(previous), Some(current)) => previous > current,
            _ => false,
        }
    }
}
