use super::*;
use serde_json::json;
use mlscrape_core::SellerInfo;

fn site() -> MarketplaceSite {
    MarketplaceSite::default()
}

fn offer_card() -> Value {
    json!({
        "card": {
            "metadata": {
                "id": "MLM100",
                "product_id": "MLM9000",
                "url": "articulo.mercadolibre.com.mx/MLM-100-audifonos#polycard_client=offers"
            },
            "pictures": { "pictures": [{ "id": "612345-MLM7" }] },
            "components": [
                { "type": "title", "title": { "text": "Audífonos Inalámbricos" } },
                { "type": "brand", "brand": { "text": "Sony" } },
                {
                    "type": "price",
                    "price": {
                        "current_price": { "value": 899 },
                        "previous_price": { "value": 1299.5 },
                        "discount": { "value": 30 }
                    }
                },
                { "type": "reviews", "reviews": { "rating_average": 4.7, "total": 1520 } },
                {
                    "type": "shipping",
                    "shipping": { "text": "Envío gratis", "icon": { "key": "vpp_full_icon" } }
                }
            ]
        }
    })
}

#[test]
fn offer_card_maps_every_field() {
    let tracking = json!({ "MLM100": { "tags": ["deal_of_the_day", "best_seller"] } });
    let product = normalize_offer(&offer_card(), &tracking, &site()).expect("card present");

    assert_eq!(product.id.as_deref(), Some("MLM100"));
    assert_eq!(product.title.as_deref(), Some("Audífonos Inalámbricos"));
    assert_eq!(product.brand.as_deref(), Some("Sony"));
    assert_eq!(
        product.url.as_deref(),
        Some("https://www.mercadolibre.com.mx/p/MLM9000")
    );
    assert_eq!(
        product.image_url.as_deref(),
        Some("https://http2.mlstatic.com/D_Q_NP_2X_612345-MLM7-AB.webp")
    );
    assert_eq!(product.price, Some(Number::from(899)));
    assert_eq!(product.previous_price.as_ref().and_then(|n| n.as_f64()), Some(1299.5));
    assert_eq!(product.discount, Some(Number::from(30)));
    assert_eq!(product.currency, "MXN");
    assert_eq!(product.rating.as_ref().and_then(|n| n.as_f64()), Some(4.7));
    assert_eq!(product.votes, Some(1520));
    assert_eq!(product.shipping.text.as_deref(), Some("Envío gratis"));
    assert!(product.shipping.is_full);
    assert_eq!(product.tags, vec!["deal_of_the_day", "best_seller"]);
    assert!(product.is_discounted());
}

#[test]
fn offer_without_card_is_skipped() {
    assert!(normalize_offer(&json!({ "type": "banner" }), &Value::Null, &site()).is_none());
}

#[test]
fn offer_accepts_polycard_wrapper() {
    let item = json!({ "polycard": { "metadata": { "id": "MLM7" } } });
    let product = normalize_offer(&item, &Value::Null, &site()).expect("polycard");
    assert_eq!(product.id.as_deref(), Some("MLM7"));
}

#[test]
fn offer_with_sparse_card_blanks_missing_fields() {
    let item = json!({
        "card": {
            "metadata": { "id": "MLM1" },
            "components": [
                { "type": "price", "price": { "current_price": { "value": 100 }, "previous_price": { "value": 0 } } },
                { "type": "reviews", "reviews": { "rating_average": 0, "total": 0 } }
            ]
        }
    });
    let product = normalize_offer(&item, &Value::Null, &site()).expect("card");

    assert_eq!(product.price, Some(Number::from(100)));
    assert!(product.title.is_none());
    assert!(product.brand.is_none());
    assert!(product.url.is_none());
    assert!(product.image_url.is_none());
    assert!(product.previous_price.is_none());
    assert!(product.discount.is_none());
    assert!(product.rating.is_none());
    assert!(product.votes.is_none());
    assert!(product.shipping.text.is_none());
    assert!(!product.shipping.is_full);
    assert!(product.tags.is_empty());
    assert!(!product.is_discounted());
}

#[test]
fn offer_without_catalog_id_uses_listing_url() {
    let mut item = offer_card();
    item["card"]["metadata"]["product_id"] = Value::Null;
    let product = normalize_offer(&item, &Value::Null, &site()).expect("card");
    assert_eq!(
        product.url.as_deref(),
        Some("https://articulo.mercadolibre.com.mx/MLM-100-audifonos")
    );
}

#[test]
fn offers_from_state_reads_items_and_tracking_table() {
    let state = json!({
        "data": {
            "items": [offer_card(), { "type": "banner" }],
            "trackingAdditionalData": { "MLM100": { "tags": ["lightning_deal"] } }
        }
    });
    let products = offers_from_state(&state, &site());
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].tags, vec!["lightning_deal"]);
}

#[test]
fn offers_from_state_without_items_is_empty() {
    assert!(offers_from_state(&json!({ "data": {} }), &site()).is_empty());
}

fn search_result(id: &str, item_type: &str, product_id: Option<&str>) -> Value {
    json!({
        "type": item_type,
        "polycard": {
            "metadata": { "id": id, "product_id": product_id },
            "components": [
                { "type": "title", "title": { "text": "Laptop  Gamer Ryzen 7" } },
                { "type": "price", "price": { "current_price": { "value": 15999 } } },
                { "type": "shipped_from" },
                { "type": "shipping", "shipping": { "text": "Llega mañana" } }
            ]
        }
    })
}

#[test]
fn search_result_without_polycard_is_none() {
    let item = json!({ "type": "ITEM", "card": { "metadata": { "id": "MLM1" } } });
    assert!(normalize_search(&item, &site()).is_none());
}

#[test]
fn search_result_tags_promoted_and_organic() {
    let promoted = normalize_search(&search_result("MLM1", "PERSO", None), &site()).expect("card");
    let organic = normalize_search(&search_result("MLM2", "ITEM", None), &site()).expect("card");
    assert_eq!(promoted.tags, vec!["promoted"]);
    assert_eq!(organic.tags, vec!["organic"]);
}

#[test]
fn search_result_full_shipping_comes_from_shipped_from_component() {
    let product = normalize_search(&search_result("MLM1", "ITEM", None), &site()).expect("card");
    assert!(product.shipping.is_full);
    assert_eq!(product.shipping.text.as_deref(), Some("Llega mañana"));
}

#[test]
fn search_result_without_catalog_id_gets_article_url() {
    let product =
        normalize_search(&search_result("MLM123456", "ITEM", None), &site()).expect("card");
    assert_eq!(
        product.url.as_deref(),
        Some("https://articulo.mercadolibre.com.mx/MLM-123456-laptop-gamer-ryzen-7")
    );
}

#[test]
fn search_result_with_catalog_id_gets_product_url() {
    let product =
        normalize_search(&search_result("MLM1", "ITEM", Some("MLM777")), &site()).expect("card");
    assert_eq!(
        product.url.as_deref(),
        Some("https://www.mercadolibre.com.mx/p/MLM777")
    );
}

#[test]
fn search_results_from_state_filters_non_cards() {
    let state = json!({
        "pageStoreState": {
            "search": {
                "results": [
                    search_result("MLM1", "ITEM", None),
                    { "type": "RELATED_SEARCHES" },
                    search_result("MLM2", "PERSO", None)
                ]
            }
        }
    });
    let products = search_results_from_state(&state, &site());
    let ids: Vec<_> = products.iter().filter_map(|p| p.id.as_deref()).collect();
    assert_eq!(ids, vec!["MLM1", "MLM2"]);
}

#[test]
fn slug_is_truncated_to_fifty_chars() {
    let slug = slugify_title(&"palabra ".repeat(20));
    assert_eq!(slug.chars().count(), 50);
    assert!(slug.starts_with("palabra-palabra"));
}

#[test]
fn slug_keeps_edge_whitespace_as_dashes() {
    assert_eq!(slugify_title(" Laptop  Gamer "), "-laptop-gamer-");
    assert_eq!(slugify_title("Tab\tY\nSalto"), "tab-y-salto");
}

fn product_state() -> Value {
    json!({
        "id": "MLM555",
        "components": {
            "header": { "title": "Smart TV 55\"" },
            "price": { "price": { "value": 7999, "original_value": 9999 } },
            "description": { "content": "Pantalla 4K" },
            "highlights": { "tag_action": { "label": { "text": "MÁS VENDIDO" } } },
            "reviews_capability_v3": {
                "rating": { "average": 4.6, "amount": 310 },
                "total_opinions": "(1.234 opiniones)",
                "reviews": [
                    { "rating": 5, "comment": { "content": { "text": "Excelente" }, "date": "12 mar. 2024" } },
                    { "rating": 3 }
                ]
            },
            "gallery": {
                "picture_config": {
                    "template": "https://img.example/{id}-{sanitizedTitle}-O.webp",
                    "template_2x": "https://img.example/{id}-{sanitizedTitle}-F.webp"
                },
                "pictures": [{ "id": "P1", "sanitized_title": "smart-tv" }, { "id": "P2" }]
            },
            "stock_information": { "title": { "text": "Stock disponible" } },
            "available_quantity": { "picker": { "description": "(15 disponibles)" } },
            "seller_experiment": {
                "seller_info": {
                    "title": "TIENDA OFICIAL",
                    "power_seller_status": { "title": "MercadoLíder Platinum" }
                },
                "subtitles": [{ "text": "+10mil ventas" }]
            },
            "outside_variations": {
                "pickers": [{
                    "label": { "text": "Tamaño: " },
                    "selected_option": { "text": "55\"" },
                    "products": [
                        { "label": { "text": "50\"" }, "stock": { "text": "Sin stock" } },
                        { "label": { "text": "55\"" } }
                    ]
                }]
            },
            "highlighted_specs_attrs": {
                "components": [
                    { "id": "key_specs" },
                    {
                        "id": "technical_specifications",
                        "specs": [
                            { "attributes": [{ "id": "Marca", "text": "Hisense" }] },
                            { "attributes": [{ "id": "Resolución", "text": "4K" }, { "id": "Sin texto" }] }
                        ]
                    }
                ]
            }
        }
    })
}

#[test]
fn product_detail_maps_every_section() {
    let detail = normalize_product_detail(&product_state(), &site());

    assert_eq!(detail.id.as_deref(), Some("MLM555"));
    assert_eq!(detail.title.as_deref(), Some("Smart TV 55\""));
    assert_eq!(detail.price, Some(Number::from(7999)));
    assert_eq!(detail.previous_price, Some(Number::from(9999)));
    assert_eq!(detail.currency, "MXN");
    assert_eq!(detail.description.as_deref(), Some("Pantalla 4K"));
    assert_eq!(detail.highlight_tag.as_deref(), Some("MÁS VENDIDO"));

    assert_eq!(detail.rating.rating_value.and_then(|n| n.as_f64()), Some(4.6));
    assert_eq!(detail.rating.rating_count, Some(310));
    assert_eq!(detail.rating.review_count, 1);
    assert_eq!(detail.reviews.len(), 2);
    assert_eq!(detail.reviews[0].text.as_deref(), Some("Excelente"));
    assert_eq!(detail.reviews[0].date.as_deref(), Some("12 mar. 2024"));
    assert!(detail.reviews[1].text.is_none());

    let images = detail.images.expect("gallery present");
    assert_eq!(images.len(), 2);
    assert_eq!(
        images[0].standard.as_deref(),
        Some("https://img.example/P1-smart-tv-O.webp")
    );
    assert_eq!(
        images[1].high_res.as_deref(),
        Some("https://img.example/P2--F.webp")
    );

    assert_eq!(detail.stock.status.as_deref(), Some("Stock disponible"));
    assert_eq!(detail.stock.available_quantity.as_deref(), Some("15 disponibles"));

    assert_eq!(detail.seller_info.name.as_deref(), Some("TIENDA OFICIAL"));
    assert_eq!(
        detail.seller_info.reputation_level.as_deref(),
        Some("MercadoLíder Platinum")
    );
    assert_eq!(detail.seller_info.sales_count.as_deref(), Some("+10mil ventas"));

    assert_eq!(detail.variations.len(), 1);
    let variation = &detail.variations[0];
    assert_eq!(variation.name.as_deref(), Some("Tamaño "));
    assert_eq!(variation.selected_value.as_deref(), Some("55\""));
    assert!(!variation.options[0].available);
    assert!(variation.options[1].available);

    assert_eq!(detail.features.len(), 2);
    assert_eq!(detail.features.get("Marca").map(String::as_str), Some("Hisense"));
    assert_eq!(detail.features.get("Resolución").map(String::as_str), Some("4K"));
}

#[test]
fn product_detail_of_empty_state_has_empty_containers() {
    let detail = normalize_product_detail(&json!({}), &site());

    assert!(detail.id.is_none());
    assert!(detail.title.is_none());
    assert!(detail.price.is_none());
    assert_eq!(detail.currency, "MXN");
    assert_eq!(detail.rating.review_count, 0);
    assert!(detail.rating.rating_value.is_none());
    assert!(detail.reviews.is_empty());
    assert!(detail.images.is_none());
    assert!(detail.stock.status.is_none());
    assert_eq!(detail.seller_info, SellerInfo::default());
    assert!(detail.variations.is_empty());
    assert!(detail.features.is_empty());
}

#[test]
fn product_detail_falls_back_to_tracking_id_and_classic_seller_block() {
    let state = json!({
        "components": {
            "track": { "event_data": { "item_id": "MLM42" } },
            "seller_data": { "power_seller_status": { "title": "MercadoLíder" } },
            "seller_experiment": {
                "seller_link": { "label": { "text": "Vendedor X" } },
                "subtitles": [{ "values": { "bold_amount": { "text": "+500" } } }]
            },
            "highlighted_specs_attrs_swap": {
                "components": [{
                    "id": "technical_specifications",
                    "specs": [{ "attributes": [{ "id": "Color", "text": "Negro" }] }]
                }]
            }
        }
    });
    let detail = normalize_product_detail(&state, &site());

    assert_eq!(detail.id.as_deref(), Some("MLM42"));
    assert_eq!(detail.seller_info.name.as_deref(), Some("Vendedor X"));
    assert_eq!(detail.seller_info.reputation_level.as_deref(), Some("MercadoLíder"));
    assert_eq!(detail.seller_info.sales_count.as_deref(), Some("+500"));
    assert_eq!(detail.features.get("Color").map(String::as_str), Some("Negro"));
}

#[test]
fn review_count_without_digits_is_zero() {
    let state = json!({
        "components": { "reviews_capability_v3": { "total_opinions": "Sin opiniones" } }
    });
    assert_eq!(normalize_product_detail(&state, &site()).rating.review_count, 0);
}

#[test]
fn normalizing_twice_gives_identical_output() {
    let state = product_state();
    assert_eq!(
        normalize_product_detail(&state, &site()),
        normalize_product_detail(&state, &site())
    );
}
