use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Extension, Json,
};
use mlscrape_core::{NormalizedProduct, ProductDetail};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_scrape_error, ApiError, ApiResponse, AppState};

/// Pages scraped when `maxPages` is not given.
const DEFAULT_MAX_PAGES: u32 = 1;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct OffersQuery {
    pub max_pages: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SearchQuery {
    pub q: Option<String>,
    pub max_pages: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProductRequest {
    pub url: Option<String>,
}

pub(super) async fn scrape_offers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<OffersQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<NormalizedProduct>>>, ApiError> {
    let Query(query) = query.map_err(|rejection| invalid_query(&req_id, &rejection))?;
    let products = state
        .marketplace
        .list_offers(query.max_pages.unwrap_or(DEFAULT_MAX_PAGES))
        .await
        .map_err(|e| map_scrape_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, products)))
}

pub(super) async fn scrape_search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<NormalizedProduct>>>, ApiError> {
    let Query(query) = query.map_err(|rejection| invalid_query(&req_id, &rejection))?;
    let products = state
        .marketplace
        .search(
            query.q.as_deref().unwrap_or_default(),
            query.max_pages.unwrap_or(DEFAULT_MAX_PAGES),
        )
        .await
        .map_err(|e| map_scrape_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, products)))
}

pub(super) async fn scrape_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ProductDetail>>, ApiError> {
    let request = match body {
        Ok(Json(request)) => request,
        // A bare POST carries no body at all; report the missing field.
        Err(JsonRejection::MissingJsonContentType(_)) => ProductRequest { url: None },
        Err(rejection) => {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                rejection.body_text(),
            ))
        }
    };
    let Some(url) = request.url.filter(|u| !u.trim().is_empty()) else {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "Body parameter \"url\" is required.",
        ));
    };

    let detail = state
        .marketplace
        .get_product(&url)
        .await
        .map_err(|e| map_scrape_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, detail)))
}

fn invalid_query(req_id: &RequestId, rejection: &QueryRejection) -> ApiError {
    ApiError::new(req_id.0.clone(), "validation_error", rejection.body_text())
}
