use axum::{
    extract::{Path, State},
    Extension, Json,
};
use pricefinder_core::{format_failure_reply, format_reply, LookupResult, SearchChannel};
use pricefinder_scraper::LookupError;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_lookup_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct SearchRequest {
    pub product_id: String,
    /// Chat user the search is made for; marks the search as coming from the
    /// chat bot rather than the web front end.
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchData {
    found: bool,
    result: Option<LookupResult>,
    currency: String,
    /// The two chat messages for this outcome.
    reply: [String; 2],
}

/// `POST /api/v1/search`
///
/// An unknown product is a normal outcome here: it answers 200 with
/// `found: false` and the failure reply. Blank identifiers and upstream
/// failures are errors.
pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<ApiResponse<SearchData>>, ApiError> {
    let user_id = body
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let channel = if user_id.is_some() {
        SearchChannel::Linebot
    } else {
        SearchChannel::Web
    };

    let currency = state.pipeline.currency().to_owned();
    let outcome = state
        .pipeline
        .lookup_via(&body.product_id, channel, user_id)
        .await;

    let data = match outcome {
        Ok(result) => SearchData {
            found: true,
            reply: format_reply(&result, &currency),
            result: Some(result),
            currency,
        },
        Err(LookupError::NotFound { .. }) => SearchData {
            found: false,
            result: None,
            currency,
            reply: format_failure_reply(),
        },
        Err(e) => return Err(map_lookup_error(req_id.0, &e)),
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `GET /api/v1/products/{product_id}`
pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(product_id): Path<String>,
) -> Result<Json<ApiResponse<LookupResult>>, ApiError> {
    let result = state
        .pipeline
        .lookup_via(&product_id, SearchChannel::Api, None)
        .await
        .map_err(|e| map_lookup_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: result,
        meta: ResponseMeta::new(req_id.0),
    }))
}
