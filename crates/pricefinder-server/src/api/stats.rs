use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use pricefinder_core::LookupResult;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct StatsData {
    total_searches: i64,
    successful_searches: i64,
    success_rate: f64,
    recent_searches_24h: i64,
    popular_products: Vec<PopularProductItem>,
}

#[derive(Debug, Serialize)]
pub(super) struct PopularProductItem {
    identifier: String,
    search_count: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchHistoryItem {
    identifier: String,
    serial_number: Option<String>,
    success: bool,
    result: Option<LookupResult>,
    error_message: Option<String>,
    source_channel: String,
    user_id: Option<String>,
    searched_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RecentSearchQuery {
    pub limit: Option<i64>,
}

/// `GET /api/v1/stats`
pub(super) async fn get_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<StatsData>>, ApiError> {
    let stats = pricefinder_db::search_stats(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = StatsData {
        total_searches: stats.total_searches,
        successful_searches: stats.successful_searches,
        success_rate: stats.success_rate,
        recent_searches_24h: stats.recent_searches_24h,
        popular_products: stats
            .popular_products
            .into_iter()
            .map(|row| PopularProductItem {
                identifier: row.identifier,
                search_count: row.search_count,
            })
            .collect(),
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `GET /api/v1/searches?limit=`
pub(super) async fn list_recent_searches(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<RecentSearchQuery>,
) -> Result<Json<ApiResponse<Vec<SearchHistoryItem>>>, ApiError> {
    let rows = pricefinder_db::list_recent_searches(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| SearchHistoryItem {
            identifier: row.identifier,
            serial_number: row.serial_number,
            success: row.success,
            result: row.payload.map(|p| p.0),
            error_message: row.error_message,
            source_channel: row.source_channel,
            user_id: row.user_id,
            searched_at: row.searched_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
