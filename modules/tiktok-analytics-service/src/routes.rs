//! Axum route handlers for the analytics RPC API.
//!
//! Every derived view (filtered collections, per-record metrics, group
//! aggregates) is recomputed from the current store snapshot per request —
//! the store is never mutated by a read.

use crate::analytics;
use crate::store::Store;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use std::sync::Arc;
use std::time::Instant;
use tiktok_analytics_types::*;

pub struct AppState {
    pub store: Arc<Store>,
    pub start_time: Instant,
}

// =====================================================
// Data Endpoints
// =====================================================

// GET /rpc/overview/query
pub async fn overview_query(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<Vec<OverviewRecord>>>) {
    let filters = state.store.filter_state();
    let records = state.store.overview_snapshot();
    let filtered = analytics::filter_overview(&records, &filters.date_range);
    (StatusCode::OK, Json(RpcResponse::ok(filtered)))
}

// GET /rpc/content/query
pub async fn content_query(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<Vec<ContentRecordWithMetrics>>>) {
    let filters = state.store.filter_state();
    let records = state.store.content_snapshot();
    let filtered =
        analytics::filter_content(&records, &filters.date_range, &filters.views_range);
    let with_metrics = filtered
        .into_iter()
        .map(|record| {
            let metrics = analytics::content_metrics(&record);
            ContentRecordWithMetrics { record, metrics }
        })
        .collect();
    (StatusCode::OK, Json(RpcResponse::ok(with_metrics)))
}

// GET /rpc/aggregates/groups
pub async fn aggregates_groups(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<Vec<GroupAggregate>>>) {
    let filters = state.store.filter_state();
    let records = state.store.content_snapshot();
    let filtered =
        analytics::filter_content(&records, &filters.date_range, &filters.views_range);
    let combinations = state.store.combinations();
    let aggregates = analytics::group_aggregates(&filtered, &combinations);
    (StatusCode::OK, Json(RpcResponse::ok(aggregates)))
}

// =====================================================
// Filter Endpoints
// =====================================================

// GET /rpc/filters/get
pub async fn filters_get(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<FilterState>>) {
    (
        StatusCode::OK,
        Json(RpcResponse::ok(state.store.filter_state())),
    )
}

// POST /rpc/filters/set
pub async fn filters_set(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetFiltersRequest>,
) -> (StatusCode, Json<RpcResponse<FilterState>>) {
    match state.store.set_filters(&req) {
        Ok(filters) => (StatusCode::OK, Json(RpcResponse::ok(filters))),
        Err(e) => (StatusCode::BAD_REQUEST, Json(RpcResponse::err(e))),
    }
}

// =====================================================
// Combination Endpoints
// =====================================================

// GET /rpc/combinations/list
pub async fn combinations_list(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<Vec<TagCombination>>>) {
    (
        StatusCode::OK,
        Json(RpcResponse::ok(state.store.combinations())),
    )
}

// POST /rpc/combinations/add
pub async fn combinations_add(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddCombinationRequest>,
) -> (StatusCode, Json<RpcResponse<TagCombination>>) {
    match state.store.add_combination(&req.tags) {
        Ok(combination) => (StatusCode::OK, Json(RpcResponse::ok(combination))),
        Err(e) => (StatusCode::BAD_REQUEST, Json(RpcResponse::err(e))),
    }
}

// POST /rpc/combinations/remove
pub async fn combinations_remove(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RemoveCombinationRequest>,
) -> (StatusCode, Json<RpcResponse<bool>>) {
    if state.store.remove_combination(req.id) {
        (StatusCode::OK, Json(RpcResponse::ok(true)))
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(RpcResponse::err(format!("Combination #{} not found", req.id))),
        )
    }
}

// =====================================================
// Metric Visibility Endpoints
// =====================================================

// GET /rpc/metrics/visibility
pub async fn metrics_visibility(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<MetricVisibility>>) {
    (
        StatusCode::OK,
        Json(RpcResponse::ok(state.store.metric_visibility())),
    )
}

// POST /rpc/metrics/toggle
pub async fn metrics_toggle(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ToggleMetricRequest>,
) -> (StatusCode, Json<RpcResponse<MetricVisibility>>) {
    match state.store.toggle_metric(&req.metric) {
        Ok(visibility) => (StatusCode::OK, Json(RpcResponse::ok(visibility))),
        Err(e) => (StatusCode::BAD_REQUEST, Json(RpcResponse::err(e))),
    }
}

// =====================================================
// Service Endpoints
// =====================================================

// GET /rpc/status
pub async fn status(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<ServiceStatus>>) {
    let status = ServiceStatus {
        running: true,
        uptime_secs: state.start_time.elapsed().as_secs(),
        overview_loaded: state.store.overview_loaded(),
        content_loaded: state.store.content_loaded(),
        overview_records: state.store.overview_snapshot().len() as i64,
        content_records: state.store.content_snapshot().len() as i64,
        active_combinations: state.store.combinations().len() as i64,
        filter_state: state.store.filter_state(),
    };
    (StatusCode::OK, Json(RpcResponse::ok(status)))
}
