use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::{AssetRequest, PriceQuery, PriceResponse, TrackedAssets},
};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

/// Trims and upper-cases a symbol from a request body.
fn normalize_asset(raw: &str) -> ApiResult<String> {
    let asset = raw.trim().to_uppercase();
    if asset.is_empty() {
        return Err(ApiError::BadRequest("asset is required".to_string()));
    }
    Ok(asset)
}

#[utoipa::path(
    post,
    path = "/api/v1/currency/add",
    request_body = AssetRequest,
    responses(
        (status = 200, description = "Asset is tracked"),
        (status = 400, description = "Empty or unsupported asset"),
        (status = 503, description = "Server is shutting down")
    )
)]
pub async fn add_currency(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AssetRequest>,
) -> ApiResult<StatusCode> {
    let asset = normalize_asset(&payload.asset)?;
    if state.registry.register(&asset).await? {
        tracing::info!("Started tracking {}", asset);
    }
    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/api/v1/currency/remove",
    request_body = AssetRequest,
    responses((status = 200, description = "Asset is no longer tracked"))
)]
pub async fn remove_currency(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AssetRequest>,
) -> ApiResult<StatusCode> {
    let asset = normalize_asset(&payload.asset)?;
    if state.registry.unregister(&asset).await {
        tracing::info!("Stopped tracking {}", asset);
    }
    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/api/v1/currency/price",
    request_body = PriceQuery,
    responses(
        (status = 200, body = PriceResponse),
        (status = 404, description = "No sample for the asset")
    )
)]
pub async fn get_price(
    State(state): State<Arc<AppState>>,
    Json(query): Json<PriceQuery>,
) -> ApiResult<Json<PriceResponse>> {
    let asset = normalize_asset(&query.asset)?;
    let timestamp = query.timestamp.unwrap_or_else(|| state.clock.now_unix());
    let sample = state.resolver.resolve(&asset, timestamp).await?;
    Ok(Json(PriceResponse::new(sample, timestamp)))
}

#[utoipa::path(get, path = "/api/v1/currency", responses((status = 200, body = TrackedAssets)))]
pub async fn list_currencies(State(state): State<Arc<AppState>>) -> Json<TrackedAssets> {
    Json(TrackedAssets {
        assets: state.registry.tracked_assets(),
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/currency", get(list_currencies))
        .route("/currency/add", post(add_currency))
        .route("/currency/remove", post(remove_currency))
        .route("/currency/price", post(get_price))
}
