//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::error::ServiceError;
use crate::request::{FeatureRowSource, LoosePriceRequest, StrictPriceRequest};
use crate::service::PriceService;

/// Error response: status code plus a `{"detail": ...}` body
pub type ApiError = (StatusCode, Json<serde_json::Value>);

/// Response for both estimate endpoints
#[derive(Debug, Serialize)]
pub struct PriceResponse {
    pub estimated_price: f64,
}

/// Estimate from the fixed 18-field schema
pub async fn estimate_price(
    State(state): State<Arc<PriceService>>,
    payload: Result<Json<StrictPriceRequest>, JsonRejection>,
) -> Result<Json<PriceResponse>, ApiError> {
    let Json(request) = payload.map_err(rejection)?;
    respond(&state, request)
}

/// Estimate from any JSON object, ignoring unknown keys
pub async fn estimate_price2(
    State(state): State<Arc<PriceService>>,
    payload: Result<Json<LoosePriceRequest>, JsonRejection>,
) -> Result<Json<PriceResponse>, ApiError> {
    let Json(request) = payload.map_err(rejection)?;
    respond(&state, request)
}

/// Loaded model summary
pub async fn get_status(State(state): State<Arc<PriceService>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "features": state.features().names(),
        "trees": state.n_trees(),
        "demographics_rows": state.demographics_rows(),
    }))
}

fn respond(
    state: &PriceService,
    request: impl FeatureRowSource,
) -> Result<Json<PriceResponse>, ApiError> {
    let estimated_price = state.estimate_from(request).map_err(service_error)?;
    tracing::debug!("Estimated price {:.2}", estimated_price);
    Ok(Json(PriceResponse { estimated_price }))
}

fn rejection(rejection: JsonRejection) -> ApiError {
    tracing::debug!("Rejected request body: {}", rejection.body_text());
    detail(rejection.status(), rejection.body_text())
}

fn service_error(err: ServiceError) -> ApiError {
    if err.is_client_error() {
        detail(StatusCode::BAD_REQUEST, err.to_string())
    } else {
        tracing::error!("Prediction failed: {}", err);
        detail(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

fn detail(status: StatusCode, message: String) -> ApiError {
    (status, Json(serde_json::json!({ "detail": message })))
}
