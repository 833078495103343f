//! Hearth Server - Price Estimate API
//!
//! HTTP server answering home price estimates from a trained pipeline.
//! `POST /api/price` takes the fixed 18-field record, `POST /api/price2`
//! takes any JSON object and uses only the keys the model knows.

pub mod error;
pub mod http;
pub mod request;
pub mod service;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::ServiceError;
pub use http::PriceResponse;
pub use request::{FeatureRowSource, LoosePriceRequest, StrictPriceRequest, STRICT_FIELDS};
pub use service::PriceService;

/// Create the API router
pub fn create_router(state: Arc<PriceService>) -> Router {
    Router::new()
        // Estimate endpoints
        .route("/api/price", post(http::estimate_price))
        .route("/api/price2", post(http::estimate_price2))
        // System endpoints
        .route("/status", get(http::get_status))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the server
pub async fn serve(addr: &str, state: Arc<PriceService>) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Hearth server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
