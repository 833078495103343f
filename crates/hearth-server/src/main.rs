//! Hearth Server Binary
//!
//! Standalone server for price estimates. Reads its settings from
//! `HEARTH_ADDR`, `HEARTH_MODEL_DIR`, and `HEARTH_DEMOGRAPHICS`.

use std::sync::Arc;

use hearth_core::{DataConfig, ServerConfig};
use hearth_server::{serve, PriceService};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = ServerConfig::default();
    if let Ok(addr) = std::env::var("HEARTH_ADDR") {
        config.addr = addr;
    }
    if let Ok(dir) = std::env::var("HEARTH_MODEL_DIR") {
        config.model_dir = dir.into();
    }
    if let Ok(path) = std::env::var("HEARTH_DEMOGRAPHICS") {
        config.demographics_path = path.into();
    }

    let join_key = DataConfig::default().join_key;
    let state = PriceService::load(&config.model_dir, &config.demographics_path, &join_key)?;
    serve(&config.addr, Arc::new(state)).await
}
