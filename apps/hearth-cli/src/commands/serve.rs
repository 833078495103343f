use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use hearth_server::{serve, PriceService};

use super::load_config;

/// Serve price estimates
#[derive(Args, Debug, Clone)]
pub struct ServeCommand {
    /// TOML configuration file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Listen address, overriding the config file and `HEARTH_ADDR`
    #[arg(long)]
    pub addr: Option<String>,
}

impl ServeCommand {
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config = load_config(self.config.as_deref())?;
        let server = &config.server;
        let addr = self
            .addr
            .clone()
            .or_else(|| std::env::var("HEARTH_ADDR").ok())
            .unwrap_or_else(|| server.addr.clone());

        let state = PriceService::load(
            &server.model_dir,
            &server.demographics_path,
            &config.data.join_key,
        )?;
        serve(&addr, Arc::new(state)).await
    }
}
