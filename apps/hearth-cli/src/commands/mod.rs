//! Subcommand implementations

mod serve;
mod smoke;
mod train;

use std::path::Path;

use hearth_core::HearthConfig;

pub use serve::ServeCommand;
pub use smoke::SmokeCommand;
pub use train::TrainCommand;

/// Load a TOML config, or fall back to the defaults
fn load_config(path: Option<&Path>) -> hearth_core::Result<HearthConfig> {
    match path {
        Some(path) => {
            tracing::info!("Loading config from {}", path.display());
            Ok(HearthConfig::load(path)?)
        }
        None => Ok(HearthConfig::default()),
    }
}
