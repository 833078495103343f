//! Hearth CLI
//!
//! Trains the price model, serves it over HTTP, and replays unseen examples
//! against a running server.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ServeCommand, SmokeCommand, TrainCommand};

#[derive(Parser, Debug)]
#[command(name = "hearth", version, about = "Home price estimation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train, evaluate, and save the model
    Train(TrainCommand),
    /// Serve price estimates over HTTP
    Serve(ServeCommand),
    /// Post unseen examples to a running server
    Smoke(SmokeCommand),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Train(cmd) => cmd.run(),
        Commands::Serve(cmd) => cmd.run().await,
        Commands::Smoke(cmd) => cmd.run().await,
    }
}
