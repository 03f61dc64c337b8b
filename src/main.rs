mod api;
mod app_data;
mod cli;
mod config;
mod error;
mod model;
mod repository;
mod session;
mod state;
mod storage;
mod task;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize logging (stderr keeps stdout clean for --json)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "pets_gallery=info,warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = cli::Cli::parse();
    tracing::debug!("Starting pets gallery v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = cli::run(args).await {
        cli::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
