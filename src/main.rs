//! Taskboard server binary.
//!
//! Configuration comes from the environment (see [`taskboard::config`]);
//! log verbosity from `RUST_LOG`.

use tracing_subscriber::EnvFilter;

use taskboard::{api, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("taskboard=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        "Starting taskboard {} (database: {})",
        env!("CARGO_PKG_VERSION"),
        config.database_path.display()
    );

    api::serve(config).await
}
