use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lead_prospector::cli::CliApp;
use lead_prospector::config::{load_config, Config};
use lead_prospector::models::Result;
use lead_prospector::store::create_db_pool;

use tokio::signal;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = match load_config("config.yml").await {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load config.yml: {}. Using defaults.", e);
            Config::default()
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("lead_prospector={}", config.logging.level).parse()?),
        )
        .init();

    info!("Initializing database...");
    let db_pool = create_db_pool(&config.storage.db_path).await?;

    let mut app = CliApp::new(config, db_pool).await?;

    tokio::select! {
        result = app.run() => {
            result?;
        }
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
