//! One-shot migration runner for the vision store.

use anyhow::Result;
use tracing::info;
use vision_shared::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    vision_shared::telemetry::init_telemetry();
    let config = AppConfig::load()?;

    let pool =
        vision_infrastructure::create_pool(&config.database.url, config.database.max_connections)
            .await?;
    vision_infrastructure::run_migrations(&pool).await?;

    info!("Migrations applied to {}", config.app.name);
    Ok(())
}
