use std::sync::Arc;

use anyhow::Result;
use tracing::info;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::post_service::PostService;
use data::repositories::postgres::post_storage::PostgresPostStorage;
use infrastructure::clock::SystemClock;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::id_generator::UuidGenerator;
use infrastructure::logging::init_logging;
use infrastructure::settings::Settings;
use presentation::{AppState, ListLimits};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level, settings.log_format)?;
    info!(config = %serde_json::to_string(&settings)?, "configuration loaded");

    let pool = create_pool(&settings).await?;
    if settings.run_migrations {
        run_migrations(&pool).await?;
    }

    let storage = PostgresPostStorage::new(pool.clone(), &settings.post_table_name);
    let post_service = PostService::new(
        Arc::new(storage),
        Arc::new(SystemClock),
        Arc::new(UuidGenerator),
    );

    let state = AppState::new(
        Arc::new(post_service),
        settings.service_name.clone(),
        ListLimits {
            default_limit: settings.default_post_limit,
            max_limit: settings.max_post_limit,
        },
    );

    server::run_http(&settings, state).await?;

    pool.close().await;
    info!("database pool closed");
    Ok(())
}
