use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use medforecast_backend::app;
use medforecast_backend::config::{AppConfig, StoreBackend};
use medforecast_backend::logging::{init_logging, LoggingConfig};
use medforecast_backend::state::AppState;
use medforecast_backend::store::{InMemoryRecordStore, PgRecordStore, RecordStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env()).map_err(|e| anyhow::anyhow!("logging setup failed: {}", e))?;

    let config = AppConfig::from_env().map_err(anyhow::Error::msg)?;

    let store: Arc<dyn RecordStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for the postgres store"))?;

            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(database_url)
                .await?;

            let store = PgRecordStore::new(pool);
            store.ensure_schema().await?;
            tracing::info!("🗄️ Using record store: Postgres");
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::info!("🗄️ Using record store: in-memory (data is lost on restart)");
            Arc::new(InMemoryRecordStore::new())
        }
    };

    let state = AppState::new(store, config.max_upload_bytes);
    let app = app::create_app(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("🚀 Medforecast backend running at http://{}/", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
