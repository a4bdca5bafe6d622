use std::sync::Arc;

use hostelhub_api::config::AppConfig;
use hostelhub_api::routes::health::SERVICE_NAME;
use hostelhub_api::{build_router, open_store, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hostelhub_shared::middleware::init_tracing(SERVICE_NAME);

    let config = AppConfig::load()?;
    let port = config.port;

    let metrics = hostelhub_shared::middleware::init_metrics()?;
    let store = open_store(&config)?;
    tokio::fs::create_dir_all(config.upload_dir()).await?;

    let state = Arc::new(AppState::new(config, store, Some(metrics)));
    let app = build_router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "hostelhub-api starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
