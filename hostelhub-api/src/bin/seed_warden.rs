//! Creates the initial WARDEN account from `HOSTELHUB__DEFAULT_WARDEN_*`.

use hostelhub_api::config::AppConfig;
use hostelhub_api::open_store;
use hostelhub_api::services::seed::ensure_default_warden;

fn main() -> anyhow::Result<()> {
    hostelhub_shared::middleware::init_tracing("seed-warden");

    let config = AppConfig::load()?;
    let store = open_store(&config)?;

    match ensure_default_warden(store.as_ref(), &config)? {
        Some(user) => tracing::info!(user_id = %user.id, email = %user.email, "default warden created"),
        None => tracing::info!("nothing to seed"),
    }
    Ok(())
}
