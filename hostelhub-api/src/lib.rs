use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post};
use axum::{middleware, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use hostelhub_shared::clients::db::create_pool;
use hostelhub_shared::middleware::{metrics_middleware, GateState, JwtSecret};

pub mod config;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;
pub mod store;

#[cfg(test)]
mod router_tests;

use config::AppConfig;
use services::photo_storage::{PhotoStorage, UPLOADS_ROUTE};
use store::{HostelStore, MemoryStore, PgStore};

/// Headroom over the photo cap for the text fields sharing the request.
const FORM_FIELDS_ALLOWANCE: usize = 64 * 1024;

pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn HostelStore>,
    pub jwt: JwtSecret,
    pub photos: PhotoStorage,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn HostelStore>, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            jwt: JwtSecret::new(config.jwt_secret.as_str()),
            photos: PhotoStorage::new(config.upload_dir(), config.max_upload_bytes),
            config,
            store,
            metrics,
        }
    }
}

impl GateState for AppState {
    fn jwt_secret(&self) -> &JwtSecret {
        &self.jwt
    }
}

/// Postgres unless `database_url` uses the `memory://` scheme.
pub fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn HostelStore>> {
    if config.uses_memory_store() {
        tracing::warn!("using in-memory store; data is lost on exit");
        return Ok(Arc::new(MemoryStore::new()));
    }
    let pool = create_pool(&config.database_url, config.db_pool_size)?;
    Ok(Arc::new(PgStore::new(pool)))
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let form_limit = DefaultBodyLimit::max(state.config.max_upload_bytes + FORM_FIELDS_ALLOWANCE);

    Router::new()
        .route("/api", get(routes::health::banner))
        .route("/api/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        // Auth
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/register/student", post(routes::auth::register_student))
        .route("/api/auth/register/staff", post(routes::auth::register_staff))
        // Staff (WARDEN, CARETAKER)
        .route(
            "/api/staff/profile",
            get(routes::staff::get_my_profile)
                .post(routes::staff::save_my_profile)
                .layer(form_limit.clone()),
        )
        .route("/api/staff/:student_profile_id/details", get(routes::staff::student_details))
        .route("/api/staff/:student_profile_id/actions", get(routes::staff::list_actions))
        .route("/api/staff/action", post(routes::staff::create_action))
        .route("/api/staff/action/:action_id", patch(routes::staff::update_action))
        // Student family (STUDENT, HOSTEL_ADMIN, MESS_ADMIN)
        .route(
            "/api/student/profile",
            get(routes::student::get_my_profile)
                .post(routes::student::save_my_profile)
                .layer(form_limit),
        )
        // Warden administration
        .route("/api/users/promote", post(routes::users::promote))
        .route("/api/users/demote", post(routes::users::demote))
        .route("/api/users/create-student", post(routes::users::create_student))
        .route("/api/users/create-staff", post(routes::users::create_staff))
        .route("/api/users/students", get(routes::users::list_students))
        .route("/api/users/:user_id/status", patch(routes::users::set_status))
        // Public
        .route("/public/committee", get(routes::public::committee))
        .nest_service(UPLOADS_ROUTE, ServeDir::new(state.photos.dir()))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
