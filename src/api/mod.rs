use axum::{
    Json, Router, middleware,
    extract::State,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

use crate::config::Config;
use crate::db::Store;
use crate::services::{Mailer, ReservationService, SeaOrmReservationService};

mod admin;
pub mod auth;
mod books;
mod contact;
mod error;
pub mod events;
mod observability;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub reservations: Arc<dyn ReservationService>,

    pub mailer: Mailer,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn reservations(&self) -> &Arc<dyn ReservationService> {
        &self.reservations
    }

    #[must_use]
    pub fn mailer(&self) -> &Mailer {
        &self.mailer
    }
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::new(&config.general.database_path).await?;
    let reservations: Arc<dyn ReservationService> =
        Arc::new(SeaOrmReservationService::new(store.clone()));
    let mailer = Mailer::new(config.mail.clone());

    Ok(Arc::new(AppState {
        config,
        store,
        reservations,
        mailer,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    database: &'static str,
    uptime_seconds: u64,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthStatus>> {
    let database = if state.store().ping().await.is_ok() {
        "ok"
    } else {
        "unreachable"
    };

    Json(ApiResponse::success(HealthStatus {
        status: "ok",
        database,
        uptime_seconds: state.start_time.elapsed().as_secs(),
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let session_minutes = state.config.server.session_minutes;
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(session_minutes)));

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users))
        .route("/users", post(admin::create_user))
        .route("/users/{id}", put(admin::update_user))
        .route("/users/{id}", delete(admin::delete_user))
        .route("/users/bulk", post(admin::bulk_users))
        .route("/events", get(admin::list_all_events))
        .route("/events", post(admin::create_event))
        .route("/events/{id}", put(admin::update_event))
        .route("/events/{id}", delete(admin::delete_event))
        .route(
            "/events/{id}/registrations",
            get(admin::event_registrations),
        )
        .route("/contact", get(admin::list_contact_messages))
        .route("/contact/{id}/read", put(admin::mark_message_read))
        .route("/books", post(admin::create_book))
        .route("/books/{id}", put(admin::update_book))
        .route("/books/{id}", delete(admin::delete_book))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::admin_middleware,
        ));

    let api_router = Router::new()
        .route("/events", get(events::list_events))
        .route("/events/registrations", get(events::my_registrations))
        .route("/events/register", post(events::register_for_event))
        .route(
            "/events/registrations/{id}/cancel",
            post(events::cancel_registration),
        )
        .route("/events/{id}", get(events::get_event))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/verify", get(auth::verify_email))
        .route("/auth/me", get(auth::get_current_user))
        .route("/auth/profile", put(auth::update_profile))
        .route("/auth/password", put(auth::change_password))
        .route("/auth/account", delete(auth::delete_account))
        .route("/books", get(books::list_books))
        .route("/contact", post(contact::submit_contact))
        .route("/health", get(health))
        .route("/metrics", get(observability::get_metrics))
        .nest("/admin", admin_routes)
        .layer(session_layer)
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(
            observability::request_tracking_middleware,
        ))
}
