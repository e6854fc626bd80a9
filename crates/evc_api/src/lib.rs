//! EV charging client API
//!
//! JSON endpoints over the client flows of [`evc_engine::Engine`].

mod auth;
mod charging;
mod error;
mod notification;
mod station;

pub use crate::error::{ApiError, ApiResult, ErrorResponse};

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch, post},
};
use evc_engine::Engine;
use tower_http::trace::TraceLayer;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Create the application router with all endpoints
pub fn create_app(engine: Arc<Engine>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/code", post(auth::request_code))
        .route("/auth/code/resend", post(auth::resend_code))
        .route("/auth/verify", post(auth::verify_code))
        .route("/auth/me", get(auth::current_user))
        .route("/auth/profile", patch(auth::update_profile))
        .route("/auth/logout", post(auth::logout))
        .route("/stations", get(station::list_stations))
        .route("/stations/reload", post(station::reload_stations))
        .route("/stations/{station_id}", get(station::get_station))
        .route(
            "/stations/{station_id}/favorite",
            post(station::toggle_favorite),
        )
        .route("/stations/{station_id}/select", post(station::select_station))
        .route("/favorites", get(station::list_favorites))
        .route("/charging/current", get(charging::current_session))
        .route("/charging/current/elapsed", get(charging::elapsed_events))
        .route("/charging/start", post(charging::start_charging))
        .route("/charging/stop", post(charging::stop_charging))
        .route("/charging/history", get(charging::history))
        .route("/wallet", get(charging::wallet))
        .route("/notifications", get(notification::list_notifications))
        .route(
            "/notifications/read-all",
            post(notification::mark_all_read),
        )
        .route(
            "/notifications/{notification_id}/read",
            post(notification::mark_read),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}
