//! HTTP surface of the walk coordinator.
//!
//! Routes live under `/api/v1`. Admin and participant identity is taken
//! from gateway headers, see [`extract`].

pub mod app_state;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod routes;

pub use app_state::AppState;

use axum::{
    Router,
    http::{HeaderName, Method},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Build the full application router with tracing and CORS applied.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            HeaderName::from_static(extract::ADMIN_HEADER),
            HeaderName::from_static(extract::PARTICIPANT_HEADER),
        ]);

    routes::create_api_router()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
