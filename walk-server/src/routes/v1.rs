use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::{
    AppState,
    handlers::{admin, health, teams},
};

pub mod paths {
    pub const HEALTH: &str = "/health";
    pub const PARTICIPANT_STATUS: &str = "/admin/participants/status";
    pub const TEAM_ARRIVALS: &str = "/admin/teams/{id}/arrivals";
    pub const TIMEOUTS: &str = "/admin/timeouts";
    pub const NO_SHOWS: &str = "/admin/no-shows";
    pub const TEAM_MEMBER: &str = "/teams/members/{participant_id}";
    pub const MATCH: &str = "/teams/match";
}

/// Create all v1 API routes
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(paths::HEALTH, get(health::health_handler))
        .merge(create_admin_routes())
        .merge(create_team_routes())
}

fn create_admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            paths::PARTICIPANT_STATUS,
            post(admin::change_participant_status),
        )
        .route(paths::TEAM_ARRIVALS, post(admin::record_arrival))
        .route(paths::TIMEOUTS, get(admin::timeout_report))
        .route(paths::NO_SHOWS, get(admin::no_show_teams))
}

fn create_team_routes() -> Router<AppState> {
    Router::new()
        .route(paths::TEAM_MEMBER, delete(teams::remove_member))
        .route(paths::MATCH, post(teams::random_match_list))
}
