//! Station staff endpoints: status changes, arrivals and roster reports.

use axum::{
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use walk_core::domain::{
    ArrivalOutcome, ReportQuery, StatusChange, StatusChangeOutcome, TimeoutReport,
};
use walk_model::{ParticipantKind, RouteId, Team, TeamId};

use crate::{
    app_state::AppState,
    errors::{AppError, AppResult},
    extract::AdminActor,
};

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub changes: Vec<StatusChange>,
}

#[derive(Debug, Deserialize)]
pub struct ArrivalRequest {
    pub waypoint: u32,
}

#[derive(Debug, Deserialize)]
pub struct TimeoutQuery {
    /// Minutes without a check-in; the configured default when absent.
    pub minute: Option<u32>,
    pub route: u8,
    pub kind: Option<ParticipantKind>,
    pub secret: String,
}

#[derive(Debug, Deserialize)]
pub struct NoShowQuery {
    pub route: u8,
    pub secret: String,
}

#[derive(Debug, Serialize)]
pub struct NoShowResponse {
    pub route: RouteId,
    pub teams: Vec<Team>,
}

pub async fn change_participant_status(
    State(state): State<AppState>,
    AdminActor(admin): AdminActor,
    payload: Result<Json<StatusChangeRequest>, JsonRejection>,
) -> AppResult<Json<StatusChangeOutcome>> {
    let Json(request) = payload?;
    let outcome = state
        .services()
        .check_in
        .apply_status_change(&admin, &request.changes)
        .await?;
    Ok(Json(outcome))
}

pub async fn record_arrival(
    State(state): State<AppState>,
    AdminActor(admin): AdminActor,
    team_id: Result<Path<TeamId>, PathRejection>,
    payload: Result<Json<ArrivalRequest>, JsonRejection>,
) -> AppResult<Json<ArrivalOutcome>> {
    let Path(team_id) = team_id?;
    let Json(request) = payload?;
    let outcome = state
        .services()
        .check_in
        .record_arrival(&admin, team_id, request.waypoint)
        .await?;
    Ok(Json(outcome))
}

pub async fn timeout_report(
    State(state): State<AppState>,
    query: Result<Query<TimeoutQuery>, QueryRejection>,
) -> AppResult<Json<TimeoutReport>> {
    let Query(query) = query?;
    verify_secret(&state, &query.secret)?;

    let report_query = ReportQuery {
        threshold_minutes: query
            .minute
            .unwrap_or(state.config().scanner.default_threshold_minutes),
        route: RouteId(query.route),
        kind: query.kind,
    };
    let report = TimeoutReport::build(&state.services().timeouts, report_query).await?;
    Ok(Json(report))
}

pub async fn no_show_teams(
    State(state): State<AppState>,
    query: Result<Query<NoShowQuery>, QueryRejection>,
) -> AppResult<Json<NoShowResponse>> {
    let Query(query) = query?;
    verify_secret(&state, &query.secret)?;

    let route = RouteId(query.route);
    let teams = state.services().timeouts.no_show_teams(route).await?;
    Ok(Json(NoShowResponse { route, teams }))
}

fn verify_secret(state: &AppState, provided: &str) -> AppResult<()> {
    let Some(expected) = state.config().admin.secret.as_deref() else {
        return Err(AppError::forbidden(
            "Report endpoints are disabled: no admin secret configured",
        ));
    };
    if provided != expected {
        warn!("rejected report request with a wrong secret");
        return Err(AppError::unauthorized("Invalid secret"));
    }
    Ok(())
}
