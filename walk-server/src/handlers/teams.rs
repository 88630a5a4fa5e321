use axum::{
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    response::Json,
};
use serde::{Deserialize, Serialize};
use walk_core::domain::RemovalOutcome;
use walk_model::{ParticipantId, RouteId, Team};

use crate::{app_state::AppState, errors::AppResult, extract::ParticipantActor};

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub route: u8,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub teams: Vec<Team>,
}

/// Captain removes a member from their own team.
pub async fn remove_member(
    State(state): State<AppState>,
    ParticipantActor(actor): ParticipantActor,
    target: Result<Path<ParticipantId>, PathRejection>,
) -> AppResult<Json<RemovalOutcome>> {
    let Path(target) = target?;
    let outcome = state
        .services()
        .membership
        .remove_member(actor, target)
        .await?;
    Ok(Json(outcome))
}

pub async fn random_match_list(
    State(state): State<AppState>,
    _actor: ParticipantActor,
    payload: Result<Json<MatchRequest>, JsonRejection>,
) -> AppResult<Json<MatchResponse>> {
    let Json(request) = payload?;
    let teams = state
        .services()
        .matching
        .random_list(RouteId(request.route))
        .await?;
    Ok(Json(MatchResponse { teams }))
}
