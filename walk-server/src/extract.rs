//! Actor identity extractors.
//!
//! Authentication happens at the gateway in front of this service. It
//! forwards the resolved identity in `x-walk-admin` (station staff) or
//! `x-walk-participant` (walkers) and the handlers trust those headers.

use axum::{extract::FromRequestParts, http::request::Parts};
use walk_model::{Admin, AdminId, ParticipantId};

use crate::{app_state::AppState, errors::AppError};

pub const ADMIN_HEADER: &str = "x-walk-admin";
pub const PARTICIPANT_HEADER: &str = "x-walk-participant";

/// The station admin issuing the request, loaded from the store.
#[derive(Debug, Clone)]
pub struct AdminActor(pub Admin);

/// The walker issuing the request.
#[derive(Debug, Clone, Copy)]
pub struct ParticipantActor(pub ParticipantId);

fn header_value<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, AppError> {
    parts
        .headers
        .get(name)
        .ok_or_else(|| AppError::unauthorized(format!("Missing {name} header")))?
        .to_str()
        .map(str::trim)
        .map_err(|_| AppError::bad_request(format!("Malformed {name} header")))
}

impl FromRequestParts<AppState> for AdminActor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id: AdminId = header_value(parts, ADMIN_HEADER)?
            .parse()
            .map_err(|err| AppError::bad_request(format!("{err}")))?;

        let admin = state
            .services()
            .store
            .admin(id)
            .await?
            .ok_or_else(|| AppError::unauthorized(format!("Unknown admin {id}")))?;

        Ok(AdminActor(admin))
    }
}

impl FromRequestParts<AppState> for ParticipantActor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id: ParticipantId = header_value(parts, PARTICIPANT_HEADER)?
            .parse()
            .map_err(|err| AppError::bad_request(format!("{err}")))?;
        Ok(ParticipantActor(id))
    }
}
