use thiserror::Error;
use walk_model::{AdminId, ModelError, ParticipantId, RouteId, TeamId, WalkStatus};

/// Errors surfaced by the walk coordinator core.
///
/// Every precondition variant is detected before any write is issued; the
/// enclosing transaction is rolled back and nothing is retried.
#[derive(Error, Debug)]
pub enum WalkError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Unknown route: {0}")]
    UnknownRoute(RouteId),

    #[error("{entity} {id} has already finished the walk")]
    AlreadyFinished { entity: &'static str, id: String },

    #[error("Participant {0} is not the captain of their team")]
    NotCaptain(ParticipantId),

    #[error("Participant {0} has not joined a team")]
    NotInTeam(ParticipantId),

    #[error(
        "Team {team} has {member_count} members; removing one would drop it below the minimum of {minimum}"
    )]
    BelowMinimum {
        team: TeamId,
        member_count: u32,
        minimum: u32,
    },

    #[error("Participant {target} is not a member of team {team}")]
    CrossTeamRemoval { target: ParticipantId, team: TeamId },

    #[error("The captain cannot remove themselves from team {0}")]
    CannotRemoveCaptain(TeamId),

    #[error("Admin {admin} has no authority over route {route}")]
    Unauthorized { admin: AdminId, route: RouteId },

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: WalkStatus, to: WalkStatus },

    #[error("Waypoint {waypoint} is beyond the finish ({finish}) of route {route}")]
    WaypointOutOfRange {
        route: RouteId,
        waypoint: u32,
        finish: u32,
    },

    #[error("Team {team} is at waypoint {current}; cannot move back to {requested}")]
    WaypointRegression {
        team: TeamId,
        current: u32,
        requested: u32,
    },

    #[error("Store error: {0}")]
    Store(String),
}

impl WalkError {
    pub fn participant_not_found(id: ParticipantId) -> Self {
        WalkError::NotFound {
            entity: "participant",
            id: id.to_string(),
        }
    }

    pub fn team_not_found(id: impl ToString) -> Self {
        WalkError::NotFound {
            entity: "team",
            id: id.to_string(),
        }
    }

}

impl From<ModelError> for WalkError {
    fn from(err: ModelError) -> Self {
        WalkError::Store(format!("Corrupt record: {err}"))
    }
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for WalkError {
    fn from(err: sqlx::Error) -> Self {
        WalkError::Store(err.to_string())
    }
}

#[cfg(feature = "database")]
impl From<redis::RedisError> for WalkError {
    fn from(err: redis::RedisError) -> Self {
        WalkError::Store(format!("Redis error: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, WalkError>;
