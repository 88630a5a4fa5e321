use chrono::{DateTime, Utc};

use crate::{
    ids::{ParticipantId, RouteId, TeamId},
    status::TeamStatus,
};

/// A walking team and its position along the route.
///
/// `current_waypoint` never decreases. `last_check_in_time` stays `None`
/// until the team produces its first check-in event.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub route_id: RouteId,
    pub member_count: u32,
    pub current_waypoint: u32,
    pub status: TeamStatus,
    pub last_check_in_time: Option<DateTime<Utc>>,
    pub captain: ParticipantId,
    /// Whether the team is listed in the matching lobby.
    pub allow_match: bool,
}

impl Team {
    pub fn new(
        name: impl Into<String>,
        route_id: RouteId,
        captain: ParticipantId,
    ) -> Self {
        Self {
            id: TeamId::new(),
            name: name.into(),
            route_id,
            member_count: 1,
            current_waypoint: 0,
            status: TeamStatus::Formed,
            last_check_in_time: None,
            captain,
            allow_match: false,
        }
    }

    pub fn has_started(&self) -> bool {
        self.status != TeamStatus::Formed
    }

    /// Never checked in anywhere, still at the start line.
    pub fn is_no_show(&self) -> bool {
        self.status == TeamStatus::Formed
            && self.current_waypoint == 0
            && self.last_check_in_time.is_none()
    }
}
