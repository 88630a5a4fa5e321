//! Roster report of stalled and no-show teams for station operators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use walk_model::{
    ContactInfo, Gender, MembershipRole, Participant, ParticipantId, ParticipantKind, RouteId,
    Team, TeamId, TeamStatus, WalkStatus,
};

use crate::{
    domain::timeouts::TimeoutScanner, error::Result, topology::NOT_ARRIVED_LOCATION,
};

/// Position of a report bucket. `NotArrived` sorts before every waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaypointSlot {
    NotArrived,
    Waypoint(u32),
}

impl WaypointSlot {
    /// Numeric index with `-1` standing in for the not-arrived bucket.
    pub fn index(self) -> i64 {
        match self {
            WaypointSlot::NotArrived => -1,
            WaypointSlot::Waypoint(index) => i64::from(index),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportQuery {
    pub threshold_minutes: u32,
    pub route: RouteId,
    /// Restrict rows to one participant kind; `None` keeps everyone.
    #[serde(default)]
    pub kind: Option<ParticipantKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub participant_id: ParticipantId,
    pub name: String,
    pub gender: Gender,
    pub kind: ParticipantKind,
    pub role: MembershipRole,
    pub walk_status: WalkStatus,
    pub contact: ContactInfo,
    pub team_id: TeamId,
    pub team_name: String,
    pub team_status: TeamStatus,
    pub last_check_in_time: Option<DateTime<Utc>>,
}

impl RosterEntry {
    fn new(team: &Team, member: Participant) -> Self {
        Self {
            participant_id: member.id,
            name: member.name,
            gender: member.gender,
            kind: member.kind,
            role: member.role,
            walk_status: member.walk_status,
            contact: member.contact,
            team_id: team.id,
            team_name: team.name.clone(),
            team_status: team.status,
            last_check_in_time: team.last_check_in_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaypointBucket {
    pub slot: WaypointSlot,
    pub index: i64,
    pub location: String,
    pub entries: Vec<RosterEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeoutReport {
    pub route: RouteId,
    pub threshold_minutes: u32,
    pub generated_at: DateTime<Utc>,
    pub buckets: Vec<WaypointBucket>,
}

impl TimeoutReport {
    /// Combine no-show and timed-out teams into per-member rows.
    ///
    /// The not-arrived bucket always comes first, followed by stalled
    /// waypoints in ascending order. Inside a bucket, teams keep the
    /// scanner's order and each team lists its captain first.
    pub async fn build(scanner: &TimeoutScanner, query: ReportQuery) -> Result<Self> {
        let topology = scanner.topology();
        let no_shows = scanner.no_show_teams(query.route).await?;
        let stalled = scanner
            .timeout_teams(query.threshold_minutes, query.route)
            .await?;

        let mut buckets = Vec::with_capacity(stalled.len() + 1);
        buckets.push(WaypointBucket {
            slot: WaypointSlot::NotArrived,
            index: WaypointSlot::NotArrived.index(),
            location: NOT_ARRIVED_LOCATION.to_string(),
            entries: roster(scanner, &no_shows, query.kind).await?,
        });

        for (waypoint, teams) in stalled {
            let slot = WaypointSlot::Waypoint(waypoint);
            buckets.push(WaypointBucket {
                slot,
                index: slot.index(),
                location: topology.waypoint_name(query.route, waypoint)?.to_string(),
                entries: roster(scanner, &teams, query.kind).await?,
            });
        }

        Ok(Self {
            route: query.route,
            threshold_minutes: query.threshold_minutes,
            generated_at: scanner.clock().now(),
            buckets,
        })
    }

    pub fn total_entries(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.entries.len()).sum()
    }
}

async fn roster(
    scanner: &TimeoutScanner,
    teams: &[Team],
    kind: Option<ParticipantKind>,
) -> Result<Vec<RosterEntry>> {
    let mut entries = Vec::new();
    for team in teams {
        let mut members = scanner.store().participants_in_team(team.id).await?;
        // Stable sort keeps the id order among non-captains.
        members.sort_by_key(|member| member.id != team.captain);
        entries.extend(
            members
                .into_iter()
                .filter(|member| kind.is_none_or(|kind| member.kind == kind))
                .map(|member| RosterEntry::new(team, member)),
        );
    }
    Ok(entries)
}
