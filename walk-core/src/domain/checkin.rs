//! Check-in engine: admin status changes and station arrivals.
//!
//! Both operations run inside a single store transaction. All checks happen
//! before the first write, so a rejected request leaves no trace.

use std::{
    any::type_name_of_val,
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use walk_model::{Admin, Participant, ParticipantId, Team, TeamId, TeamStatus, WalkStatus};

use crate::{
    domain::teams::TeamState,
    error::{Result, WalkError},
    ports::{Clock, RouteAuthority, WalkStore},
    topology::{RouteTopology, UNKNOWN_LOCATION},
};

/// One entry of a batch status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub participant_id: ParticipantId,
    pub new_status: WalkStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusChangeOutcome {
    /// Participants after the change, ordered by id.
    pub participants: Vec<Participant>,
    /// Every touched team with its recomputed status, ordered by id.
    pub teams: Vec<Team>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrivalKind {
    Started,
    Advanced,
    Finished,
    /// Same waypoint scanned twice; nothing was written.
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrivalOutcome {
    pub kind: ArrivalKind,
    pub team: Team,
    /// Members whose walk status changed.
    pub updated: Vec<Participant>,
}

#[derive(Clone)]
pub struct CheckInEngine {
    store: Arc<dyn WalkStore>,
    topology: Arc<RouteTopology>,
    authority: Arc<dyn RouteAuthority>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for CheckInEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckInEngine")
            .field("store", &type_name_of_val(self.store.as_ref()))
            .field("authority", &type_name_of_val(self.authority.as_ref()))
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl CheckInEngine {
    pub fn new(
        store: Arc<dyn WalkStore>,
        topology: Arc<RouteTopology>,
        authority: Arc<dyn RouteAuthority>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            topology,
            authority,
            clock,
        }
    }

    /// Apply a batch of admin status changes.
    ///
    /// Each request is checked in order for route authority, an already
    /// finished walker, and an admin-settable target status. The first
    /// failure aborts the whole batch. Touched teams are locked in id order
    /// and their aggregate status is recomputed from the full membership
    /// once every member write is staged.
    pub async fn apply_status_change(
        &self,
        actor: &Admin,
        changes: &[StatusChange],
    ) -> Result<StatusChangeOutcome> {
        if changes.is_empty() {
            return Ok(StatusChangeOutcome::default());
        }

        let mut tx = self.store.begin().await?;

        let mut team_ids = BTreeSet::new();
        for change in changes {
            let participant = tx
                .participant(change.participant_id)
                .await?
                .ok_or_else(|| WalkError::participant_not_found(change.participant_id))?;
            let team_id = participant.team_id.ok_or_else(|| {
                WalkError::team_not_found(format!("of participant {}", participant.id))
            })?;
            team_ids.insert(team_id);
        }

        let mut teams: BTreeMap<TeamId, Team> = BTreeMap::new();
        for team_id in team_ids {
            let team = tx
                .lock_team(team_id)
                .await?
                .ok_or_else(|| WalkError::team_not_found(team_id))?;
            teams.insert(team_id, team);
        }

        let mut staged: BTreeMap<ParticipantId, Participant> = BTreeMap::new();
        for change in changes {
            let id = change.participant_id;
            let mut participant = match staged.remove(&id) {
                Some(participant) => participant,
                None => tx
                    .participant(id)
                    .await?
                    .ok_or_else(|| WalkError::participant_not_found(id))?,
            };

            let team = participant
                .team_id
                .and_then(|team_id| teams.get(&team_id))
                .ok_or_else(|| {
                    WalkError::Store(format!("participant {id} changed teams concurrently"))
                })?;

            if !self.authority.check_route(actor, team) {
                return Err(WalkError::Unauthorized {
                    admin: actor.id,
                    route: team.route_id,
                });
            }

            if participant.walk_status == WalkStatus::Finished {
                return Err(WalkError::AlreadyFinished {
                    entity: "participant",
                    id: id.to_string(),
                });
            }

            if !change.new_status.is_admin_settable()
                || !participant.walk_status.can_transition_to(change.new_status)
            {
                return Err(WalkError::InvalidTransition {
                    from: participant.walk_status,
                    to: change.new_status,
                });
            }

            participant.walk_status = change.new_status;
            staged.insert(id, participant);
        }

        for participant in staged.values() {
            tx.update_participant(participant).await?;
        }

        for team in teams.values_mut() {
            let members = tx.participants_in_team(team.id).await?;
            let derived = TeamState::derive_status(team.status, &members);
            if derived != team.status {
                debug!(team = %team.id, from = %team.status, to = %derived, "team status recomputed");
                team.status = derived;
                tx.update_team(team).await?;
            }
        }

        tx.commit().await?;

        info!(
            admin = %actor.id,
            participants = staged.len(),
            teams = teams.len(),
            "applied status changes"
        );

        Ok(StatusChangeOutcome {
            participants: staged.into_values().collect(),
            teams: teams.into_values().collect(),
        })
    }

    /// Record a team reaching a waypoint.
    ///
    /// The start moves members out of `NotStarted`, intermediate waypoints
    /// put active members back in progress, and the finish completes every
    /// member that has not abandoned. Scanning the current waypoint of a
    /// team already under way is a no-op.
    pub async fn record_arrival(
        &self,
        actor: &Admin,
        team_id: TeamId,
        waypoint: u32,
    ) -> Result<ArrivalOutcome> {
        let mut tx = self.store.begin().await?;

        let mut team = tx
            .lock_team(team_id)
            .await?
            .ok_or_else(|| WalkError::team_not_found(team_id))?;

        if !self.authority.check_route(actor, &team) {
            return Err(WalkError::Unauthorized {
                admin: actor.id,
                route: team.route_id,
            });
        }

        if team.status == TeamStatus::Finished {
            return Err(WalkError::AlreadyFinished {
                entity: "team",
                id: team_id.to_string(),
            });
        }

        let finish = self.topology.finish_index(team.route_id)?;
        if waypoint > finish {
            return Err(WalkError::WaypointOutOfRange {
                route: team.route_id,
                waypoint,
                finish,
            });
        }

        if waypoint < team.current_waypoint {
            return Err(WalkError::WaypointRegression {
                team: team_id,
                current: team.current_waypoint,
                requested: waypoint,
            });
        }

        if waypoint == team.current_waypoint && team.has_started() {
            tx.rollback().await?;
            debug!(team = %team_id, waypoint, "duplicate arrival ignored");
            return Ok(ArrivalOutcome {
                kind: ArrivalKind::Duplicate,
                team,
                updated: Vec::new(),
            });
        }

        let at_finish = waypoint == finish;
        let mut members = tx.participants_in_team(team_id).await?;
        let mut updated = Vec::new();
        for member in &mut members {
            let next = arrival_status(member.walk_status, at_finish);
            if next != member.walk_status {
                member.walk_status = next;
                tx.update_participant(member).await?;
                updated.push(member.clone());
            }
        }

        if team.status == TeamStatus::Formed {
            team.status = TeamStatus::Active;
        }
        TeamState::advance_waypoint(&mut team, waypoint, self.clock.now());
        team.status = TeamState::derive_status(team.status, &members);
        tx.update_team(&team).await?;
        tx.commit().await?;

        let kind = if team.status == TeamStatus::Finished {
            ArrivalKind::Finished
        } else if waypoint == 0 {
            ArrivalKind::Started
        } else {
            ArrivalKind::Advanced
        };

        let location = self
            .topology
            .waypoint_name(team.route_id, waypoint)
            .unwrap_or(UNKNOWN_LOCATION);
        info!(
            admin = %actor.id,
            team = %team_id,
            waypoint,
            location,
            outcome = ?kind,
            "arrival recorded"
        );

        Ok(ArrivalOutcome {
            kind,
            team,
            updated,
        })
    }
}

/// Walk status of a member after their team checks in somewhere.
fn arrival_status(current: WalkStatus, at_finish: bool) -> WalkStatus {
    match current {
        WalkStatus::Abandoned | WalkStatus::Finished => current,
        _ if at_finish => WalkStatus::Finished,
        _ => WalkStatus::InProgress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abandoned_walkers_are_left_alone_at_the_finish() {
        assert_eq!(
            arrival_status(WalkStatus::Abandoned, true),
            WalkStatus::Abandoned
        );
        assert_eq!(
            arrival_status(WalkStatus::CheckedIn, true),
            WalkStatus::Finished
        );
        assert_eq!(
            arrival_status(WalkStatus::NotStarted, false),
            WalkStatus::InProgress
        );
    }
}
