use std::{any::type_name_of_val, fmt, sync::Arc};

use chrono::{DateTime, Utc};
use walk_model::{Participant, ParticipantId, RouteId, Team, TeamId, TeamStatus, WalkStatus};

use crate::{
    error::{Result, WalkError},
    ports::{WalkStore, WalkTransaction},
};

/// Team lookups and the rules that keep a team consistent with its members.
#[derive(Clone)]
pub struct TeamState {
    store: Arc<dyn WalkStore>,
}

impl fmt::Debug for TeamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeamState")
            .field("store", &type_name_of_val(self.store.as_ref()))
            .finish()
    }
}

impl TeamState {
    pub fn new(store: Arc<dyn WalkStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: TeamId) -> Result<Team> {
        self.store
            .team(id)
            .await?
            .ok_or_else(|| WalkError::team_not_found(id))
    }

    pub async fn list_by_route(&self, route: RouteId) -> Result<Vec<Team>> {
        self.store.teams_on_route(route).await
    }

    /// Aggregate status of a team given its full membership.
    ///
    /// `Finished` exactly when every member is abandoned or finished. A team
    /// that has not set off yet stays `Formed` until a member is walking or
    /// has finished; a station check-in alone does not start it. Anything
    /// else is `Active`. An empty team keeps `current`.
    pub fn derive_status(current: TeamStatus, members: &[Participant]) -> TeamStatus {
        if members.is_empty() {
            return current;
        }

        if members.iter().all(|member| member.walk_status.is_terminal()) {
            return TeamStatus::Finished;
        }

        let progressed = members.iter().any(|member| {
            matches!(
                member.walk_status,
                WalkStatus::InProgress | WalkStatus::Finished
            )
        });

        if current == TeamStatus::Formed && !progressed {
            TeamStatus::Formed
        } else {
            TeamStatus::Active
        }
    }

    /// Move the team to `index` and stamp the check-in time. The waypoint
    /// never moves backwards.
    pub fn advance_waypoint(team: &mut Team, index: u32, now: DateTime<Utc>) {
        team.current_waypoint = team.current_waypoint.max(index);
        team.last_check_in_time = Some(now);
    }
}

/// Resolve a participant's team and lock it.
///
/// The participant is read again once the team row is held so that the
/// returned record cannot change underneath the caller. A participant that
/// moved to another team between the two reads is reported as a conflict.
pub(crate) async fn lock_team_of(
    tx: &mut dyn WalkTransaction,
    participant: ParticipantId,
) -> Result<(Participant, Option<Team>)> {
    let first = tx
        .participant(participant)
        .await?
        .ok_or_else(|| WalkError::participant_not_found(participant))?;

    let Some(team_id) = first.team_id else {
        return Ok((first, None));
    };

    let team = tx
        .lock_team(team_id)
        .await?
        .ok_or_else(|| WalkError::team_not_found(team_id))?;

    let current = tx
        .participant(participant)
        .await?
        .ok_or_else(|| WalkError::participant_not_found(participant))?;

    if current.team_id != Some(team_id) {
        return Err(WalkError::Store(format!(
            "participant {participant} changed teams concurrently"
        )));
    }

    Ok((current, Some(team)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use walk_model::{Gender, ParticipantKind};

    fn member(status: WalkStatus) -> Participant {
        let mut walker = Participant::new("walker", ParticipantKind::Student, Gender::Male);
        walker.walk_status = status;
        walker
    }

    #[test]
    fn all_terminal_members_finish_the_team() {
        let members = [member(WalkStatus::Abandoned), member(WalkStatus::Finished)];
        assert_eq!(
            TeamState::derive_status(TeamStatus::Active, &members),
            TeamStatus::Finished
        );
    }

    #[test]
    fn one_walker_still_out_keeps_the_team_active() {
        let members = [member(WalkStatus::Abandoned), member(WalkStatus::CheckedIn)];
        assert_eq!(
            TeamState::derive_status(TeamStatus::Finished, &members),
            TeamStatus::Active
        );
    }

    #[test]
    fn unstarted_team_stays_formed() {
        let members = [member(WalkStatus::NotStarted), member(WalkStatus::Abandoned)];
        assert_eq!(
            TeamState::derive_status(TeamStatus::Formed, &members),
            TeamStatus::Formed
        );
    }

    #[test]
    fn station_check_in_does_not_start_a_formed_team() {
        let members = [member(WalkStatus::CheckedIn), member(WalkStatus::NotStarted)];
        assert_eq!(
            TeamState::derive_status(TeamStatus::Formed, &members),
            TeamStatus::Formed
        );
        assert_eq!(
            TeamState::derive_status(TeamStatus::Active, &members),
            TeamStatus::Active
        );
    }

    #[test]
    fn empty_team_keeps_its_status() {
        assert_eq!(
            TeamState::derive_status(TeamStatus::Active, &[]),
            TeamStatus::Active
        );
    }

    #[test]
    fn waypoint_never_moves_back() {
        let mut team = Team::new("t", RouteId(1), ParticipantId::new());
        let now = Utc::now();
        TeamState::advance_waypoint(&mut team, 3, now);
        TeamState::advance_waypoint(&mut team, 1, now);
        assert_eq!(team.current_waypoint, 3);
        assert_eq!(team.last_check_in_time, Some(now));
    }
}
