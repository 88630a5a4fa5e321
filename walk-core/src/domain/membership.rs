use std::{any::type_name_of_val, fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::info;
use walk_model::{MembershipRole, Participant, ParticipantId, Team};

use crate::{
    domain::teams::lock_team_of,
    error::{Result, WalkError},
    ports::{Notification, Notifier, SubmissionRegistry, WalkStore, spawn_notification},
    topology::RouteTopology,
};

/// Which teams the minimum-size floor protects on member removal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloorPolicy {
    /// Only teams submitted to the matching lobby.
    #[default]
    SubmittedOnly,
    /// Every team.
    Always,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipPolicy {
    #[serde(default)]
    pub floor: FloorPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalOutcome {
    pub team: Team,
    pub removed: Participant,
}

/// Captain-driven team membership changes.
#[derive(Clone)]
pub struct MembershipService {
    store: Arc<dyn WalkStore>,
    topology: Arc<RouteTopology>,
    registry: Arc<dyn SubmissionRegistry>,
    notifier: Arc<dyn Notifier>,
    policy: MembershipPolicy,
}

impl fmt::Debug for MembershipService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MembershipService")
            .field("store", &type_name_of_val(self.store.as_ref()))
            .field("registry", &type_name_of_val(self.registry.as_ref()))
            .field("notifier", &type_name_of_val(self.notifier.as_ref()))
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl MembershipService {
    pub fn new(
        store: Arc<dyn WalkStore>,
        topology: Arc<RouteTopology>,
        registry: Arc<dyn SubmissionRegistry>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            topology,
            registry,
            notifier,
            policy: MembershipPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: MembershipPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> MembershipPolicy {
        self.policy
    }

    /// Remove `target_id` from the captain's team.
    ///
    /// Guards run in order: the actor must captain a team, a guarded team
    /// may not shrink below its route minimum, and the target must be
    /// another member of that same team. Both parties are notified after the
    /// commit on a detached task.
    pub async fn remove_member(
        &self,
        actor_id: ParticipantId,
        target_id: ParticipantId,
    ) -> Result<RemovalOutcome> {
        let actor = self
            .store
            .participant(actor_id)
            .await?
            .ok_or_else(|| WalkError::participant_not_found(actor_id))?;
        ensure_captain(&actor)?;
        let Some(team_id) = actor.team_id else {
            return Err(WalkError::NotInTeam(actor_id));
        };

        // Registry lookups stay outside the transaction.
        let guarded = match self.policy.floor {
            FloorPolicy::Always => true,
            FloorPolicy::SubmittedOnly => self.registry.is_submitted(team_id).await?,
        };

        let mut tx = self.store.begin().await?;
        let (actor, team) = lock_team_of(tx.as_mut(), actor_id).await?;
        let Some(mut team) = team else {
            return Err(WalkError::NotInTeam(actor_id));
        };
        ensure_captain(&actor)?;
        if team.id != team_id {
            return Err(WalkError::Store(format!(
                "participant {actor_id} changed teams concurrently"
            )));
        }

        let minimum = self.topology.team_size(team.route_id)?.min;
        if guarded && team.member_count <= minimum {
            return Err(WalkError::BelowMinimum {
                team: team.id,
                member_count: team.member_count,
                minimum,
            });
        }

        let mut target = tx
            .participant(target_id)
            .await?
            .ok_or_else(|| WalkError::participant_not_found(target_id))?;
        if target.team_id != Some(team.id) {
            return Err(WalkError::CrossTeamRemoval {
                target: target_id,
                team: team.id,
            });
        }
        if target.id == actor.id || target.is_captain() {
            return Err(WalkError::CannotRemoveCaptain(team.id));
        }

        team.member_count = team.member_count.saturating_sub(1);
        target.leave_team();
        tx.update_team(&team).await?;
        tx.update_participant(&target).await?;
        tx.commit().await?;

        info!(
            captain = %actor.id,
            removed = %target.id,
            team = %team.id,
            member_count = team.member_count,
            "member removed from team"
        );

        spawn_notification(
            Arc::clone(&self.notifier),
            Notification::to(
                &target,
                format!("You have been removed from team \"{}\" by the captain.", team.name),
            ),
        );
        spawn_notification(
            Arc::clone(&self.notifier),
            Notification::to(
                &actor,
                format!("{} has been removed from your team.", target.name),
            ),
        );

        Ok(RemovalOutcome {
            team,
            removed: target,
        })
    }
}

fn ensure_captain(actor: &Participant) -> Result<()> {
    match actor.role {
        MembershipRole::Captain if actor.team_id.is_some() => Ok(()),
        MembershipRole::Member if actor.team_id.is_some() => Err(WalkError::NotCaptain(actor.id)),
        _ => Err(WalkError::NotInTeam(actor.id)),
    }
}
