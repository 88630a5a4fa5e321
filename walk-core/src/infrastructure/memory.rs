//! In-process store used by tests and the demo server mode.
//!
//! One async mutex guards all tables; a transaction owns the guard for its
//! whole lifetime and stages writes until commit.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use walk_model::{Admin, AdminId, Participant, ParticipantId, RouteId, Team, TeamId};

use crate::{
    error::{Result, WalkError},
    ports::{SubmissionRegistry, WalkStore, WalkTransaction},
};

#[derive(Debug, Default)]
struct Tables {
    participants: HashMap<ParticipantId, Participant>,
    teams: HashMap<TeamId, Team>,
    admins: HashMap<AdminId, Admin>,
}

impl Tables {
    fn members_of(&self, team: TeamId) -> Vec<Participant> {
        let mut members: Vec<Participant> = self
            .participants
            .values()
            .filter(|participant| participant.team_id == Some(team))
            .cloned()
            .collect();
        members.sort_by_key(|participant| participant.id);
        members
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryWalkStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryWalkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_participant(&self, participant: Participant) {
        self.tables
            .lock()
            .await
            .participants
            .insert(participant.id, participant);
    }

    pub async fn insert_team(&self, team: Team) {
        self.tables.lock().await.teams.insert(team.id, team);
    }

    pub async fn insert_admin(&self, admin: Admin) {
        self.tables.lock().await.admins.insert(admin.id, admin);
    }
}

#[async_trait]
impl WalkStore for InMemoryWalkStore {
    async fn begin(&self) -> Result<Box<dyn WalkTransaction>> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        Ok(Box::new(InMemoryTransaction {
            tables: guard,
            participants: HashMap::new(),
            teams: HashMap::new(),
        }))
    }

    async fn participant(&self, id: ParticipantId) -> Result<Option<Participant>> {
        Ok(self.tables.lock().await.participants.get(&id).cloned())
    }

    async fn participants_in_team(&self, team: TeamId) -> Result<Vec<Participant>> {
        Ok(self.tables.lock().await.members_of(team))
    }

    async fn team(&self, id: TeamId) -> Result<Option<Team>> {
        Ok(self.tables.lock().await.teams.get(&id).cloned())
    }

    async fn teams_on_route(&self, route: RouteId) -> Result<Vec<Team>> {
        let tables = self.tables.lock().await;
        let mut teams: Vec<Team> = tables
            .teams
            .values()
            .filter(|team| team.route_id == route)
            .cloned()
            .collect();
        teams.sort_by_key(|team| team.id);
        Ok(teams)
    }

    async fn admin(&self, id: AdminId) -> Result<Option<Admin>> {
        Ok(self.tables.lock().await.admins.get(&id).cloned())
    }
}

struct InMemoryTransaction {
    tables: OwnedMutexGuard<Tables>,
    participants: HashMap<ParticipantId, Participant>,
    teams: HashMap<TeamId, Team>,
}

#[async_trait]
impl WalkTransaction for InMemoryTransaction {
    async fn participant(&mut self, id: ParticipantId) -> Result<Option<Participant>> {
        Ok(self
            .participants
            .get(&id)
            .or_else(|| self.tables.participants.get(&id))
            .cloned())
    }

    async fn participants_in_team(&mut self, team: TeamId) -> Result<Vec<Participant>> {
        let mut members: Vec<Participant> = self
            .tables
            .participants
            .values()
            .map(|committed| self.participants.get(&committed.id).unwrap_or(committed))
            .filter(|participant| participant.team_id == Some(team))
            .cloned()
            .collect();
        members.sort_by_key(|participant| participant.id);
        Ok(members)
    }

    async fn lock_team(&mut self, id: TeamId) -> Result<Option<Team>> {
        Ok(self
            .teams
            .get(&id)
            .or_else(|| self.tables.teams.get(&id))
            .cloned())
    }

    async fn update_participant(&mut self, participant: &Participant) -> Result<()> {
        if !self.tables.participants.contains_key(&participant.id) {
            return Err(WalkError::participant_not_found(participant.id));
        }
        self.participants
            .insert(participant.id, participant.clone());
        Ok(())
    }

    async fn update_team(&mut self, team: &Team) -> Result<()> {
        if !self.tables.teams.contains_key(&team.id) {
            return Err(WalkError::team_not_found(team.id));
        }
        self.teams.insert(team.id, team.clone());
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<()> {
        let participants = std::mem::take(&mut self.participants);
        let teams = std::mem::take(&mut self.teams);
        self.tables.participants.extend(participants);
        self.tables.teams.extend(teams);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Submitted-team set held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySubmissionRegistry {
    teams: Arc<RwLock<HashSet<TeamId>>>,
}

impl InMemorySubmissionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn submit(&self, team: TeamId) {
        self.teams.write().await.insert(team);
    }

    pub async fn withdraw(&self, team: TeamId) {
        self.teams.write().await.remove(&team);
    }
}

#[async_trait]
impl SubmissionRegistry for InMemorySubmissionRegistry {
    async fn is_submitted(&self, team: TeamId) -> Result<bool> {
        Ok(self.teams.read().await.contains(&team))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use walk_model::{Gender, ParticipantKind, WalkStatus};

    #[tokio::test]
    async fn dropped_transaction_discards_writes() {
        let store = InMemoryWalkStore::new();
        let mut walker = Participant::new("Wu", ParticipantKind::Staff, Gender::Male);
        store.insert_participant(walker.clone()).await;

        {
            let mut tx = store.begin().await.unwrap();
            walker.walk_status = WalkStatus::Abandoned;
            tx.update_participant(&walker).await.unwrap();
        }

        let stored = store.participant(walker.id).await.unwrap().unwrap();
        assert_eq!(stored.walk_status, WalkStatus::NotStarted);
    }

    #[tokio::test]
    async fn transaction_reads_its_own_writes() {
        let store = InMemoryWalkStore::new();
        let captain = Participant::new("Ma", ParticipantKind::Student, Gender::Female);
        let team = Team::new("Larks", RouteId(2), captain.id);
        let mut captain = captain.join(team.id, walk_model::MembershipRole::Captain);
        store.insert_team(team.clone()).await;
        store.insert_participant(captain.clone()).await;

        let mut tx = store.begin().await.unwrap();
        captain.leave_team();
        tx.update_participant(&captain).await.unwrap();
        assert!(tx.participants_in_team(team.id).await.unwrap().is_empty());
        tx.commit().await.unwrap();

        assert!(store.participants_in_team(team.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn submission_registry_tracks_membership() {
        let registry = InMemorySubmissionRegistry::new();
        let team = TeamId::new();
        assert!(!registry.is_submitted(team).await.unwrap());
        registry.submit(team).await;
        assert!(registry.is_submitted(team).await.unwrap());
        registry.withdraw(team).await;
        assert!(!registry.is_submitted(team).await.unwrap());
    }
}
