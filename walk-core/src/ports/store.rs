use async_trait::async_trait;
use walk_model::{Admin, AdminId, Participant, ParticipantId, RouteId, Team, TeamId};

use crate::error::Result;

/// Transactional store for participants, teams and admins.
///
/// Plain reads outside a transaction see committed data only. Every write
/// goes through a [`WalkTransaction`].
#[async_trait]
pub trait WalkStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn WalkTransaction>>;

    async fn participant(&self, id: ParticipantId) -> Result<Option<Participant>>;

    /// Members of a team ordered by id.
    async fn participants_in_team(&self, team: TeamId) -> Result<Vec<Participant>>;

    async fn team(&self, id: TeamId) -> Result<Option<Team>>;

    /// Teams on a route ordered by id.
    async fn teams_on_route(&self, route: RouteId) -> Result<Vec<Team>>;

    async fn admin(&self, id: AdminId) -> Result<Option<Admin>>;
}

/// An open unit of work.
///
/// Dropping a transaction without calling [`commit`](Self::commit) discards
/// every staged write.
#[async_trait]
pub trait WalkTransaction: Send {
    async fn participant(&mut self, id: ParticipantId) -> Result<Option<Participant>>;

    /// Members of a team ordered by id, including writes staged in this
    /// transaction.
    async fn participants_in_team(&mut self, team: TeamId) -> Result<Vec<Participant>>;

    /// Fetch a team and hold it exclusively until the transaction ends.
    async fn lock_team(&mut self, id: TeamId) -> Result<Option<Team>>;

    async fn update_participant(&mut self, participant: &Participant) -> Result<()>;

    async fn update_team(&mut self, team: &Team) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}
