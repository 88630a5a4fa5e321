use std::{any::type_name_of_val, fmt, sync::Arc};

use tracing::debug;
use walk_model::{Participant, ParticipantId, TeamId, WalkStatus};

use crate::{
    error::{Result, WalkError},
    ports::WalkStore,
};

/// Point access to participant records.
#[derive(Clone)]
pub struct ParticipantState {
    store: Arc<dyn WalkStore>,
}

impl fmt::Debug for ParticipantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParticipantState")
            .field("store", &type_name_of_val(self.store.as_ref()))
            .finish()
    }
}

impl ParticipantState {
    pub fn new(store: Arc<dyn WalkStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: ParticipantId) -> Result<Participant> {
        self.store
            .participant(id)
            .await?
            .ok_or_else(|| WalkError::participant_not_found(id))
    }

    /// Overwrite one participant's walk status.
    ///
    /// Single-row write: the team aggregate is not recomputed. Batch changes
    /// that must keep the team consistent go through the check-in engine.
    pub async fn update_status(
        &self,
        id: ParticipantId,
        status: WalkStatus,
    ) -> Result<Participant> {
        let mut tx = self.store.begin().await?;
        let mut participant = tx
            .participant(id)
            .await?
            .ok_or_else(|| WalkError::participant_not_found(id))?;

        participant.walk_status = status;
        tx.update_participant(&participant).await?;
        tx.commit().await?;

        debug!(participant = %id, status = %status, "participant status updated");
        Ok(participant)
    }

    /// Members of a team, ordered by id.
    pub async fn list_by_team(&self, team: TeamId) -> Result<Vec<Participant>> {
        self.store.participants_in_team(team).await
    }
}
