use async_trait::async_trait;
use walk_model::TeamId;

use crate::error::Result;

/// The set of teams submitted to the matching lobby.
///
/// Submitted teams are protected by the membership floor under the default
/// policy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionRegistry: Send + Sync {
    async fn is_submitted(&self, team: TeamId) -> Result<bool>;
}
