use std::fmt;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use walk_model::TeamId;

use crate::{
    error::{Result, WalkError},
    ports::SubmissionRegistry,
};

/// Redis set holding the ids of teams submitted for matching.
pub const DEFAULT_SUBMISSION_KEY: &str = "teams";

#[derive(Clone)]
pub struct RedisSubmissionRegistry {
    connection: ConnectionManager,
    key: String,
}

impl fmt::Debug for RedisSubmissionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisSubmissionRegistry")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl RedisSubmissionRegistry {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| WalkError::Store(format!("Failed to create Redis client: {e}")))?;
        let connection = ConnectionManager::new(client).await.map_err(|e| {
            WalkError::Store(format!("Failed to create Redis connection manager: {e}"))
        })?;

        Ok(Self {
            connection,
            key: DEFAULT_SUBMISSION_KEY.to_string(),
        })
    }
}

#[async_trait]
impl SubmissionRegistry for RedisSubmissionRegistry {
    async fn is_submitted(&self, team: TeamId) -> Result<bool> {
        let mut conn = self.connection.clone();
        let member: bool = conn.sismember(&self.key, team.to_string()).await?;
        Ok(member)
    }
}
