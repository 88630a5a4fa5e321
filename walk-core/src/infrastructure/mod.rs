//! Adapters for the core ports.

pub mod memory;
pub mod notify;
#[cfg(feature = "database")]
pub mod postgres;
#[cfg(feature = "database")]
pub mod redis;

pub use memory::{InMemorySubmissionRegistry, InMemoryWalkStore};
pub use notify::{LogNotifier, WebhookNotifier};
#[cfg(feature = "database")]
pub use postgres::PostgresWalkStore;
#[cfg(feature = "database")]
pub use redis::RedisSubmissionRegistry;
