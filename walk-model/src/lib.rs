//! Core data model definitions shared across the walk coordinator crates.
#![allow(missing_docs)]

pub mod admin;
pub mod error;
pub mod ids;
pub mod participant;
pub mod status;
pub mod team;

// Intentionally curated re-exports for downstream consumers.
pub use admin::{Admin, AdminScope};
pub use error::{ModelError, Result as ModelResult};
pub use ids::{AdminId, ParticipantId, RouteId, TeamId};
pub use participant::{Campus, ContactInfo, Gender, Participant, ParticipantKind};
pub use status::{MembershipRole, TeamStatus, WalkStatus};
pub use team::Team;
