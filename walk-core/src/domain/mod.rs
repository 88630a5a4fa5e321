//! Services implementing the walk coordinator's business rules.

pub mod checkin;
pub mod matching;
pub mod membership;
pub mod participants;
pub mod report;
pub mod teams;
pub mod timeouts;

pub use checkin::{ArrivalKind, ArrivalOutcome, CheckInEngine, StatusChange, StatusChangeOutcome};
pub use matching::MatchCandidates;
pub use membership::{FloorPolicy, MembershipPolicy, MembershipService, RemovalOutcome};
pub use participants::ParticipantState;
pub use report::{ReportQuery, RosterEntry, TimeoutReport, WaypointBucket, WaypointSlot};
pub use teams::TeamState;
pub use timeouts::TimeoutScanner;
