//! Status enumerations for participants and teams.
//!
//! Each enumeration keeps the numeric code used by the persisted data set
//! and the transition table of its state machine.

use std::fmt;

use crate::error::ModelError;

/// Progress of an individual walker along the route.
///
/// Transitions:
/// - `NotStarted` -> `InProgress` | `CheckedIn` | `Abandoned`
/// - `InProgress` -> `CheckedIn` | `Abandoned` | `Finished`
/// - `CheckedIn` -> `InProgress` | `Abandoned` | `Finished`
/// - `Abandoned` -> `CheckedIn` (reinstated by a route admin)
/// - `Finished` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WalkStatus {
    NotStarted,
    InProgress,
    CheckedIn,
    Abandoned,
    Finished,
}

impl WalkStatus {
    pub fn code(self) -> i16 {
        match self {
            WalkStatus::NotStarted => 1,
            WalkStatus::InProgress => 2,
            WalkStatus::CheckedIn => 3,
            WalkStatus::Abandoned => 4,
            WalkStatus::Finished => 5,
        }
    }

    pub fn from_code(code: i16) -> Result<Self, ModelError> {
        match code {
            1 => Ok(WalkStatus::NotStarted),
            2 => Ok(WalkStatus::InProgress),
            3 => Ok(WalkStatus::CheckedIn),
            4 => Ok(WalkStatus::Abandoned),
            5 => Ok(WalkStatus::Finished),
            _ => Err(ModelError::UnknownCode {
                kind: "walk status",
                code,
            }),
        }
    }

    /// Abandoned and finished walkers no longer count toward an active team.
    pub fn is_terminal(self) -> bool {
        matches!(self, WalkStatus::Abandoned | WalkStatus::Finished)
    }

    /// Only these two statuses may be set directly by a route admin.
    pub fn is_admin_settable(self) -> bool {
        matches!(self, WalkStatus::CheckedIn | WalkStatus::Abandoned)
    }

    /// Same status is always valid (no-op), except out of `Finished`.
    pub fn can_transition_to(self, next: WalkStatus) -> bool {
        if self == WalkStatus::Finished {
            return false;
        }
        if self == next {
            return true;
        }

        match self {
            WalkStatus::NotStarted => matches!(
                next,
                WalkStatus::InProgress
                    | WalkStatus::CheckedIn
                    | WalkStatus::Abandoned
            ),
            WalkStatus::InProgress | WalkStatus::CheckedIn => matches!(
                next,
                WalkStatus::InProgress
                    | WalkStatus::CheckedIn
                    | WalkStatus::Abandoned
                    | WalkStatus::Finished
            ),
            WalkStatus::Abandoned => matches!(next, WalkStatus::CheckedIn),
            WalkStatus::Finished => false,
        }
    }

    pub fn valid_transitions(self) -> Vec<WalkStatus> {
        [
            WalkStatus::NotStarted,
            WalkStatus::InProgress,
            WalkStatus::CheckedIn,
            WalkStatus::Abandoned,
            WalkStatus::Finished,
        ]
        .into_iter()
        .filter(|next| *next != self && self.can_transition_to(*next))
        .collect()
    }
}

impl fmt::Display for WalkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalkStatus::NotStarted => write!(f, "not started"),
            WalkStatus::InProgress => write!(f, "in progress"),
            WalkStatus::CheckedIn => write!(f, "checked in"),
            WalkStatus::Abandoned => write!(f, "abandoned"),
            WalkStatus::Finished => write!(f, "finished"),
        }
    }
}

/// Aggregate status of a team, derived from its members.
///
/// Transitions:
/// - `Formed` -> `Active` | `Finished`
/// - `Active` -> `Finished`
/// - `Finished` -> `Active` (an abandoned member was reinstated)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TeamStatus {
    Formed,
    Active,
    Finished,
}

impl TeamStatus {
    pub fn code(self) -> i16 {
        match self {
            TeamStatus::Formed => 1,
            TeamStatus::Active => 2,
            TeamStatus::Finished => 3,
        }
    }

    pub fn from_code(code: i16) -> Result<Self, ModelError> {
        match code {
            1 => Ok(TeamStatus::Formed),
            2 => Ok(TeamStatus::Active),
            3 => Ok(TeamStatus::Finished),
            _ => Err(ModelError::UnknownCode {
                kind: "team status",
                code,
            }),
        }
    }

    pub fn can_transition_to(self, next: TeamStatus) -> bool {
        if self == next {
            return true;
        }

        match self {
            TeamStatus::Formed => {
                matches!(next, TeamStatus::Active | TeamStatus::Finished)
            }
            TeamStatus::Active => matches!(next, TeamStatus::Finished),
            TeamStatus::Finished => matches!(next, TeamStatus::Active),
        }
    }
}

impl fmt::Display for TeamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamStatus::Formed => write!(f, "formed"),
            TeamStatus::Active => write!(f, "active"),
            TeamStatus::Finished => write!(f, "finished"),
        }
    }
}

/// A participant's standing inside their team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MembershipRole {
    Unassigned,
    Member,
    Captain,
}

impl MembershipRole {
    pub fn code(self) -> i16 {
        match self {
            MembershipRole::Unassigned => 0,
            MembershipRole::Member => 1,
            MembershipRole::Captain => 2,
        }
    }

    pub fn from_code(code: i16) -> Result<Self, ModelError> {
        match code {
            0 => Ok(MembershipRole::Unassigned),
            1 => Ok(MembershipRole::Member),
            2 => Ok(MembershipRole::Captain),
            _ => Err(ModelError::UnknownCode {
                kind: "membership role",
                code,
            }),
        }
    }
}

impl fmt::Display for MembershipRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MembershipRole::Unassigned => write!(f, "unassigned"),
            MembershipRole::Member => write!(f, "member"),
            MembershipRole::Captain => write!(f, "captain"),
        }
    }
}
