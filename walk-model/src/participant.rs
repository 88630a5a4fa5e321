use crate::{
    error::ModelError,
    ids::{ParticipantId, TeamId},
    status::{MembershipRole, WalkStatus},
};

/// Registration category of a walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ParticipantKind {
    Student,
    Staff,
    Alumnus,
}

impl ParticipantKind {
    pub fn code(self) -> i16 {
        match self {
            ParticipantKind::Student => 1,
            ParticipantKind::Staff => 2,
            ParticipantKind::Alumnus => 3,
        }
    }

    pub fn from_code(code: i16) -> Result<Self, ModelError> {
        match code {
            1 => Ok(ParticipantKind::Student),
            2 => Ok(ParticipantKind::Staff),
            3 => Ok(ParticipantKind::Alumnus),
            _ => Err(ModelError::UnknownCode {
                kind: "participant kind",
                code,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn code(self) -> i16 {
        match self {
            Gender::Male => 1,
            Gender::Female => 2,
        }
    }

    pub fn from_code(code: i16) -> Result<Self, ModelError> {
        match code {
            1 => Ok(Gender::Male),
            2 => Ok(Gender::Female),
            _ => Err(ModelError::UnknownCode {
                kind: "gender",
                code,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Campus {
    Zhaohui,
    Pingfeng,
    Moganshan,
}

impl Campus {
    pub fn code(self) -> i16 {
        match self {
            Campus::Zhaohui => 1,
            Campus::Pingfeng => 2,
            Campus::Moganshan => 3,
        }
    }

    pub fn from_code(code: i16) -> Result<Self, ModelError> {
        match code {
            1 => Ok(Campus::Zhaohui),
            2 => Ok(Campus::Pingfeng),
            3 => Ok(Campus::Moganshan),
            _ => Err(ModelError::UnknownCode {
                kind: "campus",
                code,
            }),
        }
    }
}

/// Contact details surfaced to operators on roster reports.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContactInfo {
    pub phone: String,
    pub student_number: Option<String>,
    pub campus: Option<Campus>,
    pub college: Option<String>,
}

/// A registered walker.
///
/// `team_id` is `None` while the participant is unassigned; the role is then
/// [`MembershipRole::Unassigned`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub team_id: Option<TeamId>,
    pub role: MembershipRole,
    pub kind: ParticipantKind,
    pub walk_status: WalkStatus,
    pub gender: Gender,
    pub contact: ContactInfo,
}

impl Participant {
    pub fn new(
        name: impl Into<String>,
        kind: ParticipantKind,
        gender: Gender,
    ) -> Self {
        Self {
            id: ParticipantId::new(),
            name: name.into(),
            team_id: None,
            role: MembershipRole::Unassigned,
            kind,
            walk_status: WalkStatus::NotStarted,
            gender,
            contact: ContactInfo::default(),
        }
    }

    pub fn with_contact(mut self, contact: ContactInfo) -> Self {
        self.contact = contact;
        self
    }

    /// Attach the participant to a team with the given role.
    pub fn join(mut self, team_id: TeamId, role: MembershipRole) -> Self {
        self.team_id = Some(team_id);
        self.role = role;
        self
    }

    /// Detach from the current team.
    pub fn leave_team(&mut self) {
        self.team_id = None;
        self.role = MembershipRole::Unassigned;
    }

    pub fn is_captain(&self) -> bool {
        self.role == MembershipRole::Captain
    }
}
