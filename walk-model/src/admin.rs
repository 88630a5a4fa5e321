use crate::ids::{AdminId, RouteId};

/// Which routes an admin may act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "scope", content = "route", rename_all = "snake_case"))]
pub enum AdminScope {
    All,
    Route(RouteId),
}

impl AdminScope {
    pub fn covers(&self, route: RouteId) -> bool {
        match self {
            AdminScope::All => true,
            AdminScope::Route(own) => *own == route,
        }
    }
}

/// Station staff account.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Admin {
    pub id: AdminId,
    pub name: String,
    pub account: String,
    pub scope: AdminScope,
}

impl Admin {
    pub fn new(
        name: impl Into<String>,
        account: impl Into<String>,
        scope: AdminScope,
    ) -> Self {
        Self {
            id: AdminId::new(),
            name: name.into(),
            account: account.into(),
            scope,
        }
    }
}
