//! Route topology: the fixed, ordered waypoints of every route.
//!
//! Built once at startup and shared read-only behind an `Arc`. Index 0 is
//! the start line and the last index is the finish line.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use walk_model::RouteId;

use crate::error::{Result, WalkError};

/// Label returned for a waypoint index the route does not define.
pub const UNKNOWN_LOCATION: &str = "unknown location";

/// Label of the synthetic bucket for teams that never left the start.
pub const NOT_ARRIVED_LOCATION: &str = "not yet arrived";

pub const DEFAULT_MIN_TEAM_SIZE: u32 = 4;
pub const DEFAULT_MAX_TEAM_SIZE: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSizeBounds {
    pub min: u32,
    pub max: u32,
}

impl Default for TeamSizeBounds {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_TEAM_SIZE,
            max: DEFAULT_MAX_TEAM_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDefinition {
    pub id: RouteId,
    pub name: String,
    pub waypoints: Vec<String>,
    #[serde(default)]
    pub team_size: TeamSizeBounds,
}

impl RouteDefinition {
    pub fn new<I, S>(id: u8, name: impl Into<String>, waypoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: RouteId(id),
            name: name.into(),
            waypoints: waypoints.into_iter().map(Into::into).collect(),
            team_size: TeamSizeBounds::default(),
        }
    }

    pub fn with_team_size(mut self, min: u32, max: u32) -> Self {
        self.team_size = TeamSizeBounds { min, max };
        self
    }

    pub fn finish_index(&self) -> u32 {
        self.waypoints.len().saturating_sub(1) as u32
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("route {0} is defined more than once")]
    DuplicateRoute(RouteId),
    #[error("route {route} needs at least a start and a finish, found {count} waypoint(s)")]
    TooFewWaypoints { route: RouteId, count: usize },
    #[error("route {route} has min team size {min} above max {max}")]
    InvalidTeamSize { route: RouteId, min: u32, max: u32 },
    #[error("no routes configured")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTopology {
    routes: BTreeMap<RouteId, RouteDefinition>,
}

impl RouteTopology {
    pub fn new(
        routes: impl IntoIterator<Item = RouteDefinition>,
    ) -> std::result::Result<Self, TopologyError> {
        let mut map = BTreeMap::new();
        for route in routes {
            if route.waypoints.len() < 2 {
                return Err(TopologyError::TooFewWaypoints {
                    route: route.id,
                    count: route.waypoints.len(),
                });
            }
            if route.team_size.min > route.team_size.max {
                return Err(TopologyError::InvalidTeamSize {
                    route: route.id,
                    min: route.team_size.min,
                    max: route.team_size.max,
                });
            }
            let id = route.id;
            if map.insert(id, route).is_some() {
                return Err(TopologyError::DuplicateRoute(id));
            }
        }

        if map.is_empty() {
            return Err(TopologyError::Empty);
        }

        Ok(Self { routes: map })
    }

    /// The five routes of the campus charity walk.
    pub fn builtin() -> Self {
        Self {
            routes: builtin_routes()
                .into_iter()
                .map(|route| (route.id, route))
                .collect(),
        }
    }

    pub fn route(&self, route: RouteId) -> Result<&RouteDefinition> {
        self.routes.get(&route).ok_or(WalkError::UnknownRoute(route))
    }

    pub fn routes(&self) -> impl Iterator<Item = &RouteDefinition> {
        self.routes.values()
    }

    pub fn contains(&self, route: RouteId) -> bool {
        self.routes.contains_key(&route)
    }

    /// Label of a waypoint. An index past the finish resolves to
    /// [`UNKNOWN_LOCATION`] rather than failing.
    pub fn waypoint_name(&self, route: RouteId, index: u32) -> Result<&str> {
        let definition = self.route(route)?;
        Ok(definition
            .waypoints
            .get(index as usize)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_LOCATION))
    }

    /// Number of waypoint indices, start and finish included.
    pub fn waypoint_count(&self, route: RouteId) -> Result<u32> {
        Ok(self.route(route)?.waypoints.len() as u32)
    }

    pub fn finish_index(&self, route: RouteId) -> Result<u32> {
        Ok(self.route(route)?.finish_index())
    }

    pub fn team_size(&self, route: RouteId) -> Result<TeamSizeBounds> {
        Ok(self.route(route)?.team_size)
    }
}

impl Default for RouteTopology {
    fn default() -> Self {
        Self::builtin()
    }
}

pub fn builtin_routes() -> Vec<RouteDefinition> {
    vec![
        RouteDefinition::new(
            1,
            "Zhaohui full route",
            [
                "起点",
                "上塘映翠",
                "京杭大运河",
                "西湖文化广场",
                "中国海事",
                "忠亭",
                "德胜运河驿站",
                "终点",
            ],
        ),
        RouteDefinition::new(
            2,
            "Pingfeng half route",
            ["起点", "金莲寺", "老焦山", "屏峰山", "屏峰善院", "终点"],
        ),
        RouteDefinition::new(
            3,
            "Pingfeng full route",
            [
                "起点",
                "金莲寺",
                "白龙潭",
                "慈母桥",
                "元帅亭",
                "屏峰山",
                "屏峰善院",
                "终点",
            ],
        ),
        RouteDefinition::new(4, "Moganshan half route", ["起点", "终点"]),
        RouteDefinition::new(
            5,
            "Moganshan full route",
            [
                "起点",
                "石山古寺",
                "下渚湖",
                "观景塔",
                "科普馆",
                "下渚湖",
                "天安云谷",
                "终点",
            ],
        ),
    ]
}
