use std::{any::type_name_of_val, collections::BTreeMap, fmt, sync::Arc};

use chrono::Duration;
use tracing::{debug, warn};
use walk_model::{RouteId, Team, TeamStatus};

use crate::{
    error::Result,
    ports::{Clock, WalkStore},
    topology::RouteTopology,
};

/// Read-only detection of stalled and no-show teams.
#[derive(Clone)]
pub struct TimeoutScanner {
    store: Arc<dyn WalkStore>,
    topology: Arc<RouteTopology>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TimeoutScanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeoutScanner")
            .field("store", &type_name_of_val(self.store.as_ref()))
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl TimeoutScanner {
    pub fn new(
        store: Arc<dyn WalkStore>,
        topology: Arc<RouteTopology>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            topology,
            clock,
        }
    }

    pub fn topology(&self) -> &RouteTopology {
        &self.topology
    }

    pub(crate) fn store(&self) -> &Arc<dyn WalkStore> {
        &self.store
    }

    pub(crate) fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Teams under way whose last check-in is older than the threshold,
    /// bucketed by their current waypoint. Teams inside a bucket are ordered
    /// by id. A waypoint past the route's end is logged but still reported.
    pub async fn timeout_teams(
        &self,
        threshold_minutes: u32,
        route: RouteId,
    ) -> Result<BTreeMap<u32, Vec<Team>>> {
        let waypoints = self.topology.waypoint_count(route)?;
        let cutoff = self.clock.now() - Duration::minutes(i64::from(threshold_minutes));

        let mut buckets: BTreeMap<u32, Vec<Team>> = BTreeMap::new();
        for team in self.store.teams_on_route(route).await? {
            if matches!(team.status, TeamStatus::Finished | TeamStatus::Formed) {
                continue;
            }
            let Some(last) = team.last_check_in_time else {
                continue;
            };
            if team.current_waypoint >= waypoints {
                warn!(
                    team_id = %team.id,
                    route = %route,
                    current_waypoint = team.current_waypoint,
                    waypoints,
                    "team is past the end of its route"
                );
            }
            if last < cutoff {
                buckets.entry(team.current_waypoint).or_default().push(team);
            }
        }

        for teams in buckets.values_mut() {
            teams.sort_by_key(|team| team.id);
        }

        debug!(
            route = %route,
            threshold_minutes,
            waypoints = buckets.len(),
            "timeout scan complete"
        );
        Ok(buckets)
    }

    /// Teams that never set off: still formed, at the start, no check-in.
    pub async fn no_show_teams(&self, route: RouteId) -> Result<Vec<Team>> {
        self.topology.route(route)?;

        let mut teams: Vec<Team> = self
            .store
            .teams_on_route(route)
            .await?
            .into_iter()
            .filter(Team::is_no_show)
            .collect();
        teams.sort_by_key(|team| team.id);
        Ok(teams)
    }
}
