use walk_model::{Admin, Team};

/// Decides whether an admin may act on a team.
#[cfg_attr(test, mockall::automock)]
pub trait RouteAuthority: Send + Sync {
    fn check_route(&self, actor: &Admin, team: &Team) -> bool;
}

/// Grants authority when the admin's scope covers the team's route.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScopedRouteAuthority;

impl RouteAuthority for ScopedRouteAuthority {
    fn check_route(&self, actor: &Admin, team: &Team) -> bool {
        actor.scope.covers(team.route_id)
    }
}
