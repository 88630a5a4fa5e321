use std::{any::type_name_of_val, fmt, sync::Arc};

use rand::{Rng, seq::SliceRandom};
use walk_model::{RouteId, Team};

use crate::{
    error::{Result, WalkError},
    ports::WalkStore,
    topology::RouteTopology,
};

const SMALL_TEAM_LIMIT: usize = 3;
const FOUR_MEMBER_LIMIT: usize = 4;
const FIVE_MEMBER_LIMIT: usize = 5;

/// Random shortlist of teams open to matching on a route.
#[derive(Clone)]
pub struct MatchCandidates {
    store: Arc<dyn WalkStore>,
    topology: Arc<RouteTopology>,
}

impl fmt::Debug for MatchCandidates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchCandidates")
            .field("store", &type_name_of_val(self.store.as_ref()))
            .finish_non_exhaustive()
    }
}

impl MatchCandidates {
    pub fn new(store: Arc<dyn WalkStore>, topology: Arc<RouteTopology>) -> Self {
        Self { store, topology }
    }

    pub async fn random_list(&self, route: RouteId) -> Result<Vec<Team>> {
        let teams = self.open_teams(route).await?;
        let mut rng = rand::rng();
        shortlist(teams, &mut rng, route)
    }

    async fn open_teams(&self, route: RouteId) -> Result<Vec<Team>> {
        self.topology.route(route)?;
        Ok(self
            .store
            .teams_on_route(route)
            .await?
            .into_iter()
            .filter(|team| team.allow_match)
            .collect())
    }
}

/// Up to three small teams, then four-member teams, then five-member teams,
/// keeping the shortlist within five entries overall.
fn shortlist<R: Rng + ?Sized>(
    mut teams: Vec<Team>,
    rng: &mut R,
    route: RouteId,
) -> Result<Vec<Team>> {
    teams.shuffle(rng);

    let small: Vec<Team> = teams
        .iter()
        .filter(|team| team.member_count <= 3)
        .take(SMALL_TEAM_LIMIT)
        .cloned()
        .collect();
    let four: Vec<Team> = teams
        .iter()
        .filter(|team| team.member_count == 4)
        .take(FOUR_MEMBER_LIMIT - small.len())
        .cloned()
        .collect();
    let five: Vec<Team> = teams
        .iter()
        .filter(|team| team.member_count == 5)
        .take(FIVE_MEMBER_LIMIT - small.len() - four.len())
        .cloned()
        .collect();

    let mut picked = small;
    picked.extend(four);
    picked.extend(five);

    if picked.is_empty() {
        return Err(WalkError::NotFound {
            entity: "match candidates on route",
            id: route.to_string(),
        });
    }
    Ok(picked)
}
