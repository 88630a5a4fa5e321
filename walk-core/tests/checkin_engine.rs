#[path = "support/mod.rs"]
mod support;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use support::Fixture;
use walk_core::{
    RouteTopology, WalkError,
    domain::{ArrivalKind, CheckInEngine, StatusChange},
    infrastructure::InMemoryWalkStore,
    ports::{ManualClock, ScopedRouteAuthority, WalkStore, WalkTransaction},
};
use walk_model::{
    Admin, AdminId, Gender, Participant, ParticipantId, ParticipantKind, RouteId, Team, TeamId,
    TeamStatus, WalkStatus,
};

fn change(participant: &Participant, new_status: WalkStatus) -> StatusChange {
    StatusChange {
        participant_id: participant.id,
        new_status,
    }
}

#[tokio::test]
async fn check_in_then_abandon_everyone_finishes_team() {
    let fx = Fixture::new().await;
    let seeded = fx.walking_team(1, "Herons", 2, 2, 10).await;
    let captain = &seeded.captain;
    let member = &seeded.members[0];

    let outcome = fx
        .services
        .check_in
        .apply_status_change(&fx.head_admin, &[change(member, WalkStatus::CheckedIn)])
        .await
        .expect("check-in accepted");
    assert_eq!(outcome.participants.len(), 1);
    assert_eq!(outcome.teams[0].status, TeamStatus::Active);
    assert_eq!(fx.participant(member).await.walk_status, WalkStatus::CheckedIn);
    assert_eq!(fx.reload(&seeded.team).await.status, TeamStatus::Active);

    fx.services
        .check_in
        .apply_status_change(
            &fx.head_admin,
            &[
                change(member, WalkStatus::Abandoned),
                change(captain, WalkStatus::Abandoned),
            ],
        )
        .await
        .expect("abandon accepted");

    let team = fx.reload(&seeded.team).await;
    assert_eq!(team.status, TeamStatus::Finished);
    assert_eq!(team.current_waypoint, 2);
}

#[tokio::test]
async fn one_invalid_request_leaves_the_whole_batch_untouched() {
    let fx = Fixture::new().await;
    let first = fx.walking_team(1, "Cranes", 6, 3, 5).await;
    let second = fx.walking_team(1, "Egrets", 5, 1, 5).await;

    let mut walkers = first.everyone();
    walkers.extend(second.everyone());
    assert_eq!(walkers.len(), 11);

    let finished = walkers[7].clone();
    fx.services
        .participants
        .update_status(finished.id, WalkStatus::Finished)
        .await
        .unwrap();

    let batch: Vec<StatusChange> = walkers
        .iter()
        .map(|walker| change(walker, WalkStatus::CheckedIn))
        .collect();

    let err = fx
        .services
        .check_in
        .apply_status_change(&fx.head_admin, &batch)
        .await
        .unwrap_err();
    assert!(matches!(err, WalkError::AlreadyFinished { entity: "participant", .. }));

    for walker in &walkers {
        let stored = fx.participant(walker).await;
        let expected = if walker.id == finished.id {
            WalkStatus::Finished
        } else {
            WalkStatus::InProgress
        };
        assert_eq!(stored.walk_status, expected, "{} changed", walker.name);
    }
    assert_eq!(fx.reload(&first.team).await.status, TeamStatus::Active);
    assert_eq!(fx.reload(&second.team).await.status, TeamStatus::Active);
}

#[tokio::test]
async fn admin_of_another_route_is_unauthorized() {
    let fx = Fixture::new().await;
    let seeded = fx.walking_team(1, "Kites", 4, 1, 5).await;
    let outsider = fx.route_admin(2).await;

    let err = fx
        .services
        .check_in
        .apply_status_change(&outsider, &[change(&seeded.members[0], WalkStatus::Abandoned)])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WalkError::Unauthorized { route: RouteId(1), .. }
    ));
    assert_eq!(
        fx.participant(&seeded.members[0]).await.walk_status,
        WalkStatus::InProgress
    );
}

#[tokio::test]
async fn authority_is_checked_before_finished_status() {
    let fx = Fixture::new().await;
    let seeded = fx.walking_team(1, "Swifts", 4, 7, 5).await;
    fx.services
        .participants
        .update_status(seeded.members[0].id, WalkStatus::Finished)
        .await
        .unwrap();
    let outsider = fx.route_admin(3).await;

    let err = fx
        .services
        .check_in
        .apply_status_change(&outsider, &[change(&seeded.members[0], WalkStatus::CheckedIn)])
        .await
        .unwrap_err();
    assert!(matches!(err, WalkError::Unauthorized { .. }));
}

#[tokio::test]
async fn statuses_outside_the_admin_set_are_rejected() {
    let fx = Fixture::new().await;
    let seeded = fx.walking_team(1, "Robins", 4, 1, 5).await;

    for status in [WalkStatus::Finished, WalkStatus::NotStarted, WalkStatus::InProgress] {
        let err = fx
            .services
            .check_in
            .apply_status_change(&fx.head_admin, &[change(&seeded.captain, status)])
            .await
            .unwrap_err();
        assert!(
            matches!(err, WalkError::InvalidTransition { to, .. } if to == status),
            "unexpected error for {status}: {err}"
        );
    }
}

#[tokio::test]
async fn missing_walker_is_reported_before_validation() {
    let fx = Fixture::new().await;
    let seeded = fx.walking_team(1, "Finches", 4, 1, 5).await;

    let err = fx
        .services
        .check_in
        .apply_status_change(
            &fx.head_admin,
            &[
                change(&seeded.members[0], WalkStatus::Finished),
                StatusChange {
                    participant_id: ParticipantId::new(),
                    new_status: WalkStatus::CheckedIn,
                },
            ],
        )
        .await
        .unwrap_err();

    // Lookups run before validation, so the unknown walker wins.
    assert!(matches!(err, WalkError::NotFound { entity: "participant", .. }));
}

#[tokio::test]
async fn walker_without_team_is_reported_as_missing_team() {
    let fx = Fixture::new().await;
    let loner = Participant::new("Loner", ParticipantKind::Alumnus, Gender::Male);
    fx.store.insert_participant(loner.clone()).await;

    let err = fx
        .services
        .check_in
        .apply_status_change(&fx.head_admin, &[change(&loner, WalkStatus::CheckedIn)])
        .await
        .unwrap_err();
    assert!(matches!(err, WalkError::NotFound { entity: "team", .. }));
}

#[tokio::test]
async fn reinstating_an_abandoned_walker_reopens_the_team() {
    let fx = Fixture::new().await;
    let seeded = fx.walking_team(2, "Wrens", 2, 3, 5).await;
    let everyone: Vec<StatusChange> = seeded
        .everyone()
        .iter()
        .map(|walker| change(walker, WalkStatus::Abandoned))
        .collect();

    fx.services
        .check_in
        .apply_status_change(&fx.head_admin, &everyone)
        .await
        .unwrap();
    assert_eq!(fx.reload(&seeded.team).await.status, TeamStatus::Finished);

    fx.services
        .check_in
        .apply_status_change(&fx.head_admin, &[change(&seeded.captain, WalkStatus::CheckedIn)])
        .await
        .unwrap();
    assert_eq!(fx.reload(&seeded.team).await.status, TeamStatus::Active);
}

#[tokio::test]
async fn empty_batch_is_a_no_op() {
    let fx = Fixture::new().await;
    let outcome = fx
        .services
        .check_in
        .apply_status_change(&fx.head_admin, &[])
        .await
        .unwrap();
    assert!(outcome.participants.is_empty());
    assert!(outcome.teams.is_empty());
}

#[tokio::test]
async fn start_scan_sets_the_team_off() {
    let fx = Fixture::new().await;
    let seeded = fx.team(1, "Larks", 4).await;

    let outcome = fx
        .services
        .check_in
        .record_arrival(&fx.head_admin, seeded.team.id, 0)
        .await
        .unwrap();

    assert_eq!(outcome.kind, ArrivalKind::Started);
    assert_eq!(outcome.updated.len(), 4);
    assert_eq!(outcome.team.status, TeamStatus::Active);
    assert_eq!(outcome.team.last_check_in_time, Some(fx.clock_now()));
    for walker in seeded.everyone() {
        assert_eq!(fx.participant(&walker).await.walk_status, WalkStatus::InProgress);
    }
}

#[tokio::test]
async fn arrivals_move_forward_and_ignore_duplicates() {
    let fx = Fixture::new().await;
    let seeded = fx.team(1, "Plovers", 4).await;
    let engine = &fx.services.check_in;

    engine.record_arrival(&fx.head_admin, seeded.team.id, 0).await.unwrap();
    fx.clock.advance(Duration::minutes(20));
    let advanced = engine
        .record_arrival(&fx.head_admin, seeded.team.id, 2)
        .await
        .unwrap();
    assert_eq!(advanced.kind, ArrivalKind::Advanced);
    assert_eq!(advanced.team.current_waypoint, 2);

    fx.clock.advance(Duration::minutes(5));
    let duplicate = engine
        .record_arrival(&fx.head_admin, seeded.team.id, 2)
        .await
        .unwrap();
    assert_eq!(duplicate.kind, ArrivalKind::Duplicate);
    assert_eq!(
        fx.reload(&seeded.team).await.last_check_in_time,
        Some(fx.clock_now() - Duration::minutes(5))
    );

    let err = engine
        .record_arrival(&fx.head_admin, seeded.team.id, 1)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WalkError::WaypointRegression { current: 2, requested: 1, .. }
    ));

    let err = engine
        .record_arrival(&fx.head_admin, seeded.team.id, 8)
        .await
        .unwrap_err();
    assert!(matches!(err, WalkError::WaypointOutOfRange { finish: 7, .. }));
}

#[tokio::test]
async fn reaching_the_finish_completes_everyone_still_walking() {
    let fx = Fixture::new().await;
    let seeded = fx.walking_team(2, "Gulls", 4, 4, 10).await;
    let quitter = &seeded.members[1];
    fx.services
        .check_in
        .apply_status_change(&fx.head_admin, &[change(quitter, WalkStatus::Abandoned)])
        .await
        .unwrap();

    let outcome = fx
        .services
        .check_in
        .record_arrival(&fx.head_admin, seeded.team.id, 5)
        .await
        .unwrap();

    assert_eq!(outcome.kind, ArrivalKind::Finished);
    assert_eq!(outcome.team.status, TeamStatus::Finished);
    assert_eq!(outcome.updated.len(), 3);
    assert_eq!(fx.participant(quitter).await.walk_status, WalkStatus::Abandoned);
    assert_eq!(
        fx.participant(&seeded.captain).await.walk_status,
        WalkStatus::Finished
    );

    let err = fx
        .services
        .check_in
        .record_arrival(&fx.head_admin, seeded.team.id, 5)
        .await
        .unwrap_err();
    assert!(matches!(err, WalkError::AlreadyFinished { entity: "team", .. }));
}

#[tokio::test]
async fn route_admin_cannot_scan_foreign_teams() {
    let fx = Fixture::new().await;
    let seeded = fx.team(3, "Terns", 4).await;
    let admin = fx.route_admin(1).await;

    let err = fx
        .services
        .check_in
        .record_arrival(&admin, seeded.team.id, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, WalkError::Unauthorized { route: RouteId(3), .. }));
    assert_eq!(fx.reload(&seeded.team).await.status, TeamStatus::Formed);
}

/// Delegates to the memory store but fails every team update.
struct FailingTeamWrites(InMemoryWalkStore);

struct FailingTransaction(Box<dyn WalkTransaction>);

#[async_trait]
impl WalkStore for FailingTeamWrites {
    async fn begin(&self) -> walk_core::Result<Box<dyn WalkTransaction>> {
        Ok(Box::new(FailingTransaction(self.0.begin().await?)))
    }

    async fn participant(&self, id: ParticipantId) -> walk_core::Result<Option<Participant>> {
        self.0.participant(id).await
    }

    async fn participants_in_team(&self, team: TeamId) -> walk_core::Result<Vec<Participant>> {
        self.0.participants_in_team(team).await
    }

    async fn team(&self, id: TeamId) -> walk_core::Result<Option<Team>> {
        self.0.team(id).await
    }

    async fn teams_on_route(&self, route: RouteId) -> walk_core::Result<Vec<Team>> {
        self.0.teams_on_route(route).await
    }

    async fn admin(&self, id: AdminId) -> walk_core::Result<Option<Admin>> {
        self.0.admin(id).await
    }
}

#[async_trait]
impl WalkTransaction for FailingTransaction {
    async fn participant(&mut self, id: ParticipantId) -> walk_core::Result<Option<Participant>> {
        self.0.participant(id).await
    }

    async fn participants_in_team(&mut self, team: TeamId) -> walk_core::Result<Vec<Participant>> {
        self.0.participants_in_team(team).await
    }

    async fn lock_team(&mut self, id: TeamId) -> walk_core::Result<Option<Team>> {
        self.0.lock_team(id).await
    }

    async fn update_participant(&mut self, participant: &Participant) -> walk_core::Result<()> {
        self.0.update_participant(participant).await
    }

    async fn update_team(&mut self, _team: &Team) -> walk_core::Result<()> {
        Err(WalkError::Store("disk full".into()))
    }

    async fn commit(self: Box<Self>) -> walk_core::Result<()> {
        let FailingTransaction(inner) = *self;
        inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> walk_core::Result<()> {
        let FailingTransaction(inner) = *self;
        inner.rollback().await
    }
}

#[tokio::test]
async fn store_failure_rolls_back_member_writes() {
    let fx = Fixture::new().await;
    let seeded = fx.walking_team(1, "Owls", 2, 3, 5).await;
    let engine = CheckInEngine::new(
        Arc::new(FailingTeamWrites(fx.store.clone())),
        Arc::new(RouteTopology::builtin()),
        Arc::new(ScopedRouteAuthority),
        Arc::new(ManualClock::new(support::start_time())),
    );

    let batch: Vec<StatusChange> = seeded
        .everyone()
        .iter()
        .map(|walker| change(walker, WalkStatus::Abandoned))
        .collect();
    let err = engine
        .apply_status_change(&fx.head_admin, &batch)
        .await
        .unwrap_err();

    assert!(matches!(err, WalkError::Store(ref message) if message == "disk full"));
    for walker in seeded.everyone() {
        assert_eq!(fx.participant(&walker).await.walk_status, WalkStatus::InProgress);
    }
    assert_eq!(fx.reload(&seeded.team).await.status, TeamStatus::Active);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_abandons_on_one_team_both_land() {
    let fx = Fixture::new().await;

    for round in 0..16 {
        let seeded = fx.walking_team(1, &format!("Pair {round}"), 2, 2, 5).await;

        let tasks: Vec<_> = seeded
            .everyone()
            .into_iter()
            .map(|walker| {
                let engine = fx.services.check_in.clone();
                let admin = fx.head_admin.clone();
                tokio::spawn(async move {
                    engine
                        .apply_status_change(&admin, &[change(&walker, WalkStatus::Abandoned)])
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.expect("task joined").expect("abandon accepted");
        }

        let team = fx.reload(&seeded.team).await;
        assert_eq!(team.status, TeamStatus::Finished, "round {round}");
        for walker in seeded.everyone() {
            assert_eq!(fx.participant(&walker).await.walk_status, WalkStatus::Abandoned);
        }
    }
}
