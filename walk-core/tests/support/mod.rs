#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::{Mutex, mpsc};
use walk_core::{
    RouteTopology, WalkPorts, WalkServices,
    domain::MembershipPolicy,
    infrastructure::{InMemorySubmissionRegistry, InMemoryWalkStore},
    ports::{ManualClock, Notification, NotifyError, Notifier, ScopedRouteAuthority},
};
use walk_model::{
    Admin, AdminScope, Gender, MembershipRole, Participant, ParticipantKind, RouteId, Team,
    TeamStatus, WalkStatus,
};

/// Captures every notification and forwards it to the test.
#[derive(Debug)]
pub struct RecordingNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let _ = self.tx.send(notification.clone());
        Ok(())
    }
}

pub struct SeededTeam {
    pub team: Team,
    pub captain: Participant,
    pub members: Vec<Participant>,
}

impl SeededTeam {
    /// Captain first, then the other members in creation order.
    pub fn everyone(&self) -> Vec<Participant> {
        std::iter::once(self.captain.clone())
            .chain(self.members.iter().cloned())
            .collect()
    }
}

pub struct Fixture {
    pub store: InMemoryWalkStore,
    pub submissions: InMemorySubmissionRegistry,
    pub clock: Arc<ManualClock>,
    pub services: WalkServices,
    pub notifications: Mutex<mpsc::UnboundedReceiver<Notification>>,
    pub head_admin: Admin,
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 7, 30, 0).unwrap()
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_policy(MembershipPolicy::default()).await
    }

    pub async fn with_policy(policy: MembershipPolicy) -> Self {
        let store = InMemoryWalkStore::new();
        let submissions = InMemorySubmissionRegistry::new();
        let clock = Arc::new(ManualClock::new(start_time()));
        let (tx, rx) = mpsc::unbounded_channel();

        let ports = WalkPorts {
            store: Arc::new(store.clone()),
            submissions: Arc::new(submissions.clone()),
            notifier: Arc::new(RecordingNotifier { tx }),
            authority: Arc::new(ScopedRouteAuthority),
            clock: clock.clone(),
        };
        let services = WalkServices::new(ports, Arc::new(RouteTopology::builtin()), policy);

        let head_admin = Admin::new("Head of staff", "head", AdminScope::All);
        store.insert_admin(head_admin.clone()).await;

        Self {
            store,
            submissions,
            clock,
            services,
            notifications: Mutex::new(rx),
            head_admin,
        }
    }

    pub async fn route_admin(&self, route: u8) -> Admin {
        let admin = Admin::new(
            format!("Station {route}"),
            format!("station-{route}"),
            AdminScope::Route(RouteId(route)),
        );
        self.store.insert_admin(admin.clone()).await;
        admin
    }

    /// Seed a team of `size` walkers (captain included) on `route`.
    pub async fn team(&self, route: u8, name: &str, size: usize) -> SeededTeam {
        assert!(size >= 1);
        let captain = Participant::new(
            format!("{name} captain"),
            ParticipantKind::Student,
            Gender::Female,
        );
        let mut team = Team::new(name, RouteId(route), captain.id);
        team.member_count = size as u32;
        let captain = captain.join(team.id, MembershipRole::Captain);

        let members: Vec<Participant> = (1..size)
            .map(|i| {
                let kind = if i % 2 == 0 {
                    ParticipantKind::Staff
                } else {
                    ParticipantKind::Student
                };
                Participant::new(format!("{name} member {i}"), kind, Gender::Male)
                    .join(team.id, MembershipRole::Member)
            })
            .collect();

        self.store.insert_team(team.clone()).await;
        self.store.insert_participant(captain.clone()).await;
        for member in &members {
            self.store.insert_participant(member.clone()).await;
        }

        SeededTeam {
            team,
            captain,
            members,
        }
    }

    /// Seed a team already walking, last seen at `waypoint` `minutes_ago`.
    pub async fn walking_team(
        &self,
        route: u8,
        name: &str,
        size: usize,
        waypoint: u32,
        minutes_ago: i64,
    ) -> SeededTeam {
        let mut seeded = self.team(route, name, size).await;
        seeded.team.status = TeamStatus::Active;
        seeded.team.current_waypoint = waypoint;
        seeded.team.last_check_in_time = Some(self.clock_now() - Duration::minutes(minutes_ago));
        self.store.insert_team(seeded.team.clone()).await;

        for participant in std::iter::once(&mut seeded.captain).chain(seeded.members.iter_mut()) {
            participant.walk_status = WalkStatus::InProgress;
            self.store.insert_participant(participant.clone()).await;
        }
        seeded
    }

    pub fn clock_now(&self) -> DateTime<Utc> {
        use walk_core::ports::Clock;
        self.clock.now()
    }

    pub async fn participant(&self, participant: &Participant) -> Participant {
        self.services
            .participants
            .get(participant.id)
            .await
            .expect("participant exists")
    }

    pub async fn reload(&self, team: &Team) -> Team {
        self.services.teams.get(team.id).await.expect("team exists")
    }

    pub async fn next_notification(&self) -> Notification {
        let mut rx = self.notifications.lock().await;
        tokio::time::timeout(std::time::Duration::from_secs(2), rx.recv())
            .await
            .expect("notification within timeout")
            .expect("notifier channel open")
    }
}
