#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;
use walk_config::{
    AdminConfig, Config, ConfigMetadata, DatabaseConfig, NotificationConfig, ScannerConfig,
    ServerConfig,
};
use walk_core::{
    RouteTopology, WalkPorts, WalkServices,
    domain::MembershipPolicy,
    infrastructure::{InMemorySubmissionRegistry, InMemoryWalkStore},
    ports::{Clock, ManualClock, WalkStore},
    topology::builtin_routes,
};
use walk_model::{
    Admin, AdminScope, Gender, MembershipRole, Participant, ParticipantKind, RouteId, Team,
    TeamStatus, WalkStatus,
};
use walk_server::{
    AppState, create_app,
    extract::{ADMIN_HEADER, PARTICIPANT_HEADER},
};

pub const SECRET: &str = "night-lantern";

pub struct SeededTeam {
    pub team: Team,
    pub captain: Participant,
    pub members: Vec<Participant>,
}

pub struct TestApp {
    pub router: Router,
    pub store: InMemoryWalkStore,
    pub submissions: InMemorySubmissionRegistry,
    pub clock: Arc<ManualClock>,
    pub head_admin: Admin,
}

pub fn test_config(secret: Option<&str>) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseConfig {
            url: None,
            max_connections: 1,
        },
        redis: None,
        admin: AdminConfig {
            secret: secret.map(str::to_string),
        },
        membership: MembershipPolicy::default(),
        scanner: ScannerConfig::default(),
        notifications: NotificationConfig::default(),
        routes: builtin_routes(),
        metadata: ConfigMetadata::default(),
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config(Some(SECRET))).await
    }

    pub async fn with_config(config: Config) -> Self {
        let store = InMemoryWalkStore::new();
        let submissions = InMemorySubmissionRegistry::new();
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap(),
        ));

        let mut ports = WalkPorts::in_memory(store.clone(), submissions.clone());
        ports.clock = Arc::clone(&clock) as Arc<dyn Clock>;

        let topology = Arc::new(RouteTopology::new(config.routes.clone()).unwrap());
        let services = WalkServices::new(ports, topology, config.membership);
        let router = create_app(AppState::new(services, Arc::new(config)));

        let head_admin = Admin::new("Head of staff", "head", AdminScope::All);
        store.insert_admin(head_admin.clone()).await;

        Self {
            router,
            store,
            submissions,
            clock,
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

    pub async fn team(&self, route: u8, name: &str, size: usize) -> SeededTeam {
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
                Participant::new(format!("{name} member {i}"), ParticipantKind::Staff, Gender::Male)
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

    /// Seed a team last scanned at `waypoint` `minutes_ago`.
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
        seeded.team.last_check_in_time = Some(self.clock.now() - Duration::minutes(minutes_ago));
        self.store.insert_team(seeded.team.clone()).await;
        for participant in std::iter::once(&mut seeded.captain).chain(seeded.members.iter_mut()) {
            participant.walk_status = WalkStatus::InProgress;
            self.store.insert_participant(participant.clone()).await;
        }
        seeded
    }

    pub async fn store_team(&self, team: &Team) -> Team {
        self.store
            .team(team.id)
            .await
            .unwrap()
            .expect("team exists")
    }

    pub async fn store_participant(&self, participant: &Participant) -> Participant {
        self.store
            .participant(participant.id)
            .await
            .unwrap()
            .expect("participant exists")
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        parse_json_response(response).await
    }
}

pub async fn parse_json_response(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn admin_json(method: &str, uri: &str, admin: &Admin, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(ADMIN_HEADER, admin.id.to_string())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn participant_request(
    method: &str,
    uri: &str,
    participant: &Participant,
    body: Option<Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(PARTICIPANT_HEADER, participant.id.to_string());
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
