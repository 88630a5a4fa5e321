//! Postgres store built on sqlx.
//!
//! Team rows are the unit of locking: every write path locks the teams it
//! touches with `SELECT ... FOR UPDATE` in ascending id order before it
//! reads or writes membership.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool, Postgres, Transaction, postgres::PgPoolOptions};
use tracing::info;
use uuid::Uuid;
use walk_model::{
    Admin, AdminId, AdminScope, Campus, ContactInfo, Gender, MembershipRole, Participant,
    ParticipantId, ParticipantKind, RouteId, Team, TeamId, TeamStatus, WalkStatus,
};

use crate::{
    error::{Result, WalkError},
    ports::{WalkStore, WalkTransaction},
};

#[derive(Debug, Clone)]
pub struct PostgresWalkStore {
    pool: PgPool,
}

impl PostgresWalkStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| WalkError::Store(format!("Failed to connect to Postgres: {e}")))?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<()> {
        crate::MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| WalkError::Store(format!("Failed to run migrations: {e}")))?;
        info!("walk schema migrations applied");
        Ok(())
    }

    pub async fn insert_team(&self, team: &Team) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO walk_teams
                (id, name, route_id, member_count, current_waypoint, status,
                 last_check_in_time, captain_id, allow_match)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(team.id.to_uuid())
        .bind(&team.name)
        .bind(i16::from(team.route_id.get()))
        .bind(to_i32(team.member_count, "member_count")?)
        .bind(to_i32(team.current_waypoint, "current_waypoint")?)
        .bind(team.status.code())
        .bind(team.last_check_in_time)
        .bind(team.captain.to_uuid())
        .bind(team.allow_match)
        .execute(self.pool())
        .await
        .map_err(|e| WalkError::Store(format!("Failed to insert team: {e}")))?;
        Ok(())
    }

    pub async fn insert_participant(&self, participant: &Participant) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO walk_participants
                (id, name, team_id, role, kind, walk_status, gender,
                 phone, student_number, campus, college)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(participant.id.to_uuid())
        .bind(&participant.name)
        .bind(participant.team_id.map(|id| id.to_uuid()))
        .bind(participant.role.code())
        .bind(participant.kind.code())
        .bind(participant.walk_status.code())
        .bind(participant.gender.code())
        .bind(&participant.contact.phone)
        .bind(&participant.contact.student_number)
        .bind(participant.contact.campus.map(Campus::code))
        .bind(&participant.contact.college)
        .execute(self.pool())
        .await
        .map_err(|e| WalkError::Store(format!("Failed to insert participant: {e}")))?;
        Ok(())
    }

    pub async fn insert_admin(&self, admin: &Admin) -> Result<()> {
        let route = match admin.scope {
            AdminScope::All => None,
            AdminScope::Route(route) => Some(i16::from(route.get())),
        };
        sqlx::query(
            r#"
            INSERT INTO walk_admins (id, name, account, route_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(admin.id.to_uuid())
        .bind(&admin.name)
        .bind(&admin.account)
        .bind(route)
        .execute(self.pool())
        .await
        .map_err(|e| WalkError::Store(format!("Failed to insert admin: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl WalkStore for PostgresWalkStore {
    async fn begin(&self) -> Result<Box<dyn WalkTransaction>> {
        let tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| WalkError::Store(format!("Failed to start transaction: {e}")))?;
        Ok(Box::new(PgWalkTransaction { tx }))
    }

    async fn participant(&self, id: ParticipantId) -> Result<Option<Participant>> {
        fetch_participant(self.pool(), id).await
    }

    async fn participants_in_team(&self, team: TeamId) -> Result<Vec<Participant>> {
        fetch_members(self.pool(), team).await
    }

    async fn team(&self, id: TeamId) -> Result<Option<Team>> {
        let row = sqlx::query_as::<_, TeamRow>(
            r#"
            SELECT id, name, route_id, member_count, current_waypoint, status,
                   last_check_in_time, captain_id, allow_match
            FROM walk_teams
            WHERE id = $1
            "#,
        )
        .bind(id.to_uuid())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| WalkError::Store(format!("Failed to load team: {e}")))?;

        row.map(Team::try_from).transpose()
    }

    async fn teams_on_route(&self, route: RouteId) -> Result<Vec<Team>> {
        let rows = sqlx::query_as::<_, TeamRow>(
            r#"
            SELECT id, name, route_id, member_count, current_waypoint, status,
                   last_check_in_time, captain_id, allow_match
            FROM walk_teams
            WHERE route_id = $1
            ORDER BY id
            "#,
        )
        .bind(i16::from(route.get()))
        .fetch_all(self.pool())
        .await
        .map_err(|e| WalkError::Store(format!("Failed to list teams on route {route}: {e}")))?;

        rows.into_iter().map(Team::try_from).collect()
    }

    async fn admin(&self, id: AdminId) -> Result<Option<Admin>> {
        let row = sqlx::query_as::<_, AdminRow>(
            "SELECT id, name, account, route_id FROM walk_admins WHERE id = $1",
        )
        .bind(id.to_uuid())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| WalkError::Store(format!("Failed to load admin: {e}")))?;

        row.map(Admin::try_from).transpose()
    }
}

struct PgWalkTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl WalkTransaction for PgWalkTransaction {
    async fn participant(&mut self, id: ParticipantId) -> Result<Option<Participant>> {
        fetch_participant(&mut *self.tx, id).await
    }

    async fn participants_in_team(&mut self, team: TeamId) -> Result<Vec<Participant>> {
        fetch_members(&mut *self.tx, team).await
    }

    async fn lock_team(&mut self, id: TeamId) -> Result<Option<Team>> {
        let row = sqlx::query_as::<_, TeamRow>(
            r#"
            SELECT id, name, route_id, member_count, current_waypoint, status,
                   last_check_in_time, captain_id, allow_match
            FROM walk_teams
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.to_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| WalkError::Store(format!("Failed to lock team: {e}")))?;

        row.map(Team::try_from).transpose()
    }

    async fn update_participant(&mut self, participant: &Participant) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE walk_participants
            SET team_id = $2, role = $3, walk_status = $4
            WHERE id = $1
            "#,
        )
        .bind(participant.id.to_uuid())
        .bind(participant.team_id.map(|id| id.to_uuid()))
        .bind(participant.role.code())
        .bind(participant.walk_status.code())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| WalkError::Store(format!("Failed to update participant: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(WalkError::participant_not_found(participant.id));
        }
        Ok(())
    }

    async fn update_team(&mut self, team: &Team) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE walk_teams
            SET member_count = $2,
                current_waypoint = $3,
                status = $4,
                last_check_in_time = $5,
                allow_match = $6
            WHERE id = $1
            "#,
        )
        .bind(team.id.to_uuid())
        .bind(to_i32(team.member_count, "member_count")?)
        .bind(to_i32(team.current_waypoint, "current_waypoint")?)
        .bind(team.status.code())
        .bind(team.last_check_in_time)
        .bind(team.allow_match)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| WalkError::Store(format!("Failed to update team: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(WalkError::team_not_found(team.id));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let PgWalkTransaction { tx } = *self;
        tx.commit()
            .await
            .map_err(|e| WalkError::Store(format!("Failed to commit transaction: {e}")))
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        let PgWalkTransaction { tx } = *self;
        tx.rollback()
            .await
            .map_err(|e| WalkError::Store(format!("Failed to rollback transaction: {e}")))
    }
}

async fn fetch_participant<'e, E>(executor: E, id: ParticipantId) -> Result<Option<Participant>>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, ParticipantRow>(
        r#"
        SELECT id, name, team_id, role, kind, walk_status, gender,
               phone, student_number, campus, college
        FROM walk_participants
        WHERE id = $1
        "#,
    )
    .bind(id.to_uuid())
    .fetch_optional(executor)
    .await
    .map_err(|e| WalkError::Store(format!("Failed to load participant: {e}")))?;

    row.map(Participant::try_from).transpose()
}

async fn fetch_members<'e, E>(executor: E, team: TeamId) -> Result<Vec<Participant>>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, ParticipantRow>(
        r#"
        SELECT id, name, team_id, role, kind, walk_status, gender,
               phone, student_number, campus, college
        FROM walk_participants
        WHERE team_id = $1
        ORDER BY id
        "#,
    )
    .bind(team.to_uuid())
    .fetch_all(executor)
    .await
    .map_err(|e| WalkError::Store(format!("Failed to load team members: {e}")))?;

    rows.into_iter().map(Participant::try_from).collect()
}

fn to_i32(value: u32, column: &str) -> Result<i32> {
    i32::try_from(value).map_err(|_| WalkError::Store(format!("{column} out of range: {value}")))
}

fn to_u32(value: i32, column: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| WalkError::Store(format!("Negative {column}: {value}")))
}

fn to_route(value: i16) -> Result<RouteId> {
    u8::try_from(value)
        .map(RouteId)
        .map_err(|_| WalkError::Store(format!("Invalid route id: {value}")))
}

#[derive(Debug, sqlx::FromRow)]
struct TeamRow {
    id: Uuid,
    name: String,
    route_id: i16,
    member_count: i32,
    current_waypoint: i32,
    status: i16,
    last_check_in_time: Option<DateTime<Utc>>,
    captain_id: Uuid,
    allow_match: bool,
}

impl TryFrom<TeamRow> for Team {
    type Error = WalkError;

    fn try_from(row: TeamRow) -> Result<Self> {
        Ok(Team {
            id: TeamId(row.id),
            name: row.name,
            route_id: to_route(row.route_id)?,
            member_count: to_u32(row.member_count, "member_count")?,
            current_waypoint: to_u32(row.current_waypoint, "current_waypoint")?,
            status: TeamStatus::from_code(row.status)?,
            last_check_in_time: row.last_check_in_time,
            captain: ParticipantId(row.captain_id),
            allow_match: row.allow_match,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ParticipantRow {
    id: Uuid,
    name: String,
    team_id: Option<Uuid>,
    role: i16,
    kind: i16,
    walk_status: i16,
    gender: i16,
    phone: String,
    student_number: Option<String>,
    campus: Option<i16>,
    college: Option<String>,
}

impl TryFrom<ParticipantRow> for Participant {
    type Error = WalkError;

    fn try_from(row: ParticipantRow) -> Result<Self> {
        Ok(Participant {
            id: ParticipantId(row.id),
            name: row.name,
            team_id: row.team_id.map(TeamId),
            role: MembershipRole::from_code(row.role)?,
            kind: ParticipantKind::from_code(row.kind)?,
            walk_status: WalkStatus::from_code(row.walk_status)?,
            gender: Gender::from_code(row.gender)?,
            contact: ContactInfo {
                phone: row.phone,
                student_number: row.student_number,
                campus: row.campus.map(Campus::from_code).transpose()?,
                college: row.college,
            },
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AdminRow {
    id: Uuid,
    name: String,
    account: String,
    route_id: Option<i16>,
}

impl TryFrom<AdminRow> for Admin {
    type Error = WalkError;

    fn try_from(row: AdminRow) -> Result<Self> {
        let scope = match row.route_id {
            None => AdminScope::All,
            Some(route) => AdminScope::Route(to_route(route)?),
        };
        Ok(Admin {
            id: AdminId(row.id),
            name: row.name,
            account: row.account,
            scope,
        })
    }
}
