//! Workshop repository
//!
//! The persistence contract for workshop records plus the Postgres
//! implementation. The two participant operations are the concurrency
//! hot spot: both are single guarded statements so that the capacity,
//! uniqueness, and status checks hold against the same row version the
//! write lands on.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::ids::{CategoryId, UserId, WorkshopId};
use crate::models::workshop::{
    Attachment, UpdateWorkshopRequest, Workshop, WorkshopLevel, WorkshopStatus,
};
use crate::utils::errors::{Result, SkillhubError};

/// Persistence contract for workshops.
///
/// Implementations must make `register_participant` and
/// `remove_participant` atomic: the membership/capacity/status check and
/// the list write happen against the same snapshot, so two concurrent
/// registrations can never both take the last seat.
#[async_trait]
pub trait WorkshopRepository: Send + Sync {
    async fn find_by_id(&self, id: WorkshopId) -> Result<Option<Workshop>>;

    /// Persist a new workshop and return the stored representation.
    async fn create(&self, workshop: &Workshop) -> Result<Workshop>;

    /// Apply a partial update; absent fields keep their stored values.
    /// `attachments` replaces the whole attachment list when given.
    async fn update(
        &self,
        id: WorkshopId,
        request: &UpdateWorkshopRequest,
        attachments: Option<&[Attachment]>,
    ) -> Result<Workshop>;

    async fn delete(&self, id: WorkshopId) -> Result<()>;

    /// Atomically append `user_id` to the participant list.
    async fn register_participant(&self, id: WorkshopId, user_id: UserId) -> Result<Workshop>;

    /// Atomically remove `user_id` from the participant list.
    async fn remove_participant(&self, id: WorkshopId, user_id: UserId) -> Result<Workshop>;

    /// Move the workshop to a new lifecycle status if the transition is
    /// allowed by the state machine.
    async fn set_status(&self, id: WorkshopId, status: WorkshopStatus) -> Result<Workshop>;

    /// Upcoming workshops with a start date from now on, soonest first.
    async fn list_upcoming(&self) -> Result<Vec<Workshop>>;

    /// Workshops hosted by an instructor, soonest first.
    async fn list_by_instructor(&self, instructor: UserId) -> Result<Vec<Workshop>>;
}

/// Attempts for a guarded participant update whose guard keeps losing to
/// concurrent row mutations before the operation gives up.
const MAX_GUARD_RETRIES: usize = 3;

const WORKSHOP_COLUMNS: &str = "id, title, description, date, time, duration, max_participants, \
     participants, price, level, status, instructor, attachments, category_id, location, \
     requirements, created_at, updated_at";

/// Row shape for sqlx; attachments travel as JSONB.
#[derive(sqlx::FromRow)]
struct WorkshopRow {
    id: WorkshopId,
    title: String,
    description: String,
    date: chrono::DateTime<Utc>,
    time: String,
    duration: String,
    max_participants: i32,
    participants: Vec<UserId>,
    price: f64,
    level: WorkshopLevel,
    status: WorkshopStatus,
    instructor: UserId,
    attachments: Json<Vec<Attachment>>,
    category_id: Option<CategoryId>,
    location: Option<String>,
    requirements: Vec<String>,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

impl From<WorkshopRow> for Workshop {
    fn from(row: WorkshopRow) -> Self {
        Workshop {
            id: row.id,
            title: row.title,
            description: row.description,
            date: row.date,
            time: row.time,
            duration: row.duration,
            max_participants: row.max_participants,
            participants: row.participants,
            price: row.price,
            level: row.level,
            status: row.status,
            instructor: row.instructor,
            attachments: row.attachments.0,
            category_id: row.category_id,
            location: row.location,
            requirements: row.requirements,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Postgres-backed workshop repository.
#[derive(Clone)]
pub struct PgWorkshopRepository {
    pool: PgPool,
}

impl PgWorkshopRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: WorkshopId) -> Result<Workshop> {
        self.find_by_id(id)
            .await?
            .ok_or(SkillhubError::WorkshopNotFound { workshop_id: id })
    }
}

#[async_trait]
impl WorkshopRepository for PgWorkshopRepository {
    async fn find_by_id(&self, id: WorkshopId) -> Result<Option<Workshop>> {
        let row = sqlx::query_as::<_, WorkshopRow>(&format!(
            "SELECT {} FROM workshops WHERE id = $1",
            WORKSHOP_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Workshop::from))
    }

    async fn create(&self, workshop: &Workshop) -> Result<Workshop> {
        let row = sqlx::query_as::<_, WorkshopRow>(&format!(
            r#"
            INSERT INTO workshops (id, title, description, date, time, duration,
                max_participants, participants, price, level, status, instructor,
                attachments, category_id, location, requirements, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING {}
            "#,
            WORKSHOP_COLUMNS
        ))
        .bind(workshop.id)
        .bind(&workshop.title)
        .bind(&workshop.description)
        .bind(workshop.date)
        .bind(&workshop.time)
        .bind(&workshop.duration)
        .bind(workshop.max_participants)
        .bind(&workshop.participants)
        .bind(workshop.price)
        .bind(workshop.level)
        .bind(workshop.status)
        .bind(workshop.instructor)
        .bind(Json(&workshop.attachments))
        .bind(workshop.category_id)
        .bind(&workshop.location)
        .bind(&workshop.requirements)
        .bind(workshop.created_at)
        .bind(workshop.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update(
        &self,
        id: WorkshopId,
        request: &UpdateWorkshopRequest,
        attachments: Option<&[Attachment]>,
    ) -> Result<Workshop> {
        let row = sqlx::query_as::<_, WorkshopRow>(&format!(
            r#"
            UPDATE workshops
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                date = COALESCE($4, date),
                time = COALESCE($5, time),
                duration = COALESCE($6, duration),
                max_participants = COALESCE($7, max_participants),
                price = COALESCE($8, price),
                level = COALESCE($9, level),
                category_id = COALESCE($10, category_id),
                location = COALESCE($11, location),
                requirements = COALESCE($12, requirements),
                attachments = COALESCE($13, attachments),
                updated_at = $14
            WHERE id = $1
            RETURNING {}
            "#,
            WORKSHOP_COLUMNS
        ))
        .bind(id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.date)
        .bind(&request.time)
        .bind(&request.duration)
        .bind(request.max_participants)
        .bind(request.price)
        .bind(request.level)
        .bind(request.category_id)
        .bind(&request.location)
        .bind(&request.requirements)
        .bind(attachments.map(Json))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Workshop::from)
            .ok_or(SkillhubError::WorkshopNotFound { workshop_id: id })
    }

    async fn delete(&self, id: WorkshopId) -> Result<()> {
        let result = sqlx::query("DELETE FROM workshops WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(SkillhubError::WorkshopNotFound { workshop_id: id });
        }

        Ok(())
    }

    async fn register_participant(&self, id: WorkshopId, user_id: UserId) -> Result<Workshop> {
        // Guarded append: the capacity, membership, and status checks are
        // part of the UPDATE itself, so two registrations racing for the
        // last seat cannot both pass. A missed guard is classified by
        // re-reading the row; if the re-read says registration is allowed
        // the row moved under us and the append is retried.
        for _ in 0..MAX_GUARD_RETRIES {
            let row = sqlx::query_as::<_, WorkshopRow>(&format!(
                r#"
                UPDATE workshops
                SET participants = array_append(participants, $2),
                    updated_at = $3
                WHERE id = $1
                  AND status = 'upcoming'
                  AND NOT ($2 = ANY(participants))
                  AND cardinality(participants) < max_participants
                RETURNING {}
                "#,
                WORKSHOP_COLUMNS
            ))
            .bind(id)
            .bind(user_id)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

            match row {
                Some(row) => return Ok(row.into()),
                None => {
                    let workshop = self.fetch(id).await?;
                    workshop.ensure_can_register(user_id)?;
                }
            }
        }

        Err(SkillhubError::Persistence(sqlx::Error::RowNotFound))
    }

    async fn remove_participant(&self, id: WorkshopId, user_id: UserId) -> Result<Workshop> {
        for _ in 0..MAX_GUARD_RETRIES {
            let row = sqlx::query_as::<_, WorkshopRow>(&format!(
                r#"
                UPDATE workshops
                SET participants = array_remove(participants, $2),
                    updated_at = $3
                WHERE id = $1
                  AND status = 'upcoming'
                  AND $2 = ANY(participants)
                RETURNING {}
                "#,
                WORKSHOP_COLUMNS
            ))
            .bind(id)
            .bind(user_id)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

            match row {
                Some(row) => return Ok(row.into()),
                None => {
                    let workshop = self.fetch(id).await?;
                    workshop.ensure_can_cancel(user_id)?;
                }
            }
        }

        Err(SkillhubError::Persistence(sqlx::Error::RowNotFound))
    }

    async fn set_status(&self, id: WorkshopId, status: WorkshopStatus) -> Result<Workshop> {
        let current = self.fetch(id).await?;
        if !current.status.can_transition_to(status) {
            return Err(SkillhubError::InvalidStateTransition {
                from: current.status,
                to: status,
            });
        }

        // Guard on the observed status so a concurrent transition loses.
        let row = sqlx::query_as::<_, WorkshopRow>(&format!(
            r#"
            UPDATE workshops
            SET status = $3, updated_at = $4
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            WORKSHOP_COLUMNS
        ))
        .bind(id)
        .bind(current.status)
        .bind(status)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Workshop::from).ok_or(SkillhubError::InvalidStateTransition {
            from: current.status,
            to: status,
        })
    }

    async fn list_upcoming(&self) -> Result<Vec<Workshop>> {
        let rows = sqlx::query_as::<_, WorkshopRow>(&format!(
            "SELECT {} FROM workshops WHERE status = 'upcoming' AND date >= NOW() ORDER BY date ASC",
            WORKSHOP_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Workshop::from).collect())
    }

    async fn list_by_instructor(&self, instructor: UserId) -> Result<Vec<Workshop>> {
        let rows = sqlx::query_as::<_, WorkshopRow>(&format!(
            "SELECT {} FROM workshops WHERE instructor = $1 ORDER BY date ASC",
            WORKSHOP_COLUMNS
        ))
        .bind(instructor)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Workshop::from).collect())
    }
}
