//! Workshop model
//!
//! The workshop record, its lifecycle state machine, and the pure
//! registration guards shared by every storage backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ids::{CategoryId, UserId, WorkshopId};
use crate::utils::errors::{Result, SkillhubError};

/// Difficulty level of a workshop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "workshop_level", rename_all = "lowercase")]
pub enum WorkshopLevel {
    Beginner,
    Intermediate,
    Expert,
}

impl Default for WorkshopLevel {
    fn default() -> Self {
        WorkshopLevel::Beginner
    }
}

/// Lifecycle status of a workshop.
///
/// Valid transitions: upcoming -> in-progress -> completed, and
/// upcoming -> cancelled. Completed and cancelled are terminal. Only
/// upcoming workshops accept participant mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "workshop_status", rename_all = "kebab-case")]
pub enum WorkshopStatus {
    Upcoming,
    InProgress,
    Completed,
    Cancelled,
}

impl WorkshopStatus {
    /// Check whether a lifecycle transition is allowed.
    pub fn can_transition_to(self, next: WorkshopStatus) -> bool {
        matches!(
            (self, next),
            (WorkshopStatus::Upcoming, WorkshopStatus::InProgress)
                | (WorkshopStatus::Upcoming, WorkshopStatus::Cancelled)
                | (WorkshopStatus::InProgress, WorkshopStatus::Completed)
        )
    }
}

impl std::fmt::Display for WorkshopStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WorkshopStatus::Upcoming => "upcoming",
            WorkshopStatus::InProgress => "in-progress",
            WorkshopStatus::Completed => "completed",
            WorkshopStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Metadata for a stored attachment binary.
///
/// `path` is a storage-relative locator with a generated name, never the
/// original filename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub path: String,
    pub mimetype: String,
    pub size: i64,
}

/// An uploaded binary handed to the pipeline by the transport layer,
/// already size/type filtered upstream.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub mimetype: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn size(&self) -> i64 {
        self.data.len() as i64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workshop {
    pub id: WorkshopId,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub time: String,
    pub duration: String,
    pub max_participants: i32,
    pub participants: Vec<UserId>,
    pub price: f64,
    pub level: WorkshopLevel,
    pub status: WorkshopStatus,
    pub instructor: UserId,
    pub attachments: Vec<Attachment>,
    pub category_id: Option<CategoryId>,
    pub location: Option<String>,
    pub requirements: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkshopRequest {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub time: String,
    pub duration: String,
    pub max_participants: i32,
    pub price: f64,
    #[serde(default)]
    pub level: WorkshopLevel,
    pub category_id: Option<CategoryId>,
    pub location: Option<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWorkshopRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub time: Option<String>,
    pub duration: Option<String>,
    pub max_participants: Option<i32>,
    pub price: Option<f64>,
    pub level: Option<WorkshopLevel>,
    pub category_id: Option<CategoryId>,
    pub location: Option<String>,
    pub requirements: Option<Vec<String>>,
}

impl CreateWorkshopRequest {
    /// Enforce the business rules the schema layer does not cover.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(SkillhubError::Validation("Title is required".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(SkillhubError::Validation(
                "Description is required".to_string(),
            ));
        }
        if self.time.trim().is_empty() {
            return Err(SkillhubError::Validation("Time is required".to_string()));
        }
        if self.duration.trim().is_empty() {
            return Err(SkillhubError::Validation(
                "Duration is required".to_string(),
            ));
        }
        if self.max_participants < 1 {
            return Err(SkillhubError::Validation(
                "Maximum participants must be at least 1".to_string(),
            ));
        }
        if self.price < 0.0 {
            return Err(SkillhubError::Validation(
                "Price cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl UpdateWorkshopRequest {
    /// True when no field is present at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.duration.is_none()
            && self.max_participants.is_none()
            && self.price.is_none()
            && self.level.is_none()
            && self.category_id.is_none()
            && self.location.is_none()
            && self.requirements.is_none()
    }

    /// Validate the fields that are present; at least one must be.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(SkillhubError::Validation(
                "At least one field must be provided for update".to_string(),
            ));
        }
        if let Some(ref title) = self.title {
            if title.trim().is_empty() {
                return Err(SkillhubError::Validation(
                    "Title cannot be empty if provided".to_string(),
                ));
            }
        }
        if let Some(ref description) = self.description {
            if description.trim().is_empty() {
                return Err(SkillhubError::Validation(
                    "Description cannot be empty if provided".to_string(),
                ));
            }
        }
        if let Some(max_participants) = self.max_participants {
            if max_participants < 1 {
                return Err(SkillhubError::Validation(
                    "Maximum participants must be at least 1".to_string(),
                ));
            }
        }
        if let Some(price) = self.price {
            if price < 0.0 {
                return Err(SkillhubError::Validation(
                    "Price cannot be negative".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Apply only the present fields onto an existing record.
    pub fn apply_to(&self, workshop: &mut Workshop) {
        if let Some(ref title) = self.title {
            workshop.title = title.clone();
        }
        if let Some(ref description) = self.description {
            workshop.description = description.clone();
        }
        if let Some(date) = self.date {
            workshop.date = date;
        }
        if let Some(ref time) = self.time {
            workshop.time = time.clone();
        }
        if let Some(ref duration) = self.duration {
            workshop.duration = duration.clone();
        }
        if let Some(max_participants) = self.max_participants {
            workshop.max_participants = max_participants;
        }
        if let Some(price) = self.price {
            workshop.price = price;
        }
        if let Some(level) = self.level {
            workshop.level = level;
        }
        if let Some(category_id) = self.category_id {
            workshop.category_id = Some(category_id);
        }
        if let Some(ref location) = self.location {
            workshop.location = Some(location.clone());
        }
        if let Some(ref requirements) = self.requirements {
            workshop.requirements = requirements.clone();
        }
        workshop.updated_at = Utc::now();
    }
}

impl Workshop {
    /// Build a new workshop from a validated creation request.
    ///
    /// The instructor is fixed here and never changes afterwards; the
    /// participant list starts empty and the status at upcoming.
    pub fn from_request(
        request: CreateWorkshopRequest,
        instructor: UserId,
        attachments: Vec<Attachment>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: WorkshopId::new(),
            title: request.title,
            description: request.description,
            date: request.date,
            time: request.time,
            duration: request.duration,
            max_participants: request.max_participants,
            participants: Vec::new(),
            price: request.price,
            level: request.level,
            status: WorkshopStatus::Upcoming,
            instructor,
            attachments,
            category_id: request.category_id,
            location: request.location,
            requirements: request.requirements,
            created_at: now,
            updated_at: now,
        }
    }

    /// Typed ownership check: only the stored instructor may mutate.
    pub fn is_instructor(&self, user_id: UserId) -> bool {
        self.instructor == user_id
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() as i32 >= self.max_participants
    }

    pub fn is_registered(&self, user_id: UserId) -> bool {
        self.participants.contains(&user_id)
    }

    /// Check whether `user_id` may register right now.
    ///
    /// Every backend must evaluate this against the same snapshot it
    /// writes, so the capacity bound holds under concurrent requests.
    pub fn ensure_can_register(&self, user_id: UserId) -> Result<()> {
        if self.is_full() {
            return Err(SkillhubError::WorkshopFull {
                workshop_id: self.id,
            });
        }
        if self.is_registered(user_id) {
            return Err(SkillhubError::AlreadyRegistered {
                workshop_id: self.id,
                user_id,
            });
        }
        if self.status != WorkshopStatus::Upcoming {
            return Err(SkillhubError::InvalidState {
                status: self.status,
                expected: WorkshopStatus::Upcoming,
            });
        }
        Ok(())
    }

    /// Check whether `user_id` may cancel an existing registration.
    pub fn ensure_can_cancel(&self, user_id: UserId) -> Result<()> {
        if !self.is_registered(user_id) {
            return Err(SkillhubError::NotRegistered {
                workshop_id: self.id,
                user_id,
            });
        }
        if self.status != WorkshopStatus::Upcoming {
            return Err(SkillhubError::InvalidState {
                status: self.status,
                expected: WorkshopStatus::Upcoming,
            });
        }
        Ok(())
    }
}
