//! In-memory workshop repository
//!
//! A lock-backed implementation of [`WorkshopRepository`] used by the test
//! suite and as an embedded store. Every operation takes the map lock for
//! its whole check-and-mutate span, which is what makes the participant
//! operations atomic here.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::models::ids::{UserId, WorkshopId};
use crate::models::workshop::{
    Attachment, UpdateWorkshopRequest, Workshop, WorkshopStatus,
};
use crate::utils::errors::{Result, SkillhubError};

use super::workshop::WorkshopRepository;

#[derive(Clone, Default)]
pub struct InMemoryWorkshopRepository {
    workshops: Arc<Mutex<HashMap<WorkshopId, Workshop>>>,
}

impl InMemoryWorkshopRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored workshops.
    pub async fn len(&self) -> usize {
        self.workshops.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.workshops.lock().await.is_empty()
    }
}

#[async_trait]
impl WorkshopRepository for InMemoryWorkshopRepository {
    async fn find_by_id(&self, id: WorkshopId) -> Result<Option<Workshop>> {
        let workshops = self.workshops.lock().await;
        Ok(workshops.get(&id).cloned())
    }

    async fn create(&self, workshop: &Workshop) -> Result<Workshop> {
        let mut workshops = self.workshops.lock().await;
        workshops.insert(workshop.id, workshop.clone());
        Ok(workshop.clone())
    }

    async fn update(
        &self,
        id: WorkshopId,
        request: &UpdateWorkshopRequest,
        attachments: Option<&[Attachment]>,
    ) -> Result<Workshop> {
        let mut workshops = self.workshops.lock().await;
        let workshop = workshops
            .get_mut(&id)
            .ok_or(SkillhubError::WorkshopNotFound { workshop_id: id })?;

        request.apply_to(workshop);
        if let Some(attachments) = attachments {
            workshop.attachments = attachments.to_vec();
        }

        Ok(workshop.clone())
    }

    async fn delete(&self, id: WorkshopId) -> Result<()> {
        let mut workshops = self.workshops.lock().await;
        workshops
            .remove(&id)
            .map(|_| ())
            .ok_or(SkillhubError::WorkshopNotFound { workshop_id: id })
    }

    async fn register_participant(&self, id: WorkshopId, user_id: UserId) -> Result<Workshop> {
        let mut workshops = self.workshops.lock().await;
        let workshop = workshops
            .get_mut(&id)
            .ok_or(SkillhubError::WorkshopNotFound { workshop_id: id })?;

        // Check and append under the same lock hold.
        workshop.ensure_can_register(user_id)?;
        workshop.participants.push(user_id);
        workshop.updated_at = Utc::now();

        Ok(workshop.clone())
    }

    async fn remove_participant(&self, id: WorkshopId, user_id: UserId) -> Result<Workshop> {
        let mut workshops = self.workshops.lock().await;
        let workshop = workshops
            .get_mut(&id)
            .ok_or(SkillhubError::WorkshopNotFound { workshop_id: id })?;

        workshop.ensure_can_cancel(user_id)?;
        workshop.participants.retain(|participant| *participant != user_id);
        workshop.updated_at = Utc::now();

        Ok(workshop.clone())
    }

    async fn set_status(&self, id: WorkshopId, status: WorkshopStatus) -> Result<Workshop> {
        let mut workshops = self.workshops.lock().await;
        let workshop = workshops
            .get_mut(&id)
            .ok_or(SkillhubError::WorkshopNotFound { workshop_id: id })?;

        if !workshop.status.can_transition_to(status) {
            return Err(SkillhubError::InvalidStateTransition {
                from: workshop.status,
                to: status,
            });
        }

        workshop.status = status;
        workshop.updated_at = Utc::now();

        Ok(workshop.clone())
    }

    async fn list_upcoming(&self) -> Result<Vec<Workshop>> {
        let workshops = self.workshops.lock().await;
        let now = Utc::now();
        let mut upcoming: Vec<Workshop> = workshops
            .values()
            .filter(|workshop| workshop.status == WorkshopStatus::Upcoming && workshop.date >= now)
            .cloned()
            .collect();
        upcoming.sort_by_key(|workshop| workshop.date);
        Ok(upcoming)
    }

    async fn list_by_instructor(&self, instructor: UserId) -> Result<Vec<Workshop>> {
        let workshops = self.workshops.lock().await;
        let mut hosted: Vec<Workshop> = workshops
            .values()
            .filter(|workshop| workshop.instructor == instructor)
            .cloned()
            .collect();
        hosted.sort_by_key(|workshop| workshop.date);
        Ok(hosted)
    }
}
